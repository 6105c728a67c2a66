// src/resolver/mod.rs

//! Dependency resolution for component installs
//!
//! Dependencies are installed depth-first before the component that needs
//! them. Each dependency goes through the full install path (validate,
//! resolve its own dependencies, fetch), so the resolver itself only decides
//! the order, tracks what is in progress and stops at the first failure.
//!
//! A [`ResolutionSession`] lives for one top-level install call. It carries
//! the stack of identifiers currently being resolved, which is how cycles are
//! detected, and the set of identifiers already installed during the call,
//! so a dependency shared by several components is installed once.

mod plan;

pub use plan::InstallPlan;

use crate::error::{Error, Result};
use crate::store::{ComponentRef, KnowledgeStore, StoreError};
use std::collections::HashSet;
use tracing::{debug, error, info};

/// Per-call resolution state
#[derive(Debug, Default)]
pub struct ResolutionSession {
    /// Identifiers currently being installed, outermost first
    in_progress: Vec<String>,
    installed: HashSet<String>,
}

impl ResolutionSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `identifier` as being installed
    ///
    /// Fails with [`Error::CyclicDependency`] if it is already on the stack.
    pub fn enter(&mut self, identifier: &str) -> Result<()> {
        if let Some(start) = self.in_progress.iter().position(|id| id == identifier) {
            let mut cycle = self.in_progress[start..].to_vec();
            cycle.push(identifier.to_string());
            error!("Cyclic dependency detected: {}", cycle.join(" -> "));
            return Err(Error::CyclicDependency { cycle });
        }
        self.in_progress.push(identifier.to_string());
        Ok(())
    }

    /// Pop `identifier` off the in-progress stack
    pub fn leave(&mut self, identifier: &str) {
        if let Some(pos) = self.in_progress.iter().rposition(|id| id == identifier) {
            self.in_progress.remove(pos);
        }
    }

    pub fn mark_installed(&mut self, identifier: &str) {
        self.installed.insert(identifier.to_string());
    }

    pub fn is_installed(&self, identifier: &str) -> bool {
        self.installed.contains(identifier)
    }

    /// Depth of the current install chain
    pub fn depth(&self) -> usize {
        self.in_progress.len()
    }
}

/// Identifiers of a component's dependencies, in declaration order
///
/// A failed dependency query is an error of its own, distinct from a
/// component that has no dependencies.
pub fn dependency_identifiers<S>(
    store: &S,
    component: ComponentRef,
    identifier: &str,
) -> Result<Vec<String>>
where
    S: KnowledgeStore + ?Sized,
{
    let query_failed = |source: StoreError| {
        error!("Failed to query dependencies of \"{}\": {}", identifier, source);
        Error::DependencyQuery {
            identifier: identifier.to_string(),
            source,
        }
    };

    store
        .get_dependencies(component)
        .map_err(query_failed)?
        .into_iter()
        .map(|dependency| store.get_identifier(dependency).map_err(query_failed))
        .collect()
}

/// Install each dependency through `install`, recording it in `plan`
///
/// `install` is the full install operation for a single identifier and
/// records that identifier's own dependencies in the plan it is given. A
/// dependency is appended once it is installed, after its own dependencies.
/// The first failure aborts the remaining dependencies; dependencies
/// installed before it stay installed and stay in `plan`.
pub fn install_dependencies<F>(
    dependencies: &[String],
    session: &mut ResolutionSession,
    plan: &mut InstallPlan,
    mut install: F,
) -> Result<()>
where
    F: FnMut(&str, &mut ResolutionSession, &mut InstallPlan) -> Result<()>,
{
    for dependency in dependencies {
        if session.is_installed(dependency) {
            debug!("Dependency \"{}\" already installed in this run", dependency);
            continue;
        }

        info!("Install dependency \"{}\"", dependency);
        match install(dependency, session, plan) {
            Ok(()) => plan.push(dependency.as_str()),
            Err(e @ (Error::CyclicDependency { .. } | Error::Cancelled)) => return Err(e),
            Err(e) => {
                error!("Dependency \"{}\" is not installed", dependency);
                return Err(Error::DependencyFailed {
                    dependency: dependency.clone(),
                    source: Box::new(e),
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::store::keynodes::NREL_COMPONENT_DEPENDENCIES;
    use crate::validator::Rejection;
    use std::collections::HashMap;

    /// Resolve against a plain adjacency map, recursing like the installer does
    fn install_from_map(
        graph: &HashMap<&str, Vec<&str>>,
        identifier: &str,
        session: &mut ResolutionSession,
        plan: &mut InstallPlan,
        fetched: &mut Vec<String>,
    ) -> Result<()> {
        session.enter(identifier)?;
        let deps: Vec<String> = graph
            .get(identifier)
            .map(|d| d.iter().map(|s| s.to_string()).collect())
            .unwrap_or_default();
        let result = install_dependencies(&deps, session, plan, |dep, session, plan| {
            install_from_map(graph, dep, session, plan, fetched)
        });
        session.leave(identifier);
        result?;
        fetched.push(identifier.to_string());
        session.mark_installed(identifier);
        Ok(())
    }

    fn resolve(
        graph: &HashMap<&str, Vec<&str>>,
        root: &str,
    ) -> (Result<()>, InstallPlan, Vec<String>) {
        let mut session = ResolutionSession::new();
        let mut plan = InstallPlan::new();
        let mut fetched = Vec::new();
        let result = install_from_map(graph, root, &mut session, &mut plan, &mut fetched);
        assert_eq!(session.depth(), 0);
        (result, plan, fetched)
    }

    #[test]
    fn test_leaf_component_has_empty_plan() {
        let graph = HashMap::from([("c", vec![])]);
        let (result, plan, fetched) = resolve(&graph, "c");
        assert!(result.is_ok());
        assert!(plan.is_empty());
        assert_eq!(fetched, vec!["c"]);
    }

    #[test]
    fn test_chain_orders_dependencies_first() {
        let graph = HashMap::from([("c", vec!["b"]), ("b", vec!["a"]), ("a", vec![])]);
        let (result, plan, fetched) = resolve(&graph, "c");

        assert!(result.is_ok());
        assert_eq!(plan.as_slice(), &["a", "b"]);
        assert_eq!(fetched, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_diamond_installs_shared_dependency_once() {
        let graph = HashMap::from([
            ("top", vec!["left", "right"]),
            ("left", vec!["base"]),
            ("right", vec!["base"]),
            ("base", vec![]),
        ]);
        let (result, plan, fetched) = resolve(&graph, "top");

        assert!(result.is_ok());
        assert_eq!(plan.as_slice(), &["base", "left", "right"]);
        assert_eq!(fetched.iter().filter(|id| *id == "base").count(), 1);
    }

    #[test]
    fn test_two_node_cycle() {
        let graph = HashMap::from([("a", vec!["b"]), ("b", vec!["a"])]);
        let (result, plan, fetched) = resolve(&graph, "a");

        match result {
            Err(Error::CyclicDependency { cycle }) => assert_eq!(cycle, vec!["a", "b", "a"]),
            other => panic!("expected cycle, got {:?}", other),
        }
        assert!(plan.is_empty());
        assert!(fetched.is_empty());
    }

    #[test]
    fn test_self_dependency_is_a_cycle() {
        let graph = HashMap::from([("a", vec!["a"])]);
        let (result, _, _) = resolve(&graph, "a");
        assert!(matches!(result, Err(Error::CyclicDependency { cycle }) if cycle == vec!["a", "a"]));
    }

    #[test]
    fn test_failure_aborts_remaining_siblings() {
        let mut attempted = Vec::new();
        let deps = vec!["ok".to_string(), "broken".to_string(), "never".to_string()];
        let mut session = ResolutionSession::new();
        let mut plan = InstallPlan::new();

        let err = install_dependencies(&deps, &mut session, &mut plan, |dep, _, _| {
            attempted.push(dep.to_string());
            if dep == "broken" {
                Err(Error::Rejected {
                    identifier: dep.to_string(),
                    reason: Rejection::NotFound,
                })
            } else {
                Ok(())
            }
        })
        .unwrap_err();

        assert_eq!(attempted, vec!["ok", "broken"]);
        assert!(matches!(err, Error::DependencyFailed { dependency, .. } if dependency == "broken"));
        assert_eq!(plan.as_slice(), &["ok"]);
    }

    #[test]
    fn test_nested_failure_keeps_installed_dependencies() {
        let graph = HashMap::from([
            ("top", vec!["mid", "broken"]),
            ("mid", vec!["leaf"]),
            ("leaf", vec![]),
            ("broken", vec!["broken"]),
        ]);
        let (result, plan, fetched) = resolve(&graph, "top");

        assert!(matches!(result, Err(Error::CyclicDependency { .. })));
        assert_eq!(plan.as_slice(), &["leaf", "mid"]);
        assert_eq!(fetched, vec!["leaf", "mid"]);
    }

    #[test]
    fn test_dependency_identifiers_in_order() {
        let mut store = MemoryStore::new();
        let comp = store.resolve_node("comp");
        for name in ["first", "second"] {
            let dep = store.resolve_node(name);
            store.add_relation(NREL_COMPONENT_DEPENDENCIES, comp, dep);
        }

        assert_eq!(
            dependency_identifiers(&store, comp, "comp").unwrap(),
            vec!["first", "second"]
        );
    }

    #[test]
    fn test_unnamed_dependency_is_a_query_failure() {
        let mut store = MemoryStore::new();
        let comp = store.resolve_node("comp");
        let anonymous = store.add_link("not a component");
        store.add_relation(NREL_COMPONENT_DEPENDENCIES, comp, anonymous);

        let err = dependency_identifiers(&store, comp, "comp").unwrap_err();
        assert!(matches!(err, Error::DependencyQuery { .. }));
    }

    #[test]
    fn test_invalid_component_is_a_query_failure() {
        let mut store = MemoryStore::new();
        let comp = store.resolve_node("comp");
        store.remove_node(comp);
        assert!(matches!(
            dependency_identifiers(&store, comp, "comp"),
            Err(Error::DependencyQuery { .. })
        ));
    }
}
