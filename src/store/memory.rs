// src/store/memory.rs

//! In-memory knowledge store
//!
//! A small graph of named nodes, link nodes and arcs. It backs the CLI (the
//! knowledge base is loaded from source files at startup) and the test suite.
//! Relation arcs are kept in insertion order so that ordered relations such
//! as component dependencies come back in the order they were written.

use super::keynodes::{
    NREL_COMPONENT_ADDRESS, NREL_COMPONENT_DEPENDENCIES, NREL_INSTALLATION_METHOD,
};
use super::{ComponentRef, KnowledgeStore, RelationKind, StoreError};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default)]
struct Node {
    identifier: Option<String>,
    /// Present only for link nodes
    content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct RelationArc {
    relation: ComponentRef,
    subject: ComponentRef,
    object: ComponentRef,
}

/// Knowledge store held entirely in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    next_id: u64,
    nodes: HashMap<ComponentRef, Node>,
    identifiers: HashMap<String, ComponentRef>,
    memberships: HashSet<(ComponentRef, ComponentRef)>,
    relations: Vec<RelationArc>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self, node: Node) -> ComponentRef {
        self.next_id += 1;
        let node_ref = ComponentRef(self.next_id);
        self.nodes.insert(node_ref, node);
        node_ref
    }

    /// Find the node named `identifier`, creating it if needed
    pub fn resolve_node(&mut self, identifier: &str) -> ComponentRef {
        if let Some(existing) = self.identifiers.get(identifier) {
            return *existing;
        }

        let node_ref = self.allocate(Node {
            identifier: Some(identifier.to_string()),
            content: None,
        });
        self.identifiers.insert(identifier.to_string(), node_ref);
        node_ref
    }

    /// Create an anonymous link node holding `content`
    pub fn add_link(&mut self, content: &str) -> ComponentRef {
        self.allocate(Node {
            identifier: None,
            content: Some(content.to_string()),
        })
    }

    /// Add a membership arc `class -> element`
    ///
    /// Returns false if the arc already existed.
    pub fn add_membership(&mut self, class: ComponentRef, element: ComponentRef) -> bool {
        self.memberships.insert((class, element))
    }

    /// Add a relation arc `subject => relation: object`
    pub fn add_relation(&mut self, relation: &str, subject: ComponentRef, object: ComponentRef) {
        let relation = self.resolve_node(relation);
        let arc = RelationArc {
            relation,
            subject,
            object,
        };
        if !self.relations.contains(&arc) {
            self.relations.push(arc);
        }
    }

    /// Remove a node and every arc touching it
    pub fn remove_node(&mut self, node: ComponentRef) -> bool {
        let Some(removed) = self.nodes.remove(&node) else {
            return false;
        };
        if let Some(identifier) = removed.identifier {
            self.identifiers.remove(&identifier);
        }
        self.memberships
            .retain(|(class, element)| *class != node && *element != node);
        self.relations
            .retain(|arc| arc.relation != node && arc.subject != node && arc.object != node);
        true
    }

    /// Number of live nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn check(&self, node: ComponentRef) -> Result<&Node, StoreError> {
        self.nodes.get(&node).ok_or(StoreError::InvalidRef(node))
    }

    fn targets(&self, subject: ComponentRef, relation: &str) -> Result<Vec<ComponentRef>, StoreError> {
        self.check(subject)?;
        let Some(relation) = self.identifiers.get(relation) else {
            return Ok(Vec::new());
        };
        Ok(self
            .relations
            .iter()
            .filter(|arc| arc.relation == *relation && arc.subject == subject)
            .map(|arc| arc.object)
            .collect())
    }

    fn single_target(
        &self,
        subject: ComponentRef,
        relation: &str,
    ) -> Result<Option<ComponentRef>, StoreError> {
        let targets = self.targets(subject, relation)?;
        match targets.as_slice() {
            [] => Ok(None),
            [only] => Ok(Some(*only)),
            _ => Err(StoreError::Ambiguous {
                relation: relation.to_string(),
                subject,
            }),
        }
    }
}

impl KnowledgeStore for MemoryStore {
    fn find_by_identifier(&self, identifier: &str) -> Result<Option<ComponentRef>, StoreError> {
        Ok(self.identifiers.get(identifier).copied())
    }

    fn exists(&self, node: ComponentRef) -> bool {
        self.nodes.contains_key(&node)
    }

    fn has_relation(
        &self,
        kind: RelationKind,
        subject: ComponentRef,
        object: ComponentRef,
    ) -> Result<bool, StoreError> {
        self.check(subject)?;
        self.check(object)?;
        match kind {
            RelationKind::Membership => Ok(self.memberships.contains(&(subject, object))),
        }
    }

    fn get_link_content(&self, link: ComponentRef) -> Result<Option<String>, StoreError> {
        let node = self.check(link)?;
        match &node.content {
            Some(content) => Ok(Some(content.clone())),
            None => Err(StoreError::NotALink(link)),
        }
    }

    fn get_identifier(&self, node: ComponentRef) -> Result<String, StoreError> {
        self.check(node)?
            .identifier
            .clone()
            .ok_or(StoreError::Unnamed(node))
    }

    fn get_component_address(
        &self,
        component: ComponentRef,
    ) -> Result<Option<ComponentRef>, StoreError> {
        self.single_target(component, NREL_COMPONENT_ADDRESS)
    }

    fn get_dependencies(&self, component: ComponentRef) -> Result<Vec<ComponentRef>, StoreError> {
        self.targets(component, NREL_COMPONENT_DEPENDENCIES)
    }

    fn get_installation_method(
        &self,
        component: ComponentRef,
    ) -> Result<Option<ComponentRef>, StoreError> {
        self.single_target(component, NREL_INSTALLATION_METHOD)
    }
}
