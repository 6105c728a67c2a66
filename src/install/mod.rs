// src/install/mod.rs

//! Component installation
//!
//! [`Installer::execute`] takes a named-parameter request and installs every
//! component listed under [`PARAMETER_NAME`]:
//!
//! 1. resolve the identifier in the knowledge store
//! 2. validate the component (see [`crate::validator`])
//! 3. install its dependencies first, each through the same path
//! 4. fetch the component's sources and load them into the store
//!
//! Requested identifiers are independent: one failing does not stop the
//! others. Inside a dependency chain the first failure aborts the chain.

mod outcome;

pub use outcome::{InstallFailure, InstallOutcome, InstallReport};

use crate::cancel::CancelToken;
use crate::error::{Error, Result};
use crate::fetch::{ArtifactFetcher, FetchOutcome, RemoteCloner};
use crate::resolver::{self, InstallPlan, ResolutionSession};
use crate::source::SourceLoader;
use crate::store::KnowledgeStore;
use crate::validator::{Rejection, validate_component};
use std::collections::HashMap;
use tracing::{debug, error, info, warn};

/// Parameter carrying the identifiers to install
pub const PARAMETER_NAME: &str = "idtf";

/// Named request parameters: parameter name to its values
pub type CommandParameters = HashMap<String, Vec<String>>;

/// Build a request installing the given identifiers
pub fn install_parameters<I, T>(identifiers: I) -> CommandParameters
where
    I: IntoIterator<Item = T>,
    T: Into<String>,
{
    HashMap::from([(
        PARAMETER_NAME.to_string(),
        identifiers.into_iter().map(Into::into).collect(),
    )])
}

/// Installs components from a knowledge store
pub struct Installer<S, L, C> {
    store: S,
    loader: L,
    fetcher: ArtifactFetcher<C>,
    cancel: CancelToken,
}

impl<S, L, C> Installer<S, L, C>
where
    S: KnowledgeStore,
    L: SourceLoader<S>,
    C: RemoteCloner,
{
    pub fn new(store: S, loader: L, fetcher: ArtifactFetcher<C>) -> Self {
        Self {
            store,
            loader,
            fetcher,
            cancel: CancelToken::new(),
        }
    }

    /// Use an externally controlled cancellation token
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn fetcher(&self) -> &ArtifactFetcher<C> {
        &self.fetcher
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Install every identifier listed in `parameters`
    pub fn execute(&mut self, parameters: &CommandParameters) -> InstallOutcome {
        let Some(identifiers) = parameters.get(PARAMETER_NAME) else {
            info!("No identifier provided, installing all components is not supported");
            return InstallOutcome::NotImplemented {
                reason: "installing all components is not supported".to_string(),
            };
        };

        let mut session = ResolutionSession::new();
        let mut report = InstallReport::default();

        for identifier in identifiers {
            if let Err(e) = self.cancel.check() {
                warn!("Installation cancelled before \"{}\"", identifier);
                report.failures.push(InstallFailure {
                    identifier: identifier.clone(),
                    error: e,
                });
                continue;
            }

            if session.is_installed(identifier) {
                debug!("Component \"{}\" already installed in this run", identifier);
                if !report.installed.contains(identifier) {
                    report.installed.push(identifier.clone());
                }
                continue;
            }

            let mut plan = InstallPlan::new();
            let result = self.install_component(identifier, &mut session, &mut plan);
            if !plan.is_empty() {
                info!("Installed dependencies of \"{}\": {}", identifier, plan);
            }
            report.plan.append(plan);

            match result {
                Ok(()) => report.installed.push(identifier.clone()),
                Err(e) => {
                    warn!("Unable to install component \"{}\": {}", identifier, e);
                    report.failures.push(InstallFailure {
                        identifier: identifier.clone(),
                        error: e,
                    });
                }
            }
        }

        InstallOutcome::from_report(report)
    }

    /// Install one component and, first, its dependencies
    ///
    /// Every dependency installed on its behalf is appended to `plan`, even
    /// when a later step fails.
    fn install_component(
        &mut self,
        identifier: &str,
        session: &mut ResolutionSession,
        plan: &mut InstallPlan,
    ) -> Result<()> {
        session.enter(identifier)?;
        let result = self.install_entered(identifier, session, plan);
        session.leave(identifier);
        result
    }

    fn install_entered(
        &mut self,
        identifier: &str,
        session: &mut ResolutionSession,
        plan: &mut InstallPlan,
    ) -> Result<()> {
        let component = self.store.find_by_identifier(identifier).unwrap_or_else(|e| {
            error!("Failed to look up \"{}\": {}", identifier, e);
            None
        });

        debug!("Validating component \"{}\"", identifier);
        validate_component(&self.store, component).map_err(|reason| Error::Rejected {
            identifier: identifier.to_string(),
            reason,
        })?;
        let component = component.ok_or_else(|| Error::Rejected {
            identifier: identifier.to_string(),
            reason: Rejection::NotFound,
        })?;
        debug!("Component \"{}\" is specified correctly", identifier);

        let dependencies = resolver::dependency_identifiers(&self.store, component, identifier)?;
        resolver::install_dependencies(&dependencies, session, plan, |dependency, session, plan| {
            self.install_component(dependency, session, plan)
        })?;

        self.cancel.check()?;
        match self
            .fetcher
            .fetch(&mut self.store, &self.loader, component, &self.cancel)?
        {
            FetchOutcome::Skipped { address } => {
                debug!("Nothing fetched for \"{}\" ({})", identifier, address);
            }
            FetchOutcome::Fetched {
                directory,
                loaded,
                reused,
            } => {
                info!(
                    "Component \"{}\" staged at {}{} ({} source file(s) loaded)",
                    identifier,
                    directory.display(),
                    if reused { " (reused)" } else { "" },
                    loaded.len()
                );
            }
        }

        // TODO: run the component's installation method once method handlers exist
        debug!("Installation method for \"{}\" is not executed", identifier);

        session.mark_installed(identifier);
        Ok(())
    }
}
