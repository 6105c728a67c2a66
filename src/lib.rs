// src/lib.rs

//! Compman Component Manager
//!
//! Installs reusable components described in a knowledge base: resolves
//! their dependencies, validates their metadata, fetches their repositories
//! and loads the knowledge sources they ship back into the store.
//!
//! # Architecture
//!
//! - Store capability: the installer only sees the [`KnowledgeStore`] trait
//! - Validation: four ordered checks with a structured [`Rejection`]
//! - Resolution: depth-first, dependencies before dependents, cycle-safe
//! - Fetching: deterministic staging directories, checked and time-limited clones
//! - Outcomes: [`InstallOutcome`] separates complete, partial and unsupported requests

pub mod cancel;
pub mod config;
mod error;
pub mod fetch;
pub mod install;
pub mod resolver;
pub mod source;
pub mod store;
pub mod validator;

pub use cancel::CancelToken;
pub use config::ManagerConfig;
pub use error::{Error, Result};
pub use fetch::{ArtifactFetcher, FetchOutcome, GitCloner, RemoteCloner};
pub use install::{
    CommandParameters, InstallFailure, InstallOutcome, InstallReport, Installer, PARAMETER_NAME,
    install_parameters,
};
pub use resolver::{InstallPlan, ResolutionSession};
pub use source::{SourceFileLoader, SourceLoader};
pub use store::{ComponentRef, KnowledgeStore, MemoryStore, RelationKind, StoreError};
pub use validator::{Rejection, is_installable, validate_component};
