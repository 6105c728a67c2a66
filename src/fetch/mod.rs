// src/fetch/mod.rs

//! Artifact fetching
//!
//! Stages a component's repository under the specifications directory and
//! loads the knowledge source files found at its top level:
//!
//! 1. read the component's remote address from the store
//! 2. skip quietly if the address does not start with a recognised prefix
//! 3. pick a staging directory (see [`staging`]) under an exclusive lock
//! 4. clone into it, unless it was already staged from the same address
//! 5. load every `*.<extension>` file directly inside it
//!
//! A failed clone removes the directory it was cloning into and stops the
//! fetch before anything is loaded.

pub mod git;
pub mod staging;

pub use git::{GitCloner, RemoteCloner};
pub use staging::{StagingLock, StagingSlot};

use crate::cancel::CancelToken;
use crate::config::InstallConfig;
use crate::error::{Error, Result};
use crate::source::{SourceLoader, source_files_in};
use crate::store::{ComponentRef, KnowledgeStore};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Result of fetching one component
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Address not handled by any known remote source
    Skipped { address: String },
    /// Sources staged and loaded
    Fetched {
        directory: PathBuf,
        /// Loaded source files, in load order
        loaded: Vec<PathBuf>,
        /// True when an existing staging directory was reused
        reused: bool,
    },
}

/// Stages component repositories and loads their sources
#[derive(Debug, Clone)]
pub struct ArtifactFetcher<C> {
    cloner: C,
    staging_root: PathBuf,
    source_extension: String,
    remote_prefixes: Vec<String>,
}

impl<C: RemoteCloner> ArtifactFetcher<C> {
    /// Create a fetcher from the `[install]` configuration section
    pub fn new(cloner: C, config: &InstallConfig) -> Self {
        Self {
            cloner,
            staging_root: config.specifications_path.clone(),
            source_extension: config.source_extension.clone(),
            remote_prefixes: config.remote_prefixes.clone(),
        }
    }

    /// Override the staging root
    pub fn with_staging_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.staging_root = root.into();
        self
    }

    pub fn staging_root(&self) -> &Path {
        &self.staging_root
    }

    pub fn cloner(&self) -> &C {
        &self.cloner
    }

    /// Check whether an address points at a remote source this fetcher handles
    pub fn is_recognized(&self, address: &str) -> bool {
        self.remote_prefixes
            .iter()
            .any(|prefix| address.starts_with(prefix.as_str()))
    }

    /// Fetch a component and load its sources into `store`
    pub fn fetch<S, L>(
        &self,
        store: &mut S,
        loader: &L,
        component: ComponentRef,
        cancel: &CancelToken,
    ) -> Result<FetchOutcome>
    where
        S: KnowledgeStore,
        L: SourceLoader<S>,
    {
        let address = store
            .get_address_content(component)?
            .unwrap_or_default()
            .trim()
            .to_string();

        if !self.is_recognized(&address) {
            info!(
                "Component {} address '{}' is not a recognised remote source, skipping fetch",
                component, address
            );
            return Ok(FetchOutcome::Skipped { address });
        }

        let name = staging::directory_name(&address).ok_or_else(|| Error::FetchFailed {
            address: address.clone(),
            reason: "cannot derive a directory name from the address".to_string(),
        })?;

        fs::create_dir_all(&self.staging_root)?;
        let _lock = StagingLock::acquire(&self.staging_root, &name)?;

        let slot = staging::select_staging_dir(&self.staging_root, &name, &address)?;
        let reused = matches!(slot, StagingSlot::Reuse(_));
        let directory = match slot {
            StagingSlot::Reuse(dir) => {
                info!("Reusing staged sources at {}", dir.display());
                dir
            }
            StagingSlot::Fresh(dir) => {
                self.clone_into(&address, &dir, cancel)?;
                dir
            }
        };

        let loaded = self.load_sources(store, loader, &directory)?;
        Ok(FetchOutcome::Fetched {
            directory,
            loaded,
            reused,
        })
    }

    fn clone_into(&self, address: &str, dir: &Path, cancel: &CancelToken) -> Result<()> {
        fs::create_dir_all(dir)?;

        if let Err(e) = self.cloner.clone_repository(address, dir, cancel) {
            warn!("Clone of {} failed, removing {}", address, dir.display());
            if let Err(cleanup) = fs::remove_dir_all(dir) {
                warn!("Failed to remove {}: {}", dir.display(), cleanup);
            }
            return Err(e);
        }

        staging::write_marker(dir, address)?;
        Ok(())
    }

    fn load_sources<S, L>(&self, store: &mut S, loader: &L, dir: &Path) -> Result<Vec<PathBuf>>
    where
        S: KnowledgeStore,
        L: SourceLoader<S>,
    {
        let files = source_files_in(dir, &self.source_extension)?;
        if files.is_empty() {
            debug!("No .{} files in {}", self.source_extension, dir.display());
        }

        for file in &files {
            let statements = loader
                .load_source_file(store, file)
                .map_err(|source| Error::LoadFailed {
                    path: file.clone(),
                    source,
                })?;
            debug!("Loaded {} ({} statements)", file.display(), statements);
        }
        Ok(files)
    }
}
