// src/commands/install.rs
//! Component installation command

use super::{load_config, load_store};
use crate::cli::GlobalArgs;
use anyhow::{Result, anyhow};
use compman::{
    ArtifactFetcher, GitCloner, InstallOutcome, Installer, SourceFileLoader, install_parameters,
};
use std::path::PathBuf;
use tracing::info;

/// Install components and their dependencies
///
/// # Arguments
/// * `global` - Global CLI options (config file, knowledge base inputs)
/// * `identifiers` - Component identifiers to install
/// * `specifications` - Staging directory override
/// * `clone_timeout` - Clone timeout override in seconds
pub fn cmd_install(
    global: &GlobalArgs,
    identifiers: Vec<String>,
    specifications: Option<PathBuf>,
    clone_timeout: Option<u64>,
) -> Result<()> {
    let mut config = load_config(global)?;
    if let Some(path) = specifications {
        config.install.specifications_path = path;
    }
    if let Some(secs) = clone_timeout {
        if secs == 0 {
            return Err(anyhow!("--clone-timeout must be greater than zero"));
        }
        config.git.clone_timeout_secs = secs;
    }

    let store = load_store(global, &config)?;
    let fetcher = ArtifactFetcher::new(GitCloner::new(&config.git), &config.install);
    info!(
        "Installing {} component(s) into {}",
        identifiers.len(),
        fetcher.staging_root().display()
    );

    let mut installer = Installer::new(store, SourceFileLoader::new(), fetcher);
    let outcome = installer.execute(&install_parameters(identifiers));

    match &outcome {
        InstallOutcome::NotImplemented { reason } => {
            return Err(anyhow!("Not supported: {}", reason));
        }
        InstallOutcome::Completed(report) | InstallOutcome::Partial(report) => {
            for identifier in &report.installed {
                println!("Installed {}", identifier);
            }
            if !report.plan.is_empty() {
                println!("Dependencies installed: {}", report.plan);
            }
            for failure in &report.failures {
                println!("Failed {}: {}", failure.identifier, failure.error);
            }
        }
    }

    if outcome.is_complete() {
        Ok(())
    } else {
        let failed = outcome.report().map(|r| r.failures.len()).unwrap_or(0);
        Err(anyhow!("{} component(s) could not be installed", failed))
    }
}
