// src/commands/mod.rs
//! Command handlers for the compman CLI

mod install;
mod validate;

pub use install::cmd_install;
pub use validate::cmd_validate;

use crate::cli::GlobalArgs;
use anyhow::{Context, Result};
use compman::source::load_knowledge_base;
use compman::{ManagerConfig, MemoryStore, SourceFileLoader};
use tracing::{debug, info};

/// Load configuration from `--config` or the default location
pub(crate) fn load_config(global: &GlobalArgs) -> Result<ManagerConfig> {
    let path = global
        .config
        .clone()
        .or_else(compman::config::default_config_path);
    debug!("Loading configuration from {:?}", path);

    if let Some(explicit) = &global.config
        && !explicit.exists()
    {
        anyhow::bail!("Configuration file {} does not exist", explicit.display());
    }

    ManagerConfig::load_or_default(path.as_deref())
        .with_context(|| format!("Failed to load configuration from {:?}", path))
}

/// Build the knowledge store from every `--kb` input
pub(crate) fn load_store(global: &GlobalArgs, config: &ManagerConfig) -> Result<MemoryStore> {
    let mut store = MemoryStore::new();
    let loader = SourceFileLoader::new();

    for path in &global.knowledge_base {
        let statements =
            load_knowledge_base(&loader, &mut store, path, &config.install.source_extension)
                .with_context(|| format!("Failed to load knowledge base {}", path.display()))?;
        info!("Loaded {} statement(s) from {}", statements, path.display());
    }

    Ok(store)
}
