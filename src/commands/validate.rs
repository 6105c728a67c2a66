// src/commands/validate.rs
//! Component validation command

use super::{load_config, load_store};
use crate::cli::GlobalArgs;
use anyhow::{Result, anyhow};
use compman::{KnowledgeStore, validate_component};
use tracing::error;

/// Report whether each component passes validation
pub fn cmd_validate(global: &GlobalArgs, identifiers: &[String]) -> Result<()> {
    let config = load_config(global)?;
    let store = load_store(global, &config)?;

    let mut rejected = 0;
    for identifier in identifiers {
        let component = store.find_by_identifier(identifier).unwrap_or_else(|e| {
            error!("Failed to look up \"{}\": {}", identifier, e);
            None
        });

        match validate_component(&store, component) {
            Ok(()) => println!("{}: installable", identifier),
            Err(reason) => {
                println!("{}: {}", identifier, reason);
                rejected += 1;
            }
        }
    }

    if rejected == 0 {
        Ok(())
    } else {
        Err(anyhow!("{} of {} component(s) rejected", rejected, identifiers.len()))
    }
}
