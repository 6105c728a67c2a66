// src/main.rs

use anyhow::Result;
use clap::Parser;
use tracing::info;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.global.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Some(Commands::Install {
            identifiers,
            specifications,
            clone_timeout,
        }) => {
            info!("Installing components: {}", identifiers.join(", "));
            commands::cmd_install(&cli.global, identifiers, specifications, clone_timeout)
        }
        Some(Commands::Validate { identifiers }) => {
            commands::cmd_validate(&cli.global, &identifiers)
        }
        None => {
            println!("compman v{}", env!("CARGO_PKG_VERSION"));
            println!("Run 'compman --help' for usage information");
            Ok(())
        }
    }
}
