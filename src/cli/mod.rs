// src/cli/mod.rs
//! CLI definitions for the compman component manager
//!
//! This module contains the command-line interface definitions using clap.
//! The actual command implementations are in the `commands` module.
//!
//! - `install` - Install component(s) and their dependencies
//! - `validate` - Check whether component(s) are installable

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "compman")]
#[command(author = "Compman Contributors")]
#[command(version)]
#[command(about = "Installs reusable knowledge-base components", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Options shared by every command
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Configuration file (default: <config dir>/compman/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Knowledge source file or directory to load before running (repeatable)
    #[arg(short, long = "kb", global = true)]
    pub knowledge_base: Vec<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Install component(s) and their dependencies
    Install {
        /// Component identifiers to install
        #[arg(required = true)]
        identifiers: Vec<String>,

        /// Directory where component repositories are staged
        #[arg(short, long)]
        specifications: Option<PathBuf>,

        /// Seconds before a running git clone is killed
        #[arg(long)]
        clone_timeout: Option<u64>,
    },

    /// Check whether component(s) can be installed
    Validate {
        /// Component identifiers to check
        #[arg(required = true)]
        identifiers: Vec<String>,
    },
}
