// src/source/mod.rs

//! Knowledge source loading
//!
//! Source files describe nodes and arcs in a small statement language (see
//! [`parser`]). Component repositories ship such files next to their code;
//! after a component is fetched, every source file at the top of its staging
//! directory is loaded into the knowledge store.

pub mod parser;

pub use parser::{Statement, Target, parse_source};

use crate::store::MemoryStore;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Default extension of knowledge source files (without the dot)
pub const DEFAULT_SOURCE_EXTENSION: &str = "scs";

/// Syntax error in a source file
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub message: String,
}

/// Errors raised while loading a source file
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("read failed: {0}")]
    Io(String),

    #[error("syntax error at {0}")]
    Parse(#[from] ParseError),
}

impl From<io::Error> for LoadError {
    fn from(err: io::Error) -> Self {
        LoadError::Io(err.to_string())
    }
}

/// Loads source files into a knowledge store
pub trait SourceLoader<S: ?Sized> {
    /// Load one file, returning the number of statements applied
    fn load_source_file(&self, store: &mut S, path: &Path) -> Result<usize, LoadError>;
}

/// Loader for the statement language, writing into a [`MemoryStore`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceFileLoader;

impl SourceFileLoader {
    pub fn new() -> Self {
        Self
    }

    /// Apply already-parsed statements to the store
    pub fn apply(&self, store: &mut MemoryStore, statements: &[Statement]) -> usize {
        for statement in statements {
            match statement {
                Statement::Membership { class, elements } => {
                    let class = store.resolve_node(class);
                    for element in elements {
                        let element = resolve_target(store, element);
                        store.add_membership(class, element);
                    }
                }
                Statement::Relation {
                    subject,
                    relation,
                    objects,
                } => {
                    let subject = store.resolve_node(subject);
                    for object in objects {
                        let object = resolve_target(store, object);
                        store.add_relation(relation, subject, object);
                    }
                }
            }
        }
        statements.len()
    }
}

fn resolve_target(store: &mut MemoryStore, target: &Target) -> crate::store::ComponentRef {
    match target {
        Target::Node(identifier) => store.resolve_node(identifier),
        Target::Link(content) => store.add_link(content),
    }
}

impl SourceLoader<MemoryStore> for SourceFileLoader {
    fn load_source_file(&self, store: &mut MemoryStore, path: &Path) -> Result<usize, LoadError> {
        let content = fs::read_to_string(path)?;
        let statements = parse_source(&content)?;
        let applied = self.apply(store, &statements);
        debug!("Loaded {} statement(s) from {}", applied, path.display());
        Ok(applied)
    }
}

/// Check whether a file name carries the source extension
pub fn is_source_file(name: &str, extension: &str) -> bool {
    name.len() > extension.len() + 1
        && name
            .strip_suffix(extension)
            .is_some_and(|stem| stem.ends_with('.'))
}

/// List source files directly inside `dir`, sorted by name
///
/// Subdirectories are not descended into.
pub fn source_files_in(dir: &Path, extension: &str) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if is_source_file(&entry.file_name().to_string_lossy(), extension) {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

/// Load a knowledge base from a source file or a directory of source files
pub fn load_knowledge_base<L>(
    loader: &L,
    store: &mut MemoryStore,
    path: &Path,
    extension: &str,
) -> crate::Result<usize>
where
    L: SourceLoader<MemoryStore>,
{
    let files = if path.is_dir() {
        source_files_in(path, extension)?
    } else {
        vec![path.to_path_buf()]
    };

    let mut total = 0;
    for file in files {
        total += loader
            .load_source_file(store, &file)
            .map_err(|source| crate::Error::LoadFailed {
                path: file.clone(),
                source,
            })?;
    }
    Ok(total)
}
