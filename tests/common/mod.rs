// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use compman::config::InstallConfig;
use compman::source::load_knowledge_base;
use compman::{
    ArtifactFetcher, CancelToken, Error, Installer, MemoryStore, RemoteCloner, Result,
    SourceFileLoader,
};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub type TestInstaller = Installer<MemoryStore, SourceFileLoader, ScriptedCloner>;

/// Remote address used for a component in fixtures
pub fn address_of(identifier: &str) -> String {
    format!("https://github.com/example/{}", identifier)
}

/// Knowledge source describing a fully specified component
pub fn component_source(identifier: &str, dependencies: &[&str]) -> String {
    let mut source = format!(
        "concept_reusable_component -> {id};;\n\
         {id} => nrel_component_address: [{address}];;\n\
         {id} => nrel_installation_method: concept_component_dependencies_installation_method;;\n",
        id = identifier,
        address = address_of(identifier),
    );
    if !dependencies.is_empty() {
        source.push_str(&format!(
            "{} => nrel_component_dependencies: {};;\n",
            identifier,
            dependencies.join(", ")
        ));
    }
    source
}

/// Stands in for git: writes canned files into the destination
#[derive(Default)]
pub struct ScriptedCloner {
    files: HashMap<String, Vec<(String, String)>>,
    failing: HashSet<String>,
    pub calls: RefCell<Vec<String>>,
}

impl ScriptedCloner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Files the repository at `address` contains
    pub fn with_files(mut self, address: &str, files: &[(&str, &str)]) -> Self {
        self.files.insert(
            address.to_string(),
            files
                .iter()
                .map(|(name, content)| (name.to_string(), content.to_string()))
                .collect(),
        );
        self
    }

    /// Make every clone of `address` fail
    pub fn failing(mut self, address: &str) -> Self {
        self.failing.insert(address.to_string());
        self
    }

    pub fn cloned(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl RemoteCloner for ScriptedCloner {
    fn clone_repository(
        &self,
        address: &str,
        destination: &Path,
        cancel: &CancelToken,
    ) -> Result<()> {
        cancel.check()?;
        self.calls.borrow_mut().push(address.to_string());

        if self.failing.contains(address) {
            return Err(Error::FetchFailed {
                address: address.to_string(),
                reason: "repository not found".to_string(),
            });
        }

        for (name, content) in self.files.get(address).into_iter().flatten() {
            fs::write(destination.join(name), content)?;
        }
        Ok(())
    }
}

/// Scratch area holding the knowledge base and the staging root
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn staging_root(&self) -> PathBuf {
        self.dir.path().join("specifications")
    }

    /// Write a knowledge source file under `kb/`
    pub fn write_kb(&self, name: &str, content: &str) {
        let kb = self.dir.path().join("kb");
        fs::create_dir_all(&kb).unwrap();
        fs::write(kb.join(name), content).unwrap();
    }

    /// Store loaded from everything under `kb/`
    pub fn store(&self) -> MemoryStore {
        let mut store = MemoryStore::new();
        let kb = self.dir.path().join("kb");
        if kb.exists() {
            load_knowledge_base(&SourceFileLoader::new(), &mut store, &kb, "scs").unwrap();
        }
        store
    }

    pub fn installer(&self, cloner: ScriptedCloner) -> TestInstaller {
        self.installer_with_store(self.store(), cloner)
    }

    pub fn installer_with_store(&self, store: MemoryStore, cloner: ScriptedCloner) -> TestInstaller {
        let fetcher = ArtifactFetcher::new(cloner, &InstallConfig::default())
            .with_staging_root(self.staging_root());
        Installer::new(store, SourceFileLoader::new(), fetcher)
    }
}
