// src/store/mod.rs

//! Knowledge store capability
//!
//! The installer never talks to a graph engine directly. Everything it needs
//! from the knowledge base goes through [`KnowledgeStore`], a narrow query
//! interface that any knowledge-representation backend can implement.
//!
//! Component metadata lives in the store as relations hanging off the
//! component node:
//!
//! - membership in `concept_reusable_component` marks a component installable
//! - `nrel_component_address` points at a link holding the remote address
//! - `nrel_installation_method` points at the installation method node
//! - `nrel_component_dependencies` lists dependency components in order

pub mod memory;

pub use memory::MemoryStore;

use std::fmt;
use thiserror::Error;

/// Well-known identifiers the installer looks up in the store
pub mod keynodes {
    /// Class whose members are installable components
    pub const CONCEPT_REUSABLE_COMPONENT: &str = "concept_reusable_component";
    /// Relation from a component to the link holding its remote address
    pub const NREL_COMPONENT_ADDRESS: &str = "nrel_component_address";
    /// Relation from a component to its installation method
    pub const NREL_INSTALLATION_METHOD: &str = "nrel_installation_method";
    /// Relation from a component to each of its dependencies
    pub const NREL_COMPONENT_DEPENDENCIES: &str = "nrel_component_dependencies";
}

/// Opaque handle to a node in the knowledge store
///
/// A handle can outlive the node it refers to, so callers check
/// [`KnowledgeStore::exists`] before relying on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentRef(pub(crate) u64);

impl fmt::Display for ComponentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kind of relation checked by [`KnowledgeStore::has_relation`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// Class-to-element membership (`class -> element`)
    Membership,
}

/// Errors raised by knowledge store queries
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Invalid node reference {0}")]
    InvalidRef(ComponentRef),

    #[error("Node {subject} has more than one {relation} target")]
    Ambiguous {
        relation: String,
        subject: ComponentRef,
    },

    #[error("Node {0} is not a link")]
    NotALink(ComponentRef),

    #[error("Node {0} has no system identifier")]
    Unnamed(ComponentRef),
}

/// Query capability the installer needs from a knowledge store
pub trait KnowledgeStore {
    /// Resolve a system identifier to a node
    fn find_by_identifier(&self, identifier: &str) -> Result<Option<ComponentRef>, StoreError>;

    /// Check whether a handle still refers to a live node
    fn exists(&self, node: ComponentRef) -> bool;

    /// Check whether `subject` is connected to `object` by a relation of `kind`
    fn has_relation(
        &self,
        kind: RelationKind,
        subject: ComponentRef,
        object: ComponentRef,
    ) -> Result<bool, StoreError>;

    /// Read the text content of a link node
    fn get_link_content(&self, link: ComponentRef) -> Result<Option<String>, StoreError>;

    /// System identifier of a node
    fn get_identifier(&self, node: ComponentRef) -> Result<String, StoreError>;

    /// Link node holding the component's remote address
    fn get_component_address(
        &self,
        component: ComponentRef,
    ) -> Result<Option<ComponentRef>, StoreError>;

    /// Dependencies of a component, in declaration order
    fn get_dependencies(&self, component: ComponentRef) -> Result<Vec<ComponentRef>, StoreError>;

    /// Installation method node of a component
    fn get_installation_method(
        &self,
        component: ComponentRef,
    ) -> Result<Option<ComponentRef>, StoreError>;

    /// Convenience: resolve the address link and return its content
    fn get_address_content(&self, component: ComponentRef) -> Result<Option<String>, StoreError> {
        match self.get_component_address(component)? {
            Some(link) => self.get_link_content(link),
            None => Ok(None),
        }
    }
}
