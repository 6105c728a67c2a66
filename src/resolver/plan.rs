// src/resolver/plan.rs

//! Install plan data structure

use std::fmt;

/// Ordered identifiers of dependencies installed during one call
///
/// Every dependency appears after its own dependencies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallPlan {
    order: Vec<String>,
}

impl InstallPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, identifier: impl Into<String>) {
        self.order.push(identifier.into());
    }

    /// Append another plan after this one
    pub fn append(&mut self, other: InstallPlan) {
        self.order.extend(other.order);
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Position of an identifier in install order
    pub fn position(&self, identifier: &str) -> Option<usize> {
        self.order.iter().position(|id| id == identifier)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.order
    }
}

impl From<Vec<String>> for InstallPlan {
    fn from(order: Vec<String>) -> Self {
        Self { order }
    }
}

impl fmt::Display for InstallPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.order.join(", "))
    }
}
