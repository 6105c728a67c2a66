// src/validator.rs

//! Component validation
//!
//! A component is installable when all of the following hold, checked in
//! this order and stopping at the first failure:
//!
//! 1. the handle refers to a live node
//! 2. the node is a member of `concept_reusable_component`
//! 3. the component has a non-empty remote address link
//! 4. the component has an installation method
//!
//! Store errors during the address and installation method lookups are
//! logged and turn into a rejection; they are never propagated. The
//! [`Rejection`] still records whether the lookup failed or found nothing.

use crate::store::keynodes::CONCEPT_REUSABLE_COMPONENT;
use crate::store::{ComponentRef, KnowledgeStore, RelationKind, StoreError};
use thiserror::Error;
use tracing::{error, warn};

/// Why a component was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("component not found")]
    NotFound,

    #[error("component is not a reusable component")]
    NotReusable,

    #[error("reusable component check failed: {0}")]
    ReusableLookupFailed(StoreError),

    #[error("component address not found")]
    MissingAddress,

    #[error("component address lookup failed: {0}")]
    AddressLookupFailed(StoreError),

    #[error("component installation method not found")]
    MissingInstallationMethod,

    #[error("component installation method lookup failed: {0}")]
    InstallationMethodLookupFailed(StoreError),
}

/// Check that a component can be installed
///
/// `component` is `None` when the identifier did not resolve.
pub fn validate_component<S>(store: &S, component: Option<ComponentRef>) -> Result<(), Rejection>
where
    S: KnowledgeStore + ?Sized,
{
    let component = match component {
        Some(component) if store.exists(component) => component,
        _ => {
            warn!("Component not found. Unable to install");
            return Err(Rejection::NotFound);
        }
    };

    check_reusable(store, component)?;

    let address = match store.get_address_content(component) {
        Ok(address) => address.unwrap_or_default(),
        Err(e) => {
            error!("Failed to look up address of component {}: {}", component, e);
            return Err(Rejection::AddressLookupFailed(e));
        }
    };
    if address.trim().is_empty() {
        warn!("Component address not found.");
        return Err(Rejection::MissingAddress);
    }

    match store.get_installation_method(component) {
        Ok(Some(method)) if store.exists(method) => Ok(()),
        Ok(_) => {
            warn!("Component installation method not found.");
            Err(Rejection::MissingInstallationMethod)
        }
        Err(e) => {
            error!(
                "Failed to look up installation method of component {}: {}",
                component, e
            );
            Err(Rejection::InstallationMethodLookupFailed(e))
        }
    }
}

/// Boolean form of [`validate_component`]
pub fn is_installable<S>(store: &S, component: Option<ComponentRef>) -> bool
where
    S: KnowledgeStore + ?Sized,
{
    validate_component(store, component).is_ok()
}

fn check_reusable<S>(store: &S, component: ComponentRef) -> Result<(), Rejection>
where
    S: KnowledgeStore + ?Sized,
{
    let class = match store.find_by_identifier(CONCEPT_REUSABLE_COMPONENT) {
        Ok(Some(class)) => class,
        Ok(None) => {
            warn!("Component is not a reusable component.");
            return Err(Rejection::NotReusable);
        }
        Err(e) => {
            error!("Failed to resolve {}: {}", CONCEPT_REUSABLE_COMPONENT, e);
            return Err(Rejection::ReusableLookupFailed(e));
        }
    };

    match store.has_relation(RelationKind::Membership, class, component) {
        Ok(true) => Ok(()),
        Ok(false) => {
            warn!("Component is not a reusable component.");
            Err(Rejection::NotReusable)
        }
        Err(e) => {
            error!("Failed to check reusability of component {}: {}", component, e);
            Err(Rejection::ReusableLookupFailed(e))
        }
    }
}
