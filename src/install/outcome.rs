// src/install/outcome.rs

//! Results of an install call

use crate::error::Error;
use crate::resolver::InstallPlan;

/// A requested identifier that could not be installed
#[derive(Debug)]
pub struct InstallFailure {
    pub identifier: String,
    pub error: Error,
}

/// What one install call did
#[derive(Debug, Default)]
pub struct InstallReport {
    /// Dependencies installed during the call, dependencies first
    ///
    /// Includes dependencies installed before a failure; nothing is rolled back.
    pub plan: InstallPlan,
    /// Requested identifiers that were installed
    pub installed: Vec<String>,
    /// Requested identifiers that failed, with the reason
    pub failures: Vec<InstallFailure>,
}

impl InstallReport {
    pub fn failed(&self, identifier: &str) -> Option<&Error> {
        self.failures
            .iter()
            .find(|f| f.identifier == identifier)
            .map(|f| &f.error)
    }
}

/// Outcome of [`Installer::execute`](super::Installer::execute)
#[derive(Debug)]
pub enum InstallOutcome {
    /// Every requested identifier was installed
    Completed(InstallReport),
    /// At least one requested identifier failed; the others were still processed
    Partial(InstallReport),
    /// The request asked for something not supported yet
    NotImplemented { reason: String },
}

impl InstallOutcome {
    pub(crate) fn from_report(report: InstallReport) -> Self {
        if report.failures.is_empty() {
            InstallOutcome::Completed(report)
        } else {
            InstallOutcome::Partial(report)
        }
    }

    pub fn report(&self) -> Option<&InstallReport> {
        match self {
            InstallOutcome::Completed(report) | InstallOutcome::Partial(report) => Some(report),
            InstallOutcome::NotImplemented { .. } => None,
        }
    }

    /// Dependency identifiers installed, empty when nothing was installed
    pub fn plan(&self) -> &[String] {
        self.report().map(|r| r.plan.as_slice()).unwrap_or(&[])
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, InstallOutcome::Completed(_))
    }
}
