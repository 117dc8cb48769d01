//! Which modules may be installed with `go install`.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::constants::GOLANGCI_LINT_MODULE;
use crate::core::GotaskError;

/// A module that must not be installed with `go install`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludedModule {
    /// Module import path, matched exactly
    pub module: String,
    /// Shown to the user when the install is rejected
    pub reason: String,
}

/// Exclusion list consulted before any tool install.
///
/// An `[install]` table without `excluded` keeps the default list; only an
/// explicit `excluded = []` allows every module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallPolicy {
    /// Rejected modules
    #[serde(default = "default_excluded")]
    pub excluded: Vec<ExcludedModule>,
}

fn default_excluded() -> Vec<ExcludedModule> {
    vec![ExcludedModule {
        module: GOLANGCI_LINT_MODULE.to_string(),
        reason: "tool isn't supposed to be installed via go install".to_string(),
    }]
}

impl Default for InstallPolicy {
    fn default() -> Self {
        Self {
            excluded: default_excluded(),
        }
    }
}

impl InstallPolicy {
    /// A policy that allows every module.
    #[must_use]
    pub const fn permissive() -> Self {
        Self {
            excluded: Vec::new(),
        }
    }

    /// The exclusion entry for `module`, if any.
    #[must_use]
    pub fn exclusion(&self, module: &str) -> Option<&ExcludedModule> {
        self.excluded.iter().find(|entry| entry.module == module)
    }

    /// Checks that `module` may be installed.
    ///
    /// # Errors
    ///
    /// Returns [`GotaskError::ConfigurationRejection`] for an excluded module.
    pub fn check(&self, module: &str) -> Result<()> {
        match self.exclusion(module) {
            Some(entry) => Err(GotaskError::ConfigurationRejection {
                module: module.to_string(),
                reason: entry.reason.clone(),
            }
            .into()),
            None => Ok(()),
        }
    }
}
