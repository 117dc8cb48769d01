//! Loading `gotask.toml` and applying environment overrides.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

use super::InstallPolicy;
use crate::constants::{CONFIG_FILE, GO_COMMAND_ENV, TEST_TIMEOUT, VERBOSE_ENV};
use crate::core::GotaskError;

/// Effective project settings.
///
/// Every field has a default, so an empty or absent `gotask.toml` is valid.
///
/// # Examples
///
/// ```rust
/// use gotask::config::Settings;
///
/// let settings = Settings::from_toml_str("go_command = \"go1.22.1\"").unwrap();
/// assert_eq!(settings.go_command, "go1.22.1");
/// assert_eq!(settings.test_timeout().as_secs(), 10);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// The `go` executable, a name on PATH or a path
    pub go_command: String,

    /// Directory whose `go.mod` pins tool versions
    ///
    /// Relative paths are resolved against the project directory. `None` means
    /// the project directory itself.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mod_dir: Option<PathBuf>,

    /// Wall-clock limit passed to test runs
    pub test_timeout_secs: u64,

    /// Pass `-v` to test builds and runs
    pub verbose: bool,

    /// Modules that must not be installed with `go install`
    pub install: InstallPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            go_command: "go".to_string(),
            mod_dir: None,
            test_timeout_secs: TEST_TIMEOUT.as_secs(),
            verbose: false,
            install: InstallPolicy::default(),
        }
    }
}

impl Settings {
    /// Loads settings for `project_dir` and applies environment overrides.
    ///
    /// With `explicit` set, that file must exist. Otherwise
    /// `<project_dir>/gotask.toml` is read if present.
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file cannot be read or parsed, or if
    /// the resulting settings are invalid.
    pub async fn load(project_dir: &Path, explicit: Option<&Path>) -> Result<Self> {
        let settings = match explicit {
            Some(path) => Self::load_from(path).await?,
            None => {
                let path = project_dir.join(CONFIG_FILE);
                if path.exists() {
                    Self::load_from(&path).await?
                } else {
                    tracing::debug!(
                        "No {} in {}, using defaults",
                        CONFIG_FILE,
                        project_dir.display()
                    );
                    Self::default()
                }
            }
        };
        let settings = settings.with_overrides(|key| std::env::var(key).ok());
        settings.validate()?;
        Ok(settings)
    }

    /// Reads and parses one configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Parses settings from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`GotaskError::ConfigError`] on invalid TOML or field types.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            GotaskError::ConfigError {
                message: e.to_string().trim().to_string(),
            }
            .into()
        })
    }

    /// Applies `GOTASK_GOCMD` and `GOTASK_VERBOSE` as returned by `lookup`.
    ///
    /// Empty values are ignored.
    #[must_use]
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(go) = lookup(GO_COMMAND_ENV).filter(|v| !v.trim().is_empty()) {
            tracing::debug!("{} overrides go command: {}", GO_COMMAND_ENV, go);
            self.go_command = go.trim().to_string();
        }
        if let Some(verbose) = lookup(VERBOSE_ENV).filter(|v| !v.trim().is_empty()) {
            self.verbose =
                matches!(verbose.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }
        self
    }

    /// Checks field values that parse but make no sense.
    ///
    /// # Errors
    ///
    /// Returns [`GotaskError::ConfigError`] for an empty go command or a zero
    /// test timeout.
    pub fn validate(&self) -> Result<()> {
        if self.go_command.trim().is_empty() {
            return Err(GotaskError::ConfigError {
                message: "go_command must not be empty".to_string(),
            }
            .into());
        }
        if self.test_timeout_secs == 0 {
            return Err(GotaskError::ConfigError {
                message: "test_timeout_secs must be greater than zero".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Test run time limit.
    #[must_use]
    pub const fn test_timeout(&self) -> Duration {
        Duration::from_secs(self.test_timeout_secs)
    }

    /// Directory holding the tools `go.mod`, resolved against `project_dir`.
    #[must_use]
    pub fn resolved_mod_dir(&self, project_dir: &Path) -> PathBuf {
        match &self.mod_dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => project_dir.join(dir),
            None => project_dir.to_path_buf(),
        }
    }
}
