//! Project configuration for gotask
//!
//! Settings come from three layers, later ones winning:
//!
//! 1. Built-in defaults
//! 2. The optional `gotask.toml` in the project directory (or `--config`)
//! 3. Environment variables `GOTASK_GOCMD` and `GOTASK_VERBOSE`
//!
//! Command-line flags are applied on top by the CLI.
//!
//! # File Format
//!
//! ```toml
//! go_command = "go1.22.1"
//! mod_dir = "tools"
//! test_timeout_secs = 10
//! verbose = false
//!
//! [[install.excluded]]
//! module = "github.com/golangci/golangci-lint/cmd/golangci-lint"
//! reason = "ships its own release binaries"
//! ```
//!
//! Listing any `[[install.excluded]]` entry replaces the default exclusion
//! list rather than extending it. An `[install]` table without `excluded`
//! keeps the default, and `excluded = []` allows every module.

mod policy;
mod settings;

pub use policy::{ExcludedModule, InstallPolicy};
pub use settings::Settings;
