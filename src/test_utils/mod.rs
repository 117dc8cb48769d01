//! Test utilities for gotask
//!
//! Helpers shared by the unit tests and the integration suite:
//!
//! - [`FakeToolchain`] stands in for the Go toolchain and records every call,
//!   so task behaviour can be asserted without Go installed
//! - [`fixtures`] builds package records and on-disk project layouts
//! - [`set_mtime`] pins modification times so freshness checks are
//!   deterministic
//!
//! # Example
//!
//! ```rust,no_run
//! use gotask::test_utils::{FakeToolchain, init_test_logging};
//!
//! init_test_logging(None);
//! let fake = FakeToolchain::new().with_module_version("example.com/tool", "v0.20.0");
//! assert!(fake.calls().is_empty());
//! ```

mod fake;
pub mod fixtures;

pub use fake::{FakeToolchain, ToolCall};

use std::fs::File;
use std::path::Path;
use std::sync::Once;
use std::time::{Duration, SystemTime};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has any effect. With `level` set, that level is used;
/// otherwise `RUST_LOG` is honoured if present and logging stays off if not.
///
/// ```bash
/// RUST_LOG=freshness=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}

/// Sets the modification time of a file or directory.
///
/// # Panics
///
/// Panics if the path cannot be opened or its time cannot be set.
pub fn set_mtime(path: &Path, time: SystemTime) {
    let file = File::open(path)
        .unwrap_or_else(|e| panic!("Failed to open {} to set mtime: {e}", path.display()));
    file.set_modified(time)
        .unwrap_or_else(|e| panic!("Failed to set mtime of {}: {e}", path.display()));
}

/// `secs` seconds after the Unix epoch, for readable mtime fixtures.
#[must_use]
pub fn at(secs: u64) -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
}

/// Writes `contents` to `path`, creating parent directories, and pins its
/// mtime to `at(secs)`.
///
/// # Panics
///
/// Panics on any filesystem failure.
pub fn write_at(path: &Path, contents: &str, secs: u64) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .unwrap_or_else(|e| panic!("Failed to create {}: {e}", parent.display()));
    }
    std::fs::write(path, contents)
        .unwrap_or_else(|e| panic!("Failed to write {}: {e}", path.display()));
    set_mtime(path, at(secs));
}
