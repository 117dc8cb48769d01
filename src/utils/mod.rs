//! Path and platform helpers
//!
//! # Modules
//!
//! - [`fs`] - Path normalization and directory creation
//! - [`platform`] - Executable lookup on PATH

pub mod fs;
pub mod platform;

pub use fs::{absolute_path, ensure_dir, normalize_path};
pub use platform::resolve_program;
