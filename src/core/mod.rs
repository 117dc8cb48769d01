//! Core types for gotask
//!
//! This module holds the error taxonomy shared by every other module:
//! - [`GotaskError`] - Enumerated error types covering every gotask failure mode
//! - [`ErrorContext`] - User-friendly wrapper with suggestions and details
//! - [`user_friendly_error`] - Convert any error to the user-friendly format
//!
//! Library functions return [`anyhow::Result`]; when a failure belongs to the
//! taxonomy, the [`GotaskError`] is converted into the `anyhow::Error` so callers
//! (and the task runner) can recover it with downcasting.

pub mod error;

pub use error::{ErrorContext, GotaskError, user_friendly_error};
