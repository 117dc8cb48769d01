//! Error handling for gotask
//!
//! This module provides the error taxonomy and user-friendly error reporting for gotask.
//! The error system follows two principles:
//! 1. **Strongly-typed errors** so tasks and the runner can react to specific failures
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Error Categories
//!
//! - **Catalog**: [`GotaskError::CatalogLoadError`] when `go list` fails or emits bad JSON
//! - **Manifests**: [`GotaskError::MissingManifest`] for absent or malformed `mockgen.yaml`
//! - **Freshness**: [`GotaskError::StaleCheckError`] when file metadata cannot be read
//! - **Processes**: [`GotaskError::ExternalProcessError`], [`GotaskError::ToolNotFound`],
//!   [`GotaskError::ProcessTimeout`]
//! - **Policy**: [`GotaskError::ConfigurationRejection`] for tools that must not be
//!   installed with `go install`
//!
//! None of these are retried. Staleness and installation are deterministic given the
//! same external state, so a retry would reproduce the failure.
//!
//! # Examples
//!
//! ```rust,no_run
//! use gotask::core::{GotaskError, user_friendly_error};
//!
//! let err = GotaskError::PackageNotFound {
//!     name: "example.com/app/missing".to_string(),
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(err));
//! ctx.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for gotask operations
///
/// Every variant carries enough context (paths, program names, captured stderr) to
/// explain the failure without consulting logs.
///
/// Memoized task results are shared with every dependent, so this type implements
/// [`Clone`]. Wrapped foreign errors that are not clonable collapse into
/// [`GotaskError::Other`] with their message preserved.
#[derive(Error, Debug)]
pub enum GotaskError {
    /// The package lister failed or produced a record that could not be decoded.
    ///
    /// A malformed record aborts the whole load; no partial catalog is ever used.
    #[error("Failed to load package catalog: {reason}")]
    CatalogLoadError {
        /// What went wrong (process failure or JSON decode error)
        reason: String,
    },

    /// A generation task's manifest is absent or malformed
    #[error("Manifest {path} is missing or invalid: {reason}")]
    MissingManifest {
        /// Path of the manifest that was expected
        path: String,
        /// Read or parse failure
        reason: String,
    },

    /// File metadata for a required path could not be read
    ///
    /// A missing *output* is never reported here; it is a stale signal.
    #[error("Cannot determine freshness of {path}: {reason}")]
    StaleCheckError {
        /// Path whose metadata could not be read
        path: String,
        /// Underlying I/O failure
        reason: String,
    },

    /// An external program exited with a failure status or could not be started
    #[error("{program} {operation} failed{}", .status.map(|code| format!(" with exit code {code}")).unwrap_or_default())]
    ExternalProcessError {
        /// Program that was run (e.g. "go", "bin/mockgen")
        program: String,
        /// First argument, describing the operation (e.g. "build", "list")
        operation: String,
        /// Exit code, if the process exited normally
        status: Option<i32>,
        /// Captured standard error, empty when stdio was inherited
        stderr: String,
    },

    /// A static policy forbids this action
    #[error("Cannot install module {module}: {reason}")]
    ConfigurationRejection {
        /// Module identifier that was rejected
        module: String,
        /// Why the module is excluded
        reason: String,
    },

    /// A package required by a task is not in the catalog
    #[error("Package '{name}' not found")]
    PackageNotFound {
        /// Import path, relative path, or directory that was looked up
        name: String,
    },

    /// A generation task was configured without any input files
    #[error("No input files for {target}")]
    NoInputFiles {
        /// The type or target name the task generates
        target: String,
    },

    /// An executable could not be located on PATH
    #[error("Executable '{program}' not found")]
    ToolNotFound {
        /// Program name as configured
        program: String,
    },

    /// An external program did not finish within its time limit
    #[error("{program} timed out after {seconds} seconds")]
    ProcessTimeout {
        /// Program that was run
        program: String,
        /// Time limit that expired
        seconds: u64,
    },

    /// Project configuration is invalid
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the problem
        message: String,
    },

    /// IO error from [`std::io::Error`]
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Generic error with message
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

impl Clone for GotaskError {
    fn clone(&self) -> Self {
        match self {
            Self::CatalogLoadError {
                reason,
            } => Self::CatalogLoadError {
                reason: reason.clone(),
            },
            Self::MissingManifest {
                path,
                reason,
            } => Self::MissingManifest {
                path: path.clone(),
                reason: reason.clone(),
            },
            Self::StaleCheckError {
                path,
                reason,
            } => Self::StaleCheckError {
                path: path.clone(),
                reason: reason.clone(),
            },
            Self::ExternalProcessError {
                program,
                operation,
                status,
                stderr,
            } => Self::ExternalProcessError {
                program: program.clone(),
                operation: operation.clone(),
                status: *status,
                stderr: stderr.clone(),
            },
            Self::ConfigurationRejection {
                module,
                reason,
            } => Self::ConfigurationRejection {
                module: module.clone(),
                reason: reason.clone(),
            },
            Self::PackageNotFound {
                name,
            } => Self::PackageNotFound {
                name: name.clone(),
            },
            Self::NoInputFiles {
                target,
            } => Self::NoInputFiles {
                target: target.clone(),
            },
            Self::ToolNotFound {
                program,
            } => Self::ToolNotFound {
                program: program.clone(),
            },
            Self::ProcessTimeout {
                program,
                seconds,
            } => Self::ProcessTimeout {
                program: program.clone(),
                seconds: *seconds,
            },
            Self::ConfigError {
                message,
            } => Self::ConfigError {
                message: message.clone(),
            },
            // io::Error is not Clone; keep the message
            Self::IoError(e) => Self::Other {
                message: format!("IO error: {e}"),
            },
            Self::Other {
                message,
            } => Self::Other {
                message: message.clone(),
            },
        }
    }
}

impl GotaskError {
    /// Recover a [`GotaskError`] from an arbitrary [`anyhow::Error`].
    ///
    /// Typed errors anywhere in the chain are returned as-is (cloned); anything else
    /// becomes [`GotaskError::Other`] carrying the full context chain.
    #[must_use]
    pub fn from_anyhow(error: &anyhow::Error) -> Self {
        if let Some(typed) = error.chain().find_map(|cause| cause.downcast_ref::<Self>()) {
            return typed.clone();
        }
        Self::Other {
            message: format!("{error:#}"),
        }
    }
}

/// Error wrapper that adds a suggestion and details for CLI display
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying gotask error
    pub error: GotaskError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context from a [`GotaskError`]
    #[must_use]
    pub const fn new(error: GotaskError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    ///
    /// Suggestions are displayed in green in the terminal.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    ///
    /// Details are displayed in yellow in the terminal.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`] with actionable suggestions
///
/// Recognizes [`GotaskError`] anywhere in the chain and [`std::io::Error`] kinds;
/// anything else is shown with its full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(typed) = error.chain().find_map(|cause| cause.downcast_ref::<GotaskError>()) {
        return create_error_context(typed.clone());
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        if io_error.kind() == std::io::ErrorKind::PermissionDenied {
            return ErrorContext::new(GotaskError::Other {
                message: format!("{error:#}"),
            })
            .with_suggestion("Check ownership and permissions of the project and bin directories");
        }
    }

    let mut message = error.to_string();
    let chain: Vec<String> =
        error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(GotaskError::Other {
        message,
    })
}

fn create_error_context(error: GotaskError) -> ErrorContext {
    let (suggestion, details): (Option<String>, Option<String>) = match &error {
        GotaskError::CatalogLoadError { .. } => (
            Some("Run 'go list -json ./...' in the project directory to see the failure".to_string()),
            Some("No task can compute its dependencies without the package catalog".to_string()),
        ),
        GotaskError::MissingManifest { path, .. } => (
            Some(format!("Create {path} mapping import paths to {{ external, types }}")),
            None,
        ),
        GotaskError::StaleCheckError { .. } => {
            (Some("Check that the input files are readable by the current user".to_string()), None)
        }
        GotaskError::ExternalProcessError { stderr, .. } => (
            Some("Re-run with --verbose to see the exact command line".to_string()),
            (!stderr.trim().is_empty()).then(|| stderr.trim().to_string()),
        ),
        GotaskError::ConfigurationRejection { .. } => (
            Some("Use the tool's own installer, or drop it from [[install.excluded]]".to_string()),
            Some("This tool ships its own release binaries, not 'go install'".to_string()),
        ),
        GotaskError::ToolNotFound { program } => (
            Some(format!("Make sure '{program}' is installed and on PATH, or set GOTASK_GOCMD")),
            None,
        ),
        GotaskError::ProcessTimeout { .. } => {
            (None, Some("Test runs are limited to a fixed wall-clock budget".to_string()))
        }
        _ => (None, None),
    };

    ErrorContext {
        error,
        suggestion,
        details,
    }
}
