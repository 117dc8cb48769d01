//! gotask - incremental build helpers for Go projects
//!
//! A library and CLI that decide which build steps of a Go module are out of
//! date and run only those, each at most once per invocation.
//!
//! # Architecture Overview
//!
//! gotask follows a catalog/oracle/task model:
//! - The package catalog records what `go list -json ./...` reports about
//!   every package of the module
//! - The dependency flattener walks the catalog's import graph to collect
//!   every file an output depends on
//! - The freshness oracle compares modification times to decide whether an
//!   output must be rebuilt
//! - Tasks combine the three and run one external command when stale
//!
//! ## Key Features
//!
//! - **Incremental**: An output whose inputs are all older is never rebuilt
//! - **Deduplicated**: A task requested by many others runs once
//! - **Concurrent**: Independent prerequisites run in parallel on tokio
//! - **Pinned tools**: mockgen, stringer, revive and ginkgo are installed at
//!   the version pinned in a `go.mod`, and reinstalled when it changes
//!
//! # Core Modules
//!
//! ## Model
//! - [`catalog`] - Package records and the lazily loaded catalog
//! - [`graph`] - Flattening import graphs into file sets
//! - [`freshness`] - Modification-time staleness checks
//! - [`manifest`] - `mockgen.yaml` parsing
//!
//! ## Execution
//! - [`tasks`] - Task variants, the build context, and the memoizing runner
//! - [`installer`] - Version-checked tool installs
//! - [`toolchain`] - The `go` command behind a trait
//! - [`process`] - Running external commands with timeouts
//!
//! ## Supporting Modules
//! - [`cli`] - Command-line interface
//! - [`config`] - `gotask.toml` settings and the install policy
//! - [`core`] - Error types and user-facing error reporting
//! - [`utils`] - Path and platform helpers
//!
//! # Configuration (gotask.toml)
//!
//! ```toml
//! go_command = "go"
//! mod_dir = "tools"
//! test_timeout_secs = 10
//!
//! [[install.excluded]]
//! module = "github.com/golangci/golangci-lint/cmd/golangci-lint"
//! reason = "tool isn't supposed to be installed via go install"
//! ```
//!
//! # Command-Line Usage
//!
//! ```bash
//! # Build the main package if any of its sources changed
//! gotask build bin/app
//!
//! # Build all test binaries, then run them
//! gotask test
//!
//! # Regenerate mocks for one directory
//! gotask mockgen bin/mockgen internal/server
//! ```

// Model
pub mod catalog;
pub mod freshness;
pub mod graph;
pub mod manifest;

// Execution
pub mod installer;
pub mod process;
pub mod tasks;
pub mod toolchain;

// Supporting modules
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
