//! Global constants used throughout the gotask codebase.
//!
//! This module contains timeout durations, well-known file names, and the module
//! paths of the tools gotask knows how to install. Defining them centrally keeps
//! magic strings out of the task implementations.

use std::time::Duration;

/// Wall-clock limit handed to `go test` and `ginkgo run` (10 seconds).
pub const TEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Default timeout for captured `go` queries such as `go list` (5 minutes).
///
/// Package listing on a cold module cache may download dependencies, so
/// the limit is long.
pub const GO_QUERY_TIMEOUT: Duration = Duration::from_secs(300);

/// Name of the per-directory mock generation manifest.
pub const MOCKGEN_MANIFEST: &str = "mockgen.yaml";

/// Name of the optional project configuration file.
pub const CONFIG_FILE: &str = "gotask.toml";

/// Name of the Go module file that pins tool versions.
pub const GO_MOD_FILE: &str = "go.mod";

/// Environment variable overriding the `go` executable.
pub const GO_COMMAND_ENV: &str = "GOTASK_GOCMD";

/// Environment variable forcing verbose task output (`1` or `true`).
pub const VERBOSE_ENV: &str = "GOTASK_VERBOSE";

/// Module path of the mockgen generator.
pub const MOCKGEN_MODULE: &str = "github.com/golang/mock/mockgen";

/// Module path of the stringer generator.
pub const STRINGER_MODULE: &str = "golang.org/x/tools/cmd/stringer";

/// Module path of the revive linter.
pub const REVIVE_MODULE: &str = "github.com/mgechev/revive";

/// Module path of the ginkgo test driver.
pub const GINKGO_MODULE: &str = "github.com/onsi/ginkgo/v2/ginkgo";

/// Module path of golangci-lint, which ships its own release binaries and
/// must not be built with `go install`.
pub const GOLANGCI_LINT_MODULE: &str = "github.com/golangci/golangci-lint/cmd/golangci-lint";
