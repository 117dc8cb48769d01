//! Timestamp-based freshness checks
//!
//! An output is stale when it does not exist or when any input was modified
//! strictly after it. Equal timestamps count as fresh. A missing output is the
//! only metadata failure treated as a signal; every other failure (including a
//! missing input) is reported as [`GotaskError::StaleCheckError`].

use anyhow::Result;
use std::io::ErrorKind;
use std::path::Path;
use std::time::SystemTime;
use walkdir::WalkDir;

use crate::core::GotaskError;

fn stale_check_error(path: &Path, reason: impl ToString) -> anyhow::Error {
    GotaskError::StaleCheckError {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
    .into()
}

/// Modification time of the output, or `None` if it does not exist.
fn output_mtime(output: &Path) -> Result<Option<SystemTime>> {
    match std::fs::metadata(output) {
        Ok(meta) => meta.modified().map(Some).map_err(|e| stale_check_error(output, e)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(stale_check_error(output, e)),
    }
}

fn input_mtime(input: &Path) -> Result<SystemTime> {
    std::fs::metadata(input)
        .and_then(|meta| meta.modified())
        .map_err(|e| stale_check_error(input, e))
}

/// Reports whether `output` must be rebuilt from `inputs`.
///
/// Returns `true` when the output is missing or any input is strictly newer.
/// Empty `inputs` with an existing output is fresh.
///
/// # Errors
///
/// Returns [`GotaskError::StaleCheckError`] if the metadata of an input, or of
/// an output that exists, cannot be read.
///
/// # Examples
///
/// ```rust,no_run
/// use gotask::freshness::is_stale;
/// use std::path::Path;
///
/// # fn example() -> anyhow::Result<()> {
/// if is_stale(Path::new("bin/app"), &[Path::new("main.go")])? {
///     println!("rebuild needed");
/// }
/// # Ok(())
/// # }
/// ```
pub fn is_stale<P: AsRef<Path>>(output: &Path, inputs: &[P]) -> Result<bool> {
    let Some(output_time) = output_mtime(output)? else {
        tracing::debug!(target: "freshness", "{} does not exist", output.display());
        return Ok(true);
    };

    for input in inputs {
        let input = input.as_ref();
        let input_time = input_mtime(input)?;
        tracing::trace!(
            target: "freshness",
            "{} {:?} vs {} {:?}",
            input.display(),
            input_time,
            output.display(),
            output_time
        );
        if input_time > output_time {
            tracing::debug!(
                target: "freshness",
                "{} is older than {}",
                output.display(),
                input.display()
            );
            return Ok(true);
        }
    }

    tracing::debug!(target: "freshness", "{} is up to date", output.display());
    Ok(false)
}

/// Like [`is_stale`], but an input directory stands for every file beneath
/// it. Directory timestamps themselves are ignored.
///
/// # Errors
///
/// Returns [`GotaskError::StaleCheckError`] on metadata or directory walk
/// failures.
pub fn is_stale_recursive<P: AsRef<Path>>(output: &Path, inputs: &[P]) -> Result<bool> {
    let Some(output_time) = output_mtime(output)? else {
        tracing::debug!(target: "freshness", "{} does not exist", output.display());
        return Ok(true);
    };

    for input in inputs {
        for entry in WalkDir::new(input.as_ref()) {
            let entry = entry.map_err(|e| stale_check_error(input.as_ref(), e))?;
            if entry.file_type().is_dir() {
                continue;
            }
            let input_time = entry
                .metadata()
                .map_err(|e| stale_check_error(entry.path(), e))?
                .modified()
                .map_err(|e| stale_check_error(entry.path(), e))?;
            if input_time > output_time {
                tracing::debug!(
                    target: "freshness",
                    "{} is older than {}",
                    output.display(),
                    entry.path().display()
                );
                return Ok(true);
            }
        }
    }

    tracing::debug!(target: "freshness", "{} is up to date", output.display());
    Ok(false)
}
