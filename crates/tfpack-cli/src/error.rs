//! Error conversion utilities for CLI.
//!
//! Converts tfpack-core's typed errors (thiserror) into user-facing anyhow
//! errors with a hint where the user can act on them.

use anyhow::anyhow;
use std::path::Path;
use tfpack_core::PackError;

/// Converts a `PackError` raised while working on `subject` (a template
/// directory or an archive file).
pub fn convert_pack_error(err: PackError, subject: &Path) -> anyhow::Error {
    match err {
        PackError::NoTemplateFiles { path, extension } => {
            anyhow!(
                "{} is not a valid template since it has no {extension} files\n\
                 HINT: Only the top level is checked; point tfpack at the directory holding your root module.",
                path.display()
            )
        }
        PackError::ArchiveTooLarge { limit } => {
            anyhow!(
                "archive too big: must be < {limit} bytes\n\
                 HINT: Use --limit to raise the limit, or --limit 0 to disable it."
            )
        }
        PackError::FileTooLarge { path, size, max } => {
            anyhow!(
                "Entry '{}' in '{}' is {size} bytes, over the {max} byte limit\n\
                 HINT: Use --max-file-size to raise the limit or --truncate to keep a prefix.",
                path.display(),
                subject.display()
            )
        }
        PackError::TotalSizeExceeded { written, max } => {
            anyhow!(
                "Extraction of '{}' would write {written} bytes, over the {max} byte total limit\n\
                 HINT: Use --max-total-size to raise the limit.",
                subject.display()
            )
        }
        PackError::Stream(reason) => {
            anyhow!(
                "Invalid archive '{}': {reason}\n\
                 HINT: The archive may be corrupted or truncated.",
                subject.display()
            )
        }
        PackError::Io(io_err) => {
            anyhow!("I/O error while processing '{}': {io_err}", subject.display())
        }
    }
}

/// Maps a core result into an anyhow result with CLI context.
pub fn add_context<T>(result: Result<T, PackError>, subject: &Path) -> anyhow::Result<T> {
    result.map_err(|e| convert_pack_error(e, subject))
}
