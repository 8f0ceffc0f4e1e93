//! Exclusion rules and template detection used while archiving.
//!
//! Two fixed predicates decide whether an entry is left out of an archive:
//! hidden names (a last path segment starting with `.`) and Terraform state
//! artifacts (a relative path containing `.tfstate`).

use std::fmt;
use std::path::Path;

use walkdir::WalkDir;

use crate::PackError;
use crate::Result;

/// File extension that marks a directory as a template.
pub const TEMPLATE_EXTENSION: &str = ".tf";

/// Substring identifying Terraform state files and their backups.
pub const STATE_FILE_MARKER: &str = ".tfstate";

/// Reason an entry was left out of the archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    /// Last path segment starts with `.`.
    Hidden,
    /// Relative path contains [`STATE_FILE_MARKER`].
    StateArtifact,
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hidden => f.write_str("hidden"),
            Self::StateArtifact => f.write_str("terraform state"),
        }
    }
}

/// Checks an archive-relative path against the exclusion rules.
///
/// The root itself (the empty path) is never excluded.
///
/// # Examples
///
/// ```
/// use tfpack_core::filters::Exclusion;
/// use tfpack_core::filters::exclusion_for;
///
/// assert_eq!(exclusion_for(".terraform"), Some(Exclusion::Hidden));
/// assert_eq!(exclusion_for("env/.envrc"), Some(Exclusion::Hidden));
/// assert_eq!(
///     exclusion_for("terraform.tfstate.backup"),
///     Some(Exclusion::StateArtifact)
/// );
/// assert_eq!(exclusion_for("modules/vpc/main.tf"), None);
/// ```
#[must_use]
pub fn exclusion_for(archive_path: &str) -> Option<Exclusion> {
    if is_hidden(archive_path) {
        return Some(Exclusion::Hidden);
    }
    if is_state_artifact(archive_path) {
        return Some(Exclusion::StateArtifact);
    }
    None
}

/// Returns `true` if the last segment of `archive_path` starts with `.`.
#[must_use]
pub fn is_hidden(archive_path: &str) -> bool {
    archive_path
        .rsplit('/')
        .next()
        .is_some_and(|name| name.starts_with('.'))
}

/// Returns `true` if `archive_path` names Terraform state.
#[must_use]
pub fn is_state_artifact(archive_path: &str) -> bool {
    archive_path.contains(STATE_FILE_MARKER)
}

/// Returns `true` if `name` carries the template extension.
#[must_use]
pub fn is_template_name(name: &str) -> bool {
    name.ends_with(TEMPLATE_EXTENSION)
}

/// Checks the top level of `dir` for at least one template file.
///
/// Only direct children are inspected; templates nested in subdirectories
/// do not count. Directories whose name happens to end in `.tf` are ignored.
///
/// # Errors
///
/// Returns `PackError::Io` if `dir` cannot be read.
pub fn has_template_files(dir: &Path) -> Result<bool> {
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(walk_error)?;
        if entry.file_type().is_dir() {
            continue;
        }
        if entry.file_name().to_str().is_some_and(is_template_name) {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Converts a `walkdir` failure into an I/O error, keeping the underlying
/// OS error when there is one.
pub(crate) fn walk_error(err: walkdir::Error) -> PackError {
    let message = err.to_string();
    match err.into_io_error() {
        Some(io) => PackError::Io(io),
        None => PackError::Io(std::io::Error::other(format!("walkdir error: {message}"))),
    }
}
