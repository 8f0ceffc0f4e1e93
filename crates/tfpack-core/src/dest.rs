//! Validated destination directory for extraction.

use std::path::Path;
use std::path::PathBuf;

use crate::PackError;
use crate::Result;
use crate::path::SafePath;

/// A canonical, existing destination directory.
///
/// Every path produced by [`DestDir::join`] starts with this directory. The
/// extractor additionally calls [`DestDir::contains`] on parents after they
/// are created, which catches pre-existing symlinks inside the destination
/// that point elsewhere.
///
/// # Examples
///
/// ```no_run
/// use tfpack_core::dest::DestDir;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dest = DestDir::create("/tmp/workspace")?;
/// println!("extracting into {}", dest.as_path().display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestDir(PathBuf);

impl DestDir {
    /// Creates the directory (and missing ancestors) if needed and
    /// canonicalizes it.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The path exists but is not a directory
    /// - The directory cannot be created
    /// - The path cannot be canonicalized
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() && !path.is_dir() {
            return Err(PackError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("path is not a directory: {}", path.display()),
            )));
        }
        std::fs::create_dir_all(path)?;

        let canonical = path.canonicalize().map_err(|e| {
            PackError::Io(std::io::Error::new(
                e.kind(),
                format!("failed to canonicalize path {}: {e}", path.display()),
            ))
        })?;

        Ok(Self(canonical))
    }

    /// Returns the path as a `&Path`.
    #[inline]
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Joins a validated entry path onto the destination.
    #[inline]
    #[must_use]
    pub fn join(&self, safe_path: &SafePath) -> PathBuf {
        self.0.join(safe_path.as_path())
    }

    /// Returns `true` if `path`, once symlinks are resolved, lies inside the
    /// destination.
    ///
    /// Paths that do not exist yet are judged by their nearest existing
    /// ancestor; the remaining components are plain names from a
    /// [`SafePath`] and cannot climb back out. A dangling symlink on the
    /// way counts as outside.
    ///
    /// # Errors
    ///
    /// Returns `PackError::Io` if canonicalization fails for a reason other
    /// than the path not existing.
    pub fn contains(&self, path: &Path) -> Result<bool> {
        let mut current = path;
        loop {
            if std::fs::symlink_metadata(current).is_ok() {
                return match current.canonicalize() {
                    Ok(canonical) => Ok(canonical.starts_with(&self.0)),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
                    Err(e) => Err(PackError::Io(std::io::Error::new(
                        e.kind(),
                        format!("failed to canonicalize {}: {e}", current.display()),
                    ))),
                };
            }
            match current.parent() {
                Some(parent) => current = parent,
                None => return Ok(false),
            }
        }
    }
}
