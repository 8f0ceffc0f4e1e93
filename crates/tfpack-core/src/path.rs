//! Archive path helpers shared by the archiver and the extractor.
//!
//! Archive paths are always relative and `/`-delimited. The archiver builds
//! them segment by segment with [`join_segment`]; the extractor parses
//! untrusted header names with [`SafePath::parse`] before anything is joined
//! onto the destination.

use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use thiserror::Error;


/// Why an archive entry name was refused by [`SafePath::parse`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathRejection {
    /// The name resolves to the destination root itself (`.`, `./`, empty).
    #[error("entry names the destination root")]
    Root,
    /// A `..` segment appears somewhere in the name.
    #[error("entry contains a parent directory segment")]
    ParentTraversal,
    /// The name starts with `/`.
    #[error("entry uses an absolute path")]
    Absolute,
    /// A segment is not a plain file name on this platform (drive prefix,
    /// embedded separator, NUL byte).
    #[error("entry contains an invalid path segment")]
    InvalidSegment,
}

/// A relative entry path that is safe to join under a destination.
///
/// Can only be constructed through [`SafePath::parse`]; there is no
/// `From<PathBuf>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SafePath(PathBuf);

impl SafePath {
    /// Validates an archive entry name and converts it to a native path.
    ///
    /// Empty and `.` segments are dropped, so `a//b/./c` becomes `a/b/c`.
    /// A `..` segment anywhere rejects the whole name.
    ///
    /// # Errors
    ///
    /// Returns the [`PathRejection`] describing the first problem found.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::Path;
    /// use tfpack_core::path::PathRejection;
    /// use tfpack_core::path::SafePath;
    ///
    /// let safe = SafePath::parse("modules/vpc/main.tf").unwrap();
    /// assert_eq!(safe.as_path(), Path::new("modules/vpc/main.tf"));
    ///
    /// assert_eq!(SafePath::parse("."), Err(PathRejection::Root));
    /// assert_eq!(
    ///     SafePath::parse("../../escape.tf"),
    ///     Err(PathRejection::ParentTraversal)
    /// );
    /// assert_eq!(SafePath::parse("/etc/passwd"), Err(PathRejection::Absolute));
    /// ```
    pub fn parse(name: &str) -> std::result::Result<Self, PathRejection> {
        if name.split('/').any(|segment| segment == "..") {
            return Err(PathRejection::ParentTraversal);
        }
        if name.starts_with('/') {
            return Err(PathRejection::Absolute);
        }

        let mut path = PathBuf::new();
        for segment in name.split('/') {
            if segment.is_empty() || segment == "." {
                continue;
            }
            if segment.contains('\0') || !is_single_normal(segment) {
                return Err(PathRejection::InvalidSegment);
            }
            path.push(segment);
        }

        if path.as_os_str().is_empty() {
            return Err(PathRejection::Root);
        }
        Ok(Self(path))
    }

    /// Returns the path as a `&Path`.
    #[inline]
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Returns `true` if the path has more than one segment.
    #[must_use]
    pub fn has_parent(&self) -> bool {
        self.0.components().nth(1).is_some()
    }
}

/// `true` when `segment` parses as exactly one ordinary path component on
/// the host platform. Catches `C:` prefixes and `\` separators on Windows.
fn is_single_normal(segment: &str) -> bool {
    let mut components = Path::new(segment).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Appends a file name to an archive path, producing a `/`-delimited path.
///
/// # Examples
///
/// ```
/// use tfpack_core::path::join_segment;
///
/// assert_eq!(join_segment("", "main.tf"), "main.tf");
/// assert_eq!(join_segment("modules/vpc", "main.tf"), "modules/vpc/main.tf");
/// ```
#[must_use]
pub fn join_segment(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}/{name}")
    }
}
