//! Error types for template packaging and extraction.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `PackError`.
pub type Result<T> = std::result::Result<T, PackError>;

/// Errors that can occur while archiving or extracting a template.
#[derive(Error, Debug)]
pub enum PackError {
    /// The source directory has no template files at its top level.
    #[error("{} is not a valid template since it has no {extension} files", path.display())]
    NoTemplateFiles {
        /// Absolute path of the rejected source directory.
        path: PathBuf,
        /// The template extension that was looked for.
        extension: &'static str,
    },

    /// File payloads reached the archive size limit.
    #[error("archive too big: must be < {limit} bytes")]
    ArchiveTooLarge {
        /// The configured limit in bytes.
        limit: u64,
    },

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The archive stream is malformed or truncated.
    #[error("malformed archive stream: {0}")]
    Stream(String),

    /// An archive entry declares more payload than the per-file cap allows.
    #[error("entry {} is too large: {size} bytes (max {max})", path.display())]
    FileTooLarge {
        /// Relative path of the entry.
        path: PathBuf,
        /// Declared payload size.
        size: u64,
        /// Per-file cap in bytes.
        max: u64,
    },

    /// Extracted bytes exceeded the aggregate extraction cap.
    #[error("total extracted size exceeded: {written} bytes (max {max})")]
    TotalSizeExceeded {
        /// Bytes written when the cap tripped.
        written: u64,
        /// Aggregate cap in bytes.
        max: u64,
    },
}

impl PackError {
    /// Returns `true` if this error was raised by a size limit rather than by
    /// a failing filesystem or a broken stream.
    ///
    /// # Examples
    ///
    /// ```
    /// use tfpack_core::PackError;
    ///
    /// let err = PackError::ArchiveTooLarge { limit: 1024 };
    /// assert!(err.is_limit_exceeded());
    ///
    /// let err = PackError::Stream("truncated header".to_string());
    /// assert!(!err.is_limit_exceeded());
    /// ```
    #[must_use]
    pub const fn is_limit_exceeded(&self) -> bool {
        matches!(
            self,
            Self::ArchiveTooLarge { .. }
                | Self::FileTooLarge { .. }
                | Self::TotalSizeExceeded { .. }
        )
    }

    /// Returns `true` if the archive bytes themselves could not be parsed.
    #[must_use]
    pub const fn is_malformed_archive(&self) -> bool {
        matches!(self, Self::Stream(_))
    }

    /// Returns the stream diagnostic, if this is a stream error.
    #[must_use]
    pub fn context(&self) -> Option<&str> {
        match self {
            Self::Stream(msg) => Some(msg),
            _ => None,
        }
    }
}
