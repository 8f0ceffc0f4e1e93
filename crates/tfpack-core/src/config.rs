//! Configuration for archiving and extraction.

/// Default ceiling for the payload bytes of a template archive (1 MiB).
pub const TEMPLATE_ARCHIVE_LIMIT: u64 = 1 << 20;

/// Per-file cap applied while extracting (10 MiB).
pub const MAX_EXTRACTED_FILE_SIZE: u64 = 10 * (1 << 20);

/// Configuration for [`Archiver`](crate::Archiver).
///
/// # Examples
///
/// ```
/// use tfpack_core::ArchiveConfig;
///
/// let config = ArchiveConfig::default().with_limit(64 * 1024);
/// assert_eq!(config.limit, 64 * 1024);
///
/// // Zero disables the limit.
/// let unlimited = ArchiveConfig::default().with_limit(0);
/// assert!(!unlimited.is_limited());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveConfig {
    /// Ceiling for the sum of file payload bytes. `0` means unlimited.
    pub limit: u64,

    /// Archive symlinks that point at regular files as plain file copies.
    ///
    /// Only targets that resolve inside the source root are copied; anything
    /// else is skipped as when this is off.
    pub follow_file_symlinks: bool,
}

impl Default for ArchiveConfig {
    /// Default values:
    /// - `limit`: [`TEMPLATE_ARCHIVE_LIMIT`]
    /// - `follow_file_symlinks`: false
    fn default() -> Self {
        Self {
            limit: TEMPLATE_ARCHIVE_LIMIT,
            follow_file_symlinks: false,
        }
    }
}

impl ArchiveConfig {
    /// Sets the payload byte limit.
    #[must_use]
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    /// Enables or disables copying of symlinked regular files.
    #[must_use]
    pub fn with_follow_file_symlinks(mut self, follow: bool) -> Self {
        self.follow_file_symlinks = follow;
        self
    }

    /// Returns `true` when a non-zero limit is configured.
    #[must_use]
    pub fn is_limited(&self) -> bool {
        self.limit > 0
    }
}

/// What the extractor does with an entry whose payload exceeds the per-file
/// cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OversizePolicy {
    /// Abort extraction with [`PackError::FileTooLarge`](crate::PackError).
    #[default]
    Reject,

    /// Write the first `max_file_size` bytes and discard the rest of the
    /// payload.
    Truncate,
}

/// Configuration for [`Extractor`](crate::Extractor).
///
/// # Examples
///
/// ```
/// use tfpack_core::ExtractConfig;
/// use tfpack_core::OversizePolicy;
///
/// let config = ExtractConfig::default()
///     .with_max_file_size(4096)
///     .with_oversize_policy(OversizePolicy::Truncate);
/// assert_eq!(config.max_file_size, 4096);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractConfig {
    /// Maximum number of bytes written for a single file.
    pub max_file_size: u64,

    /// Behavior for entries larger than `max_file_size`.
    pub oversize_policy: OversizePolicy,

    /// Aggregate cap on bytes written across all files. `None` = unlimited.
    pub max_total_size: Option<u64>,

    /// Apply the permission bits recorded in the archive (masked to `0o777`)
    /// to newly created files.
    pub preserve_permissions: bool,
}

impl Default for ExtractConfig {
    /// Default values:
    /// - `max_file_size`: [`MAX_EXTRACTED_FILE_SIZE`]
    /// - `oversize_policy`: [`OversizePolicy::Reject`]
    /// - `max_total_size`: unlimited
    /// - `preserve_permissions`: true
    fn default() -> Self {
        Self {
            max_file_size: MAX_EXTRACTED_FILE_SIZE,
            oversize_policy: OversizePolicy::Reject,
            max_total_size: None,
            preserve_permissions: true,
        }
    }
}

impl ExtractConfig {
    /// Sets the per-file cap.
    #[must_use]
    pub fn with_max_file_size(mut self, max: u64) -> Self {
        self.max_file_size = max;
        self
    }

    /// Sets the oversize policy.
    #[must_use]
    pub fn with_oversize_policy(mut self, policy: OversizePolicy) -> Self {
        self.oversize_policy = policy;
        self
    }

    /// Sets the aggregate extraction cap.
    #[must_use]
    pub fn with_max_total_size(mut self, max: Option<u64>) -> Self {
        self.max_total_size = max;
        self
    }

    /// Enables or disables permission preservation.
    #[must_use]
    pub fn with_preserve_permissions(mut self, preserve: bool) -> Self {
        self.preserve_permissions = preserve;
        self
    }
}
