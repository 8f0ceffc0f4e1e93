//! Archiving and extraction reports.

use std::time::Duration;

/// Report of an archive creation.
///
/// # Examples
///
/// ```
/// use tfpack_core::CreationReport;
///
/// let mut report = CreationReport::default();
/// report.files_added = 3;
/// report.directories_added = 1;
/// assert_eq!(report.total_entries(), 4);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CreationReport {
    /// Number of regular files written.
    pub files_added: usize,

    /// Number of directory entries written.
    pub directories_added: usize,

    /// Sum of file payload bytes (the quantity the limit applies to).
    pub payload_bytes: u64,

    /// Size of the finished archive including tar framing.
    pub archive_bytes: u64,

    /// Entries dropped by the hidden or state-artifact rules, plus entries
    /// whose names are not valid UTF-8.
    pub entries_excluded: usize,

    /// Symlinks left out (broken, non-directory targets, or cycles).
    pub symlinks_skipped: usize,

    /// Duration of the operation.
    pub duration: Duration,
}

impl CreationReport {
    /// Creates a new empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of entries in the archive.
    #[must_use]
    pub fn total_entries(&self) -> usize {
        self.files_added + self.directories_added
    }
}

/// Report of an extraction.
#[derive(Debug, Clone, Default)]
pub struct ExtractionReport {
    /// Number of files written.
    pub files_extracted: usize,

    /// Number of directories created (pre-existing ones are not counted).
    pub directories_created: usize,

    /// Total payload bytes written to disk.
    pub bytes_written: u64,

    /// Entries skipped because their path was unsafe or their type is not
    /// materialized.
    pub entries_skipped: usize,

    /// Files cut short at the per-file cap.
    pub files_truncated: usize,

    /// Duration of the operation.
    pub duration: Duration,

    /// Human-readable notes about skipped or truncated entries.
    pub warnings: Vec<String>,
}

impl ExtractionReport {
    /// Creates a new empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a skipped entry along with the reason.
    pub fn skip(&mut self, message: impl Into<String>) {
        self.entries_skipped += 1;
        self.warnings.push(message.into());
    }

    /// Returns whether any warnings were generated.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Returns the number of entries materialized on disk.
    #[must_use]
    pub fn total_items(&self) -> usize {
        self.files_extracted + self.directories_created
    }
}
