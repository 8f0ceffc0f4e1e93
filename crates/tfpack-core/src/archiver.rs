//! Template archive creation.
//!
//! Walks a source directory with [`TemplateWalker`] and serializes every
//! surviving directory and regular file into an in-memory tar stream. File
//! payloads count against [`ArchiveConfig::limit`]; the archive is returned
//! only if the whole walk completes within it.

use std::fs::File;
use std::fs::Metadata;
use std::io::Read;
use std::path::Path;
use std::time::Instant;
use std::time::UNIX_EPOCH;

use tar::Builder;
use tar::Header;
use tracing::debug;
use tracing::info;

use crate::ArchiveConfig;
use crate::CreationReport;
use crate::PackError;
use crate::Result;
use crate::entry::EntryKind;
use crate::filters;
use crate::filters::TEMPLATE_EXTENSION;
use crate::walker::TemplateWalker;
use crate::walker::WalkEntry;

/// A finished archive together with its creation report.
#[derive(Debug, Clone)]
pub struct ArchiveOutput {
    /// The tar stream.
    pub bytes: Vec<u8>,
    /// Statistics about what went in and what was left out.
    pub report: CreationReport,
}

/// Packages template directories into tar archives.
///
/// # Examples
///
/// ```no_run
/// use tfpack_core::ArchiveConfig;
/// use tfpack_core::Archiver;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let archiver = Archiver::new(ArchiveConfig::default().with_limit(512 * 1024));
/// let output = archiver.create("./infra")?;
/// println!(
///     "{} files, {} bytes",
///     output.report.files_added,
///     output.bytes.len()
/// );
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Archiver {
    config: ArchiveConfig,
}

impl Archiver {
    /// Creates an archiver with the given configuration.
    #[must_use]
    pub fn new(config: ArchiveConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration in use.
    #[must_use]
    pub fn config(&self) -> &ArchiveConfig {
        &self.config
    }

    /// Archives `source_dir`.
    ///
    /// # Errors
    ///
    /// - `PackError::NoTemplateFiles` if the top level of `source_dir` has no
    ///   `.tf` file; the error carries the absolute path.
    /// - `PackError::ArchiveTooLarge` if file payloads reach the limit.
    /// - `PackError::Io` if the tree cannot be read.
    ///
    /// On any error the partially built archive is dropped.
    pub fn create(&self, source_dir: impl AsRef<Path>) -> Result<ArchiveOutput> {
        let source_dir = source_dir.as_ref();
        let start = Instant::now();

        if !filters::has_template_files(source_dir)? {
            return Err(PackError::NoTemplateFiles {
                path: std::path::absolute(source_dir)?,
                extension: TEMPLATE_EXTENSION,
            });
        }

        let mut builder = Builder::new(Vec::new());
        let mut report = CreationReport::new();
        let mut walker = TemplateWalker::new(source_dir, self.config.follow_file_symlinks)?;

        for entry in walker.by_ref() {
            let entry = entry?;
            match entry.kind {
                EntryKind::Directory => {
                    let mut header = entry_header(&entry);
                    builder.append_data(&mut header, &entry.archive_path, std::io::empty())?;
                    report.directories_added += 1;
                }
                EntryKind::File => {
                    self.append_file(&mut builder, &entry, &mut report)?;
                }
                EntryKind::Unsupported => {}
            }
        }

        let stats = walker.stats();
        report.entries_excluded = stats.excluded + stats.non_utf8_skipped;
        report.symlinks_skipped = stats.symlinks_skipped + stats.cycles_skipped;

        let bytes = builder.into_inner()?;
        report.archive_bytes = bytes.len() as u64;
        report.duration = start.elapsed();

        info!(
            source = %source_dir.display(),
            files = report.files_added,
            directories = report.directories_added,
            payload_bytes = report.payload_bytes,
            archive_bytes = report.archive_bytes,
            "template archive created"
        );

        Ok(ArchiveOutput {
            bytes,
            report,
        })
    }

    /// Appends one regular file, enforcing the payload limit first so the
    /// limit is never overrun.
    fn append_file<W: std::io::Write>(
        &self,
        builder: &mut Builder<W>,
        entry: &WalkEntry,
        report: &mut CreationReport,
    ) -> Result<()> {
        let size = entry.size();
        let total = report
            .payload_bytes
            .checked_add(size)
            .ok_or(PackError::ArchiveTooLarge {
                limit: self.config.limit,
            })?;

        if self.config.is_limited() && total >= self.config.limit {
            debug!(
                path = %entry.archive_path,
                total,
                limit = self.config.limit,
                "archive limit reached"
            );
            return Err(PackError::ArchiveTooLarge {
                limit: self.config.limit,
            });
        }

        let file = File::open(&entry.path)?;
        let mut header = entry_header(entry);
        builder.append_data(&mut header, &entry.archive_path, file.take(size))?;

        report.payload_bytes = total;
        report.files_added += 1;
        Ok(())
    }
}

/// Archives `source_dir` with the given payload `limit` (`0` = unlimited).
///
/// This is the plain form of [`Archiver::create`] for callers that only
/// need the bytes.
///
/// # Errors
///
/// See [`Archiver::create`].
///
/// # Examples
///
/// ```no_run
/// use tfpack_core::TEMPLATE_ARCHIVE_LIMIT;
/// use tfpack_core::create;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let bytes = create("./infra", TEMPLATE_ARCHIVE_LIMIT)?;
/// # Ok(())
/// # }
/// ```
pub fn create(source_dir: impl AsRef<Path>, limit: u64) -> Result<Vec<u8>> {
    Archiver::new(ArchiveConfig::default().with_limit(limit))
        .create(source_dir)
        .map(|output| output.bytes)
}

/// Builds the tar header for a walked entry. The path and checksum are
/// filled in by `Builder::append_data`.
fn entry_header(entry: &WalkEntry) -> Header {
    let mut header = Header::new_gnu();
    if let Some(entry_type) = entry.kind.to_tar() {
        header.set_entry_type(entry_type);
    }
    header.set_size(entry.size());
    header.set_mode(permission_bits(&entry.metadata, entry.kind));
    header.set_mtime(modified_secs(&entry.metadata));
    header
}

#[cfg(unix)]
fn permission_bits(metadata: &Metadata, _kind: EntryKind) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o777
}

#[cfg(not(unix))]
fn permission_bits(metadata: &Metadata, kind: EntryKind) -> u32 {
    match (kind, metadata.permissions().readonly()) {
        (EntryKind::Directory, _) => 0o755,
        (_, true) => 0o444,
        (_, false) => 0o644,
    }
}

fn modified_secs(metadata: &Metadata) -> u64 {
    metadata
        .modified()
        .ok()
        .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
        .map_or(0, |elapsed| elapsed.as_secs())
}
