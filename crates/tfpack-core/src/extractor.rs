//! Template archive extraction.
//!
//! Entries are processed strictly in stream order. Names are validated with
//! [`SafePath::parse`] before they touch the filesystem; unsafe names are
//! skipped, not fatal. Only directories and regular files are materialized.
//!
//! Extraction is not transactional: when an error aborts the run, whatever
//! was written before stays on disk.

use std::fs::File;
use std::fs::OpenOptions;
use std::io::BufWriter;
use std::io::Cursor;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::time::Instant;

use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::ExtractConfig;
use crate::ExtractionReport;
use crate::OversizePolicy;
use crate::PackError;
use crate::Result;
use crate::copy::CopyBuffer;
use crate::copy::copy_with_buffer;
use crate::dest::DestDir;
use crate::entry::EntryKind;
use crate::path::SafePath;

/// Mode given to directories created during extraction.
#[cfg(unix)]
const DIRECTORY_MODE: u32 = 0o755;

/// Materializes template archives onto the filesystem.
///
/// # Examples
///
/// ```no_run
/// use tfpack_core::ExtractConfig;
/// use tfpack_core::Extractor;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let archive = std::fs::read("template.tar")?;
/// let report = Extractor::new(ExtractConfig::default()).extract("/tmp/workspace", &archive)?;
/// println!("{} files, {} skipped", report.files_extracted, report.entries_skipped);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    config: ExtractConfig,
}

impl Extractor {
    /// Creates an extractor with the given configuration.
    #[must_use]
    pub fn new(config: ExtractConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration in use.
    #[must_use]
    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }

    /// Extracts an in-memory archive under `dest_dir`, creating it if
    /// needed.
    ///
    /// # Errors
    ///
    /// - `PackError::Stream` for malformed or truncated framing
    /// - `PackError::Io` for filesystem failures
    /// - `PackError::FileTooLarge` for oversized entries under
    ///   [`OversizePolicy::Reject`]
    /// - `PackError::TotalSizeExceeded` when the aggregate cap trips
    pub fn extract(&self, dest_dir: impl AsRef<Path>, archive: &[u8]) -> Result<ExtractionReport> {
        self.extract_from(dest_dir, Cursor::new(archive))
    }

    /// Extracts an archive read from any byte stream.
    ///
    /// # Errors
    ///
    /// See [`Extractor::extract`].
    pub fn extract_from<R: Read>(
        &self,
        dest_dir: impl AsRef<Path>,
        reader: R,
    ) -> Result<ExtractionReport> {
        let start = Instant::now();
        let dest = DestDir::create(dest_dir)?;
        let mut report = ExtractionReport::new();
        let mut buffer = CopyBuffer::new();

        let mut archive = tar::Archive::new(reader);
        let entries = archive.entries().map_err(stream_error)?;

        for entry in entries {
            let mut entry = entry.map_err(stream_error)?;
            let name = String::from_utf8_lossy(&entry.path_bytes()).into_owned();

            let safe_path = match SafePath::parse(&name) {
                Ok(safe_path) => safe_path,
                Err(reason) => {
                    warn!(entry = %name, %reason, "skipping unsafe archive entry");
                    report.skip(format!("skipped {name}: {reason}"));
                    continue;
                }
            };

            match EntryKind::from_tar(entry.header().entry_type()) {
                EntryKind::Directory => {
                    Self::extract_directory(&dest, &safe_path, &name, &mut report)?;
                }
                EntryKind::File => {
                    self.extract_file(
                        &mut entry,
                        &dest,
                        &safe_path,
                        &name,
                        &mut report,
                        &mut buffer,
                    )?;
                }
                EntryKind::Unsupported => {
                    debug!(
                        entry = %name,
                        entry_type = ?entry.header().entry_type(),
                        "skipping unsupported entry type"
                    );
                    report.skip(format!("skipped {name}: unsupported entry type"));
                }
            }
        }

        report.duration = start.elapsed();
        info!(
            dest = %dest.as_path().display(),
            files = report.files_extracted,
            directories = report.directories_created,
            skipped = report.entries_skipped,
            bytes = report.bytes_written,
            "template archive extracted"
        );
        Ok(report)
    }

    fn extract_directory(
        dest: &DestDir,
        safe_path: &SafePath,
        name: &str,
        report: &mut ExtractionReport,
    ) -> Result<()> {
        let target = dest.join(safe_path);
        if !dest.contains(&target)? {
            warn!(entry = %name, "directory resolves outside destination, skipping");
            report.skip(format!("skipped {name}: resolves outside destination"));
            return Ok(());
        }
        if target.is_dir() {
            return Ok(());
        }

        create_dir_all(&target)?;
        report.directories_created += 1;
        Ok(())
    }

    fn extract_file<R: Read>(
        &self,
        entry: &mut tar::Entry<'_, R>,
        dest: &DestDir,
        safe_path: &SafePath,
        name: &str,
        report: &mut ExtractionReport,
        buffer: &mut CopyBuffer,
    ) -> Result<()> {
        let declared = entry.size();
        let cap = self.config.max_file_size;

        if declared > cap {
            match self.config.oversize_policy {
                OversizePolicy::Reject => {
                    return Err(PackError::FileTooLarge {
                        path: safe_path.as_path().to_path_buf(),
                        size: declared,
                        max: cap,
                    });
                }
                OversizePolicy::Truncate => {
                    warn!(entry = %name, declared, cap, "truncating oversized file");
                    report.files_truncated += 1;
                    report
                        .warnings
                        .push(format!("truncated {name} to {cap} of {declared} bytes"));
                }
            }
        }
        let expected = declared.min(cap);

        if let Some(max) = self.config.max_total_size {
            let projected = report.bytes_written.saturating_add(expected);
            if projected > max {
                return Err(PackError::TotalSizeExceeded {
                    written: projected,
                    max,
                });
            }
        }

        let target = dest.join(safe_path);
        if let Some(parent) = target.parent()
            && safe_path.has_parent()
        {
            if !dest.contains(parent)? {
                warn!(entry = %name, "file parent resolves outside destination, skipping");
                report.skip(format!("skipped {name}: resolves outside destination"));
                return Ok(());
            }
            create_dir_all(parent)?;
        }
        if is_symlink(&target) {
            warn!(entry = %name, "refusing to write through existing symlink");
            report.skip(format!("skipped {name}: target is a symlink"));
            return Ok(());
        }

        let mode = entry.header().mode().map_err(stream_error)?;
        let file = self.open_target(&target, mode)?;
        let mut writer = BufWriter::with_capacity(buffer.size(), file);
        let copied = copy_with_buffer(&mut entry.by_ref().take(cap), &mut writer, buffer)?;
        writer.flush()?;

        if copied < expected {
            return Err(PackError::Stream(format!(
                "entry {name} truncated: expected {expected} bytes, got {copied}"
            )));
        }

        report.files_extracted += 1;
        report.bytes_written = report.bytes_written.saturating_add(copied);
        Ok(())
    }

    /// Creates or truncates `target`. On Unix the archived mode is applied
    /// to new files, masked to `0o777` with the owner-write bit kept so a
    /// later extraction can truncate the file again.
    #[cfg(unix)]
    fn open_target(&self, target: &Path, mode: u32) -> Result<File> {
        use std::os::unix::fs::OpenOptionsExt;
        use std::os::unix::fs::PermissionsExt;

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        if self.config.preserve_permissions {
            options.mode(sanitize_mode(mode));
        }
        let file = options.open(target)?;
        if self.config.preserve_permissions {
            file.set_permissions(std::fs::Permissions::from_mode(sanitize_mode(mode)))?;
        }
        Ok(file)
    }

    #[cfg(not(unix))]
    fn open_target(&self, target: &Path, _mode: u32) -> Result<File> {
        Ok(OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(target)?)
    }
}

/// Extracts `archive` under `dest_dir` with the default configuration
/// (10 MiB per-file cap, oversized entries rejected).
///
/// # Errors
///
/// See [`Extractor::extract`].
///
/// # Examples
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let archive = std::fs::read("template.tar")?;
/// tfpack_core::extract("/tmp/workspace", &archive)?;
/// # Ok(())
/// # }
/// ```
pub fn extract(dest_dir: impl AsRef<Path>, archive: &[u8]) -> Result<()> {
    Extractor::default().extract(dest_dir, archive).map(|_| ())
}

/// Strips setuid, setgid and sticky bits and keeps the owner-write bit.
fn sanitize_mode(mode: u32) -> u32 {
    (mode & 0o777) | 0o200
}

fn is_symlink(path: &Path) -> bool {
    std::fs::symlink_metadata(path).is_ok_and(|metadata| metadata.file_type().is_symlink())
}

#[cfg(unix)]
fn create_dir_all(path: &Path) -> Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    std::fs::DirBuilder::new()
        .recursive(true)
        .mode(DIRECTORY_MODE)
        .create(path)?;
    Ok(())
}

#[cfg(not(unix))]
fn create_dir_all(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path)?;
    Ok(())
}

/// Classifies a tar reader failure. Framing problems surface from the tar
/// crate as `Other`/`InvalidData`/`UnexpectedEof`; anything else came from
/// the underlying reader.
pub(crate) fn stream_error(err: std::io::Error) -> PackError {
    match err.kind() {
        std::io::ErrorKind::Other
        | std::io::ErrorKind::InvalidData
        | std::io::ErrorKind::UnexpectedEof => PackError::Stream(err.to_string()),
        _ => PackError::Io(err),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::TarTestBuilder;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_extract_files_and_directories() {
        let archive = TarTestBuilder::new()
            .add_file("main.tf", b"terraform {}")
            .add_directory("sub")
            .add_file("sub/child.tf", b"output \"x\" {}")
            .add_directory("empty")
            .build();

        let temp = TempDir::new().unwrap();
        let report = Extractor::default().extract(temp.path(), &archive).unwrap();

        assert_eq!(
            fs::read_to_string(temp.path().join("main.tf")).unwrap(),
            "terraform {}"
        );
        assert_eq!(
            fs::read_to_string(temp.path().join("sub/child.tf")).unwrap(),
            "output \"x\" {}"
        );
        assert!(temp.path().join("empty").is_dir());
        assert_eq!(report.files_extracted, 2);
        assert_eq!(report.directories_created, 2);
        assert_eq!(report.bytes_written, 12 + 13);
    }

    #[test]
    fn test_creates_missing_destination() {
        let archive = TarTestBuilder::new().add_file("main.tf", b"x").build();
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("nested/dest");

        extract(&dest, &archive).unwrap();
        assert!(dest.join("main.tf").is_file());
    }

    #[test]
    fn test_file_without_directory_entry_gets_parents() {
        let archive = TarTestBuilder::new()
            .add_file("a/b/c.tf", b"nested")
            .build();
        let temp = TempDir::new().unwrap();

        extract(temp.path(), &archive).unwrap();
        assert_eq!(
            fs::read_to_string(temp.path().join("a/b/c.tf")).unwrap(),
            "nested"
        );
    }

    #[test]
    fn test_traversal_entries_skipped() {
        let archive = TarTestBuilder::new()
            .add_raw_name_file("../../escape.tf", b"evil")
            .add_raw_name_file("sub/../../escape2.tf", b"evil")
            .add_raw_name_file(".", b"")
            .add_file("main.tf", b"ok")
            .build();

        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("a/b/dest");
        let report = Extractor::default().extract(&dest, &archive).unwrap();

        assert!(!temp.path().join("escape.tf").exists());
        assert!(!temp.path().join("a/escape.tf").exists());
        assert!(!temp.path().join("a/escape2.tf").exists());
        assert!(!dest.join("escape.tf").exists());
        assert!(dest.join("main.tf").exists());
        assert_eq!(report.entries_skipped, 3);
        assert_eq!(report.files_extracted, 1);
    }

    #[test]
    fn test_absolute_entry_skipped() {
        let archive = TarTestBuilder::new()
            .add_raw_name_file("/tmp/tfpack-absolute-escape.tf", b"evil")
            .build();

        let temp = TempDir::new().unwrap();
        let report = Extractor::default().extract(temp.path(), &archive).unwrap();
        assert_eq!(report.entries_skipped, 1);
        assert_eq!(report.files_extracted, 0);
    }

    #[test]
    fn test_unsupported_entries_skipped() {
        let archive = TarTestBuilder::new()
            .add_symlink("link.tf", "/etc/passwd")
            .add_file("main.tf", b"ok")
            .build();

        let temp = TempDir::new().unwrap();
        let report = Extractor::default().extract(temp.path(), &archive).unwrap();
        assert!(fs::symlink_metadata(temp.path().join("link.tf")).is_err());
        assert_eq!(report.entries_skipped, 1);
        assert_eq!(report.files_extracted, 1);
    }

    #[test]
    fn test_oversized_file_rejected_by_default() {
        let archive = TarTestBuilder::new()
            .add_file("big.tf", &[b'x'; 64])
            .build();
        let temp = TempDir::new().unwrap();

        let err = Extractor::new(ExtractConfig::default().with_max_file_size(16))
            .extract(temp.path(), &archive)
            .unwrap_err();
        assert!(matches!(
            err,
            PackError::FileTooLarge {
                size: 64,
                max: 16,
                ..
            }
        ));
        assert!(!temp.path().join("big.tf").exists());
    }

    #[test]
    fn test_oversized_file_truncated_keeps_stream_aligned() {
        let archive = TarTestBuilder::new()
            .add_file("big.tf", &[b'x'; 2048])
            .add_file("after.tf", b"still here")
            .build();
        let temp = TempDir::new().unwrap();

        let config = ExtractConfig::default()
            .with_max_file_size(100)
            .with_oversize_policy(OversizePolicy::Truncate);
        let report = Extractor::new(config).extract(temp.path(), &archive).unwrap();

        assert_eq!(fs::read(temp.path().join("big.tf")).unwrap().len(), 100);
        assert_eq!(
            fs::read_to_string(temp.path().join("after.tf")).unwrap(),
            "still here"
        );
        assert_eq!(report.files_truncated, 1);
        assert_eq!(report.files_extracted, 2);
    }

    #[test]
    fn test_total_size_cap() {
        let archive = TarTestBuilder::new()
            .add_file("a.tf", &[b'a'; 40])
            .add_file("b.tf", &[b'b'; 40])
            .build();
        let temp = TempDir::new().unwrap();

        let config = ExtractConfig::default().with_max_total_size(Some(64));
        let err = Extractor::new(config)
            .extract(temp.path(), &archive)
            .unwrap_err();
        assert!(matches!(err, PackError::TotalSizeExceeded { max: 64, .. }));
        assert!(temp.path().join("a.tf").exists());
        assert!(!temp.path().join("b.tf").exists());
    }

    #[test]
    fn test_existing_file_truncated() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("main.tf"), "a much longer previous body").unwrap();

        let archive = TarTestBuilder::new().add_file("main.tf", b"short").build();
        extract(temp.path(), &archive).unwrap();
        assert_eq!(
            fs::read_to_string(temp.path().join("main.tf")).unwrap(),
            "short"
        );
    }

    #[test]
    fn test_malformed_stream() {
        let temp = TempDir::new().unwrap();
        let garbage = vec![0x41u8; 1024];
        let err = extract(temp.path(), &garbage).unwrap_err();
        assert!(err.is_malformed_archive(), "unexpected error: {err:?}");
    }

    #[test]
    fn test_truncated_payload() {
        let archive = TarTestBuilder::new()
            .add_file("main.tf", &[b'x'; 2000])
            .build();
        let truncated = &archive[..512 + 1000];

        let temp = TempDir::new().unwrap();
        let err = extract(temp.path(), truncated).unwrap_err();
        assert!(err.is_malformed_archive(), "unexpected error: {err:?}");
    }

    #[test]
    fn test_empty_archive_is_ok() {
        let temp = TempDir::new().unwrap();
        let report = Extractor::default().extract(temp.path(), &[]).unwrap();
        assert_eq!(report.total_items(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_mode_sanitized() {
        use std::os::unix::fs::PermissionsExt;

        let archive = TarTestBuilder::new()
            .add_file_with_mode("run.tf", b"x", 0o4755)
            .add_file_with_mode("ro.tf", b"y", 0o444)
            .build();
        let temp = TempDir::new().unwrap();
        extract(temp.path(), &archive).unwrap();

        let mode = |name: &str| {
            fs::metadata(temp.path().join(name))
                .unwrap()
                .permissions()
                .mode()
                & 0o7777
        };
        assert_eq!(mode("run.tf"), 0o755);
        assert_eq!(mode("ro.tf"), 0o644);
    }

    #[cfg(unix)]
    #[test]
    fn test_preexisting_symlink_not_followed() {
        let temp = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        let dest = temp.path().join("dest");
        fs::create_dir(&dest).unwrap();
        std::os::unix::fs::symlink(outside.path(), dest.join("sub")).unwrap();
        std::os::unix::fs::symlink(outside.path().join("target.tf"), dest.join("main.tf"))
            .unwrap();

        let archive = TarTestBuilder::new()
            .add_file("sub/evil.tf", b"evil")
            .add_file("main.tf", b"evil")
            .build();
        let report = Extractor::default().extract(&dest, &archive).unwrap();

        assert!(!outside.path().join("evil.tf").exists());
        assert!(!outside.path().join("target.tf").exists());
        assert_eq!(report.entries_skipped, 2);
    }

    #[test]
    fn test_stream_error_classification() {
        let err = stream_error(std::io::Error::other("bad header"));
        assert!(matches!(err, PackError::Stream(_)));

        let err = stream_error(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert!(matches!(err, PackError::Io(_)));
    }

    #[test]
    fn test_sanitize_mode() {
        assert_eq!(sanitize_mode(0o644), 0o644);
        assert_eq!(sanitize_mode(0o4755), 0o755);
        assert_eq!(sanitize_mode(0o400), 0o600);
        assert_eq!(sanitize_mode(0o1777), 0o777);
    }
}
