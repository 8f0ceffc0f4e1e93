//! Archive listing without extraction.

use std::io::Cursor;
use std::io::Read;

use crate::Result;
use crate::entry::EntryKind;
use crate::extractor::stream_error;
use crate::path::PathRejection;
use crate::path::SafePath;

/// One entry of a template archive as recorded in its header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Entry name exactly as stored (lossy UTF-8).
    pub path: String,

    /// Entry kind.
    pub kind: EntryKind,

    /// Permission bits from the header.
    pub mode: u32,

    /// Declared payload size.
    pub size: u64,

    /// Why extraction would skip this entry, if it would.
    pub rejection: Option<PathRejection>,
}

impl ArchiveEntry {
    /// Returns `true` if extraction would materialize this entry.
    #[must_use]
    pub fn is_extractable(&self) -> bool {
        self.rejection.is_none() && self.kind != EntryKind::Unsupported
    }
}

/// Lists the entries of an in-memory archive in stream order.
///
/// Nothing is written to disk. Unsafe names are reported through
/// [`ArchiveEntry::rejection`] rather than failing the listing.
///
/// # Errors
///
/// Returns `PackError::Stream` if the archive framing is malformed.
///
/// # Examples
///
/// ```no_run
/// use tfpack_core::inspect::list_entries;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let archive = std::fs::read("template.tar")?;
/// for entry in list_entries(&archive)? {
///     println!("{} {} {}", entry.kind, entry.size, entry.path);
/// }
/// # Ok(())
/// # }
/// ```
pub fn list_entries(archive: &[u8]) -> Result<Vec<ArchiveEntry>> {
    list_entries_from(Cursor::new(archive))
}

/// Lists the entries of an archive read from any byte stream.
///
/// # Errors
///
/// See [`list_entries`].
pub fn list_entries_from<R: Read>(reader: R) -> Result<Vec<ArchiveEntry>> {
    let mut archive = tar::Archive::new(reader);
    let mut listed = Vec::new();

    for entry in archive.entries().map_err(stream_error)? {
        let entry = entry.map_err(stream_error)?;
        let header = entry.header();
        let path = String::from_utf8_lossy(&entry.path_bytes()).into_owned();

        listed.push(ArchiveEntry {
            rejection: SafePath::parse(&path).err(),
            kind: EntryKind::from_tar(header.entry_type()),
            mode: header.mode().map_err(stream_error)?,
            size: entry.size(),
            path,
        });
    }

    Ok(listed)
}
