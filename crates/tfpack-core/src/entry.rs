//! Archive entry kinds and the mapping to tar entry types.

use std::fmt;

/// Kind of an archive entry.
///
/// The archiver only ever produces [`EntryKind::Directory`] and
/// [`EntryKind::File`]; [`EntryKind::Unsupported`] shows up when inspecting
/// archives from other producers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// Directory.
    Directory,
    /// Regular file.
    File,
    /// Any other tar entry type (symlink, hardlink, device, FIFO, ...).
    Unsupported,
}

impl EntryKind {
    /// Maps a tar entry type onto an entry kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use tfpack_core::EntryKind;
    ///
    /// assert_eq!(EntryKind::from_tar(tar::EntryType::Regular), EntryKind::File);
    /// assert_eq!(EntryKind::from_tar(tar::EntryType::Symlink), EntryKind::Unsupported);
    /// ```
    #[must_use]
    pub fn from_tar(entry_type: tar::EntryType) -> Self {
        match entry_type {
            tar::EntryType::Directory => Self::Directory,
            tar::EntryType::Regular | tar::EntryType::Continuous => Self::File,
            _ => Self::Unsupported,
        }
    }

    /// Returns the tar entry type written for this kind.
    #[must_use]
    pub fn to_tar(self) -> Option<tar::EntryType> {
        match self {
            Self::Directory => Some(tar::EntryType::Directory),
            Self::File => Some(tar::EntryType::Regular),
            Self::Unsupported => None,
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Directory => f.write_str("directory"),
            Self::File => f.write_str("file"),
            Self::Unsupported => f.write_str("unsupported"),
        }
    }
}
