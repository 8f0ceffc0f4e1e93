//! Deterministic template directory traversal.
//!
//! [`TemplateWalker`] visits a source tree in pre-order (a directory before
//! its children, siblings in file-name order) using an explicit work stack.
//! Exclusion rules are applied on the way, symlinked directories are walked
//! as if their contents lived at the link location, and a symlinked
//! directory whose target was already descended into is skipped, which cuts
//! off cycles.

use std::collections::HashSet;
use std::fs::FileType;
use std::fs::Metadata;
use std::path::Path;
use std::path::PathBuf;

use tracing::debug;
use tracing::warn;
use walkdir::WalkDir;

use crate::Result;
use crate::entry::EntryKind;
use crate::filters;
use crate::filters::walk_error;
use crate::path::join_segment;

/// An entry that survived filtering and should be written to the archive.
#[derive(Debug, Clone)]
pub struct WalkEntry {
    /// Filesystem path to read from. For symlinked files this is the
    /// resolved target.
    pub path: PathBuf,

    /// Relative, `/`-delimited path to record in the archive.
    pub archive_path: String,

    /// Directory or regular file.
    pub kind: EntryKind,

    /// Metadata of the resolved entry (symlinks followed).
    pub metadata: Metadata,

    /// Number of segments in `archive_path`.
    pub depth: usize,
}

impl WalkEntry {
    /// Payload size in bytes (0 for directories).
    #[must_use]
    pub fn size(&self) -> u64 {
        match self.kind {
            EntryKind::File => self.metadata.len(),
            _ => 0,
        }
    }
}

/// Counters for entries the walker left out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    /// Entries dropped by the hidden or state-artifact rules.
    pub excluded: usize,
    /// Symlinks that were broken, pointed at non-directories, or escaped the
    /// source root.
    pub symlinks_skipped: usize,
    /// Symlinked directories skipped because their target was already
    /// descended into.
    pub cycles_skipped: usize,
    /// Sockets, FIFOs, devices.
    pub special_skipped: usize,
    /// Entries whose file name is not valid UTF-8 and so has no archive
    /// path.
    pub non_utf8_skipped: usize,
}

struct WorkItem {
    path: PathBuf,
    archive_path: String,
    file_type: FileType,
    depth: usize,
}

/// Pre-order walker over a template source directory.
///
/// # Examples
///
/// ```no_run
/// use tfpack_core::walker::TemplateWalker;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let walker = TemplateWalker::new("./infra", false)?;
/// for entry in walker {
///     let entry = entry?;
///     println!("{} ({:?})", entry.archive_path, entry.kind);
/// }
/// # Ok(())
/// # }
/// ```
pub struct TemplateWalker {
    root: PathBuf,
    follow_file_symlinks: bool,
    stack: Vec<WorkItem>,
    visited: HashSet<PathBuf>,
    stats: WalkStats,
}

impl TemplateWalker {
    /// Creates a walker rooted at `root`. The root itself is never yielded.
    ///
    /// # Errors
    ///
    /// Returns `PackError::Io` if the root cannot be canonicalized or read.
    pub fn new(root: impl AsRef<Path>, follow_file_symlinks: bool) -> Result<Self> {
        let root = root.as_ref().canonicalize()?;

        let mut walker = Self {
            root: root.clone(),
            follow_file_symlinks,
            stack: Vec::new(),
            visited: HashSet::from([root.clone()]),
            stats: WalkStats::default(),
        };
        walker.push_children(&root, "", 0)?;
        Ok(walker)
    }

    /// Returns counters for everything skipped so far.
    #[must_use]
    pub fn stats(&self) -> WalkStats {
        self.stats
    }

    /// Pushes the children of `dir` so that they pop in file-name order.
    fn push_children(&mut self, dir: &Path, archive_dir: &str, depth: usize) -> Result<()> {
        let listing = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .sort_by_file_name();

        let mut children = Vec::new();
        for entry in listing {
            let entry = entry.map_err(walk_error)?;
            let Some(name) = entry.file_name().to_str() else {
                if entry.file_name().as_encoded_bytes().starts_with(b".") {
                    self.stats.excluded += 1;
                } else {
                    debug!(path = %entry.path().display(), "skipping entry with non-UTF-8 name");
                    self.stats.non_utf8_skipped += 1;
                }
                continue;
            };
            children.push(WorkItem {
                archive_path: join_segment(archive_dir, name),
                file_type: entry.file_type(),
                path: entry.into_path(),
                depth: depth + 1,
            });
        }

        self.stack.extend(children.into_iter().rev());
        Ok(())
    }

    /// Processes one work item, returning the entry to emit if any.
    fn visit(&mut self, item: WorkItem) -> Result<Option<WalkEntry>> {
        if let Some(reason) = filters::exclusion_for(&item.archive_path) {
            debug!(path = %item.archive_path, %reason, "excluding entry");
            self.stats.excluded += 1;
            return Ok(None);
        }

        if item.file_type.is_symlink() {
            return self.visit_symlink(item);
        }

        if item.file_type.is_dir() {
            let metadata = std::fs::metadata(&item.path)?;
            let canonical = item.path.canonicalize()?;
            return self.descend(item, canonical, metadata).map(Some);
        }

        if item.file_type.is_file() {
            let metadata = std::fs::symlink_metadata(&item.path)?;
            return Ok(Some(WalkEntry {
                path: item.path,
                archive_path: item.archive_path,
                kind: EntryKind::File,
                metadata,
                depth: item.depth,
            }));
        }

        debug!(path = %item.archive_path, "skipping special file");
        self.stats.special_skipped += 1;
        Ok(None)
    }

    fn visit_symlink(&mut self, item: WorkItem) -> Result<Option<WalkEntry>> {
        let Ok(metadata) = std::fs::metadata(&item.path) else {
            debug!(path = %item.archive_path, "skipping broken symlink");
            self.stats.symlinks_skipped += 1;
            return Ok(None);
        };
        let Ok(target) = item.path.canonicalize() else {
            debug!(path = %item.archive_path, "skipping unresolvable symlink");
            self.stats.symlinks_skipped += 1;
            return Ok(None);
        };

        if metadata.is_dir() {
            if self.visited.contains(&target) {
                warn!(
                    path = %item.archive_path,
                    target = %target.display(),
                    "symlinked directory already walked, skipping"
                );
                self.stats.cycles_skipped += 1;
                return Ok(None);
            }
            return self.descend(item, target, metadata).map(Some);
        }

        if metadata.is_file() && self.follow_file_symlinks && target.starts_with(&self.root) {
            return Ok(Some(WalkEntry {
                path: target,
                archive_path: item.archive_path,
                kind: EntryKind::File,
                metadata,
                depth: item.depth,
            }));
        }

        debug!(path = %item.archive_path, "skipping symlink to non-directory");
        self.stats.symlinks_skipped += 1;
        Ok(None)
    }

    /// Emits a directory entry and schedules its children.
    fn descend(
        &mut self,
        item: WorkItem,
        canonical: PathBuf,
        metadata: Metadata,
    ) -> Result<WalkEntry> {
        self.push_children(&canonical, &item.archive_path, item.depth)?;
        self.visited.insert(canonical);

        Ok(WalkEntry {
            path: item.path,
            archive_path: item.archive_path,
            kind: EntryKind::Directory,
            metadata,
            depth: item.depth,
        })
    }
}

impl Iterator for TemplateWalker {
    type Item = Result<WalkEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(item) = self.stack.pop() {
            match self.visit(item) {
                Ok(Some(entry)) => return Some(Ok(entry)),
                Ok(None) => {}
                Err(e) => return Some(Err(e)),
            }
        }
        None
    }
}
