//! Packaging of Terraform template directories into tar archives and
//! traversal-safe extraction of those archives.
//!
//! `tfpack-core` has two halves that share nothing but the wire format:
//!
//! - [`create`] walks a template directory (skipping hidden names and
//!   Terraform state), and returns an uncompressed tar stream, failing once
//!   the file payload reaches a byte limit.
//! - [`extract`] materializes such a stream under a destination directory,
//!   skipping any entry whose name would resolve outside it.
//!
//! # Examples
//!
//! ```no_run
//! use tfpack_core::TEMPLATE_ARCHIVE_LIMIT;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let archive = tfpack_core::create("./templates/vpc", TEMPLATE_ARCHIVE_LIMIT)?;
//! tfpack_core::extract("/tmp/workspace", &archive)?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod archiver;
pub mod config;
pub mod copy;
pub mod dest;
pub mod entry;
pub mod error;
pub mod extractor;
pub mod filters;
pub mod inspect;
pub mod path;
pub mod report;
pub mod walker;

#[cfg(test)]
mod test_utils;

// Re-export main API types
pub use archiver::ArchiveOutput;
pub use archiver::Archiver;
pub use archiver::create;
pub use config::ArchiveConfig;
pub use config::ExtractConfig;
pub use config::MAX_EXTRACTED_FILE_SIZE;
pub use config::OversizePolicy;
pub use config::TEMPLATE_ARCHIVE_LIMIT;
pub use entry::EntryKind;
pub use error::PackError;
pub use error::Result;
pub use extractor::Extractor;
pub use extractor::extract;
pub use filters::STATE_FILE_MARKER;
pub use filters::TEMPLATE_EXTENSION;
pub use report::CreationReport;
pub use report::ExtractionReport;
