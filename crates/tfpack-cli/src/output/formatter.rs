//! Output formatter trait for CLI results.

use anyhow::Result;
use serde::Serialize;
use std::path::Path;
use tfpack_core::CreationReport;
use tfpack_core::ExtractionReport;
use tfpack_core::inspect::ArchiveEntry;

/// Common output formatter trait
pub trait OutputFormatter {
    /// Format the result of `pack`
    fn format_creation_result(&self, output_path: &Path, report: &CreationReport) -> Result<()>;

    /// Format the result of `unpack`
    fn format_extraction_result(&self, dest: &Path, report: &ExtractionReport) -> Result<()>;

    /// Format the result of `list`
    fn format_entries(&self, entries: &[ArchiveEntry]) -> Result<()>;
}

/// Generic JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    pub operation: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(operation: impl Into<String>, data: T) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Success,
            data: Some(data),
        }
    }
}
