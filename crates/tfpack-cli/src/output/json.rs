//! JSON output formatter for machine-readable results.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use anyhow::Result;
use serde::Serialize;
use std::io::Write;
use std::io::{self};
use std::path::Path;
use tfpack_core::CreationReport;
use tfpack_core::ExtractionReport;
use tfpack_core::inspect::ArchiveEntry;

pub struct JsonFormatter;

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

#[derive(Serialize)]
struct CreationOutput {
    output_path: String,
    files_added: usize,
    directories_added: usize,
    payload_bytes: u64,
    archive_bytes: u64,
    entries_excluded: usize,
    symlinks_skipped: usize,
    duration_ms: u128,
}

impl CreationOutput {
    fn new(output_path: &Path, report: &CreationReport) -> Self {
        Self {
            output_path: output_path.display().to_string(),
            files_added: report.files_added,
            directories_added: report.directories_added,
            payload_bytes: report.payload_bytes,
            archive_bytes: report.archive_bytes,
            entries_excluded: report.entries_excluded,
            symlinks_skipped: report.symlinks_skipped,
            duration_ms: report.duration.as_millis(),
        }
    }
}

#[derive(Serialize)]
struct ExtractionOutput {
    dest: String,
    files_extracted: usize,
    directories_created: usize,
    bytes_written: u64,
    entries_skipped: usize,
    files_truncated: usize,
    duration_ms: u128,
    warnings: Vec<String>,
}

impl ExtractionOutput {
    fn new(dest: &Path, report: &ExtractionReport) -> Self {
        Self {
            dest: dest.display().to_string(),
            files_extracted: report.files_extracted,
            directories_created: report.directories_created,
            bytes_written: report.bytes_written,
            entries_skipped: report.entries_skipped,
            files_truncated: report.files_truncated,
            duration_ms: report.duration.as_millis(),
            warnings: report.warnings.clone(),
        }
    }
}

#[derive(Serialize)]
struct EntryOutput {
    path: String,
    kind: String,
    mode: u32,
    size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    rejection: Option<String>,
}

impl From<&ArchiveEntry> for EntryOutput {
    fn from(entry: &ArchiveEntry) -> Self {
        Self {
            path: entry.path.clone(),
            kind: entry.kind.to_string(),
            mode: entry.mode,
            size: entry.size,
            rejection: entry.rejection.map(|reason| reason.to_string()),
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_creation_result(&self, output_path: &Path, report: &CreationReport) -> Result<()> {
        Self::output(&JsonOutput::success(
            "pack",
            CreationOutput::new(output_path, report),
        ))
    }

    fn format_extraction_result(&self, dest: &Path, report: &ExtractionReport) -> Result<()> {
        Self::output(&JsonOutput::success(
            "unpack",
            ExtractionOutput::new(dest, report),
        ))
    }

    fn format_entries(&self, entries: &[ArchiveEntry]) -> Result<()> {
        let data: Vec<EntryOutput> = entries.iter().map(EntryOutput::from).collect();
        Self::output(&JsonOutput::success("list", data))
    }
}
