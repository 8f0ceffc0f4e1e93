//! Human-readable output formatter with colors and styling.

use super::formatter::OutputFormatter;
use anyhow::Result;
use console::Term;
use console::style;
use std::path::Path;
use tfpack_core::CreationReport;
use tfpack_core::EntryKind;
use tfpack_core::ExtractionReport;
use tfpack_core::inspect::ArchiveEntry;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
        }
    }

    fn format_size(bytes: u64) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;
        const GB: u64 = MB * 1024;

        if bytes >= GB {
            format!("{:.1} GB", bytes as f64 / GB as f64)
        } else if bytes >= MB {
            format!("{:.1} MB", bytes as f64 / MB as f64)
        } else if bytes >= KB {
            format!("{:.1} KB", bytes as f64 / KB as f64)
        } else {
            format!("{bytes} B")
        }
    }

    fn headline(&self, message: &str) {
        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{} {message}", style("✓").green().bold()));
        } else {
            let _ = self.term.write_line(message);
        }
    }

    fn warnings(&self, warnings: &[String]) {
        if warnings.is_empty() {
            return;
        }

        let _ = self.term.write_line("");
        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{}", style("Warnings:").yellow().bold()));
        } else {
            let _ = self.term.write_line("Warnings:");
        }
        for warning in warnings {
            let _ = self.term.write_line(&format!("  - {warning}"));
        }
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_creation_result(&self, output_path: &Path, report: &CreationReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        self.headline(&format!("Archive created: {}", output_path.display()));
        let _ = self
            .term
            .write_line(&format!("  Files added:      {}", report.files_added));
        let _ = self
            .term
            .write_line(&format!("  Directories:      {}", report.directories_added));
        let _ = self.term.write_line(&format!(
            "  Payload size:     {}",
            Self::format_size(report.payload_bytes)
        ));
        let _ = self.term.write_line(&format!(
            "  Archive size:     {}",
            Self::format_size(report.archive_bytes)
        ));

        if self.verbose {
            let _ = self
                .term
                .write_line(&format!("  Excluded:         {}", report.entries_excluded));
            let _ = self
                .term
                .write_line(&format!("  Symlinks skipped: {}", report.symlinks_skipped));
            let _ = self
                .term
                .write_line(&format!("  Duration:         {:?}", report.duration));
        }

        Ok(())
    }

    fn format_extraction_result(&self, dest: &Path, report: &ExtractionReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        self.headline(&format!("Extraction complete: {}", dest.display()));
        let _ = self
            .term
            .write_line(&format!("  Files extracted: {}", report.files_extracted));
        let _ = self
            .term
            .write_line(&format!("  Directories: {}", report.directories_created));
        let _ = self.term.write_line(&format!(
            "  Total size: {}",
            Self::format_size(report.bytes_written)
        ));
        if report.entries_skipped > 0 {
            let _ = self
                .term
                .write_line(&format!("  Entries skipped: {}", report.entries_skipped));
        }

        if self.verbose {
            let _ = self
                .term
                .write_line(&format!("  Duration: {:?}", report.duration));
        }

        self.warnings(&report.warnings);
        Ok(())
    }

    fn format_entries(&self, entries: &[ArchiveEntry]) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        for entry in entries {
            let type_char = match entry.kind {
                EntryKind::Directory => "d",
                EntryKind::File => "-",
                EntryKind::Unsupported => "?",
            };

            let mut line = format!(
                "{type_char}{:<6o} {:>10}  {}",
                entry.mode, entry.size, entry.path
            );
            if let Some(reason) = &entry.rejection {
                let note = format!("  (unsafe: {reason})");
                if self.use_colors {
                    line.push_str(&format!("{}", style(note).red()));
                } else {
                    line.push_str(&note);
                }
            }
            let _ = self.term.write_line(&line);
        }

        let total: u64 = entries.iter().map(|entry| entry.size).sum();
        let _ = self.term.write_line("");
        let _ = self.term.write_line(&format!(
            "Total: {} entries, {}",
            entries.len(),
            Self::format_size(total)
        ));

        Ok(())
    }
}
