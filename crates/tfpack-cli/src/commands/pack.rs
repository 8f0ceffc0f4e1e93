//! Pack command implementation.

use crate::cli::PackArgs;
use crate::error::add_context;
use crate::output::OutputFormatter;
use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use tfpack_core::ArchiveConfig;
use tfpack_core::Archiver;

pub fn execute(args: &PackArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let output_path = match &args.output {
        Some(path) => path.clone(),
        None => default_output_path(&args.source)?,
    };

    if output_path.exists() && !args.force {
        bail!(
            "Output file '{}' already exists\n\
             HINT: Use --force to overwrite.",
            output_path.display()
        );
    }

    let config = ArchiveConfig::default()
        .with_limit(args.limit)
        .with_follow_file_symlinks(args.follow_file_symlinks);
    let output = add_context(Archiver::new(config).create(&args.source), &args.source)?;

    fs::write(&output_path, &output.bytes)
        .with_context(|| format!("failed to write archive to {}", output_path.display()))?;

    formatter.format_creation_result(&output_path, &output.report)
}

/// `<dir name>.tar` in the current directory.
fn default_output_path(source: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(source)
        .with_context(|| format!("failed to resolve {}", source.display()))?;
    let name = absolute
        .file_name()
        .with_context(|| format!("cannot derive an archive name from {}", source.display()))?;

    let mut file_name = name.to_os_string();
    file_name.push(".tar");
    Ok(PathBuf::from(file_name))
}
