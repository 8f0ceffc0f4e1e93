//! Unpack command implementation.

use crate::cli::UnpackArgs;
use crate::error::add_context;
use crate::output::OutputFormatter;
use anyhow::Context;
use anyhow::Result;
use std::env;
use std::fs::File;
use std::io::BufReader;
use tfpack_core::ExtractConfig;
use tfpack_core::Extractor;
use tfpack_core::OversizePolicy;

pub fn execute(args: &UnpackArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let dest = match &args.dest {
        Some(dir) => dir.clone(),
        None => env::current_dir().context("failed to get current directory")?,
    };

    let policy = if args.truncate {
        OversizePolicy::Truncate
    } else {
        OversizePolicy::Reject
    };
    let config = ExtractConfig::default()
        .with_max_file_size(args.max_file_size)
        .with_oversize_policy(policy)
        .with_max_total_size(args.max_total_size)
        .with_preserve_permissions(!args.no_preserve_permissions);

    let file = File::open(&args.archive)
        .with_context(|| format!("failed to open archive {}", args.archive.display()))?;
    let report = add_context(
        Extractor::new(config).extract_from(&dest, BufReader::new(file)),
        &args.archive,
    )?;

    formatter.format_extraction_result(&dest, &report)
}
