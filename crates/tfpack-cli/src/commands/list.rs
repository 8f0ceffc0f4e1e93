//! List command implementation

use crate::cli::ListArgs;
use crate::error::add_context;
use crate::output::OutputFormatter;
use anyhow::Context;
use anyhow::Result;
use std::fs::File;
use std::io::BufReader;
use tfpack_core::inspect::list_entries_from;

pub fn execute(args: &ListArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let file = File::open(&args.archive)
        .with_context(|| format!("failed to open archive {}", args.archive.display()))?;
    let entries = add_context(list_entries_from(BufReader::new(file)), &args.archive)?;

    formatter.format_entries(&entries)
}
