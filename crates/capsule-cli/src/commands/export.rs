//! `capsule export` — Write a package as a tar archive.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

/// Arguments for the `export` command.
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Package file to export.
    pub file: PathBuf,

    /// Archive to write; gzip-compressed when it ends in `.gz` or `.tgz`.
    #[arg(short, long)]
    pub output: PathBuf,
}

/// Executes the `export` command.
///
/// # Errors
///
/// Returns an error if the package cannot be read or the archive cannot be
/// written.
pub fn execute(args: ExportArgs) -> anyhow::Result<()> {
    let package = super::load_package(&args.file)?;
    let entries = capsule_pack::export::export_tar(&package, &args.output)
        .with_context(|| format!("failed to export to {}", args.output.display()))?;
    println!("{entries} entries -> {}", args.output.display());
    Ok(())
}
