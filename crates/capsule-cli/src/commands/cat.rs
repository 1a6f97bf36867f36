//! `capsule cat` — Print the content of one package input.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use capsule_pack::store::{ContentStore, DirectoryStore, PackageStore};
use capsule_pack::unit::Package;
use clap::Args;

/// Arguments for the `cat` command.
#[derive(Args, Debug)]
pub struct CatArgs {
    /// Package file to read from.
    pub file: PathBuf,

    /// Virtual path of the input.
    pub path: String,

    /// Read the content from an unpacked input tree (such as the `files/`
    /// directory of an exported archive) instead of the package.
    #[arg(long)]
    pub root: Option<PathBuf>,
}

/// Executes the `cat` command.
///
/// # Errors
///
/// Returns an error if the package cannot be read, the path is not one of
/// its inputs, or stdout cannot be written.
pub fn execute(args: CatArgs) -> anyhow::Result<()> {
    let package = super::load_package(&args.file)?;
    let content = match &args.root {
        Some(root) => content_of(&package, &args.path, &DirectoryStore::open(root))?,
        None => content_of(&package, &args.path, &PackageStore::new(&package))?,
    };
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&content)?;
    stdout.flush()?;
    Ok(())
}

/// Resolves `path` through the descriptor, then fetches the stored bytes
/// from `store`.
fn content_of(package: &Package, path: &str, store: &dyn ContentStore) -> anyhow::Result<Vec<u8>> {
    let input = package
        .descriptor
        .input(path)
        .with_context(|| format!("{path} is not an input of {}", package.descriptor.target))?;
    Ok(store.lookup(input.info.path.as_str(), &input.info.digest)?)
}
