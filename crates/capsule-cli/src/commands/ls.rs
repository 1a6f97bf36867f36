//! `capsule ls` — List a directory of a package's input tree.

use std::path::PathBuf;

use anyhow::Context;
use capsule_common::constants::DIRECTORY_DIGEST;
use capsule_pack::tree::FileTree;
use clap::Args;

use crate::output::SHORT_DIGEST_LEN;

/// Arguments for the `ls` command.
#[derive(Args, Debug)]
pub struct LsArgs {
    /// Package file to list.
    pub file: PathBuf,

    /// Directory to list; the tree root when omitted.
    pub dir: Option<String>,
}

/// Executes the `ls` command.
///
/// # Errors
///
/// Returns an error if the package cannot be read or the directory does not
/// exist in its input tree.
pub fn execute(args: LsArgs) -> anyhow::Result<()> {
    let package = super::load_package(&args.file)?;
    let tree = FileTree::build(&package.descriptor.required_inputs)
        .context("package inputs do not form a consistent tree")?;
    let dir = args.dir.as_deref().unwrap_or("").trim_end_matches('/');
    for line in listing(&tree, dir)? {
        println!("{line}");
    }
    Ok(())
}

/// One line per entry: directories with a trailing `/`, files with a digest
/// prefix.
fn listing(tree: &FileTree, dir: &str) -> anyhow::Result<Vec<String>> {
    let entries = tree
        .list(dir)
        .with_context(|| format!("no such directory in package: {dir:?}"))?;
    Ok(entries
        .iter()
        .map(|(name, digest)| {
            if digest == DIRECTORY_DIGEST {
                format!("{name}/")
            } else {
                let prefix = digest.get(..SHORT_DIGEST_LEN).unwrap_or(digest);
                format!("{prefix}  {name}")
            }
        })
        .collect())
}
