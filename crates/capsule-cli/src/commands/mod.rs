//! CLI command definitions and dispatch.

pub mod cat;
pub mod export;
pub mod extract;
pub mod inspect;
pub mod ls;

use std::path::Path;

use anyhow::Context;
use capsule_pack::unit::Package;
use clap::{Parser, Subcommand};

/// Capsule — capture one compilation for offline replay.
#[derive(Parser, Debug)]
#[command(name = "capsule", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a recorded compilation and write its replay package.
    Extract(extract::ExtractArgs),
    /// Show the compilation descriptor of a package.
    Inspect(inspect::InspectArgs),
    /// List a directory of a package's input tree.
    Ls(ls::LsArgs),
    /// Print the content of one package input.
    Cat(cat::CatArgs),
    /// Write a package as a tar archive.
    Export(export::ExportArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Extract(args) => extract::execute(args),
        Command::Inspect(args) => inspect::execute(args),
        Command::Ls(args) => ls::execute(args),
        Command::Cat(args) => cat::execute(args),
        Command::Export(args) => export::execute(args),
    }
}

/// Reads a package file, naming it in the error.
fn load_package(path: &Path) -> anyhow::Result<Package> {
    capsule_pack::codec::read_from_file(path)
        .with_context(|| format!("failed to read package {}", path.display()))
}
