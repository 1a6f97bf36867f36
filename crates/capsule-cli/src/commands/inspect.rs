//! `capsule inspect` — Show the compilation descriptor of a package.

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::Context;
use capsule_pack::unit::CompilationDescriptor;
use clap::Args;

use crate::output::short_digest;

/// Arguments for the `inspect` command.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Package file to inspect.
    pub file: PathBuf,

    /// Print the descriptor as JSON.
    #[arg(long)]
    pub json: bool,

    /// Re-digest every embedded input before printing.
    #[arg(long)]
    pub verify: bool,
}

/// Executes the `inspect` command.
///
/// # Errors
///
/// Returns an error if the package cannot be read or fails verification.
pub fn execute(args: InspectArgs) -> anyhow::Result<()> {
    let package = super::load_package(&args.file)?;
    if args.verify {
        package
            .verify()
            .with_context(|| format!("package {} is corrupted", args.file.display()))?;
        tracing::info!(files = package.files.len(), "package verified");
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&package.descriptor)?);
    } else {
        print!("{}", render(&package.descriptor));
    }
    Ok(())
}

/// Renders a descriptor as human-readable text.
fn render(descriptor: &CompilationDescriptor) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "TARGET\t{}", descriptor.target);
    let _ = writeln!(out, "LANGUAGE\t{}", descriptor.language);
    let _ = writeln!(out, "OUTPUT\t{}", descriptor.output_key);
    let _ = writeln!(out, "ERRORS\t{}", descriptor.has_compile_errors);
    let _ = writeln!(out, "ARGUMENTS\t{}", descriptor.arguments.join(" "));

    let _ = writeln!(out, "\nSOURCES");
    for source in &descriptor.source_files {
        let _ = writeln!(out, "  {source}");
    }

    let _ = writeln!(out, "\nPATH\tDIGEST\tORIGIN");
    for input in &descriptor.required_inputs {
        let _ = write!(
            out,
            "{}\t{}\t{}",
            input.info.path,
            short_digest(&input.info.digest),
            input.relative_path
        );
        if input.path != input.info.path {
            let _ = write!(out, "\t(as {})", input.path);
        }
        out.push('\n');
    }

    if let Some(unused) = &descriptor.unused_dependencies {
        let _ = writeln!(out, "\nUNUSED");
        for archive in unused {
            let _ = writeln!(out, "  {archive}");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::write_sample_package;

    #[test]
    fn render_lists_inputs_and_unused() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_sample_package(dir.path());
        let package = capsule_pack::codec::read_from_file(&path).expect("read");

        let text = render(&package.descriptor);
        assert!(text.starts_with("TARGET\t//acme:main\n"));
        assert!(text.contains("ARGUMENTS\t-sourcepath src -cp !jar!"));
        assert!(text.contains("!jar!/com/acme/Widget.class\t"));
        assert!(text.contains("\nUNUSED\n  lib/unused.jar\n"));
        assert!(!text.contains("(as "));
    }

    #[test]
    fn verify_passes_on_intact_package() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = write_sample_package(dir.path());
        let args = InspectArgs {
            file,
            json: true,
            verify: true,
        };
        assert!(execute(args).is_ok());
    }

    #[test]
    fn missing_package_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let args = InspectArgs {
            file: dir.path().join("absent.kindex"),
            json: false,
            verify: false,
        };
        let err = execute(args).unwrap_err();
        assert!(format!("{err:#}").contains("absent.kindex"));
    }
}
