//! `capsule extract` — Run a recorded compilation and write its package.

use std::path::PathBuf;

use anyhow::Context;
use capsule_common::config::ExtractorConfig;
use capsule_extract::frontend::processor::ProcessorRegistry;
use capsule_extract::frontend::trace::{Trace, TraceFrontEnd};
use capsule_extract::{CompilationRequest, Extractor};
use clap::Args;

use crate::output::format_bytes;

/// Arguments for the `extract` command.
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Compilation request (JSON).
    #[arg(long)]
    pub request: PathBuf,

    /// Recorded front-end run (JSON).
    #[arg(long)]
    pub trace: PathBuf,

    /// Package file to write.
    #[arg(short, long)]
    pub output: PathBuf,

    /// Extractor configuration (JSON); absent fields keep their defaults.
    #[arg(long, env = "CAPSULE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory disk paths are made relative to.
    #[arg(long, env = "CAPSULE_ROOT_DIRECTORY")]
    pub root_directory: Option<PathBuf>,

    /// Platform standard library location; its files are never embedded.
    #[arg(long, env = "CAPSULE_PLATFORM_ROOT")]
    pub platform_root: Option<PathBuf>,

    /// Record declared archives that no input was read from.
    #[arg(long)]
    pub track_unused: bool,
}

impl ExtractArgs {
    /// Builds the configuration: file (or defaults), then flag overrides.
    fn config(&self) -> anyhow::Result<ExtractorConfig> {
        let mut config = match &self.config {
            Some(path) => ExtractorConfig::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => ExtractorConfig::default(),
        };
        if let Some(root) = &self.root_directory {
            config.root_directory.clone_from(root);
        }
        if let Some(platform) = &self.platform_root {
            config.platform_root = Some(platform.clone());
        }
        if self.track_unused {
            config.track_unused_dependencies = true;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Executes the `extract` command.
///
/// # Errors
///
/// Returns an error if an input cannot be loaded, extraction fails, or the
/// package cannot be written.
pub fn execute(args: ExtractArgs) -> anyhow::Result<()> {
    let config = args.config()?;
    let request = CompilationRequest::load(&args.request)
        .with_context(|| format!("failed to load request {}", args.request.display()))?;
    let trace = Trace::load(&args.trace)
        .with_context(|| format!("failed to load trace {}", args.trace.display()))?;

    tracing::info!(
        target = %request.target,
        root = %config.root_directory.display(),
        "extracting compilation"
    );

    let registry = ProcessorRegistry::from_names(trace.processors.iter().cloned());
    let extractor = Extractor::with_loader(config, Box::new(registry));
    let mut frontend = TraceFrontEnd::new(trace);

    let package = match extractor.extract(&mut frontend, &request) {
        Ok(package) => package,
        Err(e) => {
            if e.is_retryable() {
                tracing::warn!("extraction failed on a transient condition; retrying may succeed");
            }
            return Err(anyhow::Error::new(e).context(format!("extraction of {} failed", request.target)));
        }
    };

    capsule_pack::codec::write_to_file(&package, &args.output)
        .with_context(|| format!("failed to write package {}", args.output.display()))?;

    if package.descriptor.has_compile_errors {
        tracing::warn!(target = %request.target, "compilation reported errors");
    }
    println!(
        "{}: {} inputs, {} -> {}",
        package.descriptor.target,
        package.files.len(),
        format_bytes(package.content_bytes()),
        args.output.display()
    );
    Ok(())
}
