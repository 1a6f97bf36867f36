//! Front-end driver.
//!
//! Prepares the complete option list, loads processors, and runs the
//! front-end with its class output redirected to an invocation-local
//! scratch directory. The directory is removed on every exit path.

use std::path::Path;

use capsule_common::config::ExtractorConfig;
use capsule_common::constants::{
    CLASSPATH_FLAG, ENCODING_FLAG, OUTPUT_DIR_FLAG, SCRATCH_DIR_PREFIX, SEARCH_PATH_SEPARATOR,
    SOURCEPATH_FLAG,
};
use capsule_common::error::{CapsuleError, Phase, Result};

use crate::frontend::processor::{Processor, ProcessorLoader, is_qualified_name};
use crate::frontend::{CompileOutcome, Diagnostic, FrontEnd, Invocation};
use crate::request::CompilationRequest;

/// Runs a front-end for one request.
pub struct Driver<'a> {
    config: &'a ExtractorConfig,
    loader: &'a dyn ProcessorLoader,
}

impl std::fmt::Debug for Driver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Driver").field("config", &self.config).finish_non_exhaustive()
    }
}

impl<'a> Driver<'a> {
    /// Creates a driver loading processors through `loader`.
    #[must_use]
    pub fn new(config: &'a ExtractorConfig, loader: &'a dyn ProcessorLoader) -> Self {
        Self { config, loader }
    }

    /// Returns the options the front-end runs with: the request options, a
    /// default encoding when none is given, the declared search paths, and
    /// `scratch` as the only output directory.
    #[must_use]
    pub fn complete_options(&self, request: &CompilationRequest, scratch: &Path) -> Vec<String> {
        let mut options = request.options.clone();
        if !options.iter().any(|o| o == ENCODING_FLAG) {
            options.push(ENCODING_FLAG.to_string());
            options.push(self.config.default_encoding.clone());
        }

        let classpath = request.classpath.join(SEARCH_PATH_SEPARATOR);
        if !classpath.is_empty() {
            options.push(CLASSPATH_FLAG.to_string());
            options.push(classpath);
        }
        let sourcepath = request.sourcepath.join(SEARCH_PATH_SEPARATOR);
        if !sourcepath.is_empty() {
            options.push(SOURCEPATH_FLAG.to_string());
            options.push(sourcepath);
        }

        let mut completed = Vec::with_capacity(options.len() + 2);
        let mut iter = options.into_iter();
        while let Some(option) = iter.next() {
            if option == OUTPUT_DIR_FLAG {
                let _ = iter.next();
                continue;
            }
            completed.push(option);
        }
        completed.push(OUTPUT_DIR_FLAG.to_string());
        completed.push(scratch.display().to_string());
        completed
    }

    /// Loads the processors named in the request.
    ///
    /// # Errors
    ///
    /// Returns a driver-phase error for an empty processor path entry, a
    /// malformed processor name, or a processor the loader cannot provide.
    pub fn load_processors(&self, request: &CompilationRequest) -> Result<Vec<Box<dyn Processor>>> {
        if request.processors.is_empty() {
            return Ok(Vec::new());
        }
        if request.processorpath.iter().any(String::is_empty) {
            return Err(CapsuleError::extraction(
                Phase::Driver,
                "processorpath",
                "malformed processor specification: empty processor path entry",
            ));
        }
        request
            .processors
            .iter()
            .map(|name| {
                if !is_qualified_name(name) {
                    return Err(CapsuleError::extraction(
                        Phase::Driver,
                        name.as_str(),
                        "malformed processor specification: not a qualified name",
                    ));
                }
                self.loader.load(&request.processorpath, name).map_err(|e| {
                    CapsuleError::extraction(
                        Phase::Driver,
                        name.as_str(),
                        format!("malformed processor specification: {e}"),
                    )
                })
            })
            .collect()
    }

    /// Runs the front-end through analysis and code generation.
    ///
    /// # Errors
    ///
    /// Returns `CapsuleError::Scratch` if the scratch directory cannot be
    /// created, a driver-phase error for bad processors, and a front-end
    /// phase error if the front-end aborts.
    pub fn run<F: FrontEnd + ?Sized>(
        &self,
        frontend: &mut F,
        request: &CompilationRequest,
    ) -> Result<CompileOutcome> {
        let scratch = tempfile::Builder::new()
            .prefix(SCRATCH_DIR_PREFIX)
            .tempdir()
            .map_err(|e| CapsuleError::Scratch { source: e })?;
        tracing::debug!(scratch = %scratch.path().display(), "scratch directory created");

        let invocation = Invocation {
            sources: request.sources.clone(),
            options: self.complete_options(request, scratch.path()),
            processors: self.load_processors(request)?,
            scratch_dir: scratch.path().to_path_buf(),
        };
        tracing::info!(
            target = %request.target,
            sources = invocation.sources.len(),
            processors = invocation.processors.len(),
            "running front-end"
        );
        let result = frontend.compile(&invocation);

        let scratch_path = scratch.path().to_path_buf();
        if let Err(e) = scratch.close() {
            tracing::error!(
                path = %scratch_path.display(),
                error = %e,
                "failed to delete scratch directory"
            );
        }

        result.map_err(|abort| {
            let _ = log_errors(&abort.diagnostics);
            CapsuleError::extraction(Phase::FrontEnd, request.target.as_str(), abort.message)
        })
    }
}

/// Logs every error diagnostic. Returns whether there was one.
pub fn log_errors(diagnostics: &[Diagnostic]) -> bool {
    let mut found = false;
    for diagnostic in diagnostics.iter().filter(|d| d.is_error()) {
        found = true;
        match (&diagnostic.source, diagnostic.line) {
            (Some(source), Some(line)) => {
                tracing::error!(source = %source, line, "compiler error: {}", diagnostic.message);
            }
            (Some(source), None) => {
                tracing::error!(source = %source, "compiler error: {}", diagnostic.message);
            }
            _ => tracing::error!("compiler error: {}", diagnostic.message),
        }
    }
    found
}
