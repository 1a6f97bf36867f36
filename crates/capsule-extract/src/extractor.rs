//! Extraction engine that turns one compilation request into a package.

use std::path::Path;

use capsule_common::config::ExtractorConfig;
use capsule_common::error::Result;
use capsule_pack::unit::Package;

use crate::classify::{self, Classifier};
use crate::driver::{self, Driver};
use crate::frontend::FrontEnd;
use crate::frontend::processor::{ProcessorLoader, ProcessorRegistry};
use crate::request::CompilationRequest;
use crate::results::AnalysisResults;
use crate::uri::try_make_relative;
use crate::{assemble, on_demand, unused};

/// The extraction engine.
///
/// Runs every stage in order (driver, on-demand resolution, classification,
/// unused-dependency detection, assembly) over one exclusively owned
/// [`AnalysisResults`]. A failing stage aborts the run; no partial package
/// is ever returned.
pub struct Extractor {
    config: ExtractorConfig,
    loader: Box<dyn ProcessorLoader>,
}

impl std::fmt::Debug for Extractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extractor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Extractor {
    /// Creates an engine that knows no processors.
    #[must_use]
    pub fn new(config: ExtractorConfig) -> Self {
        Self::with_loader(config, Box::new(ProcessorRegistry::new()))
    }

    /// Creates an engine loading processors through `loader`.
    #[must_use]
    pub fn with_loader(config: ExtractorConfig, loader: Box<dyn ProcessorLoader>) -> Self {
        Self { config, loader }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extracts the package for `request` by driving `frontend`.
    ///
    /// # Errors
    ///
    /// Returns `CapsuleError::Scratch` (retryable) if the scratch directory
    /// cannot be created, and a non-retryable extraction error naming the
    /// failed phase otherwise.
    pub fn extract<F: FrontEnd + ?Sized>(
        &self,
        frontend: &mut F,
        request: &CompilationRequest,
    ) -> Result<Package> {
        tracing::info!(target = %request.target, "starting extraction");
        let root = &self.config.root_directory;

        let outcome = Driver::new(&self.config, self.loader.as_ref()).run(frontend, request)?;

        let mut results = AnalysisResults::new();
        results.has_compile_errors = driver::log_errors(&outcome.diagnostics);
        results.explicit_sources = request
            .sources
            .iter()
            .map(|source| try_make_relative(root, Path::new(source)))
            .collect();

        let classifier = Classifier::new(&self.config);
        classifier.add_package_roots(&outcome.units, &mut results);

        let forced = on_demand::resolve(frontend, &outcome.units, &self.config.implicit_imports)?;
        tracing::debug!(forced, "wildcard imports resolved");

        let basenames = classify::declared_basenames(&outcome.symbol_origins, &self.config)?;
        let usages = frontend.usages();
        for file in &usages {
            classifier.classify(frontend, file, &basenames, &mut results)?;
        }

        if self.config.track_unused_dependencies {
            results.unused_dependencies = unused::detect(&self.config, &request.classpath, &usages);
        }

        let package = assemble::assemble(request, results, &self.config);
        tracing::info!(
            target = %request.target,
            inputs = package.files.len(),
            bytes = package.content_bytes(),
            has_compile_errors = package.descriptor.has_compile_errors,
            "extraction complete"
        );
        Ok(package)
    }
}

#[cfg(test)]
mod tests {
    use capsule_common::error::Phase;
    use capsule_common::types::FileKind;

    use super::*;
    use crate::frontend::trace::{Trace, TraceFile, TraceFrontEnd};
    use crate::frontend::{Diagnostic, Location, Severity};

    fn request() -> CompilationRequest {
        CompilationRequest::builder("//acme:main")
            .source("/repo/src/com/acme/Main.java")
            .output_path("/repo/out/main.jar")
            .build()
            .expect("request")
    }

    fn main_source() -> TraceFile {
        TraceFile {
            uri: "file:/repo/src/com/acme/Main.java".into(),
            kind: FileKind::Source,
            location: Some(Location::SourcePath),
            binary_name: Some("com.acme.Main".into()),
            opened: true,
            content: Some("package com.acme; class Main {}".into()),
        }
    }

    #[test]
    fn error_diagnostics_do_not_abort() {
        let mut frontend = TraceFrontEnd::new(Trace {
            files: vec![main_source()],
            diagnostics: vec![Diagnostic {
                severity: Severity::Error,
                source: Some("/repo/src/com/acme/Main.java".into()),
                line: Some(1),
                message: "cannot find symbol".into(),
            }],
            ..Trace::default()
        });
        let extractor = Extractor::new(ExtractorConfig::with_root("/repo"));
        let package = extractor.extract(&mut frontend, &request()).expect("extract");
        assert!(package.descriptor.has_compile_errors);
        assert_eq!(package.files.len(), 1);
        assert_eq!(package.descriptor.source_files, vec!["src/com/acme/Main.java"]);
        assert_eq!(package.descriptor.output_key, "out/main.jar");
    }

    #[test]
    fn unused_dependencies_are_none_unless_tracked() {
        let mut frontend = TraceFrontEnd::new(Trace {
            files: vec![main_source()],
            ..Trace::default()
        });
        let extractor = Extractor::new(ExtractorConfig::with_root("/repo"));
        let package = extractor.extract(&mut frontend, &request()).expect("extract");
        assert_eq!(package.descriptor.unused_dependencies, None);
    }

    #[test]
    fn classification_failure_names_phase() {
        let mut frontend = TraceFrontEnd::new(Trace {
            files: vec![TraceFile {
                uri: "/repo/build/Orphan.class".into(),
                kind: FileKind::Class,
                location: None,
                binary_name: None,
                opened: true,
                content: Some(String::new().into()),
            }],
            ..Trace::default()
        });
        let extractor = Extractor::new(ExtractorConfig::with_root("/repo"));
        let err = extractor.extract(&mut frontend, &request()).unwrap_err();
        assert_eq!(err.phase(), Some(Phase::Classify));
        assert!(err.to_string().contains("build/Orphan.class"));
    }
}
