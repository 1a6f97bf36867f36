//! Compilation requests and their fluent builder.

use std::path::Path;

use capsule_common::error::{CapsuleError, Result};
use capsule_common::types::TargetId;
use serde::{Deserialize, Serialize};

/// Everything needed to reproduce one compilation. Immutable once built.
///
/// Every field is required when deserializing; a missing field is a
/// contract violation of the caller, not a condition to recover from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilationRequest {
    /// Build target the compilation belongs to.
    pub target: TargetId,
    /// Explicit source files.
    pub sources: Vec<String>,
    /// Class search path entries.
    pub classpath: Vec<String>,
    /// Source search path entries.
    pub sourcepath: Vec<String>,
    /// Entries processors are loaded from.
    pub processorpath: Vec<String>,
    /// Qualified names of the processors to run.
    pub processors: Vec<String>,
    /// Compiler options.
    pub options: Vec<String>,
    /// Declared output location.
    pub output_path: String,
}

impl CompilationRequest {
    /// Starts a builder for the given target.
    #[must_use]
    pub fn builder(target: impl Into<String>) -> CompilationRequestBuilder {
        CompilationRequestBuilder::new().target(target)
    }

    /// Loads a request from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a field is missing.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CapsuleError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let request: Self = serde_json::from_str(&content)?;
        tracing::debug!(
            target = %request.target,
            sources = request.sources.len(),
            "loaded compilation request"
        );
        Ok(request)
    }
}

/// Builder for a [`CompilationRequest`].
#[derive(Debug, Default)]
pub struct CompilationRequestBuilder {
    target: Option<String>,
    sources: Vec<String>,
    classpath: Vec<String>,
    sourcepath: Vec<String>,
    processorpath: Vec<String>,
    processors: Vec<String>,
    options: Vec<String>,
    output_path: Option<String>,
}

impl CompilationRequestBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the target identifier.
    #[must_use]
    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Adds an explicit source file.
    #[must_use]
    pub fn source(mut self, path: impl Into<String>) -> Self {
        self.sources.push(path.into());
        self
    }

    /// Adds a class search path entry.
    #[must_use]
    pub fn classpath(mut self, entry: impl Into<String>) -> Self {
        self.classpath.push(entry.into());
        self
    }

    /// Adds a source search path entry.
    #[must_use]
    pub fn sourcepath(mut self, entry: impl Into<String>) -> Self {
        self.sourcepath.push(entry.into());
        self
    }

    /// Adds a processor path entry.
    #[must_use]
    pub fn processorpath(mut self, entry: impl Into<String>) -> Self {
        self.processorpath.push(entry.into());
        self
    }

    /// Adds a processor to run.
    #[must_use]
    pub fn processor(mut self, name: impl Into<String>) -> Self {
        self.processors.push(name.into());
        self
    }

    /// Appends compiler options.
    #[must_use]
    pub fn options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.extend(options.into_iter().map(Into::into));
        self
    }

    /// Sets the declared output location.
    #[must_use]
    pub fn output_path(mut self, path: impl Into<String>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    /// Builds the request.
    ///
    /// # Errors
    ///
    /// Returns an error if the target or the output path is missing.
    pub fn build(self) -> Result<CompilationRequest> {
        let target = self.target.ok_or_else(|| CapsuleError::Config {
            message: "target is required".to_string(),
        })?;
        let output_path = self.output_path.ok_or_else(|| CapsuleError::Config {
            message: "output path is required".to_string(),
        })?;
        Ok(CompilationRequest {
            target: TargetId::new(target),
            sources: self.sources,
            classpath: self.classpath,
            sourcepath: self.sourcepath,
            processorpath: self.processorpath,
            processors: self.processors,
            options: self.options,
            output_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_all_fields() {
        let request = CompilationRequest::builder("//acme:lib")
            .source("src/com/acme/Main.java")
            .classpath("lib/guava.jar")
            .sourcepath("src")
            .processorpath("lib/proc.jar")
            .processor("com.acme.Proc")
            .options(["-g", "-Xlint"])
            .output_path("out/lib.jar")
            .build()
            .expect("build");
        assert_eq!(request.target.as_str(), "//acme:lib");
        assert_eq!(request.sources, vec!["src/com/acme/Main.java"]);
        assert_eq!(request.classpath, vec!["lib/guava.jar"]);
        assert_eq!(request.options, vec!["-g", "-Xlint"]);
        assert_eq!(request.output_path, "out/lib.jar");
    }

    #[test]
    fn builder_requires_target_and_output() {
        assert!(CompilationRequestBuilder::new().output_path("o").build().is_err());
        assert!(CompilationRequest::builder("//t").build().is_err());
    }

    #[test]
    fn deserialize_rejects_missing_field() {
        let json = r#"{
            "target": "//t", "sources": [], "classpath": [], "sourcepath": [],
            "processorpath": [], "processors": [], "options": []
        }"#;
        let result: std::result::Result<CompilationRequest, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn load_reads_json_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("request.json");
        let request = CompilationRequest::builder("//t")
            .source("A.java")
            .output_path("out")
            .build()
            .expect("build");
        std::fs::write(&path, serde_json::to_string(&request).expect("json")).expect("write");
        assert_eq!(CompilationRequest::load(&path).expect("load"), request);
    }
}
