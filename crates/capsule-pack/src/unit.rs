//! Replay package data model.
//!
//! A [`Package`] is one [`CompilationDescriptor`] plus the content of every
//! required input. It is assembled once per extraction and never mutated
//! afterwards.

use capsule_common::error::Result;
use capsule_common::types::{Digest, TargetId, VirtualPath};
use serde::{Deserialize, Serialize};

/// Stored path and content digest of one input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileInfo {
    /// Virtual path the content is stored under.
    pub path: VirtualPath,
    /// SHA-256 digest of the content.
    pub digest: Digest,
}

/// One required input of a compilation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileInput {
    /// Where the content is stored in the package.
    pub info: FileInfo,
    /// Path the replayed compilation refers to the input by. Differs from
    /// `info.path` only when a source file's basename was corrected.
    pub path: VirtualPath,
    /// Original location relative to the extraction root, including the
    /// `archive!member` form for archive members.
    pub relative_path: String,
}

/// Immutable description of one compilation unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilationDescriptor {
    /// Build target the compilation belongs to.
    pub target: TargetId,
    /// Language of the compilation.
    pub language: String,
    /// Replay arguments: original options without output directories,
    /// followed by the minimized search paths.
    pub arguments: Vec<String>,
    /// Required inputs in canonical order.
    pub required_inputs: Vec<FileInput>,
    /// Explicit source files, including generated ones.
    pub source_files: Vec<String>,
    /// Output location, relative to the extraction root when possible.
    pub output_key: String,
    /// Whether the front-end reported error diagnostics.
    pub has_compile_errors: bool,
    /// Declared archive dependencies no input came from; `None` when not
    /// tracked or unknown.
    pub unused_dependencies: Option<Vec<String>>,
}

impl CompilationDescriptor {
    /// Returns the required input stored under `path`, if any.
    #[must_use]
    pub fn input(&self, path: &str) -> Option<&FileInput> {
        self.required_inputs
            .iter()
            .find(|input| input.path.as_str() == path || input.info.path.as_str() == path)
    }
}

/// Content of one required input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Stored path and digest.
    pub info: FileInfo,
    /// Raw bytes.
    pub content: Vec<u8>,
}

impl FileRecord {
    /// Creates a record, digesting `content`.
    #[must_use]
    pub fn new(path: VirtualPath, content: Vec<u8>) -> Self {
        let digest = crate::hash::digest_bytes(&content);
        Self {
            info: FileInfo { path, digest },
            content,
        }
    }
}

/// A descriptor together with the content of its inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    /// The compilation descriptor.
    pub descriptor: CompilationDescriptor,
    /// Input content, in the descriptor's input order.
    pub files: Vec<FileRecord>,
}

impl Package {
    /// Returns the record stored under `path`.
    #[must_use]
    pub fn file(&self, path: &str) -> Option<&FileRecord> {
        self.files.iter().find(|f| f.info.path.as_str() == path)
    }

    /// Total size of all embedded content in bytes.
    #[must_use]
    pub fn content_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.content.len() as u64).sum()
    }

    /// Re-digests every record and checks it against its recorded digest.
    ///
    /// # Errors
    ///
    /// Returns `CapsuleError::HashMismatch` for the first corrupted record.
    pub fn verify(&self) -> Result<()> {
        for file in &self.files {
            crate::hash::validate(file.info.path.as_str(), &file.content, &file.info.digest)?;
        }
        tracing::debug!(files = self.files.len(), "package content verified");
        Ok(())
    }
}
