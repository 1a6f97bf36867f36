//! Front-end replaying a recorded trace.
//!
//! A [`Trace`] is a JSON record of what a compiler saw during one run: the
//! files visible on each search path, which of them compilation opened, the
//! parsed units, diagnostics, and symbol origins. [`TraceFrontEnd`] serves
//! that record through the [`FrontEnd`] contract. Files without inline
//! content are read from disk, archive members out of their zip archive.

use std::collections::BTreeSet;
use std::io::Read;
use std::path::{Path, PathBuf};

use capsule_common::error::{CapsuleError, Result};
use capsule_common::types::FileKind;
use serde::{Deserialize, Serialize};

use super::{
    CompileOutcome, Diagnostic, FrontEnd, FrontEndAbort, Invocation, Location, ParsedUnit,
    SymbolOrigin, TouchedFile,
};
use crate::uri::{self, Origin};

/// One file visible to the recorded front-end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceFile {
    /// Origin URI.
    pub uri: String,
    /// Source or class.
    pub kind: FileKind,
    /// Search path the file is resolvable through.
    #[serde(default)]
    pub location: Option<Location>,
    /// Binary name of the file's primary type.
    #[serde(default)]
    pub binary_name: Option<String>,
    /// Whether compilation opened the file.
    #[serde(default)]
    pub opened: bool,
    /// Inline content; read from disk or the archive when absent.
    #[serde(default)]
    pub content: Option<InlineContent>,
}

/// Content recorded inline in a trace: text, or raw bytes as a JSON array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InlineContent {
    /// UTF-8 text such as a source file.
    Text(String),
    /// Arbitrary bytes such as a class file.
    Bytes(Vec<u8>),
}

impl InlineContent {
    /// Returns the content as bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(text) => text.as_bytes(),
            Self::Bytes(bytes) => bytes,
        }
    }
}

impl From<String> for InlineContent {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for InlineContent {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Vec<u8>> for InlineContent {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

/// Reads `member` (with its leading `/`) out of the zip archive at `archive`.
fn read_archive_member(archive: &Path, member: &str) -> std::io::Result<Vec<u8>> {
    let file = std::fs::File::open(archive)?;
    let mut zip = zip::ZipArchive::new(file).map_err(std::io::Error::other)?;
    let name = member.trim_start_matches('/');
    let mut entry = zip.by_name(name).map_err(|e| match e {
        zip::result::ZipError::FileNotFound => std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{name} not found in {}", archive.display()),
        ),
        other => std::io::Error::other(other),
    })?;
    let mut content = Vec::new();
    let _ = entry.read_to_end(&mut content)?;
    Ok(content)
}

impl TraceFile {
    fn touched(&self) -> TouchedFile {
        TouchedFile::new(self.uri.clone(), self.kind)
    }

    fn package(&self) -> Option<&str> {
        self.binary_name
            .as_deref()
            .map(|name| name.rsplit_once('.').map_or("", |(package, _)| package))
    }
}

/// Recorded front-end run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Trace {
    /// Files visible on the search paths.
    pub files: Vec<TraceFile>,
    /// Parsed compilation units.
    pub units: Vec<ParsedUnit>,
    /// Reported diagnostics.
    pub diagnostics: Vec<Diagnostic>,
    /// Declaring source files of loaded symbols.
    pub symbol_origins: Vec<SymbolOrigin>,
    /// Processors available on the processor path.
    pub processors: Vec<String>,
    /// Structural failure the run ended with.
    pub abort: Option<String>,
}

impl Trace {
    /// Loads a trace from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CapsuleError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let trace: Self = serde_json::from_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            files = trace.files.len(),
            units = trace.units.len(),
            "loaded front-end trace"
        );
        Ok(trace)
    }
}

/// [`FrontEnd`] serving a [`Trace`].
#[derive(Debug)]
pub struct TraceFrontEnd {
    trace: Trace,
    usages: Vec<TouchedFile>,
    seen: BTreeSet<TouchedFile>,
    last_options: Vec<String>,
    last_processors: Vec<String>,
    last_scratch_dir: Option<PathBuf>,
}

impl TraceFrontEnd {
    /// Creates a front-end over `trace`.
    #[must_use]
    pub const fn new(trace: Trace) -> Self {
        Self {
            trace,
            usages: Vec::new(),
            seen: BTreeSet::new(),
            last_options: Vec::new(),
            last_processors: Vec::new(),
            last_scratch_dir: None,
        }
    }

    /// Options of the most recent run.
    #[must_use]
    pub fn last_options(&self) -> &[String] {
        &self.last_options
    }

    /// Names of the processors handed to the most recent run.
    #[must_use]
    pub fn last_processors(&self) -> &[String] {
        &self.last_processors
    }

    /// Scratch directory of the most recent run.
    #[must_use]
    pub fn last_scratch_dir(&self) -> Option<&Path> {
        self.last_scratch_dir.as_deref()
    }

    fn record(&mut self, file: TouchedFile) {
        if self.seen.insert(file.clone()) {
            self.usages.push(file);
        }
    }

    fn find(&self, file: &TouchedFile) -> Option<&TraceFile> {
        self.trace
            .files
            .iter()
            .find(|f| f.uri == file.uri && f.kind == file.kind)
    }
}

impl FrontEnd for TraceFrontEnd {
    fn compile(&mut self, invocation: &Invocation) -> std::result::Result<CompileOutcome, FrontEndAbort> {
        self.last_options.clone_from(&invocation.options);
        self.last_processors = invocation
            .processors
            .iter()
            .map(|p| p.name().to_string())
            .collect();
        self.last_scratch_dir = Some(invocation.scratch_dir.clone());

        if let Some(message) = &self.trace.abort {
            return Err(FrontEndAbort {
                message: message.clone(),
                diagnostics: self.trace.diagnostics.clone(),
            });
        }

        let opened: Vec<TouchedFile> = self
            .trace
            .files
            .iter()
            .filter(|f| f.opened)
            .map(TraceFile::touched)
            .collect();
        for file in opened {
            self.record(file);
        }
        tracing::debug!(opened = self.usages.len(), "trace replayed");

        Ok(CompileOutcome {
            diagnostics: self.trace.diagnostics.clone(),
            units: self.trace.units.clone(),
            symbol_origins: self.trace.symbol_origins.clone(),
        })
    }

    fn usages(&self) -> Vec<TouchedFile> {
        self.usages.clone()
    }

    fn list(&self, location: Location, package: &str, kind: FileKind) -> Vec<TouchedFile> {
        self.trace
            .files
            .iter()
            .filter(|f| f.location == Some(location) && f.kind == kind)
            .filter(|f| f.package() == Some(package))
            .map(TraceFile::touched)
            .collect()
    }

    fn open(&mut self, file: &TouchedFile) -> std::io::Result<Vec<u8>> {
        let content = self.read(file)?;
        self.record(file.clone());
        Ok(content)
    }

    fn read(&self, file: &TouchedFile) -> std::io::Result<Vec<u8>> {
        if let Some(content) = self.find(file).and_then(|f| f.content.as_ref()) {
            return Ok(content.as_bytes().to_vec());
        }
        match uri::parse(&file.uri) {
            Ok(Origin::Disk(path)) => std::fs::read(path),
            Ok(Origin::Archive { archive, member }) => read_archive_member(&archive, &member),
            Err(e) => Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())),
        }
    }

    fn infer_binary_name(&self, location: Location, file: &TouchedFile) -> Option<String> {
        self.find(file)
            .filter(|f| f.location == Some(location))
            .and_then(|f| f.binary_name.clone())
    }
}
