//! Front-end contract.
//!
//! The engine never parses code itself. It drives a [`FrontEnd`] through
//! analysis and code generation and then asks it which files it opened,
//! what it parsed, and how it would name a class file on a given search path.

pub mod processor;
pub mod trace;

use std::fmt;
use std::path::PathBuf;

use capsule_common::types::FileKind;
use serde::{Deserialize, Serialize};

use self::processor::Processor;

/// Search path context a file can be resolved through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    /// Class output directory of the compilation.
    ClassOutput,
    /// Declared class search path.
    ClassPath,
    /// Declared source search path.
    SourcePath,
    /// Platform standard library.
    PlatformClassPath,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClassOutput => write!(f, "class_output"),
            Self::ClassPath => write!(f, "class_path"),
            Self::SourcePath => write!(f, "source_path"),
            Self::PlatformClassPath => write!(f, "platform_class_path"),
        }
    }
}

/// One file the front-end opened.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TouchedFile {
    /// Origin URI as reported by the front-end.
    pub uri: String,
    /// Source or class.
    pub kind: FileKind,
}

impl TouchedFile {
    /// Creates a touched file.
    #[must_use]
    pub fn new(uri: impl Into<String>, kind: FileKind) -> Self {
        Self {
            uri: uri.into(),
            kind,
        }
    }
}

/// Severity of a front-end diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Compilation error.
    Error,
    /// Warning.
    Warning,
    /// Informational note.
    Note,
}

/// A message reported by the front-end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity level.
    pub severity: Severity,
    /// File the diagnostic refers to.
    #[serde(default)]
    pub source: Option<String>,
    /// Line number within `source`.
    #[serde(default)]
    pub line: Option<u64>,
    /// Message text.
    pub message: String,
}

impl Diagnostic {
    /// Returns whether this is an error.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// An import directive of a parsed compilation unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Import {
    /// Qualified name as written, e.g. `com.acme.*`.
    pub name: String,
    /// Whether this is a static import.
    #[serde(default)]
    pub is_static: bool,
}

impl Import {
    /// Returns the imported package of a non-static wildcard import.
    #[must_use]
    pub fn wildcard_package(&self) -> Option<&str> {
        if self.is_static {
            return None;
        }
        self.name.strip_suffix(".*")
    }
}

/// A compilation unit the front-end parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedUnit {
    /// URI of the unit's source file.
    pub source_uri: String,
    /// Declared package, if any.
    #[serde(default)]
    pub package: Option<String>,
    /// Import directives.
    #[serde(default)]
    pub imports: Vec<Import>,
}

/// Links a file a symbol was loaded from to the source file declaring it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolOrigin {
    /// URI of the file the symbol was loaded from.
    pub file_uri: String,
    /// URI of the source file that declares the symbol.
    pub source_uri: String,
}

/// Arguments of one front-end run.
#[derive(Debug)]
pub struct Invocation {
    /// Explicit source files.
    pub sources: Vec<String>,
    /// Complete option list, including search paths and output directory.
    pub options: Vec<String>,
    /// Loaded processors.
    pub processors: Vec<Box<dyn Processor>>,
    /// Invocation-local output directory.
    pub scratch_dir: PathBuf,
}

/// What a completed front-end run reports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileOutcome {
    /// All diagnostics, in report order.
    pub diagnostics: Vec<Diagnostic>,
    /// Parsed compilation units.
    pub units: Vec<ParsedUnit>,
    /// Declaring source files of loaded symbols.
    pub symbol_origins: Vec<SymbolOrigin>,
}

/// The front-end could not proceed at all.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("front-end aborted: {message}")]
pub struct FrontEndAbort {
    /// Reason given by the front-end.
    pub message: String,
    /// Diagnostics collected before the abort.
    pub diagnostics: Vec<Diagnostic>,
}

/// A language front-end instrumented to report the files it opens.
pub trait FrontEnd {
    /// Runs parsing, analysis, and code generation.
    ///
    /// # Errors
    ///
    /// Returns [`FrontEndAbort`] on a structural failure. Error diagnostics
    /// are not failures; they are part of the outcome.
    fn compile(&mut self, invocation: &Invocation) -> Result<CompileOutcome, FrontEndAbort>;

    /// Returns every file opened so far, in first-open order.
    fn usages(&self) -> Vec<TouchedFile>;

    /// Lists the files of `kind` in `package` resolvable through `location`.
    fn list(&self, location: Location, package: &str, kind: FileKind) -> Vec<TouchedFile>;

    /// Reads a file and records it as opened.
    ///
    /// # Errors
    ///
    /// Returns an error if the content cannot be read.
    fn open(&mut self, file: &TouchedFile) -> std::io::Result<Vec<u8>>;

    /// Reads a file without recording it.
    ///
    /// # Errors
    ///
    /// Returns an error if the content cannot be read.
    fn read(&self, file: &TouchedFile) -> std::io::Result<Vec<u8>>;

    /// Returns the binary name of `file` as seen through `location`.
    fn infer_binary_name(&self, location: Location, file: &TouchedFile) -> Option<String>;
}
