//! State collected over one extraction run.

use std::collections::BTreeSet;

use crate::accumulator::ContentAccumulator;

/// Everything the stages of one run learn about the compilation.
///
/// Owned by a single run and handed from stage to stage; root sets are
/// ordered so flattened search paths are reproducible.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AnalysisResults {
    /// Collected input content.
    pub files: ContentAccumulator,
    /// Minimal source search path roots.
    pub source_roots: BTreeSet<String>,
    /// Minimal class search path roots.
    pub class_roots: BTreeSet<String>,
    /// Explicit sources of the request, root-relative.
    pub explicit_sources: Vec<String>,
    /// Generated sources found among the touched files.
    pub generated_sources: BTreeSet<String>,
    /// Whether the front-end reported error diagnostics.
    pub has_compile_errors: bool,
    /// Declared archives no input was read from, when known.
    pub unused_dependencies: Option<Vec<String>>,
}

impl AnalysisResults {
    /// Creates empty results.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}
