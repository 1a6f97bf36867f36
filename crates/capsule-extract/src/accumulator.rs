//! First-write-wins content collection keyed by virtual path.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use capsule_common::error::{CapsuleError, Phase, Result};
use capsule_common::types::VirtualPath;

/// Content and bookkeeping collected for one virtual path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accumulated {
    /// Original location relative to the extraction root.
    pub relative_path: String,
    /// Raw bytes.
    pub content: Vec<u8>,
    /// Basename of the source file declaring the content's symbols.
    pub declared_basename: Option<String>,
}

/// Set of collected inputs; at most one entry per virtual path.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ContentAccumulator {
    entries: BTreeMap<VirtualPath, Accumulated>,
}

impl ContentAccumulator {
    /// Creates an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `path` unless it is already known; `read` is only called for
    /// new paths. Returns whether an entry was added.
    ///
    /// # Errors
    ///
    /// Returns an extraction error for the accumulate phase if `read` fails.
    pub fn accumulate<F>(
        &mut self,
        path: VirtualPath,
        relative_path: String,
        declared_basename: Option<String>,
        read: F,
    ) -> Result<bool>
    where
        F: FnOnce() -> std::io::Result<Vec<u8>>,
    {
        let Entry::Vacant(slot) = self.entries.entry(path) else {
            return Ok(false);
        };
        let content = read().map_err(|e| {
            CapsuleError::extraction(Phase::Accumulate, relative_path.as_str(), e.to_string())
        })?;
        if content.is_empty() {
            tracing::warn!(path = %slot.key(), "input has zero-length content");
        }
        tracing::trace!(path = %slot.key(), bytes = content.len(), "input accumulated");
        let _ = slot.insert(Accumulated {
            relative_path,
            content,
            declared_basename,
        });
        Ok(true)
    }

    /// Returns whether `path` has been recorded.
    #[must_use]
    pub fn contains(&self, path: &VirtualPath) -> bool {
        self.entries.contains_key(path)
    }

    /// Returns the entry for `path`.
    #[must_use]
    pub fn get(&self, path: &VirtualPath) -> Option<&Accumulated> {
        self.entries.get(path)
    }

    /// Number of recorded inputs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in virtual path order.
    pub fn iter(&self) -> impl Iterator<Item = (&VirtualPath, &Accumulated)> {
        self.entries.iter()
    }

    /// Consumes the accumulator, yielding entries in virtual path order.
    pub fn into_entries(self) -> impl Iterator<Item = (VirtualPath, Accumulated)> {
        self.entries.into_iter()
    }
}
