//! Content lookup for replaying a package.
//!
//! Replaying analyzers fetch input bytes by path and digest. The extraction
//! side never uses these stores.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use capsule_common::error::{CapsuleError, Result};
use capsule_common::types::Digest;

use crate::unit::Package;

/// Source of input content keyed by virtual path and digest.
pub trait ContentStore {
    /// Returns the bytes stored for `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is missing or unreadable.
    fn lookup(&self, path: &str, digest: &Digest) -> Result<Vec<u8>>;
}

/// Store that reads `<root>/<path>` from the local filesystem, ignoring digests.
#[derive(Debug)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    /// Opens a store rooted at `root`.
    #[must_use]
    pub fn open(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        tracing::info!(path = %root.display(), "opening directory content store");
        Self { root }
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ContentStore for DirectoryStore {
    fn lookup(&self, path: &str, _digest: &Digest) -> Result<Vec<u8>> {
        let full = self.root.join(path.trim_start_matches('/'));
        std::fs::read(&full).map_err(|e| CapsuleError::Io {
            path: full,
            source: e,
        })
    }
}

/// Store serving content embedded in a loaded package.
#[derive(Debug)]
pub struct PackageStore<'a> {
    by_key: HashMap<(&'a str, &'a Digest), &'a [u8]>,
}

impl<'a> PackageStore<'a> {
    /// Indexes the records of `package`.
    #[must_use]
    pub fn new(package: &'a Package) -> Self {
        let by_key = package
            .files
            .iter()
            .map(|f| ((f.info.path.as_str(), &f.info.digest), f.content.as_slice()))
            .collect();
        Self { by_key }
    }
}

impl ContentStore for PackageStore<'_> {
    fn lookup(&self, path: &str, digest: &Digest) -> Result<Vec<u8>> {
        self.by_key
            .get(&(path, digest))
            .map(|bytes| bytes.to_vec())
            .ok_or_else(|| CapsuleError::NotFound {
                kind: "package file",
                id: format!("{path}@{digest}"),
            })
    }
}
