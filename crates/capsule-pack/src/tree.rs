//! Directory view over the required inputs of a compilation.
//!
//! A replaying front-end lists directories and resolves files by path; the
//! tree answers both from the descriptor alone, without touching content.

use std::collections::BTreeMap;

use capsule_common::constants::DIRECTORY_DIGEST;
use capsule_common::error::{CapsuleError, Result};

use crate::unit::FileInput;

/// Map from directory path to the digests of its entries.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FileTree {
    dirs: BTreeMap<String, BTreeMap<String, String>>,
}

impl FileTree {
    /// Builds a tree from required inputs. Every ancestor directory of an
    /// input is registered with the directory digest.
    ///
    /// # Errors
    ///
    /// Returns `CapsuleError::HashMismatch` if two inputs claim the same path
    /// with different digests.
    pub fn build<'a>(inputs: impl IntoIterator<Item = &'a FileInput>) -> Result<Self> {
        let mut tree = Self::default();
        for input in inputs {
            let path = input.path.as_str();
            tree.put(path, input.info.digest.as_hex())?;

            let mut prefix = String::new();
            for dir in dirname(path).split('/').filter(|s| !s.is_empty()) {
                prefix.push_str(dir);
                tree.put(&prefix, DIRECTORY_DIGEST)?;
                prefix.push('/');
            }
        }
        Ok(tree)
    }

    fn put(&mut self, path: &str, digest: &str) -> Result<()> {
        let entries = self.dirs.entry(dirname(path).to_string()).or_default();
        match entries.get(basename(path)) {
            Some(existing) if existing != digest => Err(CapsuleError::HashMismatch {
                resource: path.to_string(),
                expected: existing.clone(),
                actual: digest.to_string(),
            }),
            Some(_) => Ok(()),
            None => {
                let _ = entries.insert(basename(path).to_string(), digest.to_string());
                Ok(())
            }
        }
    }

    /// Returns the digest of `filename` inside `directory`.
    #[must_use]
    pub fn lookup_in(&self, directory: &str, filename: &str) -> Option<&str> {
        self.dirs
            .get(directory)
            .and_then(|dir| dir.get(filename))
            .map(String::as_str)
    }

    /// Returns the digest of the entry at `path`.
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<&str> {
        self.lookup_in(dirname(path), basename(path))
    }

    /// Returns the entries of `directory` with their digests, sorted by name.
    #[must_use]
    pub fn list(&self, directory: &str) -> Option<&BTreeMap<String, String>> {
        self.dirs.get(directory)
    }

    /// Returns whether `path` names a directory.
    #[must_use]
    pub fn is_dir(&self, path: &str) -> bool {
        self.lookup(path) == Some(DIRECTORY_DIGEST)
    }
}

fn dirname(path: &str) -> &str {
    path.rfind('/').map_or("", |i| &path[..i])
}

fn basename(path: &str) -> &str {
    path.rfind('/').map_or(path, |i| &path[i + 1..])
}
