//! Declared archive dependencies no input came from.

use std::collections::BTreeSet;
use std::path::Path;

use capsule_common::config::ExtractorConfig;
use capsule_common::error::Result;

use crate::frontend::TouchedFile;
use crate::uri::{self, Origin, try_make_relative};

/// Returns the root-relative class path archives that no usage was read
/// from, sorted.
///
/// # Errors
///
/// Returns an error if a usage URI cannot be parsed.
pub fn find_unused(
    config: &ExtractorConfig,
    classpath: &[String],
    usages: &[TouchedFile],
) -> Result<Vec<String>> {
    let root = &config.root_directory;
    let mut declared: BTreeSet<String> = classpath
        .iter()
        .filter(|entry| config.is_archive_path(entry))
        .map(|entry| try_make_relative(root, Path::new(entry)))
        .collect();
    for usage in usages {
        if let Origin::Archive { archive, .. } = uri::parse(&usage.uri)? {
            let _ = declared.remove(&try_make_relative(root, &archive));
        }
    }
    Ok(declared.into_iter().collect())
}

/// Best-effort variant of [`find_unused`]: any failure degrades to `None`.
#[must_use]
pub fn detect(
    config: &ExtractorConfig,
    classpath: &[String],
    usages: &[TouchedFile],
) -> Option<Vec<String>> {
    match find_unused(config, classpath, usages) {
        Ok(unused) => {
            tracing::debug!(unused = unused.len(), "unused dependencies computed");
            Some(unused)
        }
        Err(e) => {
            tracing::warn!(error = %e, "unable to compute unused dependencies");
            None
        }
    }
}
