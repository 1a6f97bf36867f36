//! Forced resolution of wildcard imports.
//!
//! A wildcard import that nothing in the code uses is never opened by the
//! front-end, yet a replayed compilation fails if the package resolves to no
//! file at all. One class and one source of every wildcard-imported package
//! are therefore opened on purpose, so they end up among the touched files.

use std::collections::{BTreeMap, BTreeSet};

use capsule_common::error::{CapsuleError, Phase, Result};
use capsule_common::types::FileKind;

use crate::frontend::{FrontEnd, Location, ParsedUnit};

/// Importer recorded for the implicit imports of every unit.
const IMPLICIT_IMPORTER: &str = "<implicit>";

/// Groups wildcard-imported packages with the sources importing them.
#[must_use]
pub fn wildcard_packages(
    units: &[ParsedUnit],
    implicit_imports: &[String],
) -> BTreeMap<String, BTreeSet<String>> {
    let mut packages: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for package in implicit_imports {
        let _ = packages
            .entry(package.clone())
            .or_default()
            .insert(IMPLICIT_IMPORTER.to_string());
    }
    for unit in units {
        for package in unit.imports.iter().filter_map(|i| i.wildcard_package()) {
            let _ = packages
                .entry(package.to_string())
                .or_default()
                .insert(unit.source_uri.clone());
        }
    }
    packages
}

/// Opens the first class (class path, then platform class path) and the
/// first source (source path) of every wildcard-imported package. Returns
/// the number of files opened. Packages without candidates are skipped.
///
/// # Errors
///
/// Returns an on-demand phase error naming the importing sources if a
/// candidate exists but cannot be read.
pub fn resolve<F: FrontEnd + ?Sized>(
    frontend: &mut F,
    units: &[ParsedUnit],
    implicit_imports: &[String],
) -> Result<usize> {
    let mut opened = 0;
    for (package, importers) in wildcard_packages(units, implicit_imports) {
        let class = frontend
            .list(Location::ClassPath, &package, FileKind::Class)
            .into_iter()
            .next()
            .or_else(|| {
                frontend
                    .list(Location::PlatformClassPath, &package, FileKind::Class)
                    .into_iter()
                    .next()
            });
        let source = frontend
            .list(Location::SourcePath, &package, FileKind::Source)
            .into_iter()
            .next();

        if class.is_none() && source.is_none() {
            tracing::debug!(package = %package, "no candidates for wildcard import");
            continue;
        }
        for candidate in class.iter().chain(source.iter()) {
            let _ = frontend.open(candidate).map_err(|e| {
                let importers: Vec<&str> = importers.iter().map(String::as_str).collect();
                CapsuleError::extraction(
                    Phase::OnDemand,
                    importers.join(", "),
                    format!("unable to read {} for package {package}: {e}", candidate.uri),
                )
            })?;
            opened += 1;
        }
        tracing::debug!(package = %package, "wildcard import resolved");
    }
    Ok(opened)
}
