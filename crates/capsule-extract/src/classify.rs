//! Classification of touched files and search path minimization.
//!
//! Every touched file is mapped to a relocation-stable virtual path and the
//! search path root it was found under is recorded. Archive members all share
//! the synthetic archive root, so replaying never needs the archives
//! themselves. Disk class files are rooted by their binary name, disk sources
//! by the package of the unit that declares them.

use std::collections::BTreeMap;
use std::path::Path;

use capsule_common::config::ExtractorConfig;
use capsule_common::error::{CapsuleError, Phase, Result};
use capsule_common::types::{FileKind, VirtualPath};

use crate::frontend::{FrontEnd, Location, ParsedUnit, SymbolOrigin, TouchedFile};
use crate::results::AnalysisResults;
use crate::uri::{self, Origin, try_make_relative};

/// Search paths probed, in order, for the binary name of a disk class file.
pub const BINARY_NAME_PROBE_ORDER: [Location; 4] = [
    Location::ClassOutput,
    Location::ClassPath,
    Location::SourcePath,
    Location::PlatformClassPath,
];

/// Maps touched files to virtual paths and search path roots.
#[derive(Debug)]
pub struct Classifier<'a> {
    config: &'a ExtractorConfig,
}

impl<'a> Classifier<'a> {
    /// Creates a classifier for `config`.
    #[must_use]
    pub const fn new(config: &'a ExtractorConfig) -> Self {
        Self { config }
    }

    /// Classifies one touched file and accumulates its content.
    ///
    /// `basenames` maps file URIs to the basename of their declaring source.
    ///
    /// # Errors
    ///
    /// Returns a classify-phase error if the URI is unsupported or a disk
    /// class file cannot be rooted, and an accumulate-phase error if its
    /// content cannot be read.
    pub fn classify<F: FrontEnd + ?Sized>(
        &self,
        frontend: &F,
        file: &TouchedFile,
        basenames: &BTreeMap<String, String>,
        results: &mut AnalysisResults,
    ) -> Result<()> {
        let origin = uri::parse(&file.uri)?;
        if self.is_platform(origin.container()) {
            tracing::trace!(uri = %file.uri, "skipping platform file");
            return Ok(());
        }

        let root_dir = &self.config.root_directory;
        let (virtual_path, relative_path) = match &origin {
            Origin::Archive { archive, member } => {
                let archive_root = &self.config.archive_root;
                let roots = match file.kind {
                    FileKind::Class => &mut results.class_roots,
                    FileKind::Source => &mut results.source_roots,
                };
                let _ = roots.insert(archive_root.clone());
                (
                    VirtualPath::new(format!("{archive_root}{member}")),
                    format!("{}!{member}", try_make_relative(root_dir, archive)),
                )
            }
            Origin::Disk(path) => {
                let relative = try_make_relative(root_dir, path);
                (VirtualPath::new(relative.clone()), relative)
            }
        };

        match (file.kind, &origin) {
            (FileKind::Class, Origin::Disk(_)) => {
                let binary_name = BINARY_NAME_PROBE_ORDER
                    .iter()
                    .find_map(|location| frontend.infer_binary_name(*location, file))
                    .ok_or_else(|| {
                        CapsuleError::extraction(
                            Phase::Classify,
                            virtual_path.as_str(),
                            "unable to infer a binary name on any search path",
                        )
                    })?;
                let root = class_root(virtual_path.as_str(), &binary_name)?;
                tracing::debug!(path = %virtual_path, root = %root, "class root inferred");
                let _ = results.class_roots.insert(root);
            }
            (FileKind::Source, _) => {
                if let Some(root) =
                    generated_source_root(virtual_path.as_str(), &self.config.generated_marker)
                {
                    tracing::debug!(path = %virtual_path, root, "generated source");
                    let _ = results.generated_sources.insert(virtual_path.to_string());
                    let _ = results.source_roots.insert(root.to_string());
                }
            }
            (FileKind::Class, Origin::Archive { .. }) => {}
        }

        let declared = basenames.get(&file.uri).cloned();
        let _ = results
            .files
            .accumulate(virtual_path, relative_path, declared, || frontend.read(file))?;
        Ok(())
    }

    /// Adds the source root of every parsed unit that declares a package.
    pub fn add_package_roots(&self, units: &[ParsedUnit], results: &mut AnalysisResults) {
        for unit in units {
            let Some(package) = unit.package.as_deref().filter(|p| !p.is_empty()) else {
                continue;
            };
            let Ok(Origin::Disk(path)) = uri::parse(&unit.source_uri) else {
                continue;
            };
            let path = path.display().to_string();
            if let Some(prefix) = package_source_root(&path, package) {
                let root = self.root_of(prefix);
                tracing::debug!(source = %unit.source_uri, root = %root, "source root inferred");
                let _ = results.source_roots.insert(root);
            }
        }
    }

    fn root_of(&self, prefix: &str) -> String {
        let trimmed = prefix.trim_end_matches('/');
        if trimmed.is_empty() {
            return if prefix.is_empty() { ".".into() } else { "/".into() };
        }
        try_make_relative(&self.config.root_directory, Path::new(trimmed))
    }

    fn is_platform(&self, path: &Path) -> bool {
        self.config
            .platform_root
            .as_deref()
            .is_some_and(|root| path.starts_with(root))
    }
}

/// Returns the class search path root of a disk class file: the part of its
/// virtual path in front of the **first** occurrence of the binary name.
///
/// # Errors
///
/// Returns a classify-phase error if the binary name does not occur in the
/// path or occurs at its very start, leaving no root.
pub fn class_root(virtual_path: &str, binary_name: &str) -> Result<String> {
    let fragment = binary_name.replace('.', "/");
    let index = match virtual_path.find(&fragment) {
        Some(index) if index > 0 => index,
        found => {
            let reason = if found.is_some() {
                "leaves no class path root"
            } else {
                "does not occur in the path"
            };
            return Err(CapsuleError::extraction(
                Phase::Classify,
                virtual_path,
                format!("binary name {binary_name} {reason}"),
            ));
        }
    };
    let root = virtual_path[..index].trim_end_matches('/');
    Ok(if root.is_empty() { "/".into() } else { root.into() })
}

/// Returns the prefix of `source_path` in front of the **last** occurrence
/// of `package` written as a directory path.
#[must_use]
pub fn package_source_root<'p>(source_path: &'p str, package: &str) -> Option<&'p str> {
    let fragment = format!("{}/", package.replace('.', "/"));
    source_path
        .rfind(&fragment)
        .map(|index| &source_path[..index])
}

/// Returns the generated-sources root of `path`: everything up to the marker,
/// without the marker's trailing separator.
#[must_use]
pub fn generated_source_root<'p>(path: &'p str, marker: &str) -> Option<&'p str> {
    path.find(marker)
        .map(|index| &path[..index + marker.trim_end_matches('/').len()])
}

/// Maps each symbol's file URI to the basename of its declaring source.
///
/// # Errors
///
/// Returns a classify-phase error if a declaring source does not carry the
/// source extension.
pub fn declared_basenames(
    origins: &[SymbolOrigin],
    config: &ExtractorConfig,
) -> Result<BTreeMap<String, String>> {
    let mut basenames = BTreeMap::new();
    for origin in origins {
        let basename = match uri::parse(&origin.source_uri)? {
            Origin::Disk(path) => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            Origin::Archive { member, .. } => {
                member.rsplit('/').next().unwrap_or_default().to_string()
            }
        };
        if !config.is_source_path(&basename) {
            return Err(CapsuleError::extraction(
                Phase::Classify,
                origin.source_uri.as_str(),
                format!("invalid source file name '{basename}'"),
            ));
        }
        let _ = basenames.insert(origin.file_uri.clone(), basename);
    }
    Ok(basenames)
}
