//! Configuration model for an extraction run.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::{CapsuleError, Result};

/// Settings that shape how touched files are classified and packaged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Directory that disk paths are made relative to.
    pub root_directory: PathBuf,
    /// Installation directory of the platform standard library; files under
    /// it are never embedded.
    pub platform_root: Option<PathBuf>,
    /// Whether to compute unused declared archive dependencies.
    pub track_unused_dependencies: bool,
    /// Language recorded in the descriptor.
    pub language: String,
    /// Synthetic root for archive members.
    pub archive_root: String,
    /// Path segment identifying generated sources.
    pub generated_marker: String,
    /// Source file extension, without the dot.
    pub source_extension: String,
    /// Dependency archive extension, without the dot.
    pub archive_extension: String,
    /// Packages imported implicitly by every compilation unit.
    pub implicit_imports: Vec<String>,
    /// Options removed, together with their argument, from the replay options.
    pub output_dir_flags: Vec<String>,
    /// Encoding passed to the front-end when none is requested.
    pub default_encoding: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            root_directory: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            platform_root: None,
            track_unused_dependencies: false,
            language: constants::DEFAULT_LANGUAGE.to_string(),
            archive_root: constants::ARCHIVE_ROOT.to_string(),
            generated_marker: constants::GENERATED_SOURCES_MARKER.to_string(),
            source_extension: constants::DEFAULT_SOURCE_EXTENSION.to_string(),
            archive_extension: constants::DEFAULT_ARCHIVE_EXTENSION.to_string(),
            implicit_imports: constants::DEFAULT_IMPLICIT_IMPORTS
                .iter()
                .map(ToString::to_string)
                .collect(),
            output_dir_flags: constants::DEFAULT_OUTPUT_DIR_FLAGS
                .iter()
                .map(ToString::to_string)
                .collect(),
            default_encoding: constants::DEFAULT_ENCODING.to_string(),
        }
    }
}

impl ExtractorConfig {
    /// Creates the default configuration rooted at `root_directory`.
    #[must_use]
    pub fn with_root(root_directory: impl Into<PathBuf>) -> Self {
        Self {
            root_directory: root_directory.into(),
            ..Self::default()
        }
    }

    /// Loads a configuration from a JSON file; absent fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or fails validation.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CapsuleError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the markers and extensions are usable.
    ///
    /// # Errors
    ///
    /// Returns `CapsuleError::Config` naming the offending field.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("archive_root", &self.archive_root),
            ("generated_marker", &self.generated_marker),
            ("source_extension", &self.source_extension),
            ("archive_extension", &self.archive_extension),
        ];
        for (field, value) in required {
            if value.is_empty() {
                return Err(CapsuleError::Config {
                    message: format!("{field} must not be empty"),
                });
            }
        }
        if self.source_extension.starts_with('.') || self.archive_extension.starts_with('.') {
            return Err(CapsuleError::Config {
                message: "extensions are given without the leading dot".into(),
            });
        }
        Ok(())
    }

    /// Returns whether `path` names a source file by extension.
    #[must_use]
    pub fn is_source_path(&self, path: &str) -> bool {
        path.rsplit_once('.')
            .is_some_and(|(_, ext)| ext == self.source_extension)
    }

    /// Returns whether `path` names a dependency archive by extension.
    #[must_use]
    pub fn is_archive_path(&self, path: &str) -> bool {
        path.rsplit_once('.')
            .is_some_and(|(_, ext)| ext == self.archive_extension)
    }
}
