//! Unified error types for the Capsule workspace.
//!
//! Fatal extraction failures carry the [`Phase`] that failed and the path or
//! identifier involved, so a caller can report them without inspecting the
//! message text.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Stage of an extraction run that produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Preparing the front-end invocation (options, processors, scratch).
    Driver,
    /// Running the front-end itself.
    FrontEnd,
    /// Forcing resolution of wildcard imports.
    OnDemand,
    /// Classifying touched files and inferring search path roots.
    Classify,
    /// Reading input content.
    Accumulate,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Driver => write!(f, "driver"),
            Self::FrontEnd => write!(f, "front-end"),
            Self::OnDemand => write!(f, "on-demand"),
            Self::Classify => write!(f, "classify"),
            Self::Accumulate => write!(f, "accumulate"),
        }
    }
}

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum CapsuleError {
    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A fatal, non-retryable extraction failure.
    #[error("{phase} failed for {subject}: {message}")]
    Extraction {
        /// Phase that failed.
        phase: Phase,
        /// Path or identifier the failure is about.
        subject: String,
        /// Description of the failure.
        message: String,
    },

    /// The invocation-local scratch directory could not be created.
    #[error("unable to create scratch output directory: {source}")]
    Scratch {
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// A required resource was not found.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Type of the missing resource.
        kind: &'static str,
        /// Identifier of the missing resource.
        id: String,
    },

    /// A digest validation failed.
    #[error("hash mismatch for {resource}: expected {expected}, got {actual}")]
    HashMismatch {
        /// Resource that failed validation.
        resource: String,
        /// Expected digest value.
        expected: String,
        /// Actual computed digest value.
        actual: String,
    },

    /// A framed record exceeds the reader's size limit.
    #[error("record of {size} bytes exceeds the limit of {limit} bytes")]
    RecordTooLarge {
        /// Declared record size.
        size: u64,
        /// Configured limit.
        limit: u64,
    },

    /// A package stream ended in the middle of a record.
    #[error("truncated package stream: {message}")]
    Truncated {
        /// Which part of the record was cut off.
        message: String,
    },

    /// JSON serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },

    /// Binary record encoding or decoding failed.
    #[error("record encoding error: {source}")]
    Encoding {
        /// Underlying encoding error.
        #[from]
        source: bincode::Error,
    },
}

impl CapsuleError {
    /// Builds an [`CapsuleError::Extraction`] error.
    pub fn extraction(
        phase: Phase,
        subject: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Extraction {
            phase,
            subject: subject.into(),
            message: message.into(),
        }
    }

    /// Returns the phase of an extraction failure, if this is one.
    #[must_use]
    pub const fn phase(&self) -> Option<Phase> {
        match self {
            Self::Extraction { phase, .. } => Some(*phase),
            Self::Scratch { .. } => Some(Phase::Driver),
            _ => None,
        }
    }

    /// Returns whether running the same extraction again may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Scratch { .. })
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, CapsuleError>;
