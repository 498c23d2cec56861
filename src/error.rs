//! Error types for classify-eval operations.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for classify-eval operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during an evaluation run.
///
/// Only [`Error::Config`] and [`Error::LabelMismatch`] are fatal, and only
/// while a session is being set up. Dataset errors skip a label directory;
/// sample errors skip a single image.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A label directory named in the label map does not exist.
    #[error("Skipping {label}: directory not found: {}", path.display())]
    DatasetDirectoryMissing {
        /// Dataset directory name.
        label: String,
        /// Expected directory path.
        path: PathBuf,
    },

    /// A label directory holds no recognized image files.
    #[error("No images found in {label}: {}", path.display())]
    EmptyLabelDirectory {
        /// Dataset directory name.
        label: String,
        /// Directory path.
        path: PathBuf,
    },

    /// A label directory exists but could not be listed.
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// An image could not be read or decoded.
    #[error("Decode failed: {}: {reason}", path.display())]
    Decode {
        /// Path to the image that failed to decode.
        path: PathBuf,
        /// Reason for the failure.
        reason: String,
    },

    /// Raw scores did not flatten to one entry per label.
    #[error("Shape mismatch: expected {expected} scores, got {actual} (shape {shape:?})")]
    Shape {
        /// Number of labels in the label set.
        expected: usize,
        /// Number of elements after flattening.
        actual: usize,
        /// Shape reported by the engine.
        shape: Vec<usize>,
    },

    /// Raw scores contain NaN or infinite values.
    #[error("Invalid scores: non-finite value at index {index}")]
    InvalidScores {
        /// Index of the first non-finite value.
        index: usize,
    },

    /// The inference engine failed or returned no usable output.
    #[error("Inference failed: {message}")]
    Inference {
        /// Error message from the engine.
        message: String,
    },

    /// Label vocabularies disagree (label map, engine outputs, aggregates).
    #[error("Label mismatch: {0}")]
    LabelMismatch(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error reading or writing report files.
    #[error("Report error: {0}")]
    Report(String),

    /// I/O error wrapper.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Classify a per-sample error.
    ///
    /// Errors that cannot arise while evaluating a single sample map to
    /// [`FailureKind::Inference`], since they can only reach a sample through
    /// the engine boundary.
    #[must_use]
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Self::Decode { .. } | Self::Io(_) => FailureKind::Decode,
            Self::Shape { .. } => FailureKind::Shape,
            Self::InvalidScores { .. } => FailureKind::InvalidScores,
            _ => FailureKind::Inference,
        }
    }
}

/// Why a single sample was excluded from the metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The image could not be decoded.
    Decode,
    /// The engine output had the wrong number of elements.
    Shape,
    /// The engine output contained non-finite values.
    InvalidScores,
    /// The engine call failed.
    Inference,
}

impl FailureKind {
    /// Short name used in report lines.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Decode => "DecodeError",
            Self::Shape => "ShapeError",
            Self::InvalidScores => "InvalidScores",
            Self::Inference => "InferenceEngineFailure",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
