//! Error types for image triage.
//!
//! Decoding and classification failures stay distinct all the way to the
//! caller, so a batch renderer can tell a corrupt upload from a broken model
//! without inspecting messages.

pub use is_it_fake_preprocessing::DecodeError;
use serde::Serialize;
use thiserror::Error;

/// Failure of the underlying classification service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdapterError {
    /// The model could not be loaded or is otherwise not available.
    #[error("classifier unavailable: {0}")]
    Unavailable(String),

    /// The model was loaded but raised during inference.
    #[error("inference failed: {0}")]
    Inference(String),

    /// The model returned something that cannot be mapped to labels.
    #[error("invalid classifier output: {0}")]
    InvalidOutput(String),

    #[error("classification timed out after {millis}ms")]
    Timeout { millis: u64 },
}

/// Broad category of an [`AnalysisError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Read,
    Decode,
    Adapter,
}

/// Any failure while analyzing a single image.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// The image bytes could not be read from their source.
    #[error("read error: {0}")]
    Read(String),

    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("classifier error: {0}")]
    Adapter(#[from] AdapterError),
}

impl AnalysisError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Read(_) => ErrorKind::Read,
            Self::Decode(_) => ErrorKind::Decode,
            Self::Adapter(_) => ErrorKind::Adapter,
        }
    }
}

/// Rejected triage configuration value.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    #[error("threshold must be within [0.0, 1.0], got {0}")]
    ThresholdOutOfRange(f64),

    #[error("gray zone must be within [0.0, 0.3], got {0}")]
    GrayZoneOutOfRange(f64),
}
