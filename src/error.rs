//! Error taxonomy
//!
//! Every failure the core can produce falls into one of four kinds. Each kind
//! is its own type so callers can tell them apart without string matching;
//! `MixError` unifies them for code that handles more than one stage.

use std::path::PathBuf;
use thiserror::Error;

/// Raw measurements or record metadata failed a domain check.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("request body must be a JSON object of named measurements")]
    NotAnObject,
    #[error("missing required field: {0}")]
    Missing(&'static str),
    #[error("field {field} must be a number, got {found}")]
    NotNumeric { field: &'static str, found: String },
    #[error("field {field} must be finite")]
    NonFinite { field: &'static str },
    #[error("field {field} must not be negative (got {value})")]
    Negative { field: &'static str, value: f64 },
    #[error("Age must be at least 1 day (got {0})")]
    AgeNotPositive(f64),
    #[error("Age must be a whole number of days (got {0})")]
    AgeNotInteger(f64),
    #[error("Age of {0} days is out of range")]
    AgeTooLarge(f64),
    #[error("mix name must not be empty")]
    EmptyName,
    #[error("invalid timestamp {value:?}: {reason}")]
    Timestamp { value: String, reason: String },
}

/// The regression function could not evaluate a standardized vector.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InferenceError {
    #[error("model expects {expected} features, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },
    #[error("model produced a non-finite prediction ({0})")]
    NonFiniteOutput(f64),
    #[error("model artifact failure: {0}")]
    Artifact(String),
}

/// An artifact could not be read or failed its structural checks.
/// Fatal at startup.
#[derive(Debug, Error)]
pub enum ArtifactLoadError {
    #[error("failed to read artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode artifact {path}: {reason}")]
    Decode { path: PathBuf, reason: String },
    #[error("failed to encode artifact {path}: {reason}")]
    Encode { path: PathBuf, reason: String },
    #[error("artifact {path} has format {found:?}, expected {expected:?}")]
    WrongFormat {
        path: PathBuf,
        expected: &'static str,
        found: String,
    },
    #[error("artifact {path} has unsupported version {found} (supported: {supported})")]
    UnsupportedVersion {
        path: PathBuf,
        found: u32,
        supported: u32,
    },
    #[error("artifact is invalid: {0}")]
    Invalid(String),
}

/// The compact payload could not be turned into (or recovered from) a code.
#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("payload of {0} bytes does not fit a code at medium error correction")]
    PayloadTooLarge(usize),
    #[error("code generation failed: {0}")]
    Code(String),
    #[error("image export failed: {0}")]
    Image(String),
    #[error("no scannable code found in image")]
    NoCodeFound,
    #[error("failed to decode scannable code: {0}")]
    Decode(String),
    #[error("decoded text is not a compact payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum MixError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Inference(#[from] InferenceError),
    #[error(transparent)]
    ArtifactLoad(#[from] ArtifactLoadError),
    #[error(transparent)]
    Encoding(#[from] EncodingError),
}

pub type Result<T, E = MixError> = std::result::Result<T, E>;
