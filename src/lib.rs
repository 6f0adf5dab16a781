//! Concrete Strength Service
//!
//! Predicts the compressive strength of a concrete mix from eight mix-design
//! measurements and packages the result as a documented mix record:
//! - Validated, fixed-order feature vectors
//! - Pre-fitted standardization and regression artifacts
//! - Self-contained HTML mix reports
//! - Compact scannable codes (QR) of a record's key fields

pub mod config;
pub mod error;
pub mod inference;
pub mod mix;
pub mod server;
pub mod telemetry;

// Re-exports for convenience
pub use error::{ArtifactLoadError, EncodingError, InferenceError, MixError, ValidationError};
pub use inference::{Feature, FeatureVector, InferenceService, PredictionResult};
pub use mix::{CompactCodeEncoder, CompactPayload, MixRecord, MixRecordBuilder, ReportRenderer};
