//! Mix records
//!
//! A `MixRecord` is the documented form of one prediction: the measurements,
//! the estimate and the descriptive metadata a site engineer attaches to it.
//! Records are plain values owned by the caller; nothing here keeps them.

pub mod code;
pub mod report;

pub use code::{decode_code, CompactCode, CompactCodeEncoder, CompactPayload};
pub use report::ReportRenderer;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::ValidationError;
use crate::inference::{FeatureVector, PredictionResult};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixRecord {
    pub name: String,
    pub project: String,
    pub location: String,
    pub notes: Option<String>,
    pub features: FeatureVector,
    pub strength_mpa: f64,
    pub generated_at: DateTime<Utc>,
}

impl MixRecord {
    /// `MIX-` plus eight hex digits of SHA-256 over name and timestamp.
    pub fn identifier(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.name.as_bytes());
        hasher.update(b"\n");
        hasher.update(
            self.generated_at
                .to_rfc3339_opts(SecondsFormat::Secs, true)
                .as_bytes(),
        );
        let digest = hex::encode_upper(hasher.finalize());
        format!("MIX-{}", &digest[..8])
    }

    pub fn formatted_strength(&self) -> String {
        format!("{:.2} MPa", self.strength_mpa)
    }

    pub fn timestamp_label(&self) -> String {
        self.generated_at.format(TIMESTAMP_FORMAT).to_string()
    }

    pub fn age_days(&self) -> u32 {
        self.features.age_days()
    }
}

/// Collects metadata, then combines it with a prediction.
#[derive(Debug, Clone, Default)]
pub struct MixRecordBuilder {
    name: String,
    project: String,
    location: String,
    notes: Option<String>,
    generated_at: Option<DateTime<Utc>>,
}

impl MixRecordBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn project(mut self, project: impl Into<String>) -> Self {
        self.project = project.into();
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn notes(mut self, notes: Option<String>) -> Self {
        self.notes = notes;
        self
    }

    pub fn generated_at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.generated_at = Some(timestamp);
        self
    }

    /// The timestamp is required; records never read the clock themselves.
    pub fn build(self, prediction: &PredictionResult) -> Result<MixRecord, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        let generated_at = self.generated_at.ok_or_else(|| ValidationError::Timestamp {
            value: String::new(),
            reason: "generation timestamp is required".to_string(),
        })?;
        let notes = self
            .notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        Ok(MixRecord {
            name: name.to_string(),
            project: self.project.trim().to_string(),
            location: self.location.trim().to_string(),
            notes,
            features: prediction.features,
            strength_mpa: prediction.strength_mpa,
            generated_at,
        })
    }
}

/// Parse an RFC 3339 timestamp supplied by a caller.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, ValidationError> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| ValidationError::Timestamp {
            value: value.to_string(),
            reason: e.to_string(),
        })
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_build_copies_prediction() {
        let record = record();
        assert_eq!(record.name, "Mix-1");
        assert_eq!(record.strength_mpa, 32.5);
        assert_eq!(record.age_days(), 28);
        assert_eq!(record.formatted_strength(), "32.50 MPa");
        assert_eq!(record.timestamp_label(), "2024-05-17 09:30:00 UTC");
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let err = MixRecordBuilder::new("   ")
            .generated_at(timestamp())
            .build(&prediction())
            .unwrap_err();
        assert_eq!(err, ValidationError::EmptyName);
    }

    #[test]
    fn test_blank_notes_become_none() {
        let record = MixRecordBuilder::new("Mix-2")
            .notes(Some("  \n ".to_string()))
            .generated_at(timestamp())
            .build(&prediction())
            .unwrap();
        assert_eq!(record.notes, None);
    }

    #[test]
    fn test_identifier_is_stable() {
        let a = record();
        let b = record();
        assert_eq!(a.identifier(), b.identifier());
        assert!(a.identifier().starts_with("MIX-"));
        assert_eq!(a.identifier().len(), 12);

        let mut renamed = record();
        renamed.name = "Mix-9".to_string();
        assert_ne!(renamed.identifier(), a.identifier());
    }

    #[test]
    fn test_parse_timestamp() {
        assert_eq!(parse_timestamp("2024-05-17T09:30:00Z").unwrap(), timestamp());
        assert!(matches!(
            parse_timestamp("yesterday"),
            Err(ValidationError::Timestamp { .. })
        ));
    }
}
