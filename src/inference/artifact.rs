//! Artifact files
//!
//! Scaler and model are shipped as versioned envelopes, binary (`bincode`)
//! by default or JSON when the file name ends in `.json`. Everything that
//! can be checked about an artifact is checked here, once, at load time.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use super::model::{ModelArtifact, RegressionPredictor};
use super::scaling::ScalingParameters;
use crate::error::ArtifactLoadError;

pub const ARTIFACT_VERSION: u32 = 1;
pub const SCALER_FORMAT: &str = "concrete-strength/scaler";
pub const MODEL_FORMAT: &str = "concrete-strength/model";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactEnvelope<T> {
    pub format: String,
    pub version: u32,
    pub payload: T,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Encoding {
    Json,
    Bincode,
}

impl Encoding {
    fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Encoding::Json,
            _ => Encoding::Bincode,
        }
    }
}

/// Scaler and model after a successful load. Read-only from here on.
#[derive(Debug, Clone)]
pub struct LoadedArtifacts {
    pub scaler: ScalingParameters,
    pub model: ModelArtifact,
}

impl LoadedArtifacts {
    pub fn load(scaler_path: &Path, model_path: &Path) -> Result<Self, ArtifactLoadError> {
        let scaler = load_scaler(scaler_path)?;
        let model = load_model(model_path)?;
        info!(
            "Artifacts loaded: scaler={} model={} ({})",
            scaler_path.display(),
            model_path.display(),
            model.kind()
        );
        Ok(Self { scaler, model })
    }
}

pub fn load_scaler(path: &Path) -> Result<ScalingParameters, ArtifactLoadError> {
    let scaler: ScalingParameters = read_envelope(path, SCALER_FORMAT)?;
    scaler.validate()?;
    Ok(scaler)
}

pub fn load_model(path: &Path) -> Result<ModelArtifact, ArtifactLoadError> {
    let model: ModelArtifact = read_envelope(path, MODEL_FORMAT)?;
    model.validate()?;
    Ok(model)
}

pub fn save_scaler(path: &Path, scaler: &ScalingParameters) -> Result<(), ArtifactLoadError> {
    write_envelope(path, SCALER_FORMAT, scaler)
}

pub fn save_model(path: &Path, model: &ModelArtifact) -> Result<(), ArtifactLoadError> {
    write_envelope(path, MODEL_FORMAT, model)
}

fn read_envelope<T: DeserializeOwned>(path: &Path, expected: &'static str) -> Result<T, ArtifactLoadError> {
    let bytes = std::fs::read(path).map_err(|source| ArtifactLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let decode_err = |reason: String| ArtifactLoadError::Decode {
        path: path.to_path_buf(),
        reason,
    };
    let envelope: ArtifactEnvelope<T> = match Encoding::for_path(path) {
        Encoding::Json => serde_json::from_slice(&bytes).map_err(|e| decode_err(e.to_string()))?,
        Encoding::Bincode => bincode::deserialize(&bytes).map_err(|e| decode_err(e.to_string()))?,
    };

    if envelope.format != expected {
        return Err(ArtifactLoadError::WrongFormat {
            path: path.to_path_buf(),
            expected,
            found: envelope.format,
        });
    }
    if envelope.version != ARTIFACT_VERSION {
        return Err(ArtifactLoadError::UnsupportedVersion {
            path: path.to_path_buf(),
            found: envelope.version,
            supported: ARTIFACT_VERSION,
        });
    }
    Ok(envelope.payload)
}

fn write_envelope<T: Serialize>(path: &Path, format: &str, payload: &T) -> Result<(), ArtifactLoadError> {
    let envelope = ArtifactEnvelope {
        format: format.to_string(),
        version: ARTIFACT_VERSION,
        payload,
    };
    let encode_err = |reason: String| ArtifactLoadError::Encode {
        path: path.to_path_buf(),
        reason,
    };
    let bytes = match Encoding::for_path(path) {
        Encoding::Json => serde_json::to_vec_pretty(&envelope).map_err(|e| encode_err(e.to_string()))?,
        Encoding::Bincode => bincode::serialize(&envelope).map_err(|e| encode_err(e.to_string()))?,
    };
    std::fs::write(path, bytes).map_err(|source| ArtifactLoadError::Io {
        path: PathBuf::from(path),
        source,
    })
}
