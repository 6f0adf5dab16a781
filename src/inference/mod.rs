//! Inference pipeline
//!
//! validate -> standardize -> regress. The service owns the fitted artifacts
//! for its whole lifetime and never mutates them, so one instance can be
//! shared behind an `Arc` by any number of concurrent requests.

pub mod artifact;
pub mod features;
pub mod model;
pub mod scaling;

pub use artifact::LoadedArtifacts;
pub use features::{Feature, FeatureVector, FEATURE_COUNT};
pub use model::{ModelArtifact, RegressionPredictor};
pub use scaling::{ScalingParameters, StandardizedVector};

use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, error, info};

use crate::error::{ArtifactLoadError, InferenceError, Result};

/// A strength estimate together with the measurements it came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionResult {
    /// Compressive strength in MPa.
    pub strength_mpa: f64,
    pub features: FeatureVector,
}

impl PredictionResult {
    /// `"32.50 MPa"`
    pub fn formatted_strength(&self) -> String {
        format!("{:.2} MPa", self.strength_mpa)
    }
}

pub struct InferenceService {
    scaler: ScalingParameters,
    model: Box<dyn RegressionPredictor>,
}

impl InferenceService {
    /// Build a service from already-validated artifacts.
    pub fn new(artifacts: LoadedArtifacts) -> Self {
        Self {
            scaler: artifacts.scaler,
            model: Box::new(artifacts.model),
        }
    }

    /// Use a custom predictor. The predictor must accept `FEATURE_COUNT` inputs.
    pub fn with_predictor(
        scaler: ScalingParameters,
        model: Box<dyn RegressionPredictor>,
    ) -> std::result::Result<Self, ArtifactLoadError> {
        scaler.validate()?;
        if model.n_features() != FEATURE_COUNT {
            return Err(ArtifactLoadError::Invalid(format!(
                "predictor expects {} features, service provides {}",
                model.n_features(),
                FEATURE_COUNT
            )));
        }
        Ok(Self { scaler, model })
    }

    /// Load both artifact files. Any failure here must stop the process from serving.
    pub fn load(scaler_path: &Path, model_path: &Path) -> std::result::Result<Self, ArtifactLoadError> {
        let artifacts = LoadedArtifacts::load(scaler_path, model_path)?;
        Ok(Self::new(artifacts))
    }

    pub fn model_kind(&self) -> &'static str {
        self.model.kind()
    }

    pub fn scaler(&self) -> &ScalingParameters {
        &self.scaler
    }

    /// Validate raw named measurements and predict.
    #[tracing::instrument(skip(self, raw))]
    pub fn predict(&self, raw: &Value) -> Result<PredictionResult> {
        debug!("Received measurements: {}", raw);
        let features = FeatureVector::from_json(raw)?;
        Ok(self.predict_features(&features)?)
    }

    /// Predict from an already-validated vector.
    pub fn predict_features(&self, features: &FeatureVector) -> std::result::Result<PredictionResult, InferenceError> {
        let standardized = self.scaler.transform(features);
        let strength_mpa = self.model.predict(standardized.view()).map_err(|e| {
            error!("Inference failed ({}): {}", self.model.kind(), e);
            e
        })?;
        info!("Predicted strength {:.2} MPa at {} days", strength_mpa, features.age_days());
        Ok(PredictionResult {
            strength_mpa,
            features: *features,
        })
    }
}
