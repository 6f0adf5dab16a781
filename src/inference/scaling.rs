//! Standardization
//!
//! Per-feature affine transform fitted offline: `z_i = (x_i - offset_i) / scale_i`.

use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

use super::features::{Feature, FeatureVector, FEATURE_COUNT};
use crate::error::ArtifactLoadError;

/// Fitted (offset, scale) pairs, one per feature position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalingParameters {
    offsets: Vec<f64>,
    scales: Vec<f64>,
}

impl ScalingParameters {
    pub fn new(offsets: Vec<f64>, scales: Vec<f64>) -> Result<Self, ArtifactLoadError> {
        let params = Self { offsets, scales };
        params.validate()?;
        Ok(params)
    }

    /// Structural checks applied whenever parameters come from outside the process.
    pub fn validate(&self) -> Result<(), ArtifactLoadError> {
        if self.offsets.len() != FEATURE_COUNT || self.scales.len() != FEATURE_COUNT {
            return Err(ArtifactLoadError::Invalid(format!(
                "scaler must hold {} offsets and scales, found {} and {}",
                FEATURE_COUNT,
                self.offsets.len(),
                self.scales.len()
            )));
        }
        for feature in Feature::ALL {
            let i = feature.index();
            let (offset, scale) = (self.offsets[i], self.scales[i]);
            if !offset.is_finite() || !scale.is_finite() {
                return Err(ArtifactLoadError::Invalid(format!(
                    "scaler entry for {} is not finite",
                    feature.key()
                )));
            }
            if scale == 0.0 {
                return Err(ArtifactLoadError::Invalid(format!(
                    "scaler entry for {} has zero scale",
                    feature.key()
                )));
            }
        }
        Ok(())
    }

    pub fn offsets(&self) -> &[f64] {
        &self.offsets
    }

    pub fn scales(&self) -> &[f64] {
        &self.scales
    }

    pub fn transform(&self, features: &FeatureVector) -> StandardizedVector {
        let x = features.to_array();
        let offsets = Array1::from(self.offsets.clone());
        let scales = Array1::from(self.scales.clone());
        StandardizedVector((x - &offsets) / &scales)
    }
}

/// Output of the scaler; the only input the model accepts.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardizedVector(Array1<f64>);

impl StandardizedVector {
    pub fn view(&self) -> ArrayView1<'_, f64> {
        self.0.view()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.0.to_vec()
    }
}

impl From<Vec<f64>> for StandardizedVector {
    fn from(values: Vec<f64>) -> Self {
        Self(Array1::from(values))
    }
}
