#![allow(dead_code)]

use serde_json::{json, Value};
use std::path::PathBuf;
use tempfile::TempDir;

use concrete_strength::inference::artifact::{save_model, save_scaler};
use concrete_strength::inference::model::{Aggregation, LinearModel, RegressionTree, TreeEnsemble, TreeNode};
use concrete_strength::inference::{ModelArtifact, ScalingParameters};
use concrete_strength::InferenceService;

pub struct ArtifactDir {
    pub dir: TempDir,
    pub scaler: PathBuf,
    pub model: PathBuf,
}

pub fn scaler() -> ScalingParameters {
    ScalingParameters::new(
        vec![281.17, 73.90, 54.19, 181.57, 6.20, 972.92, 773.58, 45.66],
        vec![104.46, 86.24, 63.97, 21.34, 5.97, 77.72, 80.14, 63.14],
    )
    .unwrap()
}

pub fn linear_model() -> ModelArtifact {
    ModelArtifact::Linear(LinearModel {
        coefficients: vec![12.8, 9.1, 5.6, -3.4, 1.9, 1.2, 1.5, 7.3],
        intercept: 35.8,
    })
}

/// Small boosted ensemble splitting on cement, water and age.
pub fn boosted_model() -> ModelArtifact {
    let split = |feature: usize, threshold: f64, low: f64, high: f64| RegressionTree {
        nodes: vec![
            TreeNode::Split { feature, threshold, left: 1, right: 2 },
            TreeNode::Leaf { value: low },
            TreeNode::Leaf { value: high },
        ],
    };
    ModelArtifact::TreeEnsemble(TreeEnsemble {
        n_features: 8,
        trees: vec![
            split(0, 0.0, -6.0, 8.0),
            split(3, 0.0, 4.0, -5.0),
            split(7, -0.5, -9.0, 3.0),
            RegressionTree::leaf(0.5),
        ],
        aggregation: Aggregation::Sum { learning_rate: 0.8 },
        base_score: 35.8,
    })
}

pub fn write_artifacts(model: &ModelArtifact) -> ArtifactDir {
    let dir = tempfile::tempdir().unwrap();
    let scaler_path = dir.path().join("concrete_strength_scaler.bin");
    let model_path = dir.path().join("concrete_strength_model.bin");
    save_scaler(&scaler_path, &scaler()).unwrap();
    save_model(&model_path, model).unwrap();
    ArtifactDir { dir, scaler: scaler_path, model: model_path }
}

pub fn service(model: &ModelArtifact) -> InferenceService {
    let artifacts = write_artifacts(model);
    InferenceService::load(&artifacts.scaler, &artifacts.model).unwrap()
}

pub fn reference_inputs() -> Value {
    json!({
        "Cement": 300, "Blast_furn_slag": 0, "Fly_Ash": 0, "Water": 180,
        "Superplasticizer": 5, "Coarse_Agg": 1000, "fine_Agg": 800, "Age": 28
    })
}
