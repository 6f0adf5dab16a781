//! Pre-fitted regression models
//!
//! The service treats a model as an opaque function from a standardized
//! vector to a strength in MPa. `ModelArtifact` enumerates the fitted model
//! families that can be shipped as artifacts.

use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

use super::features::FEATURE_COUNT;
use crate::error::{ArtifactLoadError, InferenceError};

/// A fitted regressor. Implementations must be pure: same input, same output.
pub trait RegressionPredictor: Send + Sync {
    /// Input width the model was fitted on.
    fn n_features(&self) -> usize;

    /// Evaluate the model without checking the input width.
    fn evaluate(&self, x: ArrayView1<'_, f64>) -> Result<f64, InferenceError>;

    /// Short name for logs and health output.
    fn kind(&self) -> &'static str;

    /// Checked evaluation: rejects wrong shapes and non-finite outputs.
    fn predict(&self, x: ArrayView1<'_, f64>) -> Result<f64, InferenceError> {
        if x.len() != self.n_features() {
            return Err(InferenceError::ShapeMismatch {
                expected: self.n_features(),
                actual: x.len(),
            });
        }
        let y = self.evaluate(x)?;
        if !y.is_finite() {
            return Err(InferenceError::NonFiniteOutput(y));
        }
        Ok(y)
    }
}

/// `intercept + coefficients · x`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl RegressionPredictor for LinearModel {
    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn evaluate(&self, x: ArrayView1<'_, f64>) -> Result<f64, InferenceError> {
        let coefficients = Array1::from(self.coefficients.clone());
        Ok(self.intercept + coefficients.dot(&x))
    }

    fn kind(&self) -> &'static str {
        "linear"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    /// `x[feature] <= threshold` descends into `left`.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf { value: f64 },
}

/// Binary regression tree stored as a flat node list; node 0 is the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    pub nodes: Vec<TreeNode>,
}

impl RegressionTree {
    pub fn leaf(value: f64) -> Self {
        Self { nodes: vec![TreeNode::Leaf { value }] }
    }

    fn evaluate(&self, x: ArrayView1<'_, f64>) -> Result<f64, InferenceError> {
        let mut index = 0;
        // A well-formed tree reaches a leaf in fewer steps than it has nodes.
        for _ in 0..self.nodes.len() {
            match self.nodes.get(index) {
                Some(TreeNode::Leaf { value }) => return Ok(*value),
                Some(TreeNode::Split { feature, threshold, left, right }) => {
                    let v = x.get(*feature).ok_or_else(|| {
                        InferenceError::Artifact(format!("split on missing feature {}", feature))
                    })?;
                    index = if *v <= *threshold { *left } else { *right };
                }
                None => {
                    return Err(InferenceError::Artifact(format!(
                        "tree references missing node {}",
                        index
                    )))
                }
            }
        }
        Err(InferenceError::Artifact("tree walk did not reach a leaf".to_string()))
    }

    fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Leaf { value } if !value.is_finite() => {
                    return Err(format!("leaf {} is not finite", i));
                }
                TreeNode::Leaf { .. } => {}
                TreeNode::Split { feature, threshold, left, right } => {
                    if *feature >= n_features {
                        return Err(format!("node {} splits on feature {} of {}", i, feature, n_features));
                    }
                    if threshold.is_nan() {
                        return Err(format!("node {} has a NaN threshold", i));
                    }
                    // Children must point forward, which also rules out cycles.
                    for child in [*left, *right] {
                        if child <= i || child >= self.nodes.len() {
                            return Err(format!("node {} has invalid child {}", i, child));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Aggregation {
    /// Random forest: average of tree outputs.
    Mean,
    /// Gradient boosting: `base_score + learning_rate * sum`.
    Sum { learning_rate: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    pub n_features: usize,
    pub trees: Vec<RegressionTree>,
    pub aggregation: Aggregation,
    pub base_score: f64,
}

impl RegressionPredictor for TreeEnsemble {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn evaluate(&self, x: ArrayView1<'_, f64>) -> Result<f64, InferenceError> {
        if self.trees.is_empty() {
            return Err(InferenceError::Artifact("ensemble has no trees".to_string()));
        }
        let mut sum = 0.0;
        for tree in &self.trees {
            sum += tree.evaluate(x)?;
        }
        Ok(match self.aggregation {
            Aggregation::Mean => self.base_score + sum / self.trees.len() as f64,
            Aggregation::Sum { learning_rate } => self.base_score + learning_rate * sum,
        })
    }

    fn kind(&self) -> &'static str {
        match self.aggregation {
            Aggregation::Mean => "random_forest",
            Aggregation::Sum { .. } => "gradient_boosting",
        }
    }
}

/// Fixed-output stand-in for UI work without a fitted model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstantModel {
    pub value: f64,
}

impl RegressionPredictor for ConstantModel {
    fn n_features(&self) -> usize {
        FEATURE_COUNT
    }

    fn evaluate(&self, _x: ArrayView1<'_, f64>) -> Result<f64, InferenceError> {
        Ok(self.value)
    }

    fn kind(&self) -> &'static str {
        "constant"
    }
}

/// Model families that can be loaded from an artifact file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ModelArtifact {
    Linear(LinearModel),
    TreeEnsemble(TreeEnsemble),
    Constant(ConstantModel),
}

impl ModelArtifact {
    fn inner(&self) -> &dyn RegressionPredictor {
        match self {
            ModelArtifact::Linear(m) => m as &dyn RegressionPredictor,
            ModelArtifact::TreeEnsemble(m) => m as &dyn RegressionPredictor,
            ModelArtifact::Constant(m) => m as &dyn RegressionPredictor,
        }
    }

    /// Structural checks run once at load time.
    pub fn validate(&self) -> Result<(), ArtifactLoadError> {
        if self.inner().n_features() != FEATURE_COUNT {
            return Err(ArtifactLoadError::Invalid(format!(
                "model expects {} features, service provides {}",
                self.inner().n_features(),
                FEATURE_COUNT
            )));
        }
        match self {
            ModelArtifact::Linear(m) => {
                if !m.intercept.is_finite() || m.coefficients.iter().any(|c| !c.is_finite()) {
                    return Err(ArtifactLoadError::Invalid(
                        "linear model has non-finite parameters".to_string(),
                    ));
                }
            }
            ModelArtifact::TreeEnsemble(m) => {
                if m.trees.is_empty() {
                    return Err(ArtifactLoadError::Invalid("ensemble has no trees".to_string()));
                }
                if !m.base_score.is_finite() {
                    return Err(ArtifactLoadError::Invalid("base score is not finite".to_string()));
                }
                if let Aggregation::Sum { learning_rate } = m.aggregation {
                    if !learning_rate.is_finite() {
                        return Err(ArtifactLoadError::Invalid(
                            "learning rate is not finite".to_string(),
                        ));
                    }
                }
                for (i, tree) in m.trees.iter().enumerate() {
                    tree.validate(m.n_features)
                        .map_err(|e| ArtifactLoadError::Invalid(format!("tree {}: {}", i, e)))?;
                }
            }
            ModelArtifact::Constant(m) => {
                if !m.value.is_finite() {
                    return Err(ArtifactLoadError::Invalid(
                        "constant model value is not finite".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }
}

impl RegressionPredictor for ModelArtifact {
    fn n_features(&self) -> usize {
        self.inner().n_features()
    }

    fn evaluate(&self, x: ArrayView1<'_, f64>) -> Result<f64, InferenceError> {
        self.inner().evaluate(x)
    }

    fn kind(&self) -> &'static str {
        self.inner().kind()
    }
}
