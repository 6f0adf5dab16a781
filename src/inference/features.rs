//! Feature vector and raw-input validation
//!
//! Named measurements are mapped to their model position exactly once, here.
//! Everything downstream works on the positional `FeatureVector`.

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::ValidationError;

pub const FEATURE_COUNT: usize = 8;

/// One of the eight mix-design measurements, in model order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Feature {
    Cement,
    BlastFurnaceSlag,
    FlyAsh,
    Water,
    Superplasticizer,
    CoarseAggregate,
    FineAggregate,
    Age,
}

impl Feature {
    /// Positional order the scaler and model were fitted on.
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::Cement,
        Feature::BlastFurnaceSlag,
        Feature::FlyAsh,
        Feature::Water,
        Feature::Superplasticizer,
        Feature::CoarseAggregate,
        Feature::FineAggregate,
        Feature::Age,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Request key used on the wire.
    pub const fn key(self) -> &'static str {
        match self {
            Feature::Cement => "Cement",
            Feature::BlastFurnaceSlag => "Blast_furn_slag",
            Feature::FlyAsh => "Fly_Ash",
            Feature::Water => "Water",
            Feature::Superplasticizer => "Superplasticizer",
            Feature::CoarseAggregate => "Coarse_Agg",
            Feature::FineAggregate => "fine_Agg",
            Feature::Age => "Age",
        }
    }

    /// Human-readable label for reports.
    pub const fn label(self) -> &'static str {
        match self {
            Feature::Cement => "Cement",
            Feature::BlastFurnaceSlag => "Blast Furnace Slag",
            Feature::FlyAsh => "Fly Ash",
            Feature::Water => "Water",
            Feature::Superplasticizer => "Superplasticizer",
            Feature::CoarseAggregate => "Coarse Aggregate",
            Feature::FineAggregate => "Fine Aggregate",
            Feature::Age => "Age",
        }
    }

    pub const fn unit(self) -> &'static str {
        match self {
            Feature::Age => "days",
            _ => "kg/m³",
        }
    }

    pub const fn is_mass(self) -> bool {
        !matches!(self, Feature::Age)
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }

    fn check(self, value: f64) -> Result<f64, ValidationError> {
        let field = self.key();
        if !value.is_finite() {
            return Err(ValidationError::NonFinite { field });
        }
        if self.is_mass() {
            if value < 0.0 {
                return Err(ValidationError::Negative { field, value });
            }
        } else {
            if value < 1.0 {
                return Err(ValidationError::AgeNotPositive(value));
            }
            if value.fract() != 0.0 {
                return Err(ValidationError::AgeNotInteger(value));
            }
            if value > f64::from(u32::MAX) {
                return Err(ValidationError::AgeTooLarge(value));
            }
        }
        // Normalise -0.0 so identical inputs are bit-identical downstream.
        Ok(value + 0.0)
    }
}

/// Validated measurements in fixed model order.
///
/// Masses are finite and non-negative (kg/m³); age is a whole number of days >= 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "Map<String, Value>",
    into = "Map<String, Value>"
)]
pub struct FeatureVector {
    values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    /// Validate a positional array. Either every field passes or nothing is built.
    pub fn from_values(values: [f64; FEATURE_COUNT]) -> Result<Self, ValidationError> {
        let mut checked = [0.0; FEATURE_COUNT];
        for feature in Feature::ALL {
            checked[feature.index()] = feature.check(values[feature.index()])?;
        }
        Ok(Self { values: checked })
    }

    /// Validate a JSON request body keyed by the canonical feature names.
    pub fn from_json(value: &Value) -> Result<Self, ValidationError> {
        match value {
            Value::Object(map) => Self::from_map(map),
            _ => Err(ValidationError::NotAnObject),
        }
    }

    pub fn from_map(map: &Map<String, Value>) -> Result<Self, ValidationError> {
        let mut values = [0.0; FEATURE_COUNT];
        for feature in Feature::ALL {
            let field = feature.key();
            let raw = map.get(field).ok_or(ValidationError::Missing(field))?;
            let number = raw.as_f64().ok_or_else(|| ValidationError::NotNumeric {
                field,
                found: describe(raw),
            })?;
            values[feature.index()] = feature.check(number)?;
        }

        for key in map.keys().filter(|k| Feature::from_key(k).is_none()) {
            debug!("Ignoring unknown measurement field: {}", key);
        }

        Ok(Self { values })
    }

    pub fn get(&self, feature: Feature) -> f64 {
        self.values[feature.index()]
    }

    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.values
    }

    pub fn age_days(&self) -> u32 {
        self.get(Feature::Age) as u32
    }

    /// The seven mass measurements, in model order.
    pub fn composition(&self) -> impl Iterator<Item = (Feature, f64)> + '_ {
        Feature::ALL
            .into_iter()
            .filter(|f| f.is_mass())
            .map(move |f| (f, self.get(f)))
    }

    pub fn to_array(&self) -> Array1<f64> {
        Array1::from(self.values.to_vec())
    }
}

impl TryFrom<Map<String, Value>> for FeatureVector {
    type Error = ValidationError;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        Self::from_map(&map)
    }
}

impl From<FeatureVector> for Map<String, Value> {
    fn from(vector: FeatureVector) -> Self {
        Feature::ALL
            .into_iter()
            .map(|f| {
                let value = vector.get(f);
                let json = if f.is_mass() {
                    Value::from(value)
                } else {
                    Value::from(vector.age_days())
                };
                (f.key().to_string(), json)
            })
            .collect()
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(_) => "a boolean".to_string(),
        Value::String(s) => format!("the string {:?}", s),
        Value::Array(_) => "an array".to_string(),
        Value::Object(_) => "an object".to_string(),
        Value::Number(n) => n.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reference_input() -> Value {
        json!({
            "Cement": 300, "Blast_furn_slag": 0, "Fly_Ash": 0, "Water": 180,
            "Superplasticizer": 5, "Coarse_Agg": 1000, "fine_Agg": 800, "Age": 28
        })
    }

    #[test]
    fn test_positions_follow_model_order() {
        let input = json!({
            "Age": 7, "fine_Agg": 7.0, "Coarse_Agg": 6.0, "Superplasticizer": 5.0,
            "Water": 4.0, "Fly_Ash": 3.0, "Blast_furn_slag": 2.0, "Cement": 1.0
        });
        let vector = FeatureVector::from_json(&input).unwrap();
        assert_eq!(vector.values(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 7.0]);
        assert_eq!(vector.age_days(), 7);
    }

    #[test]
    fn test_rejects_missing_field() {
        let mut input = reference_input();
        input.as_object_mut().unwrap().remove("Water");
        assert_eq!(
            FeatureVector::from_json(&input),
            Err(ValidationError::Missing("Water"))
        );
    }

    #[test]
    fn test_rejects_non_numeric_field() {
        let mut input = reference_input();
        input["Cement"] = json!("three hundred");
        assert!(matches!(
            FeatureVector::from_json(&input),
            Err(ValidationError::NotNumeric { field: "Cement", .. })
        ));

        input["Cement"] = json!(true);
        assert!(matches!(
            FeatureVector::from_json(&input),
            Err(ValidationError::NotNumeric { field: "Cement", .. })
        ));
    }

    #[test]
    fn test_rejects_negative_mass() {
        let mut input = reference_input();
        input["Fly_Ash"] = json!(-0.5);
        assert_eq!(
            FeatureVector::from_json(&input),
            Err(ValidationError::Negative { field: "Fly_Ash", value: -0.5 })
        );
    }

    #[test]
    fn test_rejects_bad_age() {
        let mut input = reference_input();
        input["Age"] = json!(0);
        assert_eq!(
            FeatureVector::from_json(&input),
            Err(ValidationError::AgeNotPositive(0.0))
        );

        input["Age"] = json!(3.5);
        assert_eq!(
            FeatureVector::from_json(&input),
            Err(ValidationError::AgeNotInteger(3.5))
        );
    }

    #[test]
    fn test_rejects_age_beyond_day_counter() {
        let mut input = reference_input();
        input["Age"] = json!(1e10);
        assert_eq!(
            FeatureVector::from_json(&input),
            Err(ValidationError::AgeTooLarge(1e10))
        );

        input["Age"] = json!(u32::MAX);
        let vector = FeatureVector::from_json(&input).unwrap();
        assert_eq!(vector.age_days(), u32::MAX);
    }

    #[test]
    fn test_rejects_non_object_body() {
        assert_eq!(
            FeatureVector::from_json(&json!([1, 2, 3])),
            Err(ValidationError::NotAnObject)
        );
    }

    #[test]
    fn test_accepts_zero_composition_and_one_day() {
        let vector = FeatureVector::from_values([0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0]).unwrap();
        assert_eq!(vector.age_days(), 1);
        assert!(vector.composition().all(|(_, v)| v == 0.0));
    }

    #[test]
    fn test_from_values_rejects_nan() {
        let mut values = [1.0; FEATURE_COUNT];
        values[3] = f64::NAN;
        assert_eq!(
            FeatureVector::from_values(values),
            Err(ValidationError::NonFinite { field: "Water" })
        );
    }

    #[test]
    fn test_extra_keys_are_ignored() {
        let mut input = reference_input();
        input["Colour"] = json!("grey");
        assert!(FeatureVector::from_json(&input).is_ok());
    }

    #[test]
    fn test_serde_uses_canonical_keys() {
        let vector: FeatureVector = serde_json::from_value(reference_input()).unwrap();
        let back = serde_json::to_value(vector).unwrap();
        assert_eq!(back["fine_Agg"], json!(800.0));
        assert_eq!(back["Age"], json!(28));

        let bad = json!({ "Cement": 1 });
        assert!(serde_json::from_value::<FeatureVector>(bad).is_err());
    }

    #[test]
    fn test_composition_excludes_age() {
        let vector = FeatureVector::from_json(&reference_input()).unwrap();
        let features: Vec<Feature> = vector.composition().map(|(f, _)| f).collect();
        assert_eq!(features.len(), 7);
        assert!(!features.contains(&Feature::Age));
    }
}
