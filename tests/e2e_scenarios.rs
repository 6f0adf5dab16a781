mod common;

use chrono::{TimeZone, Utc};
use serde_json::json;

use common::{boosted_model, linear_model, reference_inputs, service, write_artifacts};
use concrete_strength::inference::artifact::save_scaler;
use concrete_strength::inference::ScalingParameters;
use concrete_strength::mix::decode_code;
use concrete_strength::server::MixRequest;
use concrete_strength::{
    ArtifactLoadError, CompactCodeEncoder, CompactPayload, InferenceService, MixError, MixRecordBuilder,
    ReportRenderer, ValidationError,
};

#[test]
fn test_e2e_reference_mix_to_report() {
    let svc = service(&boosted_model());

    let prediction = svc.predict(&reference_inputs()).unwrap();
    assert!(prediction.strength_mpa.is_finite());

    let record = MixRecordBuilder::new("Mix-1")
        .project("Warehouse Slab")
        .location("Bay 3")
        .generated_at(Utc.with_ymd_and_hms(2024, 11, 2, 14, 5, 0).unwrap())
        .build(&prediction)
        .unwrap();
    let html = ReportRenderer::new().render(&record);

    for literal in ["Mix-1", "300", "180", "28"] {
        assert!(html.contains(literal), "report is missing {}", literal);
    }
    assert!(html.contains(&prediction.formatted_strength()));
    assert!(!html.contains("class=\"notes\""));
}

#[test]
fn test_e2e_code_round_trip() {
    let svc = service(&linear_model());
    let prediction = svc.predict(&reference_inputs()).unwrap();
    let record = MixRecordBuilder::new("Mix-1")
        .generated_at(Utc.with_ymd_and_hms(2024, 11, 2, 14, 5, 0).unwrap())
        .build(&prediction)
        .unwrap();

    let code = CompactCodeEncoder::new().encode(&record).unwrap();
    let text = decode_code(&code.image).unwrap();
    assert_eq!(text, code.text);

    let payload = CompactPayload::from_text(&text).unwrap();
    assert_eq!(payload, CompactPayload::from_record(&record));
    assert_eq!(payload.strength, record.formatted_strength());
    assert_eq!(payload.age, 28);
}

#[test]
fn test_e2e_same_inputs_same_prediction() {
    let svc = service(&boosted_model());
    let a = svc.predict(&reference_inputs()).unwrap();
    let b = svc.predict(&reference_inputs()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_e2e_swapped_values_change_prediction() {
    for model in [linear_model(), boosted_model()] {
        let svc = service(&model);
        let base = svc.predict(&reference_inputs()).unwrap();

        let mut swapped = reference_inputs();
        swapped["Cement"] = json!(180);
        swapped["Water"] = json!(300);
        let other = svc.predict(&swapped).unwrap();

        assert_ne!(base.strength_mpa, other.strength_mpa);
    }
}

#[test]
fn test_e2e_boundary_mix_is_finite() {
    let svc = service(&boosted_model());
    let inputs = json!({
        "Cement": 0, "Blast_furn_slag": 0, "Fly_Ash": 0, "Water": 0,
        "Superplasticizer": 0, "Coarse_Agg": 0, "fine_Agg": 0, "Age": 1
    });
    assert!(svc.predict(&inputs).unwrap().strength_mpa.is_finite());
}

#[test]
fn test_e2e_rejections_leave_service_usable() {
    let svc = service(&linear_model());

    let mut missing = reference_inputs();
    missing.as_object_mut().unwrap().remove("fine_Agg");
    assert!(matches!(
        svc.predict(&missing),
        Err(MixError::Validation(ValidationError::Missing("fine_Agg")))
    ));

    let mut negative = reference_inputs();
    negative["Water"] = json!(-180);
    assert!(matches!(
        svc.predict(&negative),
        Err(MixError::Validation(ValidationError::Negative { .. }))
    ));

    assert!(svc.predict(&reference_inputs()).is_ok());
}

#[test]
fn test_e2e_startup_fails_without_artifacts() {
    let artifacts = write_artifacts(&linear_model());
    let missing = artifacts.dir.path().join("missing_model.bin");
    let err = InferenceService::load(&artifacts.scaler, &missing).err().unwrap();
    assert!(matches!(err, ArtifactLoadError::Io { .. }));
}

#[test]
fn test_e2e_json_artifacts_are_accepted() {
    let artifacts = write_artifacts(&linear_model());
    let json_scaler = artifacts.dir.path().join("scaler.json");
    save_scaler(&json_scaler, &ScalingParameters::new(vec![0.0; 8], vec![1.0; 8]).unwrap()).unwrap();

    let svc = InferenceService::load(&json_scaler, &artifacts.model).unwrap();
    assert_eq!(svc.model_kind(), "linear");
}

#[test]
fn test_e2e_mix_request_builds_record() {
    let svc = service(&linear_model());
    let request: MixRequest = serde_json::from_value(json!({
        "name": "  Mix-1  ",
        "notes": "",
        "timestamp": "2024-11-02T14:05:00Z",
        "inputs": reference_inputs(),
    }))
    .unwrap();

    let record = request.into_record(&svc).unwrap();
    assert_eq!(record.name, "Mix-1");
    assert_eq!(record.notes, None);
    assert_eq!(record.timestamp_label(), "2024-11-02 14:05:00 UTC");

    let bad: MixRequest = serde_json::from_value(json!({
        "name": "Mix-1",
        "timestamp": "not a time",
        "inputs": reference_inputs(),
    }))
    .unwrap();
    assert!(matches!(
        bad.into_record(&svc),
        Err(MixError::Validation(ValidationError::Timestamp { .. }))
    ));
}
