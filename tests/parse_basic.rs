//! Integration tests for document loading and the step record model.

mod helpers;

use helpers::*;
use serde_json::json;
use signaljourney::parse::{self, InputSource, OutputTarget, ParameterShape};
use signaljourney::IssueKind;

#[test]
fn parse_linear_pipeline() {
    let json = include_str!("fixtures/linear_pipeline.json");
    let parsed = parse::parse_document(json).expect("Should parse");
    assert!(parsed.rejected.is_empty());

    let doc = &parsed.document;
    assert_eq!(doc.sj_version, "0.1.0");
    assert_eq!(doc.pipeline_info.name, "Basic EEG Preprocessing");
    assert_eq!(doc.processing_steps.len(), 3);

    let ids: Vec<&str> = doc.processing_steps.iter().map(|s| s.step_id.as_str()).collect();
    assert_eq!(ids, vec!["load", "filter", "reference"]);

    let load = doc.step("load").unwrap();
    assert_eq!(load.software.as_ref().unwrap().version, "1.6.1");
    assert!(matches!(load.input_sources[0], InputSource::File(_)));
    assert!(matches!(load.output_targets[0], OutputTarget::InMemory(_)));

    let filter = doc.step("filter").unwrap();
    let refs: Vec<(&str, &str)> = filter
        .output_references()
        .map(|r| (r.step_id.as_str(), r.output_id.as_str()))
        .collect();
    assert_eq!(refs, vec![("load", "Loaded raw data object")]);

    assert!(doc.summary_metrics.is_some());
    assert!(doc.step("reference").unwrap().quality_metrics.is_some());
}

#[test]
fn parameter_list_and_map_read_the_same() {
    let as_list = json!([
        { "name": "l_freq", "value": 1.0, "unit": "Hz" },
        { "name": "h_freq", "value": null }
    ]);
    let as_map = json!({ "l_freq": 1.0, "h_freq": null });

    let mut a = step("filter", &[]);
    a["parameters"] = as_list;
    let mut b = step("filter", &[]);
    b["parameters"] = as_map;

    let a = parse::parse_step(1, &a).unwrap();
    let b = parse::parse_step(1, &b).unwrap();
    assert_eq!(a.parameters.shape, ParameterShape::Records);
    assert_eq!(b.parameters.shape, ParameterShape::Map);

    for name in ["l_freq", "h_freq"] {
        assert_eq!(
            a.parameter_map()[name].value,
            b.parameter_map()[name].value,
            "parameter {} differs",
            name
        );
    }
    assert_eq!(a.parameter_map()["l_freq"].value, json!(1.0));
    assert!(a.parameter_map()["h_freq"].value.is_null());
    assert_eq!(a.parameter_map()["l_freq"].unit.as_deref(), Some("Hz"));
    assert_eq!(b.parameter_map()["l_freq"].unit, None);

    let names: Vec<&String> = a.parameter_map().keys().collect();
    assert_eq!(names, vec!["l_freq", "h_freq"]);
}

#[test]
fn parameters_keep_their_shape_when_serialized() {
    let json = include_str!("fixtures/ica_pipeline.json");
    let parsed = parse::parse_document(json).unwrap();
    let highpass = parsed.document.step("highpass").unwrap();
    let fit = parsed.document.step("fit_ica").unwrap();

    let highpass = serde_json::to_value(highpass).unwrap();
    assert_eq!(
        highpass["parameters"],
        json!([{ "name": "l_freq", "value": 1.0, "unit": "Hz", "dataType": "float" }])
    );
    let fit = serde_json::to_value(fit).unwrap();
    assert_eq!(
        fit["parameters"],
        json!({ "n_components": 20, "method": "fastica", "random_state": 97 })
    );
}

#[test]
fn repeated_parameter_keeps_first_record() {
    let mut s = step("filter", &[]);
    s["parameters"] = json!([
        { "name": "l_freq", "value": 1.0, "unit": "Hz" },
        { "name": "h_freq", "value": 40.0 },
        { "name": "l_freq", "value": 2.0 }
    ]);
    let parsed = parse::parse_step(1, &s).unwrap();
    assert_eq!(parsed.parameters.len(), 2);
    assert_eq!(parsed.parameter_map()["l_freq"].value, json!(1.0));
    assert_eq!(parsed.parameters.duplicates, vec!["l_freq".to_string()]);
}

#[test]
fn absent_parameters_stay_absent() {
    let parsed = parse::parse_step(1, &step("a", &[])).unwrap();
    assert!(parsed.parameters.is_absent());
    assert!(parsed.parameter_map().is_empty());
    let out = serde_json::to_value(&parsed).unwrap();
    assert!(out.get("parameters").is_none());
}

#[test]
fn variable_target_is_addressable_by_name() {
    let json = include_str!("fixtures/ica_pipeline.json");
    let parsed = parse::parse_document(json).unwrap();
    let highpass = parsed.document.step("highpass").unwrap();
    assert_eq!(highpass.output_targets[0].labels(), vec!["High-passed copy", "raw_hp"]);

    let load = parsed.document.step("load").unwrap();
    assert_eq!(load.output_targets[0].labels(), vec!["raw"]);
}

// =============================================================================
// Fatal and per-step rejection
// =============================================================================

#[test]
fn not_json_is_fatal() {
    let err = parse::parse_document("{ not json").unwrap_err();
    assert_eq!(err.kind, IssueKind::MalformedDocument);
    assert!(err.detail.starts_with("Failed to parse signalJourney JSON"));
}

#[test]
fn top_level_array_is_fatal() {
    let err = parse::parse_document("[]").unwrap_err();
    assert_eq!(err.kind, IssueKind::MalformedDocument);
}

#[test]
fn missing_processing_steps_is_fatal() {
    let mut doc = document(vec![]);
    doc.as_object_mut().unwrap().remove("processingSteps");
    let err = parse::parse_document(&doc.to_string()).unwrap_err();
    assert!(err.detail.contains("processingSteps"), "{}", err);
}

#[test]
fn processing_steps_must_be_an_array() {
    let mut doc = document(vec![]);
    doc["processingSteps"] = json!({ "load": {} });
    let err = parse::parse_document(&doc.to_string()).unwrap_err();
    assert_eq!(err.detail, "Top-level field 'processingSteps' must be an array");
}

#[test]
fn bad_step_is_set_aside() {
    let doc = document(vec![
        step("load", &[]),
        json!({ "stepId": "broken", "name": "Broken" }),
        json!(42),
        step("save", &["load"]),
    ]);
    let parsed = parse::parse_document(&doc.to_string()).unwrap();

    let ids: Vec<&str> = parsed
        .document
        .processing_steps
        .iter()
        .map(|s| s.step_id.as_str())
        .collect();
    assert_eq!(ids, vec!["load", "save"]);

    assert_eq!(parsed.rejected.len(), 2);
    assert_eq!(parsed.rejected[0].position, 2);
    assert_eq!(parsed.rejected[0].step_id.as_deref(), Some("broken"));
    assert_eq!(parsed.rejected[1].position, 3);
    assert_eq!(parsed.rejected[1].step_id, None);
    assert!(parsed
        .rejected
        .iter()
        .flat_map(|r| &r.errors)
        .all(|e| e.kind == IssueKind::MalformedStep));
    assert_eq!(parsed.positions, vec![1, 4]);
    assert_eq!(parsed.rejected_ids().collect::<Vec<_>>(), vec!["broken"]);
}

#[test]
fn previous_step_output_requires_output_id() {
    let mut s = step("filter", &[]);
    s["inputSources"] = json!([{ "sourceType": "previousStepOutput", "stepId": "load" }]);
    let errs = parse::parse_step(1, &s).unwrap_err();
    assert_eq!(kinds(&errs), vec![IssueKind::MalformedStep]);
    assert_eq!(errs[0].step_id.as_deref(), Some("filter"));
}
