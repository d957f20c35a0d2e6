#![allow(dead_code)]

use serde_json::{json, Value};
use signaljourney::{validate_json, ErrorRecord, IssueKind, ValidationOptions, ValidationReport};

// =============================================================================
// Document builders
// =============================================================================

/// Minimal valid header around the given step records.
pub fn document(steps: Vec<Value>) -> Value {
    json!({
        "sj_version": "0.1.0",
        "schema_version": "0.1.0",
        "description": "Test pipeline",
        "pipelineInfo": {
            "name": "Test",
            "description": "Test pipeline info",
            "pipelineVersion": "1.0.0"
        },
        "processingSteps": steps
    })
}

/// A step with no inputs or outputs.
pub fn step(id: &str, depends_on: &[&str]) -> Value {
    json!({
        "stepId": id,
        "name": format!("Step {}", id),
        "description": format!("Test step {}", id),
        "dependsOn": depends_on
    })
}

/// A step that writes one in-memory output described as `output`.
pub fn producer(id: &str, output: &str) -> Value {
    let mut s = step(id, &[]);
    s["outputTargets"] = json!([{ "targetType": "in-memory", "description": output }]);
    s
}

/// A step reading `output` of `from`, optionally declaring the dependency.
pub fn consumer(id: &str, from: &str, output: &str, declare: bool) -> Value {
    let depends_on: &[&str] = if declare { &[from] } else { &[] };
    let mut s = step(id, depends_on);
    s["inputSources"] = json!([{
        "sourceType": "previousStepOutput",
        "stepId": from,
        "outputId": output
    }]);
    s
}

// =============================================================================
// Validation shortcuts
// =============================================================================

pub fn validate_value(doc: &Value) -> ValidationReport {
    validate_json(&doc.to_string(), &ValidationOptions::default())
}

pub fn validate_steps(steps: Vec<Value>) -> ValidationReport {
    validate_value(&document(steps))
}

pub fn kinds(records: &[ErrorRecord]) -> Vec<IssueKind> {
    records.iter().map(|e| e.kind).collect()
}

pub fn order(report: &ValidationReport) -> Vec<&str> {
    report
        .execution_order
        .as_ref()
        .map(|o| o.iter().map(String::as_str).collect())
        .unwrap_or_default()
}
