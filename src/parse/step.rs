//! Per-record loading of processing steps.

use serde::Deserialize;
use serde_json::Value;

use super::types::ProcessingStep;
use crate::error::ErrorRecord;

const REQUIRED_STEP_FIELDS: [&str; 3] = ["stepId", "name", "description"];

/// Decode one entry of `processingSteps`.
///
/// `position` is the 1-based index of the entry, used in messages when the
/// record has no readable `stepId`. Every missing or blank required field is
/// reported; the schema decode only runs once those are all present.
pub fn parse_step(position: usize, value: &Value) -> Result<ProcessingStep, Vec<ErrorRecord>> {
    let Some(object) = value.as_object() else {
        return Err(vec![ErrorRecord::malformed_step(
            None,
            format!("Processing step #{} is not a JSON object", position),
        )]);
    };

    let step_id = readable_step_id(value);

    let errors: Vec<ErrorRecord> = REQUIRED_STEP_FIELDS
        .iter()
        .filter_map(|field| {
            let problem = match object.get(*field) {
                None | Some(Value::Null) => "is missing required field",
                Some(Value::String(s)) if s.trim().is_empty() => "has an empty",
                Some(Value::String(_)) => return None,
                Some(_) => "has a non-string",
            };
            Some(ErrorRecord::malformed_step(
                step_id.clone(),
                format!("Processing step #{} {} '{}'", position, problem, field),
            ))
        })
        .collect();
    if !errors.is_empty() {
        return Err(errors);
    }

    ProcessingStep::deserialize(value).map_err(|e| {
        vec![ErrorRecord::malformed_step(
            step_id,
            format!("Processing step #{} does not match the step schema: {}", position, e),
        )]
    })
}

/// The record's `stepId` if it is a non-blank string.
pub fn readable_step_id(value: &Value) -> Option<String> {
    value
        .get("stepId")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}
