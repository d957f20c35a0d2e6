//! Top-level contract checks layered on top of the graph validation.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ErrorRecord;
use crate::parse::types::{InputSource, OutputTarget, PipelineDocument, ProcessingStep};
use crate::parse::RejectedStep;

static SEMVER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.\d+\.\d+$").expect("semver pattern compiles"));

pub fn is_version_string(s: &str) -> bool {
    SEMVER.is_match(s)
}

/// Version strings, non-empty step list, pipeline info.
///
/// `step_count` is the number of step records the document carried,
/// including any that failed to decode.
pub fn check_header(document: &PipelineDocument, step_count: usize) -> Vec<ErrorRecord> {
    let mut errors = Vec::new();

    for (field, value) in [
        ("sj_version", &document.sj_version),
        ("schema_version", &document.schema_version),
    ] {
        if !is_version_string(value) {
            errors.push(ErrorRecord::malformed_document(format!(
                "'{}' must be a MAJOR.MINOR.PATCH version string, found '{}'",
                field, value
            )));
        }
    }

    if document.description.trim().is_empty() {
        errors.push(ErrorRecord::malformed_document(
            "Document 'description' must not be empty",
        ));
    }

    let info = &document.pipeline_info;
    for (field, value) in [
        ("name", &info.name),
        ("description", &info.description),
        ("pipelineVersion", &info.pipeline_version),
    ] {
        if value.trim().is_empty() {
            errors.push(ErrorRecord::malformed_document(format!(
                "pipelineInfo.{} must not be empty",
                field
            )));
        }
    }

    if step_count == 0 {
        errors.push(ErrorRecord::malformed_document(
            "processingSteps must contain at least one step",
        ));
    }

    errors
}

/// Required step fields, step-ID uniqueness, parameter-name uniqueness, and
/// the type-specific string fields of inputs and outputs.
///
/// `positions[i]` is the 1-based position of `steps[i]` in
/// `processingSteps`. Rejected steps that kept a readable `stepId` take part
/// in the uniqueness check at their own position.
pub fn check_steps(
    steps: &[ProcessingStep],
    positions: &[usize],
    rejected: &[RejectedStep],
) -> Vec<ErrorRecord> {
    let mut records: Vec<(usize, &str, Option<&ProcessingStep>)> = steps
        .iter()
        .zip(positions)
        .map(|(step, &position)| (position, step.step_id.as_str(), Some(step)))
        .chain(
            rejected
                .iter()
                .filter_map(|r| r.step_id.as_deref().map(|id| (r.position, id, None))),
        )
        .collect();
    records.sort_by_key(|(position, _, _)| *position);

    let mut errors = Vec::new();
    let mut first_seen: HashMap<&str, usize> = HashMap::new();

    for (position, id, step) in records {
        if !id.trim().is_empty() {
            match first_seen.get(id) {
                Some(&first) => errors.push(ErrorRecord::duplicate_step(id, first)),
                None => {
                    first_seen.insert(id, position);
                }
            }
        }
        if let Some(step) = step {
            check_step(position, step, &mut errors);
        }
    }

    errors
}

fn check_step(position: usize, step: &ProcessingStep, errors: &mut Vec<ErrorRecord>) {
    let step_id = (!step.step_id.trim().is_empty()).then(|| step.step_id.clone());

    for (field, value) in [
        ("stepId", &step.step_id),
        ("name", &step.name),
        ("description", &step.description),
    ] {
        if value.trim().is_empty() {
            errors.push(ErrorRecord::malformed_step(
                step_id.clone(),
                format!("Processing step #{} has an empty '{}'", position, field),
            ));
        }
    }

    for name in &step.parameters.duplicates {
        errors.push(ErrorRecord::malformed_step(
            step_id.clone(),
            format!(
                "Processing step #{} lists parameter '{}' more than once",
                position, name
            ),
        ));
    }

    check_inputs(step, &step_id, errors);
    check_outputs(step, &step_id, errors);
}

fn check_inputs(step: &ProcessingStep, step_id: &Option<String>, errors: &mut Vec<ErrorRecord>) {
    for (i, input) in step.input_sources.iter().enumerate() {
        let blank = match input {
            InputSource::File(s) | InputSource::Resource(s) => blank_field("location", &s.location),
            InputSource::PreviousStepOutput(r) => {
                blank_field("stepId", &r.step_id).or_else(|| blank_field("outputId", &r.output_id))
            }
            InputSource::Variable(v) => blank_field("name", &v.name),
            InputSource::InlineData(_) | InputSource::UserDefined(_) => None,
        };
        if let Some(field) = blank {
            errors.push(ErrorRecord::malformed_step(
                step_id.clone(),
                format!(
                    "inputSources[{}] ({}) has an empty '{}'",
                    i,
                    input.source_type(),
                    field
                ),
            ));
        }
    }
}

fn check_outputs(step: &ProcessingStep, step_id: &Option<String>, errors: &mut Vec<ErrorRecord>) {
    for (i, output) in step.output_targets.iter().enumerate() {
        let blank = match output {
            OutputTarget::File(t) => blank_field("location", &t.location),
            OutputTarget::Variable(t) => blank_field("name", &t.name),
            _ => None,
        };
        if let Some(field) = blank {
            errors.push(ErrorRecord::malformed_step(
                step_id.clone(),
                format!(
                    "outputTargets[{}] ({}) has an empty '{}'",
                    i,
                    output.target_type(),
                    field
                ),
            ));
        }
    }
}

fn blank_field(field: &'static str, value: &str) -> Option<&'static str> {
    value.trim().is_empty().then_some(field)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_pattern() {
        assert!(is_version_string("0.1.0"));
        assert!(is_version_string("10.20.300"));
        assert!(!is_version_string("1.0"));
        assert!(!is_version_string("v1.0.0"));
        assert!(!is_version_string("1.0.0-beta"));
    }
}
