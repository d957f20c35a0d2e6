//! Parse phase: signalJourney JSON → typed document.
//!
//! Top-level shape problems are fatal and reported as one error. Step records
//! are decoded one by one; a bad step is set aside and the rest still load.

pub mod step;
pub mod types;

pub use step::parse_step;
pub use types::*;

use serde::Deserialize;
use serde_json::Value;

use crate::error::ErrorRecord;

const REQUIRED_TOP_LEVEL: [(&str, JsonKind); 5] = [
    ("sj_version", JsonKind::String),
    ("schema_version", JsonKind::String),
    ("description", JsonKind::String),
    ("pipelineInfo", JsonKind::Object),
    ("processingSteps", JsonKind::Array),
];

#[derive(Debug, Clone, Copy)]
enum JsonKind {
    String,
    Object,
    Array,
}

impl JsonKind {
    fn matches(self, value: &Value) -> bool {
        match self {
            JsonKind::String => value.is_string(),
            JsonKind::Object => value.is_object(),
            JsonKind::Array => value.is_array(),
        }
    }

    fn name(self) -> &'static str {
        match self {
            JsonKind::String => "a string",
            JsonKind::Object => "an object",
            JsonKind::Array => "an array",
        }
    }
}

/// A step record that could not be decoded.
#[derive(Debug, Clone)]
pub struct RejectedStep {
    /// 1-based position in `processingSteps`.
    pub position: usize,
    /// The record's `stepId`, when it was readable.
    pub step_id: Option<String>,
    /// Every problem found in the record, in field order.
    pub errors: Vec<ErrorRecord>,
}

#[derive(Debug, Clone)]
pub struct ParsedDocument {
    /// The document holding every step that decoded cleanly, in order.
    pub document: PipelineDocument,
    /// 1-based position in `processingSteps` of each accepted step.
    pub positions: Vec<usize>,
    pub rejected: Vec<RejectedStep>,
}

impl ParsedDocument {
    /// IDs of rejected steps that still named themselves.
    pub fn rejected_ids(&self) -> impl Iterator<Item = &str> {
        self.rejected.iter().filter_map(|r| r.step_id.as_deref())
    }
}

/// Deserialize a signalJourney JSON string.
pub fn parse_document(json: &str) -> Result<ParsedDocument, ErrorRecord> {
    let value: Value = serde_json::from_str(json).map_err(|e| {
        ErrorRecord::malformed_document(format!("Failed to parse signalJourney JSON: {}", e))
    })?;
    parse_value(value)
}

/// Same as [`parse_document`] for an already-decoded JSON value.
pub fn parse_value(value: Value) -> Result<ParsedDocument, ErrorRecord> {
    let Value::Object(mut root) = value else {
        return Err(ErrorRecord::malformed_document(
            "signalJourney document must be a JSON object",
        ));
    };

    for (key, kind) in REQUIRED_TOP_LEVEL {
        match root.get(key) {
            None => {
                return Err(ErrorRecord::malformed_document(format!(
                    "Missing required top-level field '{}'",
                    key
                )));
            }
            Some(v) if !kind.matches(v) => {
                return Err(ErrorRecord::malformed_document(format!(
                    "Top-level field '{}' must be {}",
                    key,
                    kind.name()
                )));
            }
            Some(_) => {}
        }
    }

    let raw_steps = match root.insert("processingSteps".into(), Value::Array(Vec::new())) {
        Some(Value::Array(steps)) => steps,
        _ => Vec::new(),
    };

    let mut document = PipelineDocument::deserialize(Value::Object(root)).map_err(|e| {
        ErrorRecord::malformed_document(format!("Invalid document header: {}", e))
    })?;

    let mut positions = Vec::with_capacity(raw_steps.len());
    let mut rejected = Vec::new();
    for (i, raw) in raw_steps.iter().enumerate() {
        let position = i + 1;
        match parse_step(position, raw) {
            Ok(step) => {
                document.processing_steps.push(step);
                positions.push(position);
            }
            Err(errors) => rejected.push(RejectedStep {
                position,
                step_id: step::readable_step_id(raw),
                errors,
            }),
        }
    }

    tracing::debug!(
        accepted = document.processing_steps.len(),
        rejected = rejected.len(),
        "parsed signalJourney document"
    );

    Ok(ParsedDocument {
        document,
        positions,
        rejected,
    })
}
