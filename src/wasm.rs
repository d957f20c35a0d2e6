//! WASM entry points for browser / Node use.

use wasm_bindgen::prelude::*;

use crate::error::ErrorRecord;
use crate::normalize::{self, NormalizedParseResult};
use crate::options::ValidationOptions;
use crate::parser::Language;
use crate::validate::{self, ValidationReport};

/// Validate a signalJourney JSON document.
/// `options_json` may be empty; returns a `ValidationReport` object.
#[wasm_bindgen]
pub fn validate_document(json: &str, options_json: &str) -> JsValue {
    let report = validate_document_inner(json, options_json);
    serde_wasm_bindgen::to_value(&report).unwrap_or(JsValue::NULL)
}

fn validate_document_inner(json: &str, options_json: &str) -> ValidationReport {
    match ValidationOptions::from_json(options_json) {
        Ok(options) => validate::validate_json(json, &options),
        Err(e) => ValidationReport::fatal(ErrorRecord::malformed_document(format!(
            "Failed to parse validation options: {}",
            e
        ))),
    }
}

/// Normalize raw parser output JSON. `language` may be empty.
/// Returns a `NormalizedParseResult` object.
#[wasm_bindgen]
pub fn normalize_parser_output(json: &str, language: &str) -> JsValue {
    let result = normalize_parser_output_inner(json, language);
    serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
}

fn normalize_parser_output_inner(json: &str, language: &str) -> NormalizedParseResult {
    let language = if language.trim().is_empty() {
        None
    } else {
        match language.parse::<Language>() {
            Ok(lang) => Some(lang),
            Err(e) => {
                return NormalizedParseResult {
                    errors: vec![e.to_string()],
                    ..Default::default()
                };
            }
        }
    };

    match serde_json::from_str::<serde_json::Value>(json) {
        Ok(raw) => normalize::normalize_parse_result(&raw, language),
        Err(e) => NormalizedParseResult {
            language: language.map(|l| l.as_str().to_string()),
            errors: vec![format!("Failed to parse parser output JSON: {}", e)],
            ..Default::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_options_are_fatal() {
        let report = validate_document_inner("{}", "{not json");
        assert!(!report.valid);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].detail.contains("validation options"));
    }

    #[test]
    fn unknown_language_is_reported() {
        let result = normalize_parser_output_inner("{}", "fortran");
        assert_eq!(result.errors, vec!["unsupported language: 'fortran'".to_string()]);
    }
}
