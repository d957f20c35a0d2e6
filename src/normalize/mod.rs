//! Output normalization: tool-specific parser output → `NormalizedParseResult`.
//!
//! Best-effort and additive. Unknown fields are ignored, missing ones take
//! defaults, and records without a name are dropped with a note in `errors`.
//! Normalizing an already-normalized result returns it unchanged.

pub mod fields;
pub mod parameters;
pub mod types;

pub use parameters::{normalize_parameters, ListRole};
pub use types::*;

use serde_json::Value;

use self::fields::Object;
use crate::parser::Language;

const DEFAULT_CONFIDENCE: f64 = 1.0;
const DEFAULT_SCOPE: &str = "global";

/// Normalize one raw parser result. `language`, when given, overrides any
/// language tag carried by the raw output.
pub fn normalize_parse_result(raw: &Value, language: Option<Language>) -> NormalizedParseResult {
    let mut result = NormalizedParseResult::default();

    let Some(obj) = raw.as_object() else {
        result.language = language.map(|l| l.as_str().to_string());
        result.errors.push(format!(
            "Parser output must be a JSON object, found {}",
            json_kind(raw)
        ));
        return result;
    };

    result.language = language
        .map(|l| l.as_str().to_string())
        .or_else(|| fields::string(obj, &["language"]));
    result.source_file = fields::string(obj, &["source_file", "file_path"]);

    for (i, item) in fields::array(obj, &["function_calls", "calls"]).iter().enumerate() {
        match item.as_object().and_then(normalize_call) {
            Some(call) => result.function_calls.push(call),
            None => result.errors.push(format!("Function call #{} has no name", i + 1)),
        }
    }

    for (i, item) in fields::array(obj, &["function_definitions", "function_defs"])
        .iter()
        .enumerate()
    {
        match item.as_object().and_then(normalize_definition) {
            Some(def) => result.function_definitions.push(def),
            None => result
                .errors
                .push(format!("Function definition #{} has no name", i + 1)),
        }
    }

    for (i, item) in fields::array(obj, &["imports"]).iter().enumerate() {
        match normalize_import(item) {
            Some(import) => result.imports.push(import),
            None => result.errors.push(format!("Import #{} has no name", i + 1)),
        }
    }

    for (i, item) in fields::array(obj, &["variables"]).iter().enumerate() {
        match item.as_object().and_then(normalize_variable) {
            Some(var) => result.variables.push(var),
            None => result.errors.push(format!("Variable #{} has no name", i + 1)),
        }
    }

    collect_errors(obj, &mut result.errors);

    tracing::debug!(
        language = result.language.as_deref().unwrap_or("unknown"),
        calls = result.function_calls.len(),
        definitions = result.function_definitions.len(),
        imports = result.imports.len(),
        errors = result.errors.len(),
        "normalized parser output"
    );

    result
}

pub fn normalize_call(obj: &Object) -> Option<FunctionCall> {
    let name = fields::string(obj, &["name", "func_name"])?;
    Some(FunctionCall {
        qualified_name: fields::string(obj, &["qualified_name", "full_name"])
            .unwrap_or_else(|| name.clone()),
        arguments: normalize_parameters(
            fields::get(obj, &["arguments", "args"]),
            ListRole::Arguments,
        ),
        location: location(obj),
        caller: fields::string(obj, &["caller"]),
        class_context: fields::string(obj, &["class_context"]),
        confidence: confidence(obj),
        name,
    })
}

pub fn normalize_definition(obj: &Object) -> Option<FunctionDefinition> {
    let name = fields::string(obj, &["name"])?;
    let class_context = fields::string(obj, &["class_context"]);
    Some(FunctionDefinition {
        qualified_name: fields::string(obj, &["qualified_name"]).unwrap_or_else(|| name.clone()),
        parameters: normalize_parameters(
            fields::get(obj, &["parameters", "params"]),
            ListRole::Parameters,
        ),
        return_annotation: fields::string(obj, &["return_annotation", "returns"]),
        docstring: fields::string(obj, &["docstring"]),
        decorators: fields::strings(obj, &["decorators"]),
        location: location(obj),
        is_method: fields::flag(obj, &["is_method"]) || class_context.is_some(),
        is_async: fields::flag(obj, &["is_async"]),
        class_context,
        confidence: confidence(obj),
        name,
    })
}

/// Imports may be records or bare module strings.
pub fn normalize_import(item: &Value) -> Option<Import> {
    let obj = match item {
        Value::String(s) if !s.is_empty() => {
            return Some(Import {
                module: s.clone(),
                name: s.clone(),
                alias: None,
                import_type: ImportType::Import,
                location: None,
                confidence: DEFAULT_CONFIDENCE,
            });
        }
        Value::Object(obj) => obj,
        _ => return None,
    };

    let module = fields::string(obj, &["module"]);
    let name = fields::string(obj, &["name"]).or_else(|| module.clone())?;
    let module = module.unwrap_or_else(|| name.clone());
    let alias = fields::string(obj, &["alias", "asname"]).filter(|a| *a != name);

    let import_type = match fields::string(obj, &["import_type"]).as_deref() {
        Some("importFrom") => ImportType::ImportFrom,
        Some("import") => ImportType::Import,
        _ => match fields::string(obj, &["type"]).as_deref() {
            Some("importfrom" | "importFrom" | "from") => ImportType::ImportFrom,
            Some("import") => ImportType::Import,
            _ if module != name => ImportType::ImportFrom,
            _ => ImportType::Import,
        },
    };

    Some(Import {
        location: location(obj),
        confidence: confidence(obj),
        module,
        name,
        alias,
        import_type,
    })
}

pub fn normalize_variable(obj: &Object) -> Option<Variable> {
    let name = fields::string(obj, &["name"])?;
    Some(Variable {
        scope: fields::string(obj, &["scope"]).unwrap_or_else(|| DEFAULT_SCOPE.to_string()),
        location: location(obj),
        confidence: confidence(obj),
        name,
    })
}

/// `{"location": {"line", "column"}}` or flat `line`/`column` fields.
fn location(obj: &Object) -> Option<Location> {
    let source = match fields::get(obj, &["location"]) {
        Some(Value::Object(loc)) => loc,
        _ => obj,
    };
    let line = fields::unsigned(source, &["line", "lineno"])?;
    let column = fields::unsigned(source, &["column", "col", "col_offset"]).unwrap_or(0);
    Some(Location { line, column })
}

fn confidence(obj: &Object) -> f64 {
    fields::float(obj, &["confidence"]).unwrap_or(DEFAULT_CONFIDENCE)
}

fn collect_errors(obj: &Object, errors: &mut Vec<String>) {
    for e in fields::array(obj, &["errors"]) {
        match e {
            Value::String(s) if !s.is_empty() => errors.push(s.clone()),
            Value::Object(o) => {
                if let Some(message) = fields::string(o, &["message", "error"]) {
                    errors.push(message);
                }
            }
            _ => {}
        }
    }
    if let Some(message) = fields::string(obj, &["error"]) {
        match fields::unsigned(obj, &["error_line"]) {
            Some(line) => errors.push(format!("{} (line {})", message, line)),
            None => errors.push(message),
        }
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
