//! Integration tests for parser output normalization.

use serde_json::json;
use signaljourney::normalize::{normalize_parse_result, ImportType, ParameterStyle};
use signaljourney::parser::Language;

#[test]
fn libcst_shape() {
    let raw = json!({
        "file_path": "pipeline.py",
        "function_calls": [{
            "name": "filter",
            "qualified_name": "raw.filter",
            "arguments": {
                "positional": ["raw"],
                "keywords": { "l_freq": "1.0", "h_freq": "None" }
            },
            "location": null
        }],
        "function_definitions": [{
            "name": "preprocess",
            "parameters": [
                { "name": "raw", "annotation": "", "default_value": "", "is_positional_only": true },
                { "name": "args", "is_variadic": true },
                { "name": "l_freq", "annotation": "float", "default_value": "1.0", "is_keyword_only": true }
            ],
            "return_annotation": "",
            "decorators": [],
            "location": null
        }],
        "imports": [
            { "module": "mne", "name": "mne", "alias": "" },
            { "module": "mne.preprocessing", "name": "ICA" }
        ]
    });

    let result = normalize_parse_result(&raw, Some(Language::Python));
    assert_eq!(result.language.as_deref(), Some("python"));
    assert_eq!(result.source_file.as_deref(), Some("pipeline.py"));
    assert!(result.errors.is_empty(), "{:?}", result.errors);

    let call = &result.function_calls[0];
    assert_eq!(call.qualified_name, "raw.filter");
    assert_eq!(call.location, None);
    assert_eq!(call.confidence, 1.0);
    let styles: Vec<ParameterStyle> = call.arguments.iter().map(|a| a.style).collect();
    assert_eq!(
        styles,
        vec![ParameterStyle::Positional, ParameterStyle::Named, ParameterStyle::Named]
    );
    assert_eq!(call.arguments[1].name.as_deref(), Some("l_freq"));
    assert_eq!(call.arguments[1].value, Some(json!("1.0")));
    let positions: Vec<Option<u64>> = call.arguments.iter().map(|a| a.position).collect();
    assert_eq!(positions, vec![Some(0), Some(1), Some(2)]);

    let def = &result.function_definitions[0];
    assert_eq!(def.qualified_name, "preprocess");
    assert_eq!(def.return_annotation, None);
    let styles: Vec<ParameterStyle> = def.parameters.iter().map(|p| p.style).collect();
    assert_eq!(
        styles,
        vec![
            ParameterStyle::PositionalOnly,
            ParameterStyle::Variadic,
            ParameterStyle::KeywordOnly
        ]
    );
    assert_eq!(def.parameters[0].annotation, None);
    assert_eq!(def.parameters[2].default_value.as_deref(), Some("1.0"));

    assert_eq!(result.imports[0].import_type, ImportType::Import);
    assert_eq!(result.imports[0].alias, None);
    assert_eq!(result.imports[1].import_type, ImportType::ImportFrom);
}

#[test]
fn pyparser_shape() {
    let raw = json!({
        "calls": [{
            "func_name": "read_raw_fif",
            "full_name": "mne.io.read_raw_fif",
            "args": [
                { "name": null, "value": "'raw.fif'", "position": 0 },
                { "name": "preload", "value": "True", "position": 1, "is_named": true },
                { "name": "kwargs", "value": "opts", "position": 2, "is_kwargs_unpacking": true }
            ],
            "line": 12,
            "col_offset": 6
        }],
        "imports": [
            { "type": "importfrom", "module": "mne.io", "name": "read_raw_fif", "asname": "read", "lineno": 1 },
            "os"
        ],
        "variables": [{ "name": "raw", "line": 12 }],
        "error": "unexpected indent",
        "error_line": 30
    });

    let result = normalize_parse_result(&raw, None);
    assert_eq!(result.language, None);

    let call = &result.function_calls[0];
    assert_eq!(call.name, "read_raw_fif");
    assert_eq!(call.qualified_name, "mne.io.read_raw_fif");
    let loc = call.location.unwrap();
    assert_eq!((loc.line, loc.column), (12, 6));
    let styles: Vec<ParameterStyle> = call.arguments.iter().map(|a| a.style).collect();
    assert_eq!(
        styles,
        vec![ParameterStyle::Positional, ParameterStyle::Named, ParameterStyle::Variadic]
    );
    assert_eq!(call.arguments[0].name, None);

    let import = &result.imports[0];
    assert_eq!(import.import_type, ImportType::ImportFrom);
    assert_eq!(import.alias.as_deref(), Some("read"));
    assert_eq!(import.location.map(|l| l.line), Some(1));
    assert_eq!(result.imports[1].module, "os");

    assert_eq!(result.variables[0].scope, "global");
    assert_eq!(result.errors, vec!["unexpected indent (line 30)".to_string()]);
}

#[test]
fn camel_case_keys_are_accepted() {
    let raw = json!({
        "functionCalls": [{
            "name": "zeros",
            "qualifiedName": "np.zeros",
            "arguments": [{ "value": "10", "position": 0 }],
            "classContext": "Epochs"
        }],
        "functionDefinitions": [{
            "name": "run",
            "qualifiedName": "Pipeline.run",
            "isAsync": true,
            "classContext": "Pipeline"
        }]
    });
    let result = normalize_parse_result(&raw, Some(Language::Python));
    assert_eq!(result.function_calls[0].qualified_name, "np.zeros");
    assert_eq!(result.function_calls[0].class_context.as_deref(), Some("Epochs"));
    let def = &result.function_definitions[0];
    assert!(def.is_async);
    assert!(def.is_method);
    assert_eq!(def.qualified_name, "Pipeline.run");
}

#[test]
fn nameless_records_are_dropped_with_a_note() {
    let raw = json!({
        "function_calls": [{ "qualified_name": "x.y" }, { "name": "ok" }],
        "variables": [{}],
        "errors": ["line 3: bad token", { "message": "line 9: EOF" }]
    });
    let result = normalize_parse_result(&raw, None);
    assert_eq!(result.function_calls.len(), 1);
    assert!(result.variables.is_empty());
    assert_eq!(
        result.errors,
        vec![
            "Function call #1 has no name".to_string(),
            "Variable #1 has no name".into(),
            "line 3: bad token".into(),
            "line 9: EOF".into(),
        ]
    );
}

#[test]
fn non_object_output_is_an_error() {
    let result = normalize_parse_result(&json!([1, 2]), Some(Language::Matlab));
    assert!(result.is_empty());
    assert_eq!(result.language.as_deref(), Some("matlab"));
    assert_eq!(result.errors, vec!["Parser output must be a JSON object, found an array".to_string()]);
}

#[test]
fn normalizing_twice_changes_nothing() {
    let raw = json!({
        "language": "python",
        "calls": [{
            "name": "filter",
            "full_name": "raw.filter",
            "arguments": { "positional": ["raw", null], "keywords": { "l_freq": 1.0 } },
            "lineno": 4,
            "caller": "main"
        }],
        "function_defs": [{
            "name": "main",
            "params": ["cfg", "*args", { "name": "**kw" }],
            "returns": "None",
            "decorators": ["cli.command"],
            "location": { "line": 2, "column": 0 }
        }],
        "imports": [{ "type": "import", "module": "numpy", "name": "numpy", "alias": "np" }],
        "variables": [{ "name": "x", "scope": "main", "confidence": 0.5 }],
        "errors": ["partial parse"]
    });

    let once = normalize_parse_result(&raw, None);
    let as_json = serde_json::to_value(&once).unwrap();
    let twice = normalize_parse_result(&as_json, None);
    assert_eq!(once, twice);
    assert_eq!(serde_json::to_value(&twice).unwrap(), as_json);
}
