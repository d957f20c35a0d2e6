//! Parameter/argument lists in either raw shape → `Vec<Parameter>`.

use serde_json::Value;

use super::fields::{self, Object};
use super::types::{Parameter, ParameterStyle};

/// What a list of bare strings means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListRole {
    /// Call arguments: a bare string is an argument value.
    Arguments,
    /// Definition parameters: a bare string is a parameter name.
    Parameters,
}

/// Normalize a raw parameter list. Accepts
///
/// - a split object `{"positional": [...], "keywords": {...}}`,
/// - an array of records (or bare strings),
/// - a plain object, read as keyword arguments.
///
/// Anything else yields an empty list. Already-normalized input comes back
/// unchanged.
pub fn normalize_parameters(raw: Option<&Value>, role: ListRole) -> Vec<Parameter> {
    match raw {
        Some(Value::Object(obj)) if is_split(obj) => split_parameters(obj),
        Some(Value::Object(obj)) => keyword_parameters(obj.iter(), 0),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| record_parameter(i, item, role))
            .collect(),
        _ => Vec::new(),
    }
}

fn is_split(obj: &Object) -> bool {
    obj.contains_key("positional") || obj.contains_key("keywords")
}

fn split_parameters(obj: &Object) -> Vec<Parameter> {
    let positional = fields::array(obj, &["positional"]);
    let mut params: Vec<Parameter> = positional
        .iter()
        .enumerate()
        .map(|(i, v)| Parameter {
            name: None,
            value: non_null(v),
            annotation: None,
            default_value: None,
            position: Some(i as u64),
            style: ParameterStyle::Positional,
        })
        .collect();

    if let Some(Value::Object(keywords)) = obj.get("keywords") {
        params.extend(keyword_parameters(keywords.iter(), positional.len()));
    }
    params
}

fn keyword_parameters<'a, I>(entries: I, offset: usize) -> Vec<Parameter>
where
    I: Iterator<Item = (&'a String, &'a Value)>,
{
    entries
        .enumerate()
        .map(|(i, (name, v))| Parameter {
            name: Some(name.clone()),
            value: non_null(v),
            annotation: None,
            default_value: None,
            position: Some((offset + i) as u64),
            style: ParameterStyle::Named,
        })
        .collect()
}

fn record_parameter(index: usize, item: &Value, role: ListRole) -> Option<Parameter> {
    match item {
        Value::Object(obj) => Some(object_parameter(index, obj)),
        Value::Null => None,
        bare => {
            let text = match bare {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            Some(match role {
                ListRole::Arguments => Parameter {
                    name: None,
                    value: Some(bare.clone()),
                    annotation: None,
                    default_value: None,
                    position: Some(index as u64),
                    style: ParameterStyle::Positional,
                },
                ListRole::Parameters => Parameter {
                    style: infer_style(None, Some(&text)),
                    name: Some(text),
                    value: None,
                    annotation: None,
                    default_value: None,
                    position: Some(index as u64),
                },
            })
        }
    }
}

fn object_parameter(index: usize, obj: &Object) -> Parameter {
    let name = fields::string(obj, &["name", "arg"]);
    let style = fields::get(obj, &["style"])
        .and_then(Value::as_str)
        .and_then(ParameterStyle::from_tag)
        .unwrap_or_else(|| infer_style(Some(obj), name.as_deref()));

    Parameter {
        value: fields::get(obj, &["value"]).cloned(),
        annotation: fields::string(obj, &["annotation", "type"]),
        default_value: fields::string(obj, &["default_value", "default"]),
        position: fields::unsigned(obj, &["position"]).or(Some(index as u64)),
        style,
        name,
    }
}

/// Priority: keyword-only > positional-only > variadic > named > positional.
fn infer_style(obj: Option<&Object>, name: Option<&str>) -> ParameterStyle {
    let has = |keys: &[&str]| obj.is_some_and(|o| fields::flag(o, keys));

    if has(&["keyword_only", "is_keyword_only"]) {
        ParameterStyle::KeywordOnly
    } else if has(&["positional_only", "is_positional_only"]) {
        ParameterStyle::PositionalOnly
    } else if has(&["is_variadic", "is_vararg", "is_kwarg", "is_kwargs_unpacking"])
        || name.is_some_and(|n| n.starts_with('*'))
    {
        ParameterStyle::Variadic
    } else if has(&["is_named"]) {
        ParameterStyle::Named
    } else {
        ParameterStyle::Positional
    }
}

fn non_null(v: &Value) -> Option<Value> {
    (!v.is_null()).then(|| v.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keyword_only_beats_variadic() {
        let raw = json!([{"name": "*rest", "is_keyword_only": true, "is_variadic": true}]);
        let params = normalize_parameters(Some(&raw), ListRole::Parameters);
        assert_eq!(params[0].style, ParameterStyle::KeywordOnly);
    }

    #[test]
    fn star_name_is_variadic() {
        let raw = json!([{"name": "**kwargs"}]);
        let params = normalize_parameters(Some(&raw), ListRole::Parameters);
        assert_eq!(params[0].style, ParameterStyle::Variadic);
    }

    #[test]
    fn bare_strings_depend_on_role() {
        let raw = json!(["x"]);
        let args = normalize_parameters(Some(&raw), ListRole::Arguments);
        assert_eq!(args[0].value, Some(json!("x")));
        assert_eq!(args[0].name, None);
        let params = normalize_parameters(Some(&raw), ListRole::Parameters);
        assert_eq!(params[0].name.as_deref(), Some("x"));
    }
}
