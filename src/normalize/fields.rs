//! Case-insensitive-ish field access over raw JSON objects.
//!
//! Keys are always written snake_case at the call site; each lookup also
//! tries the camelCase spelling.

use serde_json::{Map, Value};

pub type Object = Map<String, Value>;

pub fn camel_case(snake: &str) -> String {
    let mut out = String::with_capacity(snake.len());
    let mut upper = false;
    for ch in snake.chars() {
        if ch == '_' {
            upper = !out.is_empty();
        } else if upper {
            out.extend(ch.to_uppercase());
            upper = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// First non-null value among `keys` (each tried snake_case then camelCase).
pub fn get<'a>(obj: &'a Object, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| {
        obj.get(*key)
            .filter(|v| !v.is_null())
            .or_else(|| obj.get(&camel_case(key)).filter(|v| !v.is_null()))
    })
}

/// String field; empty strings count as absent. Numbers and booleans are
/// stringified.
pub fn string(obj: &Object, keys: &[&str]) -> Option<String> {
    get(obj, keys).and_then(|v| match v {
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

pub fn flag(obj: &Object, keys: &[&str]) -> bool {
    matches!(get(obj, keys), Some(Value::Bool(true)))
}

pub fn unsigned(obj: &Object, keys: &[&str]) -> Option<u64> {
    get(obj, keys).and_then(Value::as_u64)
}

pub fn float(obj: &Object, keys: &[&str]) -> Option<f64> {
    get(obj, keys).and_then(Value::as_f64)
}

pub fn array<'a>(obj: &'a Object, keys: &[&str]) -> &'a [Value] {
    get(obj, keys)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

pub fn strings(obj: &Object, keys: &[&str]) -> Vec<String> {
    array(obj, keys)
        .iter()
        .filter_map(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn camel_conversion() {
        assert_eq!(camel_case("qualified_name"), "qualifiedName");
        assert_eq!(camel_case("is_kwargs_unpacking"), "isKwargsUnpacking");
        assert_eq!(camel_case("name"), "name");
        assert_eq!(camel_case("_private"), "private");
    }

    #[test]
    fn lookup_tries_both_spellings() {
        let obj = json!({"qualifiedName": "a.b", "return_annotation": ""});
        let obj = obj.as_object().unwrap();
        assert_eq!(string(obj, &["qualified_name"]).as_deref(), Some("a.b"));
        assert_eq!(string(obj, &["return_annotation"]), None);
    }

    #[test]
    fn null_falls_through_to_alias() {
        let obj = json!({"arguments": null, "args": [1]});
        let obj = obj.as_object().unwrap();
        assert_eq!(array(obj, &["arguments", "args"]).len(), 1);
    }
}
