//! Line-based regex extraction, the last-resort backend.
//!
//! Only single-line signatures and calls are recognised and string literals
//! are not tokenised, so results carry a reduced confidence.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Map, Value};

use super::{CodeParser, Language, ParserError};

const CONFIDENCE: f64 = 0.5;

static PY_DEF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(async\s+)?def\s+([A-Za-z_]\w*)\s*\((.*)\)\s*(?:->\s*([^:]+))?:")
        .expect("python def pattern compiles")
});
static PY_CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^class\s+([A-Za-z_]\w*)").expect("python class pattern compiles"));
static PY_IMPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^import\s+(.+)$").expect("python import pattern compiles"));
static PY_FROM_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^from\s+([\w.]+)\s+import\s+(.+)$").expect("python from-import pattern compiles")
});
static PY_DECORATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^@([\w.]+)").expect("python decorator pattern compiles"));

static M_FUNCTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^function\s+(?:(?:\[[^\]]*\]|[A-Za-z_]\w*)\s*=\s*)?([A-Za-z_]\w*)\s*(?:\(([^)]*)\))?")
        .expect("matlab function pattern compiles")
});
static M_IMPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^import\s+([\w.*]+)").expect("matlab import pattern compiles"));

static ASSIGNMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z_]\w*)\s*=[^=]").expect("assignment pattern compiles"));
static CALL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Za-z_][\w.]*)\s*\(").expect("call pattern compiles"));
static KEYWORD_ARG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z_]\w*)\s*=(.*)$").expect("keyword arg pattern compiles"));

const PY_KEYWORDS: &[&str] = &[
    "and", "as", "assert", "class", "def", "del", "elif", "except", "for", "from", "if",
    "import", "in", "is", "lambda", "not", "or", "raise", "return", "while", "with", "yield",
];
const M_KEYWORDS: &[&str] = &[
    "case", "elseif", "for", "function", "if", "parfor", "return", "switch", "while",
];

pub struct RegexParser {
    language: Language,
    name: String,
}

impl RegexParser {
    pub fn new(language: Language) -> Self {
        RegexParser {
            language,
            name: format!("regex-{}", language),
        }
    }
}

impl CodeParser for RegexParser {
    fn name(&self) -> &str {
        &self.name
    }

    fn parse(&self, source: &str) -> Result<Value, ParserError> {
        let mut out = RawOutput::default();
        match self.language {
            Language::Python => scan_python(source, &mut out),
            Language::Matlab => scan_matlab(source, &mut out),
        }
        Ok(out.into_json(self.language))
    }
}

#[derive(Default)]
struct RawOutput {
    calls: Vec<Value>,
    definitions: Vec<Value>,
    imports: Vec<Value>,
    variables: Vec<Value>,
}

impl RawOutput {
    fn into_json(self, language: Language) -> Value {
        json!({
            "language": language.as_str(),
            "parser": "regex",
            "function_calls": self.calls,
            "function_definitions": self.definitions,
            "imports": self.imports,
            "variables": self.variables,
            "errors": [],
        })
    }
}

#[derive(Debug, PartialEq, Eq)]
enum BlockKind {
    Class,
    Function,
}

/// Enclosing `class`/`def` blocks, tracked by indentation.
#[derive(Default)]
struct ScopeStack {
    blocks: Vec<(usize, BlockKind, String)>,
}

impl ScopeStack {
    fn enter_line(&mut self, indent: usize) {
        while self.blocks.last().is_some_and(|(i, _, _)| *i >= indent) {
            self.blocks.pop();
        }
    }

    fn innermost(&self, kind: BlockKind) -> Option<&str> {
        self.blocks
            .iter()
            .rev()
            .find(|(_, k, _)| *k == kind)
            .map(|(_, _, name)| name.as_str())
    }

    fn push(&mut self, indent: usize, kind: BlockKind, name: &str) {
        self.blocks.push((indent, kind, name.to_string()));
    }
}

fn scan_python(source: &str, out: &mut RawOutput) {
    let mut scopes = ScopeStack::default();
    let mut decorators: Vec<String> = Vec::new();

    for (i, raw_line) in source.lines().enumerate() {
        let line_no = i + 1;
        let code = strip_comment(raw_line, '#');
        let trimmed = code.trim_start();
        if trimmed.trim().is_empty() {
            continue;
        }
        let indent = code.len() - trimmed.len();
        scopes.enter_line(indent);

        if let Some(c) = PY_DECORATOR.captures(trimmed) {
            decorators.push(c[1].to_string());
            continue;
        }

        if let Some(c) = PY_DEF.captures(trimmed) {
            let name = &c[2];
            let class_context = scopes.innermost(BlockKind::Class).map(str::to_string);
            let qualified = match &class_context {
                Some(class) => format!("{}.{}", class, name),
                None => name.to_string(),
            };
            out.definitions.push(json!({
                "name": name,
                "qualified_name": qualified,
                "parameters": python_parameters(&c[3]),
                "return_annotation": c.get(4).map(|m| m.as_str().trim()).unwrap_or(""),
                "decorators": std::mem::take(&mut decorators),
                "line": line_no,
                "column": indent,
                "is_async": c.get(1).is_some(),
                "class_context": class_context,
                "confidence": CONFIDENCE,
            }));
            scopes.push(indent, BlockKind::Function, name);
            continue;
        }
        decorators.clear();

        if let Some(c) = PY_CLASS.captures(trimmed) {
            scopes.push(indent, BlockKind::Class, &c[1]);
            continue;
        }

        if let Some(c) = PY_FROM_IMPORT.captures(trimmed) {
            let module = &c[1];
            let names = c[2].trim().trim_start_matches('(').trim_end_matches(')');
            for item in names.split(',') {
                let (name, alias) = split_alias(item);
                if name.is_empty() {
                    continue;
                }
                out.imports.push(json!({
                    "type": "importfrom",
                    "module": module,
                    "name": name,
                    "alias": alias,
                    "line": line_no,
                    "column": indent,
                    "confidence": CONFIDENCE,
                }));
            }
            continue;
        }

        if let Some(c) = PY_IMPORT.captures(trimmed) {
            for item in c[1].split(',') {
                let (name, alias) = split_alias(item);
                if name.is_empty() {
                    continue;
                }
                out.imports.push(json!({
                    "type": "import",
                    "module": name,
                    "name": name,
                    "alias": alias,
                    "line": line_no,
                    "column": indent,
                    "confidence": CONFIDENCE,
                }));
            }
            continue;
        }

        let function = scopes.innermost(BlockKind::Function);
        if let Some(c) = ASSIGNMENT.captures(trimmed) {
            out.variables.push(json!({
                "name": &c[1],
                "scope": function.unwrap_or("global"),
                "line": line_no,
                "column": indent,
                "confidence": CONFIDENCE,
            }));
        }
        scan_calls(code, line_no, function, PY_KEYWORDS, out);
    }
}

fn scan_matlab(source: &str, out: &mut RawOutput) {
    // MATLAB blocks are closed by `end`, not indentation; the innermost
    // function is simply the last one declared.
    let mut current_function: Option<String> = None;

    for (i, raw_line) in source.lines().enumerate() {
        let line_no = i + 1;
        let code = strip_comment(raw_line, '%');
        let trimmed = code.trim_start();
        if trimmed.trim().is_empty() {
            continue;
        }
        let indent = code.len() - trimmed.len();

        if let Some(c) = M_FUNCTION.captures(trimmed) {
            let name = c[1].to_string();
            let parameters: Vec<Value> = c
                .get(2)
                .map(|m| {
                    m.as_str()
                        .split(',')
                        .map(str::trim)
                        .filter(|p| !p.is_empty())
                        .map(|p| {
                            json!({
                                "name": p,
                                "is_variadic": p == "varargin",
                            })
                        })
                        .collect()
                })
                .unwrap_or_default();
            out.definitions.push(json!({
                "name": &name,
                "qualified_name": &name,
                "parameters": parameters,
                "line": line_no,
                "column": indent,
                "confidence": CONFIDENCE,
            }));
            current_function = Some(name);
            continue;
        }

        if let Some(c) = M_IMPORT.captures(trimmed) {
            let target = &c[1];
            let (module, name) = match target.rsplit_once('.') {
                Some((module, name)) => (module, name),
                None => (target, target),
            };
            let import_type = if module == name { "import" } else { "importfrom" };
            out.imports.push(json!({
                "type": import_type,
                "module": module,
                "name": name,
                "line": line_no,
                "column": indent,
                "confidence": CONFIDENCE,
            }));
            continue;
        }

        if let Some(c) = ASSIGNMENT.captures(trimmed) {
            out.variables.push(json!({
                "name": &c[1],
                "scope": current_function.as_deref().unwrap_or("global"),
                "line": line_no,
                "column": indent,
                "confidence": CONFIDENCE,
            }));
        }
        scan_calls(code, line_no, current_function.as_deref(), M_KEYWORDS, out);
    }
}

fn scan_calls(
    code: &str,
    line_no: usize,
    caller: Option<&str>,
    keywords: &[&str],
    out: &mut RawOutput,
) {
    for c in CALL.captures_iter(code) {
        let (Some(whole), Some(target)) = (c.get(0), c.get(1)) else {
            continue;
        };
        let qualified = target.as_str();
        if keywords.contains(&qualified) {
            continue;
        }
        let name = qualified.rsplit('.').next().unwrap_or(qualified);
        let args = &code[whole.end()..];
        let args = match matching_paren(args) {
            Some(end) => &args[..end],
            None => args,
        };
        out.calls.push(json!({
            "name": name,
            "qualified_name": qualified,
            "arguments": split_arguments(args),
            "line": line_no,
            "column": target.start(),
            "caller": caller,
            "confidence": CONFIDENCE,
        }));
    }
}

/// `{"positional": [...], "keywords": {...}}` from an argument list.
fn split_arguments(args: &str) -> Value {
    let mut positional = Vec::new();
    let mut keywords = Map::new();
    for arg in split_top_level(args) {
        let arg = arg.trim();
        if arg.is_empty() {
            continue;
        }
        match KEYWORD_ARG.captures(arg) {
            Some(c) if !c[2].starts_with('=') => {
                keywords.insert(c[1].to_string(), Value::String(c[2].trim().to_string()));
            }
            _ => positional.push(Value::String(arg.to_string())),
        }
    }
    json!({ "positional": positional, "keywords": keywords })
}

fn python_parameters(list: &str) -> Vec<Value> {
    let parts = split_top_level(list);
    let slash = parts.iter().position(|p| p.trim() == "/");
    let mut keyword_only = false;
    let mut params = Vec::new();

    for (i, part) in parts.iter().enumerate() {
        let p = part.trim();
        match p {
            "" | "/" => continue,
            "*" => {
                keyword_only = true;
                continue;
            }
            _ => {}
        }
        let (head, default) = match p.split_once('=') {
            Some((h, d)) => (h, d.trim()),
            None => (p, ""),
        };
        let (name, annotation) = match head.split_once(':') {
            Some((n, a)) => (n.trim(), a.trim()),
            None => (head.trim(), ""),
        };
        let variadic = name.starts_with('*');
        params.push(json!({
            "name": name,
            "annotation": annotation,
            "default_value": default,
            "is_keyword_only": keyword_only && !variadic,
            "is_positional_only": slash.is_some_and(|s| i < s),
            "is_variadic": variadic,
        }));
        if variadic && !name.starts_with("**") {
            keyword_only = true;
        }
    }
    params
}

fn split_alias(item: &str) -> (&str, &str) {
    match item.trim().split_once(" as ") {
        Some((name, alias)) => (name.trim(), alias.trim()),
        None => (item.trim(), ""),
    }
}

/// Drop a trailing comment, ignoring markers inside quotes. In MATLAB a
/// `'` right after an operand is the transpose operator, not a quote.
fn strip_comment(line: &str, marker: char) -> &str {
    let mut quote: Option<char> = None;
    let mut prev: Option<char> = None;
    for (i, ch) in line.char_indices() {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => {}
            None if ch == marker => return &line[..i],
            None if ch == '"' => quote = Some(ch),
            None if ch == '\'' && (marker == '#' || !is_operand_end(prev)) => quote = Some(ch),
            None => {}
        }
        if !ch.is_whitespace() {
            prev = Some(ch);
        }
    }
    line
}

fn is_operand_end(prev: Option<char>) -> bool {
    prev.is_some_and(|c| c.is_alphanumeric() || matches!(c, ')' | ']' | '}' | '\'' | '.' | '_'))
}

/// Byte offset of the `)` closing an already-opened paren.
fn matching_paren(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, ch) in s.char_indices() {
        match ch {
            '(' | '[' | '{' => depth += 1,
            ')' if depth == 0 => return Some(i),
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    None
}

/// Split on commas that are not nested in brackets or quotes.
fn split_top_level(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, ch) in s.char_indices() {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => {}
            None => match ch {
                '"' | '\'' => quote = Some(ch),
                '(' | '[' | '{' => depth += 1,
                ')' | ']' | '}' => depth = depth.saturating_sub(1),
                ',' if depth == 0 => {
                    parts.push(&s[start..i]);
                    start = i + 1;
                }
                _ => {}
            },
        }
    }
    parts.push(&s[start..]);
    parts
}
