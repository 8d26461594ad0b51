//! Contract echo: write the loaded contract document back out as YAML.
//!
//! The writer is deliberately hand-built rather than delegated to a YAML
//! serializer. Round-tripped contracts must keep nested key order, quote
//! numeric-looking strings so downstream parsers do not retype them, and
//! use block scalars for multi-line text, and no off-the-shelf emitter
//! gives control over all three at once.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use crate::contract::ContractDocument;
use crate::error::{Error, Result};

/// Top-level keys in their conventional order. Extension keys (`x-*`) come
/// after these, sorted, then any remaining keys, sorted.
const TOP_LEVEL_ORDER: &[&str] = &[
    "openapi",
    "info",
    "externalDocs",
    "servers",
    "security",
    "tags",
    "paths",
    "components",
];

static NUMERIC_LIKE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?$").expect("static pattern"));

/// Serialize the raw contract document to YAML text.
pub fn emit_contract(doc: &ContractDocument) -> Result<String> {
    let root = doc
        .raw
        .as_object()
        .ok_or_else(|| Error::Serialization("contract root is not a mapping".to_string()))?;

    let mut out = String::new();
    for key in ordered_top_level(root) {
        write_entry(&mut out, key, &root[key], 0)?;
    }
    Ok(out)
}

fn ordered_top_level(root: &Map<String, Value>) -> Vec<&str> {
    let mut keys: Vec<&str> = Vec::with_capacity(root.len());
    for key in TOP_LEVEL_ORDER {
        if root.contains_key(*key) {
            keys.push(key);
        }
    }
    let mut extensions: Vec<&str> = root
        .keys()
        .map(String::as_str)
        .filter(|k| k.starts_with("x-"))
        .collect();
    extensions.sort_unstable();
    keys.extend(extensions);
    let mut rest: Vec<&str> = root
        .keys()
        .map(String::as_str)
        .filter(|k| !keys.contains(k))
        .collect();
    rest.sort_unstable();
    keys.extend(rest);
    keys
}

// ------------------------------ Block structure --------------------------- //

fn write_entry(out: &mut String, key: &str, value: &Value, indent: usize) -> Result<()> {
    out.push_str(&"  ".repeat(indent));
    write_entry_inline(out, key, value, indent)
}

/// Write `key: value` assuming the cursor already sits at the right column.
fn write_entry_inline(out: &mut String, key: &str, value: &Value, indent: usize) -> Result<()> {
    out.push_str(&scalar_token(key));
    out.push(':');
    match value {
        Value::Object(map) if !map.is_empty() => {
            out.push('\n');
            for (k, v) in map {
                write_entry(out, k, v, indent + 1)?;
            }
        }
        Value::Object(_) => out.push_str(" {}\n"),
        Value::Array(items) if !items.is_empty() => {
            out.push('\n');
            write_sequence(out, items, indent + 1)?;
        }
        Value::Array(_) => out.push_str(" []\n"),
        scalar => {
            out.push(' ');
            write_scalar(out, scalar, indent + 1)?;
        }
    }
    Ok(())
}

fn write_sequence(out: &mut String, items: &[Value], indent: usize) -> Result<()> {
    let pad = "  ".repeat(indent);
    for item in items {
        match item {
            Value::Object(map) if !map.is_empty() => {
                let mut entries = map.iter();
                if let Some((k, v)) = entries.next() {
                    out.push_str(&pad);
                    out.push_str("- ");
                    write_entry_inline(out, k, v, indent + 1)?;
                }
                for (k, v) in entries {
                    write_entry(out, k, v, indent + 1)?;
                }
            }
            Value::Object(_) => {
                out.push_str(&pad);
                out.push_str("- {}\n");
            }
            Value::Array(nested) if !nested.is_empty() => {
                out.push_str(&pad);
                out.push_str("-\n");
                write_sequence(out, nested, indent + 1)?;
            }
            Value::Array(_) => {
                out.push_str(&pad);
                out.push_str("- []\n");
            }
            scalar => {
                out.push_str(&pad);
                out.push_str("- ");
                write_scalar(out, scalar, indent + 1)?;
            }
        }
    }
    Ok(())
}

// ------------------------------ Scalars ----------------------------------- //

/// Write a scalar and its trailing newline. Multi-line strings become block
/// scalars whose lines sit one level deeper than the owning key.
fn write_scalar(out: &mut String, value: &Value, indent: usize) -> Result<()> {
    match value {
        Value::Null => out.push_str("null\n"),
        Value::Bool(b) => {
            out.push_str(if *b { "true" } else { "false" });
            out.push('\n');
        }
        Value::Number(n) => {
            if n.as_f64().is_some_and(|f| !f.is_finite()) {
                return Err(Error::Serialization(format!(
                    "non-finite number {n} cannot be written as YAML"
                )));
            }
            out.push_str(&n.to_string());
            out.push('\n');
        }
        Value::String(s) if block_scalar_eligible(s) => {
            let trailing_newline = s.ends_with('\n');
            out.push_str(if trailing_newline { "|\n" } else { "|-\n" });
            let pad = "  ".repeat(indent);
            for line in s.trim_end_matches('\n').split('\n') {
                if line.is_empty() {
                    out.push('\n');
                } else {
                    out.push_str(&pad);
                    out.push_str(line);
                    out.push('\n');
                }
            }
        }
        Value::String(s) => {
            out.push_str(&scalar_token(s));
            out.push('\n');
        }
        Value::Object(_) | Value::Array(_) => unreachable!("containers handled by caller"),
    }
    Ok(())
}

fn block_scalar_eligible(s: &str) -> bool {
    // Lines with trailing spaces or carriage returns would not survive a
    // block scalar, so those strings fall back to a quoted form.
    s.contains('\n')
        && !s.contains('\r')
        && s.split('\n').all(|line| line == line.trim_end_matches(' '))
}

/// A plain or double-quoted rendering of a string scalar, whichever the
/// YAML grammar allows. Numeric-looking strings are always quoted so a
/// reparse keeps them as strings.
fn scalar_token(s: &str) -> String {
    if needs_quoting(s) {
        let mut quoted = String::with_capacity(s.len() + 2);
        quoted.push('"');
        for c in s.chars() {
            match c {
                '"' => quoted.push_str("\\\""),
                '\\' => quoted.push_str("\\\\"),
                '\n' => quoted.push_str("\\n"),
                '\r' => quoted.push_str("\\r"),
                '\t' => quoted.push_str("\\t"),
                c if c.is_control() => quoted.push_str(&format!("\\u{:04x}", c as u32)),
                c => quoted.push(c),
            }
        }
        quoted.push('"');
        quoted
    } else {
        s.to_string()
    }
}

fn needs_quoting(s: &str) -> bool {
    if s.is_empty() || NUMERIC_LIKE.is_match(s) {
        return true;
    }
    if matches!(
        s,
        "true" | "false" | "null" | "~" | "yes" | "no" | "on" | "off" | "True" | "False" | "Null"
    ) {
        return true;
    }
    if s.starts_with(' ') || s.ends_with(' ') {
        return true;
    }
    let first = s.chars().next().unwrap_or(' ');
    if "-?:,[]{}#&*!|>'\"%@`".contains(first) {
        return true;
    }
    s.contains(": ")
        || s.ends_with(':')
        || s.contains(" #")
        || s.chars().any(|c| c.is_control())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(raw: Value) -> ContractDocument {
        let contract = serde_json::from_value(raw.clone()).unwrap();
        ContractDocument {
            source_path: "test.yaml".into(),
            raw,
            contract,
        }
    }

    #[test]
    fn top_level_keys_follow_conventional_order() {
        let d = doc(json!({
            "paths": {},
            "x-audit": "yes",
            "openapi": "3.0.3",
            "info": {"title": "t", "version": "1"},
        }));
        let yaml = emit_contract(&d).unwrap();
        let keys: Vec<&str> = yaml
            .lines()
            .filter(|l| !l.starts_with(' '))
            .map(|l| l.split(':').next().unwrap())
            .collect();
        assert_eq!(keys, ["openapi", "info", "paths", "x-audit"]);
    }

    #[test]
    fn numeric_looking_strings_stay_quoted() {
        assert_eq!(scalar_token("3.0.3"), "3.0.3");
        assert_eq!(scalar_token("1.0"), "\"1.0\"");
        assert_eq!(scalar_token("42"), "\"42\"");
        assert_eq!(scalar_token("-7e3"), "\"-7e3\"");
    }

    #[test]
    fn multi_line_strings_use_block_scalars() {
        let d = doc(json!({
            "openapi": "3.0.3",
            "info": {"title": "t", "version": "1", "description": "line one\nline two"},
            "paths": {},
        }));
        let yaml = emit_contract(&d).unwrap();
        assert!(yaml.contains("description: |-\n    line one\n    line two\n"));
    }

    #[test]
    fn sequences_inline_their_first_mapping_key() {
        let d = doc(json!({
            "openapi": "3.0.3",
            "info": {"title": "t", "version": "1"},
            "tags": [{"name": "pets", "description": "d"}],
            "paths": {},
        }));
        let yaml = emit_contract(&d).unwrap();
        assert!(yaml.contains("tags:\n  - name: pets\n    description: d\n"));
    }
}
