//! Normalization of value trees against a [`Schema`].
//!
//! Normalization never fails outright. Values that do not fit are dropped and
//! reported:
//!
//! - a value of the wrong kind is an error `expected <kind>, found <kind>`
//! - a struct field the schema does not know is a warning `unknown field: <key>`
//!
//! Scalars are converted where nothing is lost (`1` to `"1"`, `"42"` to `42`,
//! `2.0` to `2`). `null` is accepted everywhere, and so are pure variable
//! references such as `${var.cluster}` since they are resolved later.

use crate::schema::Schema;
use bundle_dyn::{Kind, Mapping, Path, Value};
use bundle_error_reporting::{Diagnostic, Diagnostics};
use once_cell::sync::Lazy;
use regex::Regex;

static PURE_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    let word = r"[a-zA-Z]+([-_]?[a-zA-Z0-9]+)*";
    Regex::new(&format!(
        r"^\$\{{{word}(\.{word}(\[[0-9]+\])*)*(\[[0-9]+\])*\}}$"
    ))
    .expect("variable reference pattern is valid")
});

/// Whether `s` is exactly one variable reference, e.g. `${var.name}`.
pub fn is_pure_variable_reference(s: &str) -> bool {
    PURE_REFERENCE.is_match(s)
}

/// Normalize `value` against `schema`.
///
/// Returns the normalized value and the diagnostics found on the way. When
/// the root itself does not fit the schema the returned value is invalid.
pub fn normalize(schema: &Schema, value: &Value) -> (Value, Diagnostics) {
    let mut diags = Diagnostics::new();
    let normalized = normalize_at(schema, value, &Path::empty(), &mut diags)
        .unwrap_or_else(Value::invalid);
    (normalized, diags)
}

/// `None` means the value was dropped; a diagnostic has been recorded.
fn normalize_at(schema: &Schema, value: &Value, path: &Path, diags: &mut Diagnostics) -> Option<Value> {
    if value.is_null() || matches!(schema, Schema::Any) {
        return Some(value.clone());
    }
    if value.as_str().is_some_and(is_pure_variable_reference) {
        return Some(value.clone());
    }

    match schema {
        Schema::Any => Some(value.clone()),
        Schema::Bool => normalize_bool(value, path, diags),
        Schema::Int => normalize_int(value, path, diags),
        Schema::Float => normalize_float(value, path, diags),
        Schema::String => normalize_string(value, path, diags),
        Schema::Sequence(item) => normalize_sequence(item, value, path, diags),
        Schema::Map(item) => normalize_map(item, value, path, diags),
        Schema::Struct(fields) => normalize_struct(fields, value, path, diags),
    }
}

fn relocated(value: Value, original: &Value) -> Value {
    value.with_location(original.location().cloned())
}

fn mismatch(schema: &Schema, value: &Value, path: &Path, diags: &mut Diagnostics) -> Option<Value> {
    diags.push(
        Diagnostic::error(format!(
            "expected {}, found {}",
            schema.expected(),
            value.kind()
        ))
        .with_location(value.location().cloned())
        .with_path(path.clone()),
    );
    None
}

fn unparsable(text: &str, target: &str, value: &Value, path: &Path, diags: &mut Diagnostics) -> Option<Value> {
    diags.push(
        Diagnostic::error(format!("cannot parse '{}' as {}", text, target))
            .with_location(value.location().cloned())
            .with_path(path.clone()),
    );
    None
}

fn normalize_bool(value: &Value, path: &Path, diags: &mut Diagnostics) -> Option<Value> {
    match value.kind() {
        Kind::Bool => Some(value.clone()),
        Kind::String => match value.as_str() {
            Some("true") => Some(relocated(Value::bool(true), value)),
            Some("false") => Some(relocated(Value::bool(false), value)),
            Some(text) => unparsable(text, "bool", value, path, diags),
            None => None,
        },
        _ => mismatch(&Schema::Bool, value, path, diags),
    }
}

fn normalize_int(value: &Value, path: &Path, diags: &mut Diagnostics) -> Option<Value> {
    match value.kind() {
        Kind::Int => Some(value.clone()),
        Kind::Float => {
            let f = value.as_float()?;
            if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                Some(relocated(Value::int(f as i64), value))
            } else {
                diags.push(
                    Diagnostic::error(format!("cannot represent {} as int", f))
                        .with_location(value.location().cloned())
                        .with_path(path.clone()),
                );
                None
            }
        }
        Kind::String => {
            let text = value.as_str()?;
            match text.parse::<i64>() {
                Ok(i) => Some(relocated(Value::int(i), value)),
                Err(_) => unparsable(text, "int", value, path, diags),
            }
        }
        _ => mismatch(&Schema::Int, value, path, diags),
    }
}

fn normalize_float(value: &Value, path: &Path, diags: &mut Diagnostics) -> Option<Value> {
    match value.kind() {
        Kind::Float => Some(value.clone()),
        Kind::Int => {
            let i = value.as_int()?;
            Some(relocated(Value::float(i as f64), value))
        }
        Kind::String => {
            let text = value.as_str()?;
            match text.parse::<f64>() {
                Ok(f) => Some(relocated(Value::float(f), value)),
                Err(_) => unparsable(text, "float", value, path, diags),
            }
        }
        _ => mismatch(&Schema::Float, value, path, diags),
    }
}

fn normalize_string(value: &Value, path: &Path, diags: &mut Diagnostics) -> Option<Value> {
    let text = match value.kind() {
        Kind::String => return Some(value.clone()),
        Kind::Bool => value.as_bool()?.to_string(),
        Kind::Int => value.as_int()?.to_string(),
        Kind::Float => value.as_float()?.to_string(),
        _ => return mismatch(&Schema::String, value, path, diags),
    };
    Some(relocated(Value::string(text), value))
}

fn normalize_sequence(item: &Schema, value: &Value, path: &Path, diags: &mut Diagnostics) -> Option<Value> {
    let Some(items) = value.as_sequence() else {
        return mismatch(&Schema::sequence(item.clone()), value, path, diags);
    };

    let normalized = items
        .iter()
        .enumerate()
        .filter_map(|(i, v)| normalize_at(item, v, &path.index(i), diags))
        .collect();
    Some(relocated(Value::sequence(normalized), value))
}

fn normalize_map(item: &Schema, value: &Value, path: &Path, diags: &mut Diagnostics) -> Option<Value> {
    let Some(entries) = value.as_mapping() else {
        return mismatch(&Schema::map(item.clone()), value, path, diags);
    };

    let mut normalized = Mapping::with_capacity(entries.len());
    for (key, v) in entries {
        if let Some(v) = normalize_at(item, v, &path.key(key.as_str()), diags) {
            normalized.insert(key.clone(), v);
        }
    }
    Some(relocated(Value::mapping(normalized), value))
}

fn normalize_struct(
    fields: &indexmap::IndexMap<String, Schema>,
    value: &Value,
    path: &Path,
    diags: &mut Diagnostics,
) -> Option<Value> {
    let Some(entries) = value.as_mapping() else {
        return mismatch(&Schema::Struct(fields.clone()), value, path, diags);
    };

    let mut normalized = Mapping::with_capacity(entries.len());
    for (key, v) in entries {
        let Some(field) = fields.get(key) else {
            diags.push(
                Diagnostic::warning(format!("unknown field: {}", key))
                    .with_location(v.location().cloned())
                    .with_path(path.clone()),
            );
            continue;
        };
        if let Some(v) = normalize_at(field, v, &path.key(key.as_str()), diags) {
            normalized.insert(key.clone(), v);
        }
    }
    Some(relocated(Value::mapping(normalized), value))
}
