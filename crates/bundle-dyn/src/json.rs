//! Plain JSON encoding of value trees.
//!
//! Locations are not part of the encoding. Strings that stand in for
//! unresolved variable references (`${var.x}` in an integer field) are just
//! strings here and pass through unchanged.

use crate::path::Path;
use crate::value::{Kind, Value};
use thiserror::Error;

/// A value that has no JSON representation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ToJsonError {
    #[error("cannot encode {kind} value at '{path}' as JSON")]
    Unsupported { path: Path, kind: Kind },

    #[error("cannot encode non-finite float {value} at '{path}' as JSON")]
    NonFiniteFloat { path: Path, value: f64 },
}

impl Value {
    /// Encode this value as a `serde_json::Value`, dropping locations.
    ///
    /// Fails on `Invalid` nodes and on NaN or infinite floats.
    pub fn to_json(&self) -> Result<serde_json::Value, ToJsonError> {
        to_json_at(self, &Path::empty())
    }
}

fn to_json_at(value: &Value, path: &Path) -> Result<serde_json::Value, ToJsonError> {
    let json = match value.kind() {
        Kind::Invalid => {
            return Err(ToJsonError::Unsupported {
                path: path.clone(),
                kind: Kind::Invalid,
            });
        }
        Kind::Null => serde_json::Value::Null,
        Kind::Bool => serde_json::Value::Bool(value.as_bool().unwrap_or_default()),
        Kind::Int => serde_json::Value::from(value.as_int().unwrap_or_default()),
        Kind::Float => {
            let f = value.as_float().unwrap_or_default();
            let number = serde_json::Number::from_f64(f).ok_or_else(|| {
                ToJsonError::NonFiniteFloat {
                    path: path.clone(),
                    value: f,
                }
            })?;
            serde_json::Value::Number(number)
        }
        Kind::String => serde_json::Value::String(value.as_str().unwrap_or_default().to_string()),
        Kind::Sequence => {
            let items = value.as_sequence().unwrap_or_default();
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                out.push(to_json_at(item, &path.index(i))?);
            }
            serde_json::Value::Array(out)
        }
        Kind::Mapping => {
            let mut out = serde_json::Map::new();
            if let Some(entries) = value.as_mapping() {
                for (key, item) in entries {
                    out.insert(key.clone(), to_json_at(item, &path.key(key.as_str()))?);
                }
            }
            serde_json::Value::Object(out)
        }
    };
    Ok(json)
}
