//! Event-driven loader that builds located value trees.

use crate::{Error, Result};
use bundle_dyn::{Location, Mapping, Value};
use std::path::{Path, PathBuf};
use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser};
use yaml_rust2::scanner::{Marker, TScalarStyle};

/// Load the first YAML document in `content`.
///
/// `file` is recorded in the location of every node. An empty document loads
/// as `null` located at the start of the file.
///
/// # Errors
///
/// Returns an error for invalid YAML, duplicate or non-scalar mapping keys,
/// and aliases.
pub fn load(content: &str, file: &Path) -> Result<Value> {
    let mut parser = Parser::new_from_str(content);
    let mut builder = ValueBuilder::new(file);

    parser
        .load(&mut builder, false)
        .map_err(|source| Error::Syntax {
            file: file.to_path_buf(),
            source,
        })?;

    builder.finish()
}

/// Read and load a YAML file.
pub fn load_file(file: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(file).map_err(|source| Error::Io {
        file: file.to_path_buf(),
        source,
    })?;
    load(&content, file)
}

/// Receives parser events and assembles the value tree.
struct ValueBuilder {
    file: PathBuf,

    /// Containers being built, innermost last.
    stack: Vec<Frame>,

    root: Option<Value>,

    /// First structural error; later events are ignored once set.
    error: Option<Error>,
}

enum Frame {
    Sequence {
        location: Location,
        items: Vec<Value>,
    },
    Mapping {
        location: Location,
        entries: Mapping,
        /// Key waiting for its value.
        pending_key: Option<(String, Location)>,
    },
}

impl ValueBuilder {
    fn new(file: &Path) -> Self {
        Self {
            file: file.to_path_buf(),
            stack: Vec::new(),
            root: None,
            error: None,
        }
    }

    fn finish(self) -> Result<Value> {
        if let Some(err) = self.error {
            return Err(err);
        }
        Ok(self
            .root
            .unwrap_or_else(|| Value::null().at(Location::new(self.file.clone(), 1, 1))))
    }

    fn location(&self, marker: &Marker) -> Location {
        // scanner lines are already 1-based, columns are 0-based
        Location::new(self.file.clone(), marker.line(), marker.col() + 1)
    }

    fn fail(&mut self, location: Location, message: impl Into<String>) {
        if self.error.is_none() {
            self.error = Some(Error::Structure {
                location,
                message: message.into(),
            });
        }
    }

    /// Whether the innermost container is a mapping waiting for a key.
    fn expects_key(&self) -> bool {
        matches!(
            self.stack.last(),
            Some(Frame::Mapping {
                pending_key: None,
                ..
            })
        )
    }

    fn push_key(&mut self, key: String, location: Location) {
        let duplicate = match self.stack.last_mut() {
            Some(Frame::Mapping {
                entries,
                pending_key,
                ..
            }) => {
                if entries.contains_key(&key) {
                    true
                } else {
                    *pending_key = Some((key.clone(), location.clone()));
                    false
                }
            }
            _ => false,
        };
        if duplicate {
            self.fail(location, format!("duplicate key '{}'", key));
        }
    }

    fn push_complete(&mut self, value: Value) {
        match self.stack.last_mut() {
            None => self.root = Some(value),
            Some(Frame::Sequence { items, .. }) => items.push(value),
            Some(Frame::Mapping {
                entries,
                pending_key,
                ..
            }) => {
                if let Some((key, _)) = pending_key.take() {
                    entries.insert(key, value);
                }
            }
        }
    }

    fn start_container(&mut self, frame: Frame, location: Location) {
        if self.expects_key() {
            self.fail(location, "mapping keys must be scalars");
        }
        self.stack.push(frame);
    }
}

impl MarkedEventReceiver for ValueBuilder {
    fn on_event(&mut self, ev: Event, marker: Marker) {
        if self.error.is_some() {
            return;
        }
        let location = self.location(&marker);

        match ev {
            Event::Nothing
            | Event::StreamStart
            | Event::StreamEnd
            | Event::DocumentStart
            | Event::DocumentEnd => {}

            Event::Scalar(text, style, _anchor_id, _tag) => {
                if self.expects_key() {
                    self.push_key(text, location);
                } else {
                    let value = if style == TScalarStyle::Plain {
                        resolve_plain_scalar(&text)
                    } else {
                        Value::string(text)
                    };
                    self.push_complete(value.at(location));
                }
            }

            Event::SequenceStart(_anchor_id, _tag) => {
                let frame = Frame::Sequence {
                    location: location.clone(),
                    items: Vec::new(),
                };
                self.start_container(frame, location);
            }

            Event::MappingStart(_anchor_id, _tag) => {
                let frame = Frame::Mapping {
                    location: location.clone(),
                    entries: Mapping::new(),
                    pending_key: None,
                };
                self.start_container(frame, location);
            }

            Event::SequenceEnd | Event::MappingEnd => match self.stack.pop() {
                Some(Frame::Sequence { location, items }) => {
                    self.push_complete(Value::sequence(items).at(location));
                }
                Some(Frame::Mapping {
                    location, entries, ..
                }) => {
                    self.push_complete(Value::mapping(entries).at(location));
                }
                None => self.fail(location, "unbalanced collection end"),
            },

            Event::Alias(_anchor_id) => {
                self.fail(location, "YAML aliases are not supported");
            }
        }
    }
}

/// Resolve an unquoted scalar with YAML 1.2 core schema rules.
fn resolve_plain_scalar(text: &str) -> Value {
    match text {
        "" | "~" | "null" | "Null" | "NULL" => return Value::null(),
        "true" | "True" | "TRUE" => return Value::bool(true),
        "false" | "False" | "FALSE" => return Value::bool(false),
        ".inf" | ".Inf" | ".INF" | "+.inf" | "+.Inf" | "+.INF" => {
            return Value::float(f64::INFINITY);
        }
        "-.inf" | "-.Inf" | "-.INF" => return Value::float(f64::NEG_INFINITY),
        ".nan" | ".NaN" | ".NAN" => return Value::float(f64::NAN),
        _ => {}
    }

    if let Some(hex) = text.strip_prefix("0x") {
        if let Ok(i) = i64::from_str_radix(hex, 16) {
            return Value::int(i);
        }
    }
    if let Some(octal) = text.strip_prefix("0o") {
        if let Ok(i) = i64::from_str_radix(octal, 8) {
            return Value::int(i);
        }
    }
    if let Ok(i) = text.parse::<i64>() {
        return Value::int(i);
    }

    // f64::from_str also accepts "inf" and "nan", which YAML treats as strings
    let numeric = text
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));
    if numeric && text.chars().any(|c| c.is_ascii_digit()) {
        if let Ok(f) = text.parse::<f64>() {
            return Value::float(f);
        }
    }

    Value::string(text)
}
