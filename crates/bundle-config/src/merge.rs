//! Structural diff and override merge of two value trees.
//!
//! The merge walks both trees depth-first. Mappings are compared by key
//! identity; every other pair of nodes (scalars, sequences, mismatched kinds)
//! is compared as a whole. A sequence that differs in any element is a single
//! update at the sequence's own path.

use bundle_dyn::{Mapping, Path, Value};
use std::cell::RefCell;
use std::fmt;
use thiserror::Error;

/// The kind of change found between two trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChangeKind::Insert => "insert",
            ChangeKind::Update => "update",
            ChangeKind::Delete => "delete",
        })
    }
}

/// A change the merge would apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub path: Path,
    pub kind: ChangeKind,
}

/// A rejected change. Aborts the merge that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OverrideError {
    #[error("unexpected change at '{path}' ({kind})")]
    UnexpectedChange { path: Path, kind: ChangeKind },
}

impl OverrideError {
    pub fn unexpected(path: Path, kind: ChangeKind) -> Self {
        OverrideError::UnexpectedChange { path, kind }
    }

    pub fn path(&self) -> &Path {
        match self {
            OverrideError::UnexpectedChange { path, .. } => path,
        }
    }

    pub fn kind(&self) -> ChangeKind {
        match self {
            OverrideError::UnexpectedChange { kind, .. } => *kind,
        }
    }
}

/// Decides what happens to each change found by [`override_values`].
///
/// Accepting an insert or update returns the value to splice into the merged
/// tree, normally the candidate value unchanged. Returning an error rejects
/// the change and aborts the merge.
pub trait OverrideVisitor {
    /// `value` is present in the candidate tree at `path` but not in the
    /// authoritative one.
    fn visit_insert(&self, path: &Path, value: Value) -> Result<Value, OverrideError>;

    /// The node at `path` differs between the trees.
    fn visit_update(&self, path: &Path, left: Value, right: Value) -> Result<Value, OverrideError>;

    /// `value` is present in the authoritative tree at `path` but missing from
    /// the candidate. Accepting drops it from the merged tree.
    fn visit_delete(&self, path: &Path, value: &Value) -> Result<(), OverrideError>;
}

/// Merge `right` over `left`, consulting `visitor` for every difference.
///
/// Nodes that are structurally equal keep the value (and location) from
/// `left` without calling the visitor. Merged mappings keep the location of
/// the `left` mapping; keys of `left` come first, in their original order,
/// followed by inserted keys in the order of `right`.
///
/// # Errors
///
/// Returns the first error produced by the visitor. Nothing is merged in that
/// case.
pub fn override_values<V>(left: &Value, right: &Value, visitor: &V) -> Result<Value, OverrideError>
where
    V: OverrideVisitor + ?Sized,
{
    override_at(&Path::empty(), left, right, visitor)
}

fn override_at<V>(path: &Path, left: &Value, right: &Value, visitor: &V) -> Result<Value, OverrideError>
where
    V: OverrideVisitor + ?Sized,
{
    let (Some(left_entries), Some(right_entries)) = (left.as_mapping(), right.as_mapping()) else {
        if left == right {
            return Ok(left.clone());
        }
        return visitor.visit_update(path, left.clone(), right.clone());
    };

    let mut merged = Mapping::with_capacity(left_entries.len().max(right_entries.len()));

    for (key, left_value) in left_entries {
        let child = path.key(key.as_str());
        match right_entries.get(key) {
            Some(right_value) => {
                let value = override_at(&child, left_value, right_value, visitor)?;
                merged.insert(key.clone(), value);
            }
            None => visitor.visit_delete(&child, left_value)?,
        }
    }

    for (key, right_value) in right_entries {
        if left_entries.contains_key(key) {
            continue;
        }
        let child = path.key(key.as_str());
        let value = visitor.visit_insert(&child, right_value.clone())?;
        merged.insert(key.clone(), value);
    }

    Ok(Value::mapping(merged).with_location(left.location().cloned()))
}

/// List every change between `left` and `right`, in merge order.
pub fn diff(left: &Value, right: &Value) -> Vec<Change> {
    let recorder = Recorder::default();
    // the recorder accepts everything, so the merge cannot fail
    let _ = override_values(left, right, &recorder);
    recorder.changes.into_inner()
}

#[derive(Default)]
struct Recorder {
    changes: RefCell<Vec<Change>>,
}

impl Recorder {
    fn record(&self, path: &Path, kind: ChangeKind) {
        self.changes.borrow_mut().push(Change {
            path: path.clone(),
            kind,
        });
    }
}

impl OverrideVisitor for Recorder {
    fn visit_insert(&self, path: &Path, value: Value) -> Result<Value, OverrideError> {
        self.record(path, ChangeKind::Insert);
        Ok(value)
    }

    fn visit_update(&self, path: &Path, _left: Value, right: Value) -> Result<Value, OverrideError> {
        self.record(path, ChangeKind::Update);
        Ok(right)
    }

    fn visit_delete(&self, path: &Path, _value: &Value) -> Result<(), OverrideError> {
        self.record(path, ChangeKind::Delete);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bundle_dyn::Location;

    /// Visitor that rejects everything and counts calls.
    #[derive(Default)]
    struct RejectAll {
        calls: RefCell<usize>,
    }

    impl OverrideVisitor for RejectAll {
        fn visit_insert(&self, path: &Path, _value: Value) -> Result<Value, OverrideError> {
            *self.calls.borrow_mut() += 1;
            Err(OverrideError::unexpected(path.clone(), ChangeKind::Insert))
        }

        fn visit_update(&self, path: &Path, _l: Value, _r: Value) -> Result<Value, OverrideError> {
            *self.calls.borrow_mut() += 1;
            Err(OverrideError::unexpected(path.clone(), ChangeKind::Update))
        }

        fn visit_delete(&self, path: &Path, _value: &Value) -> Result<(), OverrideError> {
            *self.calls.borrow_mut() += 1;
            Err(OverrideError::unexpected(path.clone(), ChangeKind::Delete))
        }
    }

    fn jobs() -> Value {
        Value::from_pairs([(
            "resources",
            Value::from_pairs([(
                "jobs",
                Value::from_pairs([(
                    "job0",
                    Value::from_pairs([("name", Value::string("job_0"))]),
                )]),
            )]),
        )])
    }

    #[test]
    fn test_identical_trees_skip_visitor() {
        let left = jobs();
        let visitor = RejectAll::default();
        let merged = override_values(&left, &jobs(), &visitor).unwrap();
        assert_eq!(merged, left);
        assert_eq!(*visitor.calls.borrow(), 0);
    }

    #[test]
    fn test_nan_trees_skip_visitor() {
        let tree = Value::from_pairs([
            ("x", Value::float(f64::NAN)),
            ("y", Value::sequence(vec![Value::float(f64::NAN)])),
        ]);
        let visitor = RejectAll::default();
        override_values(&tree, &tree, &visitor).unwrap();
        assert_eq!(*visitor.calls.borrow(), 0);
        assert!(diff(&tree, &tree.clone()).is_empty());
    }

    #[test]
    fn test_equal_nodes_keep_left_location() {
        let here = Location::new("a.yml", 1, 1);
        let there = Location::new("b.yml", 9, 9);
        let left = Value::from_pairs([("x", Value::int(1).at(here.clone()))]).at(here.clone());
        let right = Value::from_pairs([("x", Value::int(1).at(there.clone()))]).at(there);

        let merged = override_values(&left, &right, &RejectAll::default()).unwrap();
        assert_eq!(merged.location(), Some(&here));
        assert_eq!(merged.get_key("x").unwrap().location(), Some(&here));
    }

    #[test]
    fn test_first_rejection_aborts() {
        let left = Value::from_pairs([("a", Value::int(1)), ("b", Value::int(2))]);
        let right = Value::from_pairs([("a", Value::int(10)), ("b", Value::int(20))]);
        let visitor = RejectAll::default();

        let err = override_values(&left, &right, &visitor).unwrap_err();
        assert_eq!(err.to_string(), "unexpected change at 'a' (update)");
        assert_eq!(*visitor.calls.borrow(), 1);
    }

    #[test]
    fn test_delete_and_insert_paths() {
        let left = jobs();
        let right = Value::from_pairs([(
            "resources",
            Value::from_pairs([(
                "jobs",
                Value::from_pairs([(
                    "job1",
                    Value::from_pairs([("name", Value::string("job_1"))]),
                )]),
            )]),
        )]);

        let changes = diff(&left, &right);
        assert_eq!(
            changes,
            vec![
                Change {
                    path: "resources.jobs.job0".parse().unwrap(),
                    kind: ChangeKind::Delete,
                },
                Change {
                    path: "resources.jobs.job1".parse().unwrap(),
                    kind: ChangeKind::Insert,
                },
            ]
        );
    }

    #[test]
    fn test_sequences_are_compared_whole() {
        let left = Value::from_pairs([(
            "include",
            Value::sequence(vec![Value::string("a.yml"), Value::string("b.yml")]),
        )]);
        let right = Value::from_pairs([(
            "include",
            Value::sequence(vec![Value::string("a.yml"), Value::string("c.yml")]),
        )]);

        let changes = diff(&left, &right);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].path.to_string(), "include");
        assert_eq!(changes[0].kind, ChangeKind::Update);
    }

    #[test]
    fn test_kind_change_is_update() {
        let left = Value::from_pairs([("a", Value::from_pairs([("b", Value::int(1))]))]);
        let right = Value::from_pairs([("a", Value::string("flat"))]);

        let changes = diff(&left, &right);
        assert_eq!(
            changes,
            vec![Change {
                path: "a".parse().unwrap(),
                kind: ChangeKind::Update,
            }]
        );
    }

    #[test]
    fn test_accepting_visitor_yields_right() {
        let left = jobs();
        let right = Value::from_pairs([
            (
                "resources",
                Value::from_pairs([(
                    "jobs",
                    Value::from_pairs([(
                        "job0",
                        Value::from_pairs([
                            ("name", Value::string("renamed")),
                            ("description", Value::string("new")),
                        ]),
                    )]),
                )]),
            ),
            ("include", Value::sequence(vec![Value::string("a.yml")])),
        ]);

        let merged = override_values(&left, &right, &Recorder::default()).unwrap();
        assert_eq!(merged, right);
    }

    #[test]
    fn test_merged_key_order() {
        let left = Value::from_pairs([("b", Value::int(1)), ("a", Value::int(2))]);
        let right = Value::from_pairs([("c", Value::int(3)), ("a", Value::int(2)), ("b", Value::int(1))]);

        let merged = override_values(&left, &right, &Recorder::default()).unwrap();
        let keys: Vec<&str> = merged.as_mapping().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }
}
