//! Override merging and schema normalization for bundle configuration.
//!
//! Two operations live here:
//!
//! - [`override_values`] compares an authoritative tree with a candidate tree
//!   and asks an [`OverrideVisitor`] to approve every insert, update and
//!   delete it finds. The first rejection aborts the merge.
//! - [`normalize`] checks a tree against a [`Schema`], coercing scalars where
//!   this is lossless and reporting everything else as diagnostics.
//!
//! # Example
//!
//! ```rust
//! use bundle_config::{ChangeKind, OverrideError, OverrideVisitor, override_values};
//! use bundle_dyn::{Path, Value};
//!
//! struct InsertOnly;
//!
//! impl OverrideVisitor for InsertOnly {
//!     fn visit_insert(&self, _path: &Path, value: Value) -> Result<Value, OverrideError> {
//!         Ok(value)
//!     }
//!     fn visit_update(&self, path: &Path, _l: Value, _r: Value) -> Result<Value, OverrideError> {
//!         Err(OverrideError::unexpected(path.clone(), ChangeKind::Update))
//!     }
//!     fn visit_delete(&self, path: &Path, _l: &Value) -> Result<(), OverrideError> {
//!         Err(OverrideError::unexpected(path.clone(), ChangeKind::Delete))
//!     }
//! }
//!
//! let left = Value::from_pairs([("a", Value::int(1))]);
//! let right = Value::from_pairs([("a", Value::int(1)), ("b", Value::int(2))]);
//! let merged = override_values(&left, &right, &InsertOnly).unwrap();
//! assert_eq!(merged, right);
//!
//! let changed = Value::from_pairs([("a", Value::int(3))]);
//! let err = override_values(&left, &changed, &InsertOnly).unwrap_err();
//! assert_eq!(err.to_string(), "unexpected change at 'a' (update)");
//! ```

pub mod merge;
pub mod normalize;
pub mod schema;

pub use merge::{Change, ChangeKind, OverrideError, OverrideVisitor, diff, override_values};
pub use normalize::normalize;
pub use schema::{Schema, bundle_schema};
