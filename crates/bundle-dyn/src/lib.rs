//! # bundle-dyn
//!
//! Dynamically typed configuration values with source location tracking.
//!
//! Bundle configuration is loaded from YAML files, rewritten by mutators and
//! finally handed to code that expects a typed shape. In between, it lives as a
//! [`Value`] tree: maps, sequences and scalars where every node remembers the
//! [`Location`] it was read from.
//!
//! Nodes are addressed with a [`Path`], an ordered list of map keys and
//! sequence indices that renders as `resources.jobs.job0.tasks[0]`.
//!
//! ## Example
//!
//! ```rust
//! use bundle_dyn::{Mapping, Path, Value};
//!
//! let mut job = Mapping::new();
//! job.insert("name".to_string(), Value::string("job_0"));
//! let root = Value::from_pairs([(
//!     "resources",
//!     Value::from_pairs([("jobs", Value::from_pairs([("job0", Value::mapping(job))]))]),
//! )]);
//!
//! let path: Path = "resources.jobs.job0.name".parse().unwrap();
//! assert_eq!(root.get(&path).unwrap().as_str(), Some("job_0"));
//! ```

mod json;
mod location;
mod path;
mod value;

pub use json::ToJsonError;
pub use location::Location;
pub use path::{Path, PathComponent, PathError};
pub use value::{Kind, Mapping, Value};
