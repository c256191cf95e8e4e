//! # bundle-yaml
//!
//! Loads YAML (and therefore JSON) documents into [`bundle_dyn::Value`] trees
//! where every node carries the file, line and column it was read from.
//!
//! Plain scalars are resolved with the YAML 1.2 core schema: `yes`/`no` stay
//! strings, `0o17` is an integer. Quoted scalars are always strings.
//!
//! ```rust
//! use std::path::Path;
//!
//! let value = bundle_yaml::load("bundle:\n  name: demo\n", Path::new("/b/bundle.yml")).unwrap();
//! let name = value.get_key("bundle").and_then(|b| b.get_key("name")).unwrap();
//! assert_eq!(name.as_str(), Some("demo"));
//! assert_eq!(name.location().unwrap().column, 9);
//! ```

mod error;
mod loader;

pub use error::{Error, Result};
pub use loader::{load, load_file};
