//! Source locations for configuration values.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Where a value was read from.
///
/// Line and column are 1-based. Values created in code have no location;
/// values produced by a loader carry the file they came from, which lets later
/// pipeline stages resolve relative paths and point error messages at the
/// right line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// File the value was read from.
    pub file: PathBuf,

    /// Line number (1-based).
    pub line: usize,

    /// Column number (1-based, in characters).
    pub column: usize,
}

impl Location {
    pub fn new(file: impl Into<PathBuf>, line: usize, column: usize) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }

    /// Check whether the location's file lies under `root`.
    ///
    /// Both paths are compared component-wise without touching the file
    /// system, so `root` should already be absolute when `file` is.
    pub fn is_within(&self, root: &Path) -> bool {
        self.file.starts_with(root)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file.display(), self.line, self.column)
    }
}
