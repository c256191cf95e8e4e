//! Error types for YAML loading.

use bundle_dyn::Location;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for bundle-yaml operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading a YAML document.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read {}: {source}", file.display())]
    Io {
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML syntax error reported by the scanner.
    #[error("failed to parse {}: {source}", file.display())]
    Syntax {
        file: PathBuf,
        #[source]
        source: yaml_rust2::ScanError,
    },

    /// Well-formed YAML that cannot be represented as a configuration value.
    #[error("{location}: {message}")]
    Structure { location: Location, message: String },
}
