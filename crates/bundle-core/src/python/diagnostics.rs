//! Reader for the diagnostics file written by the Python mutator.
//!
//! The file is a stream of JSON objects, usually one per line:
//!
//! ```json
//! {"severity": "error", "summary": "job name is required", "path": "resources.jobs.job0"}
//! {"severity": "warning", "summary": "...", "location": {"file": "jobs.py", "line": 3, "column": 5}}
//! ```

use bundle_dyn::{Location, Path, PathError};
use bundle_error_reporting::{Diagnostic, Diagnostics, Severity};
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiagnosticsFileError {
    #[error("failed to open diagnostics file {}: {source}", file.display())]
    Io {
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse diagnostics: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to parse diagnostics: {0}")]
    Path(#[from] PathError),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum PythonSeverity {
    Error,
    Warning,
}

#[derive(Debug, Deserialize)]
struct PythonLocation {
    file: PathBuf,
    #[serde(default)]
    line: usize,
    #[serde(default)]
    column: usize,
}

#[derive(Debug, Deserialize)]
struct PythonDiagnostic {
    severity: PythonSeverity,
    summary: String,
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    location: Option<PythonLocation>,
    #[serde(default)]
    path: Option<String>,
}

impl PythonDiagnostic {
    fn into_diagnostic(self) -> Result<Diagnostic, PathError> {
        let severity = match self.severity {
            PythonSeverity::Error => Severity::Error,
            PythonSeverity::Warning => Severity::Warning,
        };

        let mut diagnostic = Diagnostic::new(severity, self.summary).with_location(
            self.location
                .map(|loc| Location::new(loc.file, loc.line, loc.column)),
        );
        if let Some(detail) = self.detail.filter(|d| !d.is_empty()) {
            diagnostic = diagnostic.with_detail(detail);
        }
        if let Some(path) = self.path.filter(|p| !p.is_empty()) {
            diagnostic = diagnostic.with_path(path.parse::<Path>()?);
        }
        Ok(diagnostic)
    }
}

/// Parse diagnostics from the file contents. Empty input has no diagnostics.
pub fn parse_diagnostics(content: &str) -> Result<Diagnostics, DiagnosticsFileError> {
    let mut diagnostics = Diagnostics::new();
    for entry in serde_json::Deserializer::from_str(content).into_iter::<PythonDiagnostic>() {
        diagnostics.push(entry?.into_diagnostic()?);
    }
    Ok(diagnostics)
}

/// Read and parse the diagnostics file. A missing file is an error: the
/// mutator always creates it.
pub fn load_diagnostics(file: &std::path::Path) -> Result<Diagnostics, DiagnosticsFileError> {
    let content = std::fs::read_to_string(file).map_err(|source| DiagnosticsFileError::Io {
        file: file.to_path_buf(),
        source,
    })?;
    parse_diagnostics(&content)
}
