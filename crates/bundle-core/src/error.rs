//! Error types for bundle-core.

use crate::python::settings::SettingsError;
use bundle_config::OverrideError;
use bundle_error_reporting::{Diagnostic, Diagnostics};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Why a mutator run was abandoned before the process finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    Requested,
    TimedOut(Duration),
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelReason::Requested => f.write_str("cancelled"),
            CancelReason::TimedOut(after) => write!(f, "timed out after {:?}", after),
        }
    }
}

/// Failure of one Python mutator run. Every variant is terminal.
#[derive(Debug, Error)]
pub enum MutatorError {
    #[error(
        "\"experimental.pydabs.enabled\" can only be used when \"experimental.pydabs.venv_path\" is set"
    )]
    NotConfigured,

    #[error("invalid \"experimental.pydabs\" settings: {0}")]
    Settings(#[from] SettingsError),

    #[error("can't find \"{}\", check if venv is created", interpreter.display())]
    InterpreterNotFound { interpreter: PathBuf },

    #[error("failed to create cache dir {}: {source}", path.display())]
    ScratchDirCreationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write input file: {reason}")]
    SerializationFailed { reason: String },

    /// Non-zero exit, or the process could not be started.
    #[error("python mutator process failed: {detail}, use --debug to enable logging")]
    ProcessFailed { detail: String },

    /// The generator reported errors of its own. These win over the exit code.
    #[error("{}", summarize(diagnostics))]
    DiagnosticsFatal { diagnostics: Diagnostics },

    #[error("failed to load diagnostics: {reason}")]
    DiagnosticsUnreadable { reason: String },

    #[error("failed to load Python mutator output: {reason}")]
    OutputUnreadable { reason: String },

    /// Output did not fit the configuration schema. Warnings count too.
    #[error("failed to normalize output: {}", summarize(diagnostics))]
    NormalizationFailed { diagnostics: Diagnostics },

    #[error(transparent)]
    PolicyRejected(#[from] OverrideError),

    #[error("python mutator {reason}")]
    Cancelled { reason: CancelReason },
}

fn summarize(diagnostics: &Diagnostics) -> String {
    diagnostics
        .first_error()
        .or_else(|| diagnostics.iter().next())
        .map(|d| d.summary.clone())
        .unwrap_or_default()
}

impl MutatorError {
    /// Convert into diagnostics for the user.
    ///
    /// Generator-reported errors are passed through as they are; every other
    /// failure becomes a single error, keeping the path and location of the
    /// value it is about when there is one.
    pub fn into_diagnostics(self) -> Diagnostics {
        match self {
            MutatorError::DiagnosticsFatal { diagnostics } => diagnostics,
            MutatorError::NormalizationFailed { ref diagnostics } => {
                let culprit = diagnostics
                    .first_error()
                    .or_else(|| diagnostics.iter().next())
                    .cloned();
                let mut diag = Diagnostic::error(self.to_string());
                if let Some(culprit) = culprit {
                    diag = diag.with_location(culprit.location);
                    if let Some(path) = culprit.path {
                        diag = diag.with_path(path);
                    }
                }
                diag.into()
            }
            MutatorError::PolicyRejected(ref err) => {
                let path = err.path().clone();
                Diagnostic::error(self.to_string()).with_path(path).into()
            }
            other => Diagnostic::error(other.to_string()).into(),
        }
    }
}
