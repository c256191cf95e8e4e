//! The Python mutator.
//!
//! Hands the bundle configuration to a Python generator
//! (`python -m databricks.bundles.build`) and merges what it returns back
//! into the bundle, subject to the [`PhasePolicy`] of the current phase.
//!
//! One run goes through these steps:
//!
//! 1. resolve the interpreter in the configured virtual environment
//! 2. write the configuration as JSON to `input.json` in a scratch directory
//! 3. run the generator with `--phase`, `--input`, `--output` and `--diagnostics`
//! 4. read `diagnostics.json`; errors reported there win over the exit code
//! 5. read `output.json` as YAML and normalize it against the bundle schema
//! 6. merge the output into the configuration
//!
//! Warnings reported by the generator are returned even when the run
//! succeeds.

pub mod diagnostics;
pub mod process;
pub mod scratch;
pub mod settings;

use crate::bundle::Bundle;
use crate::context::MutatorContext;
use crate::error::{CancelReason, MutatorError};
use crate::mutator::Mutator;
use crate::phase::Phase;
use crate::policy::PhasePolicy;
use bundle_config::{bundle_schema, normalize, override_values};
use bundle_dyn::Value;
use bundle_error_reporting::{Diagnostic, Diagnostics, Severity};
use process::{NativeProcessRunner, ProcessExit, ProcessInvocation, ProcessRunner};
use scratch::ScratchDir;
use settings::{PyDabsSettings, interpreter_path};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Module run by the interpreter.
pub const GENERATOR_MODULE: &str = "databricks.bundles.build";

/// File name the generator output is attributed to. It lives in the bundle
/// root so that paths inside the output resolve relative to the bundle.
pub const GENERATED_FILE_NAME: &str = "__generated_by_pydabs__.yml";

/// Runs the Python generator for one [`Phase`].
///
/// [`Mutator::apply`] blocks until the generator is done, driving the process
/// on a private current-thread tokio runtime. Called from inside another
/// tokio runtime, that private runtime runs on a thread of its own, and the
/// calling worker is blocked for the duration of the run.
pub struct PythonMutator {
    phase: Phase,
    runner: Arc<dyn ProcessRunner>,
}

impl PythonMutator {
    pub fn new(phase: Phase) -> Self {
        Self::with_runner(phase, Arc::new(NativeProcessRunner))
    }

    pub fn with_runner(phase: Phase, runner: Arc<dyn ProcessRunner>) -> Self {
        Self { phase, runner }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Run the generator against `config` and return its normalized output
    /// with any non-fatal diagnostics it reported.
    fn run(
        &self,
        ctx: &MutatorContext,
        root_path: &Path,
        interpreter: &Path,
        config: &Value,
    ) -> Result<(Value, Diagnostics), MutatorError> {
        if !interpreter.try_exists().unwrap_or(false) {
            return Err(MutatorError::InterpreterNotFound {
                interpreter: interpreter.to_path_buf(),
            });
        }

        let scratch = ScratchDir::prepare(&ctx.env)?;
        write_input(&scratch.input(), config)?;

        let invocation = ProcessInvocation {
            program: interpreter.to_path_buf(),
            args: vec![
                "-m".to_string(),
                GENERATOR_MODULE.to_string(),
                "--phase".to_string(),
                self.phase.to_string(),
                "--input".to_string(),
                scratch.input().display().to_string(),
                "--output".to_string(),
                scratch.output().display().to_string(),
                "--diagnostics".to_string(),
                scratch.diagnostics().display().to_string(),
            ],
            working_dir: root_path.to_path_buf(),
            log_prefix: self.name(),
        };

        tracing::debug!(
            phase = %self.phase,
            interpreter = %interpreter.display(),
            scratch = %scratch.path().display(),
            "Starting python mutator"
        );

        let process_failure = match self.execute(ctx, &invocation)? {
            Ok(exit) if exit.is_success() => None,
            Ok(exit) => Some(exit.describe()),
            Err(err) => Some(format!(
                "failed to start {}: {}",
                invocation.program.display(),
                err
            )),
        };

        // diagnostics explain failures better than exit codes do
        let reported = diagnostics::load_diagnostics(&scratch.diagnostics());
        if let Ok(reported) = &reported {
            if reported.has_error() {
                return Err(MutatorError::DiagnosticsFatal {
                    diagnostics: reported.clone(),
                });
            }
        }

        // the process can fail without writing diagnostics, e.g. when the
        // generator package is not installed in the environment
        if let Some(detail) = process_failure {
            return Err(MutatorError::ProcessFailed { detail });
        }

        let reported = reported.map_err(|err| MutatorError::DiagnosticsUnreadable {
            reason: err.to_string(),
        })?;

        let output = load_output(root_path, &scratch.output())?;
        Ok((output, reported))
    }

    /// Drive the runner to completion, unless cancelled or timed out first.
    fn execute(
        &self,
        ctx: &MutatorContext,
        invocation: &ProcessInvocation,
    ) -> Result<std::io::Result<ProcessExit>, MutatorError> {
        let drive = || -> Result<std::io::Result<ProcessExit>, MutatorError> {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(|err| MutatorError::ProcessFailed {
                    detail: format!("failed to start async runtime: {}", err),
                })?;

            runtime.block_on(async {
                let timeout = async {
                    match ctx.timeout {
                        Some(after) => tokio::time::sleep(after).await,
                        None => std::future::pending::<()>().await,
                    }
                };

                // dropping the runner future stops the process
                tokio::select! {
                    biased;
                    _ = ctx.cancel.cancelled() => Err(MutatorError::Cancelled {
                        reason: CancelReason::Requested,
                    }),
                    _ = timeout => Err(MutatorError::Cancelled {
                        reason: CancelReason::TimedOut(ctx.timeout.unwrap_or_default()),
                    }),
                    result = self.runner.run(invocation) => Ok(result),
                }
            })
        };

        // a runtime cannot be started on a thread that is already inside one
        if tokio::runtime::Handle::try_current().is_ok() {
            std::thread::scope(|scope| {
                scope
                    .spawn(drive)
                    .join()
                    .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
            })
        } else {
            drive()
        }
    }
}

impl Mutator for PythonMutator {
    fn name(&self) -> String {
        format!("PythonMutator({})", self.phase)
    }

    fn apply(&self, ctx: &MutatorContext, bundle: &mut Bundle) -> Diagnostics {
        let settings = match PyDabsSettings::from_config(bundle.config()) {
            Ok(settings) => settings,
            Err(err) => return MutatorError::from(err).into_diagnostics(),
        };
        if !settings.enabled {
            return Diagnostics::new();
        }
        let Some(venv_path) = settings.venv_path() else {
            return MutatorError::NotConfigured.into_diagnostics();
        };

        let root_path = bundle.root_path().to_path_buf();
        let interpreter = interpreter_path(&root_path, venv_path);
        let mut warnings = Diagnostics::new();

        let result = bundle.mutate(|left| {
            let (right, reported) = self.run(ctx, &root_path, &interpreter, left)?;
            warnings = reported;
            let policy = PhasePolicy::new(self.phase);
            Ok::<_, MutatorError>(override_values(left, &right, &policy)?)
        });

        match result {
            Ok(()) => warnings,
            Err(err) => {
                tracing::debug!(phase = %self.phase, error = %err, "Python mutator failed");
                warnings.extend(err.into_diagnostics());
                warnings
            }
        }
    }
}

fn write_input(file: &Path, config: &Value) -> Result<(), MutatorError> {
    let json = config
        .to_json()
        .map_err(|err| MutatorError::SerializationFailed {
            reason: err.to_string(),
        })?;
    let content = serde_json::to_string(&json).map_err(|err| MutatorError::SerializationFailed {
        reason: err.to_string(),
    })?;
    std::fs::write(file, content).map_err(|err| MutatorError::SerializationFailed {
        reason: format!("{}: {}", file.display(), err),
    })
}

/// Read, parse and normalize the generator output.
fn load_output(root_path: &Path, file: &Path) -> Result<Value, MutatorError> {
    let content = std::fs::read_to_string(file).map_err(|err| MutatorError::OutputUnreadable {
        reason: format!("failed to open output file: {}", err),
    })?;

    let virtual_path = generated_file_path(root_path).map_err(|err| MutatorError::OutputUnreadable {
        reason: format!("failed to get absolute path: {}", err),
    })?;

    let generated = bundle_yaml::load(&content, &virtual_path).map_err(|err| {
        MutatorError::OutputUnreadable {
            reason: format!("failed to parse output file: {}", err),
        }
    })?;

    let (normalized, diags) = normalize(bundle_schema(), &generated);

    // output should already be normalized; a warning means a generator bug
    let problems: Diagnostics = diags
        .into_iter()
        .filter(|d| matches!(d.severity, Severity::Error | Severity::Warning))
        .collect();
    if !problems.is_empty() {
        return Err(MutatorError::NormalizationFailed {
            diagnostics: problems,
        });
    }

    if normalized.as_mapping().is_none() {
        let diag = Diagnostic::error(format!("expected map, found {}", normalized.kind()))
            .with_location(generated.location().cloned());
        return Err(MutatorError::NormalizationFailed {
            diagnostics: diag.into(),
        });
    }

    Ok(normalized)
}

fn generated_file_path(root_path: &Path) -> std::io::Result<PathBuf> {
    std::path::absolute(root_path.join(GENERATED_FILE_NAME))
}
