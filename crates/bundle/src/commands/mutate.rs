//! Mutate command implementation.
//!
//! Loads the bundle at `--root`, runs the Python mutator for one phase and
//! prints the resulting configuration as JSON on stdout. Diagnostics go to
//! stderr.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use bundle_config::diff;
use bundle_core::{Bundle, BundleEnv, MutatorContext, MutatorPipeline, Phase, PythonMutator};
use bundle_error_reporting::Diagnostics;
use tracing::info;

/// Arguments for the mutate command
#[derive(Debug)]
pub struct MutateArgs {
    pub root: PathBuf,
    pub phase: Phase,
    /// Timeout for generator processes, in seconds
    pub timeout: Option<u64>,
}

/// Execute the mutate command
pub fn execute(args: MutateArgs) -> Result<()> {
    let env = env_from_process();
    let (bundle, diagnostics) = run(&args, env)?;

    if !diagnostics.is_empty() {
        eprintln!("{}", diagnostics.to_text());
    }
    if diagnostics.has_error() {
        anyhow::bail!("Mutators failed in phase {}", args.phase);
    }

    let json = bundle
        .config()
        .to_json()
        .context("Failed to encode configuration")?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

/// Load the bundle and run the pipeline. Returns the bundle as left by the
/// pipeline together with everything loading and the mutators reported.
///
/// The pipeline does not run when loading reported an error.
pub fn run(args: &MutateArgs, env: BundleEnv) -> Result<(Bundle, Diagnostics)> {
    let mut bundle = Bundle::load(&args.root)
        .with_context(|| format!("Failed to load bundle from {}", args.root.display()))?;

    let mut diagnostics = bundle.diagnostics().clone();
    if diagnostics.has_error() {
        return Ok((bundle, diagnostics));
    }

    let mut ctx = MutatorContext::new(env);
    if let Some(seconds) = args.timeout {
        ctx = ctx.with_timeout(Duration::from_secs(seconds));
    }

    let mut pipeline = MutatorPipeline::new();
    pipeline.push(Box::new(PythonMutator::new(args.phase)));

    let before = bundle.config().clone();
    diagnostics.extend(pipeline.execute(&ctx, &mut bundle));

    for change in diff(&before, bundle.config()) {
        info!(path = %change.path, kind = %change.kind, "Configuration changed");
    }

    Ok((bundle, diagnostics))
}

/// Scratch files go under `BUNDLE_TMP` when it is set.
fn env_from_process() -> BundleEnv {
    match std::env::var_os("BUNDLE_TMP") {
        Some(dir) if !dir.is_empty() => BundleEnv::new().with_temp_dir(dir),
        _ => BundleEnv::new(),
    }
}
