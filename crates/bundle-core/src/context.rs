//! Environment and cancellation handed to mutators.

use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Process environment a mutator may depend on.
///
/// Mutators never read environment variables themselves; the binary fills
/// this in once at startup.
#[derive(Debug, Clone, Default)]
pub struct BundleEnv {
    /// Root for scratch directories (`BUNDLE_TMP`).
    pub temp_dir: Option<PathBuf>,
}

impl BundleEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_temp_dir(mut self, temp_dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(temp_dir.into());
        self
    }
}

/// Per-run context shared by all mutators of a pipeline.
#[derive(Debug, Clone, Default)]
pub struct MutatorContext {
    pub env: BundleEnv,

    /// Cancelled when the user interrupts the run.
    pub cancel: CancellationToken,

    /// Upper bound for any external process a mutator starts.
    pub timeout: Option<Duration>,
}

impl MutatorContext {
    pub fn new(env: BundleEnv) -> Self {
        Self {
            env,
            ..Self::default()
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}
