//! Scratch directory holding the files exchanged with the Python mutator.

use crate::context::BundleEnv;
use crate::error::MutatorError;
use std::io;
use std::path::{Path, PathBuf};

/// Directory with the input, output and diagnostics files of one run.
///
/// The directory is never removed so the files can be inspected afterwards.
#[derive(Debug, Clone)]
pub struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    /// Create or reuse the scratch directory.
    ///
    /// With a temp root configured this is `<root>/default/pydabs`, reused
    /// between runs. Otherwise a new `pydabs-*` directory is created in the
    /// system temp directory.
    pub fn prepare(env: &BundleEnv) -> Result<Self, MutatorError> {
        let path = match &env.temp_dir {
            Some(temp_dir) => {
                // targets are not selected yet when the mutator runs
                let path = temp_dir.join("default").join("pydabs");
                create_private_dir(&path).map_err(|source| {
                    MutatorError::ScratchDirCreationFailed {
                        path: path.clone(),
                        source,
                    }
                })?;
                path
            }
            None => tempfile::Builder::new()
                .prefix("pydabs-")
                .tempdir()
                .map(tempfile::TempDir::keep)
                .map_err(|source| MutatorError::ScratchDirCreationFailed {
                    path: std::env::temp_dir(),
                    source,
                })?,
        };

        let scratch = Self { path };
        scratch.clear_previous_run().map_err(|source| {
            MutatorError::ScratchDirCreationFailed {
                path: scratch.path.clone(),
                source,
            }
        })?;
        Ok(scratch)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn input(&self) -> PathBuf {
        self.path.join("input.json")
    }

    pub fn output(&self) -> PathBuf {
        self.path.join("output.json")
    }

    pub fn diagnostics(&self) -> PathBuf {
        self.path.join("diagnostics.json")
    }

    /// Files left by an earlier run must not be mistaken for new results.
    fn clear_previous_run(&self) -> io::Result<()> {
        for file in [self.output(), self.diagnostics()] {
            match std::fs::remove_file(&file) {
                Ok(()) => {}
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }
}

#[cfg(unix)]
fn create_private_dir(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    std::fs::DirBuilder::new()
        .recursive(true)
        .mode(0o700)
        .create(path)
}

#[cfg(not(unix))]
fn create_private_dir(path: &Path) -> io::Result<()> {
    std::fs::create_dir_all(path)
}
