//! `experimental.pydabs` settings.

use bundle_dyn::{Path, ToJsonError, Value};
use serde::Deserialize;
use std::path::{Path as FsPath, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error(transparent)]
    Encode(#[from] ToJsonError),

    #[error(transparent)]
    Decode(#[from] serde_json::Error),
}

/// Settings read from `experimental.pydabs`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PyDabsSettings {
    pub enabled: bool,
    pub venv_path: Option<String>,
}

impl PyDabsSettings {
    /// Read settings from a configuration tree. A missing section means
    /// the defaults, which leave the mutator disabled.
    pub fn from_config(config: &Value) -> Result<Self, SettingsError> {
        let section = Path::from_keys(["experimental", "pydabs"]);
        let Ok(value) = config.get(&section) else {
            return Ok(Self::default());
        };
        if value.is_null() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_value(value.to_json()?)?)
    }

    /// The virtual environment path, unless it is unset or empty.
    pub fn venv_path(&self) -> Option<&str> {
        self.venv_path.as_deref().filter(|p| !p.is_empty())
    }
}

/// Location of the Python interpreter inside a virtual environment.
///
/// Relative environment paths are resolved against `root`.
pub fn interpreter_path(root: &FsPath, venv_path: &str) -> PathBuf {
    let venv = root.join(venv_path);
    if cfg!(windows) {
        venv.join("Scripts").join("python3.exe")
    } else {
        venv.join("bin").join("python3")
    }
}
