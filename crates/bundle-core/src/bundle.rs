//! The bundle and its authoritative configuration tree.

use bundle_config::{bundle_schema, normalize};
use bundle_dyn::Value;
use bundle_error_reporting::Diagnostics;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File names recognized as the bundle's root configuration, in order of
/// preference.
pub const CONFIG_FILE_NAMES: &[&str] = &[
    "databricks.yml",
    "databricks.yaml",
    "bundle.yml",
    "bundle.yaml",
];

#[derive(Debug, Error)]
pub enum BundleError {
    #[error("unable to locate bundle root: no {} found in {}", CONFIG_FILE_NAMES.join(", "), root.display())]
    ConfigNotFound { root: PathBuf },

    #[error("failed to resolve bundle root {}: {source}", root.display())]
    InvalidRoot {
        root: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Load(#[from] bundle_yaml::Error),

    #[error("invalid configuration in {}: {summary}", file.display())]
    Invalid { file: PathBuf, summary: String },
}

/// A bundle: its root directory and its configuration tree.
///
/// The tree is only ever replaced as a whole through [`Bundle::mutate`].
#[derive(Debug, Clone)]
pub struct Bundle {
    root_path: PathBuf,
    config: Value,
    diagnostics: Diagnostics,
}

impl Bundle {
    pub fn new(root_path: impl Into<PathBuf>, config: Value) -> Self {
        Self {
            root_path: root_path.into(),
            config,
            diagnostics: Diagnostics::new(),
        }
    }

    /// Load the bundle rooted at `root`.
    ///
    /// The root is made absolute so locations recorded in the tree are
    /// absolute too. The tree is normalized against the bundle schema, so it
    /// has the same shape as generator output read back later. What
    /// normalization reported is kept in [`Bundle::diagnostics`].
    pub fn load(root: &Path) -> Result<Self, BundleError> {
        let root_path = std::path::absolute(root).map_err(|source| BundleError::InvalidRoot {
            root: root.to_path_buf(),
            source,
        })?;

        let file = CONFIG_FILE_NAMES
            .iter()
            .map(|name| root_path.join(name))
            .find(|path| path.is_file())
            .ok_or_else(|| BundleError::ConfigNotFound {
                root: root_path.clone(),
            })?;

        tracing::debug!(file = %file.display(), "Loading bundle configuration");
        let loaded = bundle_yaml::load_file(&file)?;
        let (config, diagnostics) = normalize(bundle_schema(), &loaded);
        if !config.is_valid() {
            let summary = diagnostics
                .first_error()
                .map(|diag| diag.summary.clone())
                .unwrap_or_default();
            return Err(BundleError::Invalid { file, summary });
        }

        Ok(Self {
            root_path,
            config,
            diagnostics,
        })
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    pub fn config(&self) -> &Value {
        &self.config
    }

    /// Warnings and errors found while loading the configuration.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Replace the configuration with the result of `f`.
    ///
    /// On error the configuration is left untouched.
    pub fn mutate<E, F>(&mut self, f: F) -> Result<(), E>
    where
        F: FnOnce(&Value) -> Result<Value, E>,
    {
        let updated = f(&self.config)?;
        self.config = updated;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_prefers_databricks_yml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bundle.yml"), "bundle:\n  name: other\n").unwrap();
        std::fs::write(dir.path().join("databricks.yml"), "bundle:\n  name: demo\n").unwrap();

        let bundle = Bundle::load(dir.path()).unwrap();
        let name = bundle.config().get(&"bundle.name".parse().unwrap()).unwrap();
        assert_eq!(name.as_str(), Some("demo"));
        assert!(bundle.root_path().is_absolute());
        assert!(name.location().unwrap().file.ends_with("databricks.yml"));
    }

    #[test]
    fn test_load_missing_config() {
        let dir = tempfile::tempdir().unwrap();
        let err = Bundle::load(dir.path()).unwrap_err();
        assert!(matches!(err, BundleError::ConfigNotFound { .. }));
        assert!(err.to_string().contains("databricks.yml, databricks.yaml"));
    }

    #[test]
    fn test_load_normalizes_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("databricks.yml"),
            "bundle:\n  name: 2024\npython:\n  venv: .venv\n",
        )
        .unwrap();

        let bundle = Bundle::load(dir.path()).unwrap();
        let name = bundle.config().get(&"bundle.name".parse().unwrap()).unwrap();
        assert_eq!(name.as_str(), Some("2024"));
        assert!(bundle.config().get_key("python").is_none());

        let summaries: Vec<_> = bundle.diagnostics().iter().map(|d| d.summary.as_str()).collect();
        assert_eq!(summaries, vec!["unknown field: python"]);
        assert!(!bundle.diagnostics().has_error());
    }

    #[test]
    fn test_load_rejects_non_mapping_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("databricks.yml"), "- a\n- b\n").unwrap();

        let err = Bundle::load(dir.path()).unwrap_err();
        assert!(matches!(err, BundleError::Invalid { .. }));
        assert!(err.to_string().ends_with("expected map, found sequence"), "{err}");
    }

    #[test]
    fn test_mutate_is_atomic() {
        let original = Value::from_pairs([("a", Value::int(1))]);
        let mut bundle = Bundle::new("/bundle", original.clone());

        let result: Result<(), String> = bundle.mutate(|_| Err("boom".to_string()));
        assert_eq!(result, Err("boom".to_string()));
        assert_eq!(bundle.config(), &original);

        bundle
            .mutate(|_| Ok::<_, String>(Value::from_pairs([("a", Value::int(2))])))
            .unwrap();
        assert_eq!(bundle.config().get_key("a").unwrap().as_int(), Some(2));
    }
}
