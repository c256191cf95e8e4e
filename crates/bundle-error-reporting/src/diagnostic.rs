//! Core diagnostic types.

use bundle_dyn::{Location, Path};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Processing cannot continue
    Error,
    /// A problem that does not stop processing
    Warning,
    /// Informational message
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Error => "Error",
            Severity::Warning => "Warning",
            Severity::Info => "Info",
        })
    }
}

/// A single problem report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,

    /// One-line description of the problem
    pub summary: String,

    /// Optional longer explanation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// Where in the configuration sources the problem was found
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,

    /// Path of the configuration value the problem is about
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Path>,
}

impl Diagnostic {
    pub fn new(severity: Severity, summary: impl Into<String>) -> Self {
        Self {
            severity,
            summary: summary.into(),
            detail: None,
            location: None,
            path: None,
        }
    }

    pub fn error(summary: impl Into<String>) -> Self {
        Self::new(Severity::Error, summary)
    }

    pub fn warning(summary: impl Into<String>) -> Self {
        Self::new(Severity::Warning, summary)
    }

    pub fn info(summary: impl Into<String>) -> Self {
        Self::new(Severity::Info, summary)
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_location(mut self, location: Option<Location>) -> Self {
        self.location = location;
        self
    }

    pub fn with_path(mut self, path: Path) -> Self {
        self.path = Some(path);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Render for terminal display.
    ///
    /// ```text
    /// Error: expected string, found map
    ///   at resources.jobs.job0.name
    ///   in databricks.yml:4:13
    ///
    /// detail paragraph
    /// ```
    pub fn to_text(&self) -> String {
        let mut result = format!("{}: {}\n", self.severity, self.summary);

        if let Some(path) = &self.path {
            if !path.is_empty() {
                result.push_str(&format!("  at {}\n", path));
            }
        }
        if let Some(location) = &self.location {
            result.push_str(&format!("  in {}\n", location));
        }
        if let Some(detail) = &self.detail {
            result.push('\n');
            result.push_str(detail);
            result.push('\n');
        }

        result
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.summary)
    }
}

/// Ordered collection of diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.0.push(diagnostic);
    }

    /// Append all of `other`, keeping its order.
    pub fn extend(&mut self, other: Diagnostics) {
        self.0.extend(other.0);
    }

    pub fn has_error(&self) -> bool {
        self.0.iter().any(Diagnostic::is_error)
    }

    pub fn first_error(&self) -> Option<&Diagnostic> {
        self.0.iter().find(|d| d.is_error())
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter().filter(|d| d.is_error())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Render every diagnostic for terminal display, separated by blank lines.
    pub fn to_text(&self) -> String {
        self.0
            .iter()
            .map(Diagnostic::to_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl From<Diagnostic> for Diagnostics {
    fn from(diagnostic: Diagnostic) -> Self {
        Diagnostics(vec![diagnostic])
    }
}

impl From<Vec<Diagnostic>> for Diagnostics {
    fn from(diagnostics: Vec<Diagnostic>) -> Self {
        Diagnostics(diagnostics)
    }
}

impl FromIterator<Diagnostic> for Diagnostics {
    fn from_iter<I: IntoIterator<Item = Diagnostic>>(iter: I) -> Self {
        Diagnostics(iter.into_iter().collect())
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_to_text_summary_only() {
        let diag = Diagnostic::warning("unknown field: colour");
        assert_eq!(diag.to_text(), "Warning: unknown field: colour\n");
    }

    #[test]
    fn test_to_text_full() {
        let diag = Diagnostic::error("expected string, found map")
            .with_path("resources.jobs.job0.name".parse().unwrap())
            .with_location(Some(Location::new(PathBuf::from("databricks.yml"), 4, 13)))
            .with_detail("job names are plain strings");

        assert_eq!(
            diag.to_text(),
            "Error: expected string, found map\n  at resources.jobs.job0.name\n  in databricks.yml:4:13\n\njob names are plain strings\n"
        );
    }

    #[test]
    fn test_has_error_and_first_error() {
        let mut diags = Diagnostics::new();
        assert!(!diags.has_error());
        assert!(diags.first_error().is_none());

        diags.push(Diagnostic::warning("w"));
        diags.push(Diagnostic::error("e1"));
        diags.push(Diagnostic::error("e2"));

        assert!(diags.has_error());
        assert_eq!(diags.first_error().unwrap().summary, "e1");
        assert_eq!(diags.errors().count(), 2);
    }

    #[test]
    fn test_extend_keeps_order() {
        let mut diags: Diagnostics = Diagnostic::warning("a").into();
        diags.extend(vec![Diagnostic::error("b"), Diagnostic::info("c")].into());

        let summaries: Vec<&str> = diags.iter().map(|d| d.summary.as_str()).collect();
        assert_eq!(summaries, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_serde() {
        let diags: Diagnostics = Diagnostic::error("boom")
            .with_path("include[0]".parse().unwrap())
            .into();

        let json = serde_json::to_value(&diags).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{"severity": "error", "summary": "boom", "path": "include[0]"}])
        );

        let back: Diagnostics = serde_json::from_value(json).unwrap();
        assert_eq!(back, diags);
    }
}
