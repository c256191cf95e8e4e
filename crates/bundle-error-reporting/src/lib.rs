//! Diagnostics for bundle configuration processing.
//!
//! Every stage that looks at bundle configuration (loading, normalization,
//! mutators) reports problems as [`Diagnostic`]s rather than failing on the
//! first one. A [`Diagnostic`] has a [`Severity`], a one-line summary and,
//! optionally, a detail paragraph, the [`bundle_dyn::Location`] it refers to and
//! the [`bundle_dyn::Path`] of the offending value.
//!
//! [`Diagnostics`] is an ordered collection. Combining collections keeps the
//! order in which diagnostics were produced, so the user sees them in the
//! order the pipeline ran.
//!
//! # Example
//!
//! ```
//! use bundle_error_reporting::{Diagnostic, Diagnostics};
//!
//! let mut diags = Diagnostics::new();
//! diags.push(Diagnostic::warning("unknown field: colour"));
//! assert!(!diags.has_error());
//!
//! diags.push(Diagnostic::error("expected string, found map"));
//! assert!(diags.has_error());
//! assert_eq!(diags.first_error().unwrap().summary, "expected string, found map");
//! ```

pub mod diagnostic;

pub use diagnostic::{Diagnostic, Diagnostics, Severity};
