//! Bundle configuration mutators.
//!
//! This crate owns the [`Bundle`] and its configuration tree and defines the
//! [`Mutator`] pipeline that rewrites it. The main mutator is the
//! [`PythonMutator`], which lets a Python generator add and change resources
//! under the rules of a [`PhasePolicy`]:
//!
//! | change                                 | load   | init   |
//! |----------------------------------------|--------|--------|
//! | insert a new resource                  | accept | accept |
//! | insert, update or delete a property    | reject | accept |
//! | delete a resource                      | reject | reject |
//! | create `resources` or `resources.jobs` | reject | reject |
//! | anything outside `resources.jobs`      | reject | reject |
//!
//! # Example
//!
//! ```no_run
//! use bundle_core::{Bundle, BundleEnv, MutatorContext, MutatorPipeline, Phase, PythonMutator};
//!
//! let mut bundle = Bundle::load(std::path::Path::new("my-bundle")).unwrap();
//! let mut pipeline = MutatorPipeline::new();
//! pipeline.push(Box::new(PythonMutator::new(Phase::Load)));
//!
//! let diags = pipeline.execute(&MutatorContext::new(BundleEnv::new()), &mut bundle);
//! if diags.has_error() {
//!     eprintln!("{}", diags.to_text());
//! }
//! ```

pub mod bundle;
pub mod context;
pub mod error;
pub mod mutator;
pub mod phase;
pub mod policy;
pub mod python;

pub use bundle::{Bundle, BundleError};
pub use context::{BundleEnv, MutatorContext};
pub use error::{CancelReason, MutatorError};
pub use mutator::{Mutator, MutatorPipeline};
pub use phase::{Phase, UnknownPhase};
pub use policy::{PhasePolicy, default_protected_root};
pub use python::PythonMutator;
pub use python::process::{NativeProcessRunner, ProcessExit, ProcessInvocation, ProcessRunner};
