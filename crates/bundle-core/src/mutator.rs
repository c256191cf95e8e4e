//! Mutators and the pipeline that runs them.
//!
//! A [`Mutator`] inspects or rewrites a [`Bundle`] and reports what it found
//! as [`Diagnostics`]. Mutators run in a flat, ordered sequence; the first
//! one that reports an error stops the pipeline.

use crate::bundle::Bundle;
use crate::context::MutatorContext;
use bundle_error_reporting::Diagnostics;

/// A step of the bundle configuration pipeline.
pub trait Mutator: Send + Sync {
    /// Human-readable name, used for logging.
    fn name(&self) -> String;

    /// Apply the mutator to `bundle`.
    ///
    /// A mutator that reports an error must leave the bundle unchanged.
    fn apply(&self, ctx: &MutatorContext, bundle: &mut Bundle) -> Diagnostics;
}

/// Ordered collection of mutators.
#[derive(Default)]
pub struct MutatorPipeline {
    mutators: Vec<Box<dyn Mutator>>,
}

impl MutatorPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mutator. Mutators run in the order they are added.
    pub fn push(&mut self, mutator: Box<dyn Mutator>) {
        self.mutators.push(mutator);
    }

    pub fn extend(&mut self, mutators: impl IntoIterator<Item = Box<dyn Mutator>>) {
        self.mutators.extend(mutators);
    }

    pub fn len(&self) -> usize {
        self.mutators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mutators.is_empty()
    }

    /// Run all mutators in order.
    ///
    /// Returns the diagnostics of every mutator that ran, in order. Stops
    /// after the first mutator whose diagnostics contain an error.
    pub fn execute(&self, ctx: &MutatorContext, bundle: &mut Bundle) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();

        for mutator in &self.mutators {
            let name = mutator.name();
            tracing::debug!(mutator = %name, "Running mutator");

            let diags = mutator.apply(ctx, bundle);
            let failed = diags.has_error();
            diagnostics.extend(diags);

            if failed {
                tracing::debug!(mutator = %name, "Mutator failed, stopping pipeline");
                break;
            }
        }

        diagnostics
    }
}
