//! The [`Propagator`] trait and [`WriteMode`] enum.
//!
//! Propagators are the stages of a simulation step, executed in a fixed
//! order. They declare field dependencies up front so the pipeline can be
//! validated before the first step.

use crate::context::StepContext;
use dendrite_core::{FieldId, FieldSet, PropagatorError};

/// Write initialization strategy for a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteMode {
    /// The driver resets the field before `step()`; the propagator
    /// fills every cell it is responsible for.
    ///
    /// Only valid for derived fields.
    Full,

    /// The field keeps its previous values; the propagator modifies
    /// only the cells it needs to update.
    Incremental,
}

/// One stage of the per-step pipeline.
///
/// # Contract
///
/// - `step()` MUST be deterministic: same inputs produce identical outputs.
/// - `&self`: propagators are stateless; mutable state lives in the
///   [`GridState`](crate::GridState) and [`StepScratch`](crate::StepScratch).
/// - `reads()`, `writes()` and `max_dt()` are called once at pipeline
///   validation, not per step.
///
/// # Examples
///
/// A propagator that clears the velocity field:
///
/// ```
/// use dendrite_propagator::{Propagator, StepContext, WriteMode};
/// use dendrite_core::{FieldId, FieldSet, PropagatorError};
///
/// struct Quench;
///
/// impl Propagator for Quench {
///     fn name(&self) -> &str { "quench" }
///
///     fn reads(&self) -> FieldSet { FieldSet::empty() }
///
///     fn writes(&self) -> Vec<(FieldId, WriteMode)> {
///         vec![(FieldId::Velocity, WriteMode::Full)]
///     }
///
///     fn step(&self, ctx: &mut StepContext<'_>) -> Result<(), PropagatorError> {
///         ctx.state_mut().split_mut().velocity.fill(0.0);
///         Ok(())
///     }
/// }
///
/// assert_eq!(Quench.name(), "quench");
/// ```
pub trait Propagator: Send + 'static {
    /// Human-readable name for error reporting and logs.
    fn name(&self) -> &str;

    /// Fields this propagator reads.
    ///
    /// Derived fields in this set must be written by an earlier stage
    /// of the same step.
    fn reads(&self) -> FieldSet;

    /// Fields this propagator writes, with their initialization mode.
    fn writes(&self) -> Vec<(FieldId, WriteMode)>;

    /// Largest timestep this propagator can integrate stably.
    ///
    /// The pipeline validates the initial dt against `min(max_dt)`.
    /// Return `None` to impose no constraint.
    fn max_dt(&self) -> Option<f64> {
        None
    }

    /// Execute the propagator for one step.
    fn step(&self, ctx: &mut StepContext<'_>) -> Result<(), PropagatorError>;
}
