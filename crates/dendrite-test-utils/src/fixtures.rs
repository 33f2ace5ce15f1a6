//! Reusable propagator test fixtures.
//!
//! - [`ConstPropagator`]: writes a constant into a derived field.
//! - [`FailingPropagator`]: fails deterministically after N calls.
//! - [`NanInjector`]: plants a NaN in a field on a chosen call.

use dendrite_core::{FieldId, FieldSet, PropagatorError};
use dendrite_propagator::{FieldsMut, Propagator, StepContext, WriteMode};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Mutable slice for a floating-point field, or `None` for the
/// categorical ones and the optional normal angle.
fn scalar_field<'a>(fields: FieldsMut<'a>, field: FieldId) -> Option<&'a mut [f64]> {
    match field {
        FieldId::FractionSolid => Some(fields.fraction_solid),
        FieldId::Concentration => Some(fields.concentration),
        FieldId::Curvature => Some(fields.curvature),
        FieldId::AreaFactor => Some(fields.area_factor),
        FieldId::Velocity => Some(fields.velocity),
        FieldId::Occupancy | FieldId::Classification | FieldId::NormalAngle => None,
    }
}

fn write_mode_for(field: FieldId) -> WriteMode {
    if field.is_persistent() {
        WriteMode::Incremental
    } else {
        WriteMode::Full
    }
}

/// Writes a constant value to every cell of a derived scalar field.
pub struct ConstPropagator {
    pub name: String,
    pub output: FieldId,
    pub value: f64,
}

impl ConstPropagator {
    pub fn new(name: impl Into<String>, output: FieldId, value: f64) -> Self {
        Self {
            name: name.into(),
            output,
            value,
        }
    }
}

impl Propagator for ConstPropagator {
    fn name(&self) -> &str {
        &self.name
    }

    fn reads(&self) -> FieldSet {
        FieldSet::empty()
    }

    fn writes(&self) -> Vec<(FieldId, WriteMode)> {
        vec![(self.output, write_mode_for(self.output))]
    }

    fn step(&self, ctx: &mut StepContext<'_>) -> Result<(), PropagatorError> {
        let out = scalar_field(ctx.state_mut().split_mut(), self.output).ok_or_else(|| {
            PropagatorError::ExecutionFailed {
                reason: format!("field '{}' is not a scalar field", self.output),
            }
        })?;
        out.fill(self.value);
        Ok(())
    }
}

/// Fails deterministically after a configurable number of successful calls.
///
/// Uses `AtomicUsize` for the call counter so it satisfies `Send`.
pub struct FailingPropagator {
    pub name: String,
    pub succeed_count: usize,
    call_count: AtomicUsize,
}

impl FailingPropagator {
    /// Create a propagator that succeeds `succeed_count` times then fails.
    pub fn new(name: impl Into<String>, succeed_count: usize) -> Self {
        Self {
            name: name.into(),
            succeed_count,
            call_count: AtomicUsize::new(0),
        }
    }

    /// How many times `step()` has been called.
    pub fn calls(&self) -> usize {
        self.call_count.load(Ordering::Relaxed)
    }
}

impl Propagator for FailingPropagator {
    fn name(&self) -> &str {
        &self.name
    }

    fn reads(&self) -> FieldSet {
        FieldSet::empty()
    }

    fn writes(&self) -> Vec<(FieldId, WriteMode)> {
        vec![(FieldId::Velocity, WriteMode::Full)]
    }

    fn step(&self, _ctx: &mut StepContext<'_>) -> Result<(), PropagatorError> {
        let n = self.call_count.fetch_add(1, Ordering::Relaxed);
        if n >= self.succeed_count {
            return Err(PropagatorError::ExecutionFailed {
                reason: format!(
                    "deliberate failure after {} successful calls",
                    self.succeed_count
                ),
            });
        }
        Ok(())
    }
}

/// Writes NaN into one cell of a scalar field on its `at_call`-th call
/// (zero-based) and leaves the field alone otherwise.
///
/// The propagator itself reports success; detection is left to the
/// driver's post-stage sentinel scan.
pub struct NanInjector {
    pub name: String,
    pub field: FieldId,
    pub cell: usize,
    pub at_call: usize,
    call_count: AtomicUsize,
}

impl NanInjector {
    pub fn new(name: impl Into<String>, field: FieldId, cell: usize, at_call: usize) -> Self {
        Self {
            name: name.into(),
            field,
            cell,
            at_call,
            call_count: AtomicUsize::new(0),
        }
    }
}

impl Propagator for NanInjector {
    fn name(&self) -> &str {
        &self.name
    }

    fn reads(&self) -> FieldSet {
        FieldSet::empty()
    }

    fn writes(&self) -> Vec<(FieldId, WriteMode)> {
        vec![(self.field, write_mode_for(self.field))]
    }

    fn step(&self, ctx: &mut StepContext<'_>) -> Result<(), PropagatorError> {
        let n = self.call_count.fetch_add(1, Ordering::Relaxed);
        if n != self.at_call {
            return Ok(());
        }
        let out = scalar_field(ctx.state_mut().split_mut(), self.field).ok_or_else(|| {
            PropagatorError::ExecutionFailed {
                reason: format!("field '{}' is not a scalar field", self.field),
            }
        })?;
        let len = out.len();
        let slot = out
            .get_mut(self.cell)
            .ok_or_else(|| PropagatorError::ExecutionFailed {
                reason: format!("cell {} outside field of {len} cells", self.cell),
            })?;
        *slot = f64::NAN;
        Ok(())
    }
}
