//! Execution context passed to propagators during a step.

use crate::scratch::StepScratch;
use crate::state::GridState;
use dendrite_core::StepId;
use dendrite_space::Grid2D;

/// Execution context passed to each propagator's `step()` method.
///
/// Gives the running stage exclusive access to the grid state and the
/// per-step scratch buffers. Because the context holds the only mutable
/// borrow, stages cannot overlap: each sees every write made by the
/// stages before it and none made after it.
pub struct StepContext<'a> {
    state: &'a mut GridState,
    scratch: &'a mut StepScratch,
    step_id: StepId,
    dt: f64,
}

impl<'a> StepContext<'a> {
    /// Construct a new step context.
    ///
    /// Typically called by the driver. Tests construct one directly
    /// around a fixture state.
    pub fn new(
        state: &'a mut GridState,
        scratch: &'a mut StepScratch,
        step_id: StepId,
        dt: f64,
    ) -> Self {
        Self {
            state,
            scratch,
            step_id,
            dt,
        }
    }

    /// Read-only view of the grid state.
    pub fn state(&self) -> &GridState {
        self.state
    }

    /// Mutable view of the grid state.
    pub fn state_mut(&mut self) -> &mut GridState {
        self.state
    }

    /// Read-only view of the scratch buffers.
    pub fn scratch(&self) -> &StepScratch {
        self.scratch
    }

    /// Mutable view of the scratch buffers.
    pub fn scratch_mut(&mut self) -> &mut StepScratch {
        self.scratch
    }

    /// Borrow state and scratch mutably at the same time.
    pub fn parts_mut(&mut self) -> (&mut GridState, &mut StepScratch) {
        (&mut *self.state, &mut *self.scratch)
    }

    /// Grid topology.
    pub fn grid(&self) -> Grid2D {
        self.state.grid()
    }

    /// Index of the step being executed (1 for the first step).
    pub fn step_id(&self) -> StepId {
        self.step_id
    }

    /// Timestep in seconds.
    pub fn dt(&self) -> f64 {
        self.dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_exposes_state_and_metadata() {
        let mut state = GridState::new(Grid2D::new(5, 5).unwrap(), 3.0, (2, 2), 0.0).unwrap();
        let mut scratch = StepScratch::new(state.cell_count());
        let mut ctx = StepContext::new(&mut state, &mut scratch, StepId(3), 1e-6);

        assert_eq!(ctx.step_id(), StepId(3));
        assert_eq!(ctx.dt(), 1e-6);
        assert_eq!(ctx.grid().cell_count(), 25);
        assert_eq!(ctx.state().solid_count(), 1);

        ctx.scratch_mut().set_max_velocity(0.5);
        let (state, scratch) = ctx.parts_mut();
        state.split_mut().velocity[0] = scratch.max_velocity();
        assert_eq!(ctx.state().velocity()[0], 0.5);
    }
}
