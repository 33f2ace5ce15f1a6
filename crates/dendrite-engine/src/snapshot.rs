//! Owned copies of the persistent fields.

use dendrite_core::{Phase, StepId};
use dendrite_propagator::GridState;
use dendrite_space::Grid2D;

/// Occupancy, fraction solid and concentration at the end of a step.
///
/// Cloned out of the live state, so it stays valid while the driver
/// keeps stepping.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldSnapshot {
    /// Step after which the copy was taken.
    pub step: StepId,
    /// Simulated time in seconds.
    pub time: f64,
    /// Grid the arrays are laid out on.
    pub grid: Grid2D,
    /// Occupancy map.
    pub occupancy: Vec<Phase>,
    /// Fraction solid.
    pub fraction_solid: Vec<f64>,
    /// Concentration in wt%.
    pub concentration: Vec<f64>,
}

impl FieldSnapshot {
    /// Copy the persistent fields of `state`.
    pub fn from_state(state: &GridState, step: StepId, time: f64) -> Self {
        Self {
            step,
            time,
            grid: state.grid(),
            occupancy: state.occupancy().to_vec(),
            fraction_solid: state.fraction_solid().to_vec(),
            concentration: state.concentration().to_vec(),
        }
    }

    /// Number of captured cells.
    pub fn solid_count(&self) -> usize {
        self.occupancy.iter().filter(|p| p.is_solid()).count()
    }
}
