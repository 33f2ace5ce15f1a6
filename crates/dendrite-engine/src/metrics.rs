//! Per-step metrics for the simulation driver.
//!
//! [`StepMetrics`] captures the physical state and timing of a single
//! step.

use dendrite_core::StepId;

/// Scalars collected during a single step.
///
/// Durations are in microseconds. The driver fills these after each
/// `step()` call; `time` and `dt` are in seconds.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StepMetrics {
    /// The step that produced these metrics.
    pub step: StepId,
    /// Timestep used by this step.
    pub dt: f64,
    /// Timestep chosen for the next step.
    pub next_dt: f64,
    /// Simulated time at the end of the step.
    pub time: f64,
    /// Largest interface velocity, m/s.
    pub max_velocity: f64,
    /// Captured cells.
    pub solid_count: usize,
    /// Captured cells as a fraction of the grid.
    pub solid_fraction: f64,
    /// Mean fraction solid over all cells.
    pub mean_fraction_solid: f64,
    /// Interface cells processed.
    pub interface_cells: usize,
    /// Cells captured during this step.
    pub captured_cells: usize,
    /// Wall-clock time for the whole step.
    pub total_us: u64,
    /// Per-propagator execution times: `(name, microseconds)`.
    pub propagator_us: Vec<(String, u64)>,
}
