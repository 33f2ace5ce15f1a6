//! Interface normal direction from centred differences of Fs.

use dendrite_core::{FieldId, FieldSet, PropagatorError};
use dendrite_propagator::{Propagator, StepContext, WriteMode};
use dendrite_space::Grid2D;

/// Gradient magnitude below which the normal is undefined.
pub const GRADIENT_EPSILON: f64 = 1e-12;

/// Direction of steepest ascent of `fs` at `(i, j)`, in radians.
///
/// Each component is a centred difference averaged over the three
/// adjacent rows (or columns); stencil positions outside the grid are
/// clamped to the edge. Returns `None` when the gradient magnitude is
/// below [`GRADIENT_EPSILON`].
///
/// # Examples
///
/// ```
/// use dendrite_propagators::estimate_normal;
/// use dendrite_space::Grid2D;
///
/// let grid = Grid2D::new(3, 3).unwrap();
/// // Fs rises with i: the normal points along +x.
/// let fs = [0.0, 0.0, 0.0, 0.5, 0.5, 0.5, 1.0, 1.0, 1.0];
/// assert_eq!(estimate_normal(grid, &fs, 1, 1), Some(0.0));
/// assert_eq!(estimate_normal(grid, &[0.3; 9], 1, 1), None);
/// ```
pub fn estimate_normal(grid: Grid2D, fs: &[f64], i: i32, j: i32) -> Option<f64> {
    let at = |a: i32, b: i32| fs[grid.clamped_index(a, b)];
    let mut gx = 0.0;
    let mut gy = 0.0;
    for d in -1..=1 {
        gx += at(i + 1, j + d) - at(i - 1, j + d);
        gy += at(i + d, j + 1) - at(i + d, j - 1);
    }
    gx /= 6.0;
    gy /= 6.0;
    if gx.hypot(gy) < GRADIENT_EPSILON {
        None
    } else {
        Some(gy.atan2(gx))
    }
}

/// Writes [`estimate_normal`] for every interface cell.
#[derive(Clone, Copy, Debug, Default)]
pub struct NormalEstimator;

impl Propagator for NormalEstimator {
    fn name(&self) -> &str {
        "NormalEstimator"
    }

    fn reads(&self) -> FieldSet {
        [FieldId::FractionSolid, FieldId::Classification]
            .into_iter()
            .collect()
    }

    fn writes(&self) -> Vec<(FieldId, WriteMode)> {
        vec![(FieldId::NormalAngle, WriteMode::Full)]
    }

    fn step(&self, ctx: &mut StepContext<'_>) -> Result<(), PropagatorError> {
        let grid = ctx.grid();
        let (state, scratch) = ctx.parts_mut();
        let fields = state.split_mut();
        for &idx in scratch.interface_cells() {
            let (i, j) = grid.coords(idx);
            fields.normal_angle[idx] = estimate_normal(grid, fields.fraction_solid, i, j);
        }
        Ok(())
    }
}
