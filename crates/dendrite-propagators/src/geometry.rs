//! Curvature and interface-area factor for interface cells.

use dendrite_core::{FieldId, FieldSet, Phase, PropagatorError};
use dendrite_propagator::{Propagator, StepContext, WriteMode};
use dendrite_space::{Grid2D, Neighbourhood};
use std::f64::consts::SQRT_2;

/// Curvature geometric factor of cell `(i, j)` in 1/m.
///
/// `G = (1 - 2 * mean(Fs)) / cell_size`, with the mean taken over the
/// in-grid members of the 3x3 window. Convex solid tips (few solid
/// neighbours) give `G > 0`; liquid pockets give `G < 0`.
pub fn curvature(grid: Grid2D, fs: &[f64], i: i32, j: i32, cell_size: f64) -> f64 {
    let window = grid.window3x3(i, j);
    let sum: f64 = window.iter().map(|&idx| fs[idx]).sum();
    (1.0 - 2.0 * sum / window.len() as f64) / cell_size
}

/// Interface-area factor of cell `(i, j)`.
///
/// `b0 * (n_orth + n_diag / sqrt(2))`, counting solid axial and diagonal
/// neighbours.
pub fn area_factor(grid: Grid2D, occupancy: &[Phase], i: i32, j: i32, b0: f64) -> f64 {
    let mut orth = 0u32;
    let mut diag = 0u32;
    for (di, dj, n) in grid.neighbours_with_offsets(i, j, Neighbourhood::Moore) {
        if occupancy[n].is_solid() {
            if di == 0 || dj == 0 {
                orth += 1;
            } else {
                diag += 1;
            }
        }
    }
    b0 * (orth as f64 + diag as f64 / SQRT_2)
}

/// Computes [`curvature`] and [`area_factor`] over the interface worklist.
///
/// Non-interface cells are left at zero.
#[derive(Clone, Debug)]
pub struct GeometricFactor {
    cell_size: f64,
    b0: f64,
}

impl GeometricFactor {
    /// Create the stage for cells of edge `cell_size` (m) and area
    /// scaling `b0`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if either value is non-finite or not positive.
    pub fn new(cell_size: f64, b0: f64) -> Result<Self, String> {
        if !(cell_size > 0.0) || !cell_size.is_finite() {
            return Err(format!("cell_size must be finite and > 0, got {cell_size}"));
        }
        if !(b0 > 0.0) || !b0.is_finite() {
            return Err(format!("geometric factor b0 must be finite and > 0, got {b0}"));
        }
        Ok(Self { cell_size, b0 })
    }
}

impl Propagator for GeometricFactor {
    fn name(&self) -> &str {
        "GeometricFactor"
    }

    fn reads(&self) -> FieldSet {
        [
            FieldId::FractionSolid,
            FieldId::Occupancy,
            FieldId::Classification,
        ]
        .into_iter()
        .collect()
    }

    fn writes(&self) -> Vec<(FieldId, WriteMode)> {
        vec![
            (FieldId::Curvature, WriteMode::Full),
            (FieldId::AreaFactor, WriteMode::Full),
        ]
    }

    fn step(&self, ctx: &mut StepContext<'_>) -> Result<(), PropagatorError> {
        let grid = ctx.grid();
        let (state, scratch) = ctx.parts_mut();
        let fields = state.split_mut();
        for &idx in scratch.interface_cells() {
            let (i, j) = grid.coords(idx);
            fields.curvature[idx] = curvature(grid, fields.fraction_solid, i, j, self.cell_size);
            fields.area_factor[idx] = area_factor(grid, fields.occupancy, i, j, self.b0);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dendrite_core::StepId;
    use dendrite_propagator::StepScratch;
    use dendrite_test_utils::{seeded_state, set_solid};
    use crate::InterfaceClassifier;

    const LC: f64 = 0.25e-6;

    #[test]
    fn isolated_seed_neighbour_is_convex() {
        let state = seeded_state(5, 5);
        let g = curvature(state.grid(), state.fraction_solid(), 2, 1, LC);
        // One solid cell in a 3x3 window.
        let expected = (1.0 - 2.0 / 9.0) / LC;
        assert!((g - expected).abs() < 1e-6 * expected);
        assert!(g > 0.0);
    }

    #[test]
    fn liquid_pocket_is_concave() {
        let mut state = seeded_state(5, 5);
        for (i, j) in [(2, 1), (2, 3), (3, 1), (3, 3), (4, 1), (4, 2), (4, 3)] {
            set_solid(&mut state, i, j);
        }
        // Eight of the nine window cells around (3, 2) are solid.
        let g = curvature(state.grid(), state.fraction_solid(), 3, 2, LC);
        let expected = (1.0 - 16.0 / 9.0) / LC;
        assert!(g < 0.0, "expected concave curvature, got {g}");
        assert!((g - expected).abs() < 1e-6 * expected.abs());
    }

    #[test]
    fn corner_window_uses_in_grid_cells_only() {
        let mut state = seeded_state(5, 5);
        set_solid(&mut state, 0, 1);
        let g = curvature(state.grid(), state.fraction_solid(), 0, 0, LC);
        // 4 in-grid cells, one solid.
        let expected = (1.0 - 2.0 / 4.0) / LC;
        assert!((g - expected).abs() < 1e-6 * expected);
    }

    #[test]
    fn area_factor_weights_diagonals() {
        let state = seeded_state(5, 5);
        let grid = state.grid();
        let axial = area_factor(grid, state.occupancy(), 1, 2, 0.4);
        let diagonal = area_factor(grid, state.occupancy(), 1, 1, 0.4);
        assert!((axial - 0.4).abs() < 1e-15);
        assert!((diagonal - 0.4 / SQRT_2).abs() < 1e-15);
        assert_eq!(area_factor(grid, state.occupancy(), 0, 0, 0.4), 0.0);
    }

    #[test]
    fn step_writes_interface_cells_only() {
        let mut state = seeded_state(7, 7);
        let mut scratch = StepScratch::new(state.cell_count());
        let geometry = GeometricFactor::new(LC, 0.4).unwrap();
        {
            let mut ctx = StepContext::new(&mut state, &mut scratch, StepId(1), 1e-6);
            InterfaceClassifier.step(&mut ctx).unwrap();
            geometry.step(&mut ctx).unwrap();
        }
        let grid = state.grid();
        for idx in 0..grid.cell_count() {
            let on_interface = scratch.interface_cells().contains(&idx);
            assert_eq!(state.area_factor()[idx] > 0.0, on_interface, "cell {idx}");
            assert_eq!(state.curvature()[idx] != 0.0, on_interface, "cell {idx}");
        }
    }

    #[test]
    fn new_rejects_bad_parameters() {
        assert!(GeometricFactor::new(0.0, 0.4).is_err());
        assert!(GeometricFactor::new(f64::NAN, 0.4).is_err());
        assert!(GeometricFactor::new(LC, -1.0).is_err());
        assert!(GeometricFactor::new(LC, f64::INFINITY).is_err());
    }
}
