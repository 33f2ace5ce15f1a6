//! Interface classification.
//!
//! Labels every cell and builds the ascending worklist of interface
//! cells that the later stages iterate over.

use dendrite_core::{CellClass, FieldId, FieldSet, Phase, PropagatorError};
use dendrite_propagator::{Propagator, StepContext, WriteMode};
use dendrite_space::{Grid2D, Neighbourhood};

/// Classify cell `idx` from the occupancy and fraction-solid fields.
///
/// Solid cells are [`CellClass::InteriorSolid`]. A liquid cell is an
/// [`CellClass::Interface`] if any Moore neighbour is solid or its own
/// fraction solid is positive; otherwise it is
/// [`CellClass::InteriorLiquid`].
pub fn classify_cell(grid: Grid2D, occupancy: &[Phase], fs: &[f64], idx: usize) -> CellClass {
    if occupancy[idx].is_solid() {
        return CellClass::InteriorSolid;
    }
    if fs[idx] > 0.0 {
        return CellClass::Interface;
    }
    let (i, j) = grid.coords(idx);
    let touches_solid = grid
        .neighbours(i, j, Neighbourhood::Moore)
        .iter()
        .any(|&n| occupancy[n].is_solid());
    if touches_solid {
        CellClass::Interface
    } else {
        CellClass::InteriorLiquid
    }
}

/// First pipeline stage: writes the classification field and the
/// interface worklist.
#[derive(Clone, Copy, Debug, Default)]
pub struct InterfaceClassifier;

impl Propagator for InterfaceClassifier {
    fn name(&self) -> &str {
        "InterfaceClassifier"
    }

    fn reads(&self) -> FieldSet {
        [FieldId::Occupancy, FieldId::FractionSolid]
            .into_iter()
            .collect()
    }

    fn writes(&self) -> Vec<(FieldId, WriteMode)> {
        vec![(FieldId::Classification, WriteMode::Full)]
    }

    fn step(&self, ctx: &mut StepContext<'_>) -> Result<(), PropagatorError> {
        let grid = ctx.grid();
        let (state, scratch) = ctx.parts_mut();
        let fields = state.split_mut();
        let worklist = scratch.interface_cells_mut();
        worklist.clear();

        // Ascending sweep, so the worklist comes out sorted.
        for idx in 0..grid.cell_count() {
            let class = classify_cell(grid, fields.occupancy, fields.fraction_solid, idx);
            fields.classification[idx] = class;
            if class.is_interface() {
                worklist.push(idx);
            }
        }
        Ok(())
    }
}
