//! Test utilities for dendrite development.
//!
//! State builders for small grids with hand-placed solid, and the
//! fixture propagators in [`fixtures`] for driver and pipeline tests.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{ConstPropagator, FailingPropagator, NanInjector};

use dendrite_core::Phase;
use dendrite_propagator::GridState;
use dendrite_space::Grid2D;

/// Nominal composition used by every fixture state, in wt%.
pub const FIXTURE_C0: f64 = 3.0;

/// A `sizex * sizey` liquid grid at [`FIXTURE_C0`] with a solid seed at
/// the centre.
///
/// Panics on invalid dimensions; fixtures are for tests only.
pub fn seeded_state(sizex: u32, sizey: u32) -> GridState {
    let grid = Grid2D::new(sizex, sizey).expect("fixture grid dimensions");
    GridState::new(grid, FIXTURE_C0, grid.center(), 0.0).expect("centre lies inside grid")
}

/// Like [`seeded_state`] with an explicit seed and crystal angle.
pub fn seeded_state_at(sizex: u32, sizey: u32, seed: (i32, i32), angle_deg: f64) -> GridState {
    let grid = Grid2D::new(sizex, sizey).expect("fixture grid dimensions");
    GridState::new(grid, FIXTURE_C0, seed, angle_deg).expect("fixture seed inside grid")
}

/// A centred seed grown into a solid disc of the given radius (in cells).
///
/// Every cell within `radius` of the centre (Euclidean) is solid with
/// `Fs = 1`.
pub fn disc_state(sizex: u32, sizey: u32, radius: f64) -> GridState {
    let mut state = seeded_state(sizex, sizey);
    let grid = state.grid();
    let (ci, cj) = grid.center();
    let fields = state.split_mut();
    for idx in 0..grid.cell_count() {
        let (i, j) = grid.coords(idx);
        let (di, dj) = ((i - ci) as f64, (j - cj) as f64);
        if di.hypot(dj) <= radius {
            fields.occupancy[idx] = Phase::Solid;
            fields.fraction_solid[idx] = 1.0;
        }
    }
    state
}

/// Mark cell `(i, j)` solid with `Fs = 1`.
pub fn set_solid(state: &mut GridState, i: i32, j: i32) {
    let idx = state.grid().index(i, j);
    let fields = state.split_mut();
    fields.occupancy[idx] = Phase::Solid;
    fields.fraction_solid[idx] = 1.0;
}

/// Overwrite the fraction solid of liquid cell `(i, j)`.
pub fn set_fraction_solid(state: &mut GridState, i: i32, j: i32, fs: f64) {
    let idx = state.grid().index(i, j);
    state.split_mut().fraction_solid[idx] = fs;
}
