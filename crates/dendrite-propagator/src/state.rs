//! Per-cell field storage for one simulation run.
//!
//! [`GridState`] owns every array for the lifetime of a run. Propagators
//! read it through shared accessors and mutate it through the
//! split-borrow view returned by [`GridState::split_mut`], which hands out
//! disjoint `&mut` slices so one stage can read some fields while writing
//! others.

use dendrite_core::{CellClass, FieldId, Phase, PropagatorError};
use dendrite_space::{Grid2D, SpaceError};

/// All per-cell fields of the solidification model.
///
/// Dimensions are fixed at construction. The persistent fields
/// (occupancy, fraction solid, concentration) carry the physical state;
/// the derived fields are recomputed every step.
#[derive(Clone, Debug)]
pub struct GridState {
    grid: Grid2D,
    seed: (i32, i32),
    crystal_angle_deg: f64,
    occupancy: Vec<Phase>,
    fraction_solid: Vec<f64>,
    concentration: Vec<f64>,
    classification: Vec<CellClass>,
    curvature: Vec<f64>,
    area_factor: Vec<f64>,
    normal_angle: Vec<Option<f64>>,
    velocity: Vec<f64>,
}

/// Disjoint mutable views of every field, from [`GridState::split_mut`].
pub struct FieldsMut<'a> {
    /// Occupancy map.
    pub occupancy: &'a mut [Phase],
    /// Fraction solid.
    pub fraction_solid: &'a mut [f64],
    /// Solute concentration.
    pub concentration: &'a mut [f64],
    /// Interface classification.
    pub classification: &'a mut [CellClass],
    /// Curvature geometric factor.
    pub curvature: &'a mut [f64],
    /// Interface-area factor.
    pub area_factor: &'a mut [f64],
    /// Interface normal angle.
    pub normal_angle: &'a mut [Option<f64>],
    /// Interface velocity.
    pub velocity: &'a mut [f64],
}

impl GridState {
    /// Allocate a liquid grid of uniform composition with a single solid
    /// seed cell.
    ///
    /// Returns `Err(SpaceError::CoordOutOfBounds)` if `seed` lies outside
    /// the grid.
    pub fn new(
        grid: Grid2D,
        initial_concentration: f64,
        seed: (i32, i32),
        crystal_angle_deg: f64,
    ) -> Result<Self, SpaceError> {
        let seed_idx = grid.checked_index(seed.0, seed.1)?;
        let n = grid.cell_count();
        let mut state = Self {
            grid,
            seed,
            crystal_angle_deg,
            occupancy: vec![Phase::Liquid; n],
            fraction_solid: vec![0.0; n],
            concentration: vec![initial_concentration; n],
            classification: vec![CellClass::InteriorLiquid; n],
            curvature: vec![0.0; n],
            area_factor: vec![0.0; n],
            normal_angle: vec![None; n],
            velocity: vec![0.0; n],
        };
        state.occupancy[seed_idx] = Phase::Solid;
        state.fraction_solid[seed_idx] = 1.0;
        state.classification[seed_idx] = CellClass::InteriorSolid;
        Ok(state)
    }

    /// Grid topology.
    pub fn grid(&self) -> Grid2D {
        self.grid
    }

    /// Number of cells.
    pub fn cell_count(&self) -> usize {
        self.grid.cell_count()
    }

    /// Nucleation site `(i, j)`.
    pub fn seed(&self) -> (i32, i32) {
        self.seed
    }

    /// Crystal orientation in degrees, fixed for the run.
    pub fn crystal_angle_deg(&self) -> f64 {
        self.crystal_angle_deg
    }

    /// Occupancy map.
    pub fn occupancy(&self) -> &[Phase] {
        &self.occupancy
    }

    /// Fraction solid.
    pub fn fraction_solid(&self) -> &[f64] {
        &self.fraction_solid
    }

    /// Solute concentration in wt%.
    pub fn concentration(&self) -> &[f64] {
        &self.concentration
    }

    /// Interface classification from the most recent step.
    pub fn classification(&self) -> &[CellClass] {
        &self.classification
    }

    /// Curvature geometric factor from the most recent step.
    pub fn curvature(&self) -> &[f64] {
        &self.curvature
    }

    /// Interface-area factor from the most recent step.
    pub fn area_factor(&self) -> &[f64] {
        &self.area_factor
    }

    /// Normal angle in radians from the most recent step.
    pub fn normal_angle(&self) -> &[Option<f64>] {
        &self.normal_angle
    }

    /// Interface velocity in m/s from the most recent step.
    pub fn velocity(&self) -> &[f64] {
        &self.velocity
    }

    /// Whether cell `idx` has been captured.
    pub fn is_solid(&self, idx: usize) -> bool {
        self.occupancy[idx].is_solid()
    }

    /// Borrow every field mutably at once.
    pub fn split_mut(&mut self) -> FieldsMut<'_> {
        FieldsMut {
            occupancy: &mut self.occupancy,
            fraction_solid: &mut self.fraction_solid,
            concentration: &mut self.concentration,
            classification: &mut self.classification,
            curvature: &mut self.curvature,
            area_factor: &mut self.area_factor,
            normal_angle: &mut self.normal_angle,
            velocity: &mut self.velocity,
        }
    }

    /// Exchange the concentration array with `buf`.
    ///
    /// Used to publish a double-buffered update; `buf` receives the
    /// previous values.
    pub fn swap_concentration(&mut self, buf: &mut Vec<f64>) -> Result<(), PropagatorError> {
        if buf.len() != self.concentration.len() {
            return Err(PropagatorError::ExecutionFailed {
                reason: format!(
                    "concentration buffer has {} cells, grid has {}",
                    buf.len(),
                    self.concentration.len()
                ),
            });
        }
        std::mem::swap(&mut self.concentration, buf);
        Ok(())
    }

    /// Reset a derived field to its empty value.
    ///
    /// Persistent fields are left untouched.
    pub fn reset_field(&mut self, field: FieldId) {
        match field {
            FieldId::Classification => self.classification.fill(CellClass::InteriorLiquid),
            FieldId::Curvature => self.curvature.fill(0.0),
            FieldId::AreaFactor => self.area_factor.fill(0.0),
            FieldId::NormalAngle => self.normal_angle.fill(None),
            FieldId::Velocity => self.velocity.fill(0.0),
            FieldId::Occupancy | FieldId::FractionSolid | FieldId::Concentration => {}
        }
    }

    /// First non-finite value in a floating-point field, as
    /// `(cell, value)`.
    ///
    /// Always `None` for the categorical fields.
    pub fn first_non_finite(&self, field: FieldId) -> Option<(usize, f64)> {
        fn scan(data: &[f64]) -> Option<(usize, f64)> {
            data.iter()
                .enumerate()
                .find(|(_, v)| !v.is_finite())
                .map(|(i, &v)| (i, v))
        }
        match field {
            FieldId::FractionSolid => scan(&self.fraction_solid),
            FieldId::Concentration => scan(&self.concentration),
            FieldId::Curvature => scan(&self.curvature),
            FieldId::AreaFactor => scan(&self.area_factor),
            FieldId::Velocity => scan(&self.velocity),
            FieldId::NormalAngle => self
                .normal_angle
                .iter()
                .enumerate()
                .find_map(|(i, a)| a.filter(|v| !v.is_finite()).map(|v| (i, v))),
            FieldId::Occupancy | FieldId::Classification => None,
        }
    }

    /// Number of captured cells.
    pub fn solid_count(&self) -> usize {
        self.occupancy.iter().filter(|p| p.is_solid()).count()
    }

    /// Captured cells as a fraction of the grid.
    pub fn solid_fraction(&self) -> f64 {
        self.solid_count() as f64 / self.cell_count() as f64
    }

    /// Mean fraction solid over all cells.
    pub fn mean_fraction_solid(&self) -> f64 {
        self.fraction_solid.iter().sum::<f64>() / self.cell_count() as f64
    }

    /// Sum of concentration over all cells.
    pub fn total_solute(&self) -> f64 {
        self.concentration.iter().sum()
    }

    /// Equilibrium concentration field.
    ///
    /// Solid cells report `partition * C`, liquid cells report `C`.
    pub fn equilibrium_concentration(&self, partition: f64) -> Vec<f64> {
        self.occupancy
            .iter()
            .zip(&self.concentration)
            .map(|(p, &c)| if p.is_solid() { partition * c } else { c })
            .collect()
    }
}
