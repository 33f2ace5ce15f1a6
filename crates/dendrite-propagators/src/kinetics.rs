//! Anisotropic growth kinetics, fraction-solid update and capture.
//!
//! Per interface cell:
//!
//! ```text
//! ΔT  = U + m_l (C − C0) − Γ G
//! A   = 1 + δk cos(4 (θ − φ))          (A = 1 when θ is undefined)
//! V   = max(0, μ ΔT A)
//! Fs' = min(1, Fs + A_g V dt / Lc)
//! ```
//!
//! A cell reaching `Fs' = 1` is captured. It keeps `k C` of its solute;
//! the remaining `(1 − k) C` is split equally among its Moore neighbours
//! that are still liquid once every capture of the step is decided. The
//! split is staged in the scratch transfer buffer and applied by the
//! transport stage.

use dendrite_core::{FieldId, FieldSet, Phase, PropagatorError};
use dendrite_propagator::{Propagator, StepContext, WriteMode};
use dendrite_space::Neighbourhood;
use smallvec::SmallVec;

/// Four-fold anisotropy factor `1 + δk cos(4 (θ − φ))`.
///
/// `φ` is the crystal angle reduced modulo 90° and converted to radians,
/// so orientations a quarter turn apart give bitwise-identical results.
/// An undefined normal (`None`) yields the isotropic value 1.
///
/// # Examples
///
/// ```
/// use dendrite_propagators::anisotropy;
///
/// assert_eq!(anisotropy(None, 0.0, 0.3), 1.0);
/// assert!((anisotropy(Some(0.0), 0.0, 0.3) - 1.3).abs() < 1e-12);
/// assert_eq!(anisotropy(Some(0.2), 0.0, 0.3), anisotropy(Some(0.2), 90.0, 0.3));
/// ```
pub fn anisotropy(theta: Option<f64>, crystal_angle_deg: f64, strength: f64) -> f64 {
    match theta {
        Some(theta) => {
            let phi = crystal_angle_deg.rem_euclid(90.0).to_radians();
            1.0 + strength * (4.0 * (theta - phi)).cos()
        }
        None => 1.0,
    }
}

/// Growth-kinetics stage.
///
/// Constructed via [`GrowthKinetics::builder`].
#[derive(Clone, Debug)]
pub struct GrowthKinetics {
    cell_size: f64,
    undercooling: f64,
    anisotropy: f64,
    gibbs_thomson: f64,
    kinetic_coefficient: f64,
    liquidus_slope: f64,
    nominal_concentration: f64,
    partition_coefficient: f64,
}

/// Builder for [`GrowthKinetics`].
///
/// `cell_size` and `kinetic_coefficient` are required. Everything else
/// defaults to zero, except the partition coefficient, which defaults to
/// 1 (no solute rejection).
pub struct GrowthKineticsBuilder {
    cell_size: Option<f64>,
    undercooling: f64,
    anisotropy: f64,
    gibbs_thomson: f64,
    kinetic_coefficient: Option<f64>,
    liquidus_slope: f64,
    nominal_concentration: f64,
    partition_coefficient: f64,
}

impl GrowthKinetics {
    /// Create a new builder.
    pub fn builder() -> GrowthKineticsBuilder {
        GrowthKineticsBuilder {
            cell_size: None,
            undercooling: 0.0,
            anisotropy: 0.0,
            gibbs_thomson: 0.0,
            kinetic_coefficient: None,
            liquidus_slope: 0.0,
            nominal_concentration: 0.0,
            partition_coefficient: 1.0,
        }
    }

    /// Interface velocity in m/s for one cell, before the `max(0, ·)`
    /// clamp.
    fn raw_velocity(&self, c: f64, g: f64, theta: Option<f64>, crystal_angle_deg: f64) -> f64 {
        let drive = self.undercooling + self.liquidus_slope * (c - self.nominal_concentration)
            - self.gibbs_thomson * g;
        self.kinetic_coefficient * drive * anisotropy(theta, crystal_angle_deg, self.anisotropy)
    }

    /// Largest dt at which an interface moving at `v_max` advances at
    /// most one cell.
    pub fn kinetic_limit(&self, v_max: f64) -> f64 {
        if v_max > 0.0 {
            self.cell_size / v_max
        } else {
            f64::INFINITY
        }
    }
}

impl GrowthKineticsBuilder {
    /// Cell edge length in metres.
    pub fn cell_size(mut self, lc: f64) -> Self {
        self.cell_size = Some(lc);
        self
    }

    /// Imposed undercooling in K.
    pub fn undercooling(mut self, u: f64) -> Self {
        self.undercooling = u;
        self
    }

    /// Anisotropy strength δk, in `[0, 1]`.
    pub fn anisotropy(mut self, dk: f64) -> Self {
        self.anisotropy = dk;
        self
    }

    /// Gibbs–Thomson coefficient Γ in K·m.
    pub fn gibbs_thomson(mut self, gamma: f64) -> Self {
        self.gibbs_thomson = gamma;
        self
    }

    /// Kinetic coefficient μ in m/(s·K).
    pub fn kinetic_coefficient(mut self, mu: f64) -> Self {
        self.kinetic_coefficient = Some(mu);
        self
    }

    /// Liquidus slope m_l in K/wt%.
    pub fn liquidus_slope(mut self, ml: f64) -> Self {
        self.liquidus_slope = ml;
        self
    }

    /// Nominal composition C0 in wt%.
    pub fn nominal_concentration(mut self, c0: f64) -> Self {
        self.nominal_concentration = c0;
        self
    }

    /// Partition coefficient k, in `(0, 1]`.
    pub fn partition_coefficient(mut self, k: f64) -> Self {
        self.partition_coefficient = k;
        self
    }

    /// Build the stage, validating all parameters.
    ///
    /// # Errors
    ///
    /// Returns `Err` if:
    /// - `cell_size` or `kinetic_coefficient` is missing, non-finite or not positive
    /// - `anisotropy` is outside `[0, 1]`
    /// - `partition_coefficient` is outside `(0, 1]`
    /// - `gibbs_thomson` or `nominal_concentration` is negative
    /// - any value is non-finite
    pub fn build(self) -> Result<GrowthKinetics, String> {
        let cell_size = self
            .cell_size
            .ok_or_else(|| "cell_size is required".to_string())?;
        let kinetic_coefficient = self
            .kinetic_coefficient
            .ok_or_else(|| "kinetic_coefficient is required".to_string())?;

        if !(cell_size > 0.0) || !cell_size.is_finite() {
            return Err(format!("cell_size must be finite and > 0, got {cell_size}"));
        }
        if !(kinetic_coefficient > 0.0) || !kinetic_coefficient.is_finite() {
            return Err(format!(
                "kinetic_coefficient must be finite and > 0, got {kinetic_coefficient}"
            ));
        }
        if !(0.0..=1.0).contains(&self.anisotropy) {
            return Err(format!(
                "anisotropy must lie in [0, 1], got {}",
                self.anisotropy
            ));
        }
        if !(self.partition_coefficient > 0.0 && self.partition_coefficient <= 1.0) {
            return Err(format!(
                "partition_coefficient must lie in (0, 1], got {}",
                self.partition_coefficient
            ));
        }
        if !(self.gibbs_thomson >= 0.0) || !self.gibbs_thomson.is_finite() {
            return Err(format!(
                "gibbs_thomson must be finite and >= 0, got {}",
                self.gibbs_thomson
            ));
        }
        if !(self.nominal_concentration >= 0.0) || !self.nominal_concentration.is_finite() {
            return Err(format!(
                "nominal_concentration must be finite and >= 0, got {}",
                self.nominal_concentration
            ));
        }
        if !self.undercooling.is_finite() || !self.liquidus_slope.is_finite() {
            return Err("undercooling and liquidus_slope must be finite".to_string());
        }

        Ok(GrowthKinetics {
            cell_size,
            undercooling: self.undercooling,
            anisotropy: self.anisotropy,
            gibbs_thomson: self.gibbs_thomson,
            kinetic_coefficient,
            liquidus_slope: self.liquidus_slope,
            nominal_concentration: self.nominal_concentration,
            partition_coefficient: self.partition_coefficient,
        })
    }
}

impl Propagator for GrowthKinetics {
    fn name(&self) -> &str {
        "GrowthKinetics"
    }

    fn reads(&self) -> FieldSet {
        [
            FieldId::Classification,
            FieldId::Curvature,
            FieldId::AreaFactor,
            FieldId::NormalAngle,
            FieldId::Concentration,
            FieldId::FractionSolid,
            FieldId::Occupancy,
        ]
        .into_iter()
        .collect()
    }

    fn writes(&self) -> Vec<(FieldId, WriteMode)> {
        vec![
            (FieldId::Velocity, WriteMode::Full),
            (FieldId::FractionSolid, WriteMode::Incremental),
            (FieldId::Occupancy, WriteMode::Incremental),
        ]
    }

    fn step(&self, ctx: &mut StepContext<'_>) -> Result<(), PropagatorError> {
        let dt = ctx.dt();
        let grid = ctx.grid();
        let (state, scratch) = ctx.parts_mut();
        let angle = state.crystal_angle_deg();
        let fields = state.split_mut();

        let v_max = {
            let bufs = scratch.capture_buffers();

            // Velocities from step-start state.
            let mut v_max = 0.0f64;
            for &idx in bufs.interface_cells {
                let v = self.raw_velocity(
                    fields.concentration[idx],
                    fields.curvature[idx],
                    fields.normal_angle[idx],
                    angle,
                );
                if !v.is_finite() {
                    return Err(PropagatorError::NonFinite {
                        field: FieldId::Velocity,
                        cell: idx,
                        value: v,
                    });
                }
                let v = v.max(0.0);
                fields.velocity[idx] = v;
                v_max = v_max.max(v);
            }

            if v_max * dt / self.cell_size > 1.0 {
                return Err(PropagatorError::StabilityViolated {
                    field: FieldId::FractionSolid,
                    dt,
                    limit: self.kinetic_limit(v_max),
                });
            }

            // Advance Fs and decide every capture.
            for &idx in bufs.interface_cells {
                let increment = fields.area_factor[idx] * fields.velocity[idx] * dt / self.cell_size;
                let fs = (fields.fraction_solid[idx] + increment).min(1.0);
                fields.fraction_solid[idx] = fs;
                if fs >= 1.0 {
                    fields.occupancy[idx] = Phase::Solid;
                    bufs.captured_cells.push(idx);
                }
            }

            // Stage rejected solute against post-capture occupancy.
            for &idx in bufs.captured_cells.iter() {
                let (i, j) = grid.coords(idx);
                let targets: SmallVec<[usize; 8]> = grid
                    .neighbours(i, j, Neighbourhood::Moore)
                    .into_iter()
                    .filter(|&n| !fields.occupancy[n].is_solid())
                    .collect();
                if targets.is_empty() {
                    log::warn!(
                        "captured cell ({i}, {j}) has no liquid neighbour; retaining its solute"
                    );
                    continue;
                }
                let excess = (1.0 - self.partition_coefficient) * fields.concentration[idx];
                bufs.solute_transfer[idx] -= excess;
                let share = excess / targets.len() as f64;
                for n in targets {
                    bufs.solute_transfer[n] += share;
                }
            }
            log::trace!(
                "kinetics: {} interface cells, {} captured, v_max {v_max:.3e}",
                bufs.interface_cells.len(),
                bufs.captured_cells.len()
            );
            v_max
        };

        scratch.set_max_velocity(v_max);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GeometricFactor, InterfaceClassifier, NormalEstimator};
    use dendrite_core::StepId;
    use dendrite_propagator::{GridState, StepScratch};
    use dendrite_test_utils::{
        seeded_state, seeded_state_at, set_fraction_solid, set_solid, FIXTURE_C0,
    };
    use proptest::prelude::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    const LC: f64 = 0.25e-6;

    fn al_cu_kinetics(undercooling: f64, anisotropy: f64) -> GrowthKinetics {
        GrowthKinetics::builder()
            .cell_size(LC)
            .undercooling(undercooling)
            .anisotropy(anisotropy)
            .gibbs_thomson(2.4e-7)
            .kinetic_coefficient(3e-4)
            .liquidus_slope(-3.36)
            .nominal_concentration(FIXTURE_C0)
            .partition_coefficient(0.17)
            .build()
            .unwrap()
    }

    /// Run classification, geometry, normals and kinetics once.
    fn grow(
        state: &mut GridState,
        kinetics: &GrowthKinetics,
        dt: f64,
    ) -> Result<StepScratch, PropagatorError> {
        let mut scratch = StepScratch::new(state.cell_count());
        let geometry = GeometricFactor::new(LC, 0.4).unwrap();
        let mut ctx = StepContext::new(state, &mut scratch, StepId(1), dt);
        InterfaceClassifier.step(&mut ctx)?;
        geometry.step(&mut ctx)?;
        NormalEstimator.step(&mut ctx)?;
        kinetics.step(&mut ctx)?;
        Ok(scratch)
    }

    // ---------------------------------------------------------------
    // Anisotropy
    // ---------------------------------------------------------------

    #[test]
    fn anisotropy_peaks_along_crystal_axes() {
        assert!((anisotropy(Some(0.0), 0.0, 0.3) - 1.3).abs() < 1e-12);
        assert!((anisotropy(Some(PI / 4.0), 0.0, 0.3) - 0.7).abs() < 1e-12);
        assert!((anisotropy(Some(PI / 4.0), 45.0, 0.3) - 1.3).abs() < 1e-12);
    }

    #[test]
    fn crystal_angle_is_reduced_modulo_quarter_turn() {
        for theta in [-2.0, -0.4, 0.0, 0.7, 1.9, 3.0] {
            let base = anisotropy(Some(theta), 10.0, 0.3);
            assert_eq!(base, anisotropy(Some(theta), 100.0, 0.3));
            assert_eq!(base, anisotropy(Some(theta), -80.0, 0.3));
        }
    }

    proptest! {
        #[test]
        fn anisotropy_is_four_fold(theta in -PI..PI, angle in 0.0f64..360.0, dk in 0.0f64..0.99) {
            let a = anisotropy(Some(theta), angle, dk);
            let b = anisotropy(Some(theta + FRAC_PI_2), angle, dk);
            prop_assert!((a - b).abs() < 1e-12);
            prop_assert!(a >= 1.0 - dk - 1e-12 && a <= 1.0 + dk + 1e-12);
        }
    }

    // ---------------------------------------------------------------
    // Builder
    // ---------------------------------------------------------------

    #[test]
    fn builder_requires_cell_size_and_mobility() {
        assert!(GrowthKinetics::builder().kinetic_coefficient(1e-3).build().is_err());
        assert!(GrowthKinetics::builder().cell_size(LC).build().is_err());
        assert!(GrowthKinetics::builder()
            .cell_size(LC)
            .kinetic_coefficient(1e-3)
            .build()
            .is_ok());
    }

    #[test]
    fn builder_rejects_out_of_range() {
        let base = || GrowthKinetics::builder().cell_size(LC).kinetic_coefficient(1e-3);
        assert!(base().anisotropy(1.0).build().is_ok());
        assert!(base().anisotropy(1.0 + f64::EPSILON).build().is_err());
        assert!(base().anisotropy(-0.1).build().is_err());
        assert!(base().partition_coefficient(0.0).build().is_err());
        assert!(base().partition_coefficient(1.5).build().is_err());
        assert!(base().gibbs_thomson(f64::NAN).build().is_err());
        assert!(base().undercooling(f64::INFINITY).build().is_err());
        assert!(base().kinetic_coefficient(-1.0).build().is_err());
    }

    // ---------------------------------------------------------------
    // Step
    // ---------------------------------------------------------------

    #[test]
    fn axial_neighbours_outgrow_diagonal_ones() {
        let mut state = seeded_state(7, 7);
        let scratch = grow(&mut state, &al_cu_kinetics(15.0, 0.3), 1e-6).unwrap();
        let grid = state.grid();
        let axial = grid.index(2, 3);
        let diagonal = grid.index(2, 2);

        let v = state.velocity();
        assert!(v[axial] > v[diagonal]);
        assert_eq!(scratch.max_velocity(), v[axial]);

        let fs = state.fraction_solid();
        assert!(fs[axial] > fs[diagonal] && fs[diagonal] > 0.0);
        assert!(fs[axial] < 1.0);
        assert!(scratch.captured_cells().is_empty());
        assert!(scratch.solute_transfer().iter().all(|&t| t == 0.0));
    }

    #[test]
    fn velocity_matches_closed_form_for_axial_neighbour() {
        let mut state = seeded_state(7, 7);
        grow(&mut state, &al_cu_kinetics(15.0, 0.3), 1e-6).unwrap();
        let idx = state.grid().index(2, 3);
        let g = (1.0 - 2.0 / 9.0) / LC;
        let expected = 3e-4 * (15.0 - 2.4e-7 * g) * 1.3;
        assert!((state.velocity()[idx] - expected).abs() < 1e-12);
    }

    #[test]
    fn no_driving_force_means_no_growth() {
        let mut state = seeded_state(7, 7);
        let scratch = grow(&mut state, &al_cu_kinetics(0.0, 0.3), 1e-6).unwrap();
        assert_eq!(scratch.max_velocity(), 0.0);
        assert_eq!(state.solid_count(), 1);
        assert!((state.mean_fraction_solid() - 1.0 / 49.0).abs() < 1e-15);
    }

    #[test]
    fn capture_stages_rejected_solute() {
        let mut state = seeded_state(7, 7);
        set_fraction_solid(&mut state, 2, 3, 0.999);
        let scratch = grow(&mut state, &al_cu_kinetics(15.0, 0.3), 1e-6).unwrap();
        let grid = state.grid();
        let captured = grid.index(2, 3);

        assert_eq!(scratch.captured_cells(), &[captured]);
        assert!(state.is_solid(captured));
        assert_eq!(state.fraction_solid()[captured], 1.0);

        let transfer = scratch.solute_transfer();
        let excess = (1.0 - 0.17) * FIXTURE_C0;
        assert!((transfer[captured] + excess).abs() < 1e-12);
        // Seven liquid Moore neighbours share the excess.
        let receivers = transfer.iter().filter(|&&t| t > 0.0).count();
        assert_eq!(receivers, 7);
        for (_, _, n) in grid.neighbours_with_offsets(2, 3, Neighbourhood::Moore) {
            if !state.is_solid(n) {
                assert!((transfer[n] - excess / 7.0).abs() < 1e-12);
            }
        }
        assert!(transfer.iter().sum::<f64>().abs() < 1e-12);
    }

    #[test]
    fn enclosed_capture_retains_solute() {
        let mut state = seeded_state_at(3, 3, (0, 0), 0.0);
        for (i, j) in [(0, 1), (0, 2), (1, 0), (1, 2), (2, 0), (2, 1), (2, 2)] {
            set_solid(&mut state, i, j);
        }
        set_fraction_solid(&mut state, 1, 1, 0.999);
        let scratch = grow(&mut state, &al_cu_kinetics(15.0, 0.3), 1e-6).unwrap();
        assert_eq!(scratch.captured_cells(), &[4]);
        assert_eq!(state.solid_count(), 9);
        assert!(scratch.solute_transfer().iter().all(|&t| t == 0.0));
    }

    #[test]
    fn oversized_dt_violates_kinetic_bound() {
        let mut state = seeded_state(7, 7);
        let err = grow(&mut state, &al_cu_kinetics(15.0, 0.3), 1e-3).unwrap_err();
        match err {
            PropagatorError::StabilityViolated { field, dt, limit } => {
                assert_eq!(field, FieldId::FractionSolid);
                assert_eq!(dt, 1e-3);
                assert!(limit < dt);
            }
            other => panic!("expected StabilityViolated, got {other:?}"),
        }
    }

    #[test]
    fn kinetic_limit_is_infinite_without_growth() {
        let k = al_cu_kinetics(15.0, 0.3);
        assert_eq!(k.kinetic_limit(0.0), f64::INFINITY);
        assert!((k.kinetic_limit(0.5) - LC / 0.5).abs() < 1e-20);
    }
}
