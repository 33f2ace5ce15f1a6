//! Explicit finite-difference solute transport.
//!
//! Applies the solute staged by capture, then advances Fick's second law
//! one step on the 4-neighbour stencil:
//!
//! ```text
//! C'[p] = C[p] + dt / Lc² · Σ_q D_face(p, q) · (C[q] − C[p])
//! D_face = 2 D[p] D[q] / (D[p] + D[q])
//! ```
//!
//! with `D = D_solid` on captured cells and `D_liquid` elsewhere. Edge
//! cells sum over in-grid neighbours only, which is a zero-flux
//! boundary, so total solute is conserved up to rounding. Every update
//! reads the frozen concentration array and writes the scratch back
//! buffer; the two are swapped at the end of the sweep.

use dendrite_core::{FieldId, FieldSet, Phase, PropagatorError};
use dendrite_propagator::{Propagator, StepContext, WriteMode};
use dendrite_space::{Grid2D, Neighbourhood};

/// Relative slack on the stability bound, for dt values computed from it.
const STABILITY_TOLERANCE: f64 = 1e-9;

/// Solute diffusion stage with phase-dependent diffusivity.
///
/// Constructed via [`SoluteTransport::builder`].
///
/// ```
/// use dendrite_propagators::SoluteTransport;
///
/// let transport = SoluteTransport::builder()
///     .cell_size(0.25e-6)
///     .diffusivity_liquid(3e-9)
///     .diffusivity_solid(3e-13)
///     .build()
///     .unwrap();
/// // Lc² / (4 D_max)
/// assert!((transport.stability_limit() - 5.208333e-6).abs() < 1e-11);
/// ```
#[derive(Clone, Debug)]
pub struct SoluteTransport {
    cell_size: f64,
    diffusivity_liquid: f64,
    diffusivity_solid: f64,
}

/// Builder for [`SoluteTransport`]. All three parameters are required.
pub struct SoluteTransportBuilder {
    cell_size: Option<f64>,
    diffusivity_liquid: Option<f64>,
    diffusivity_solid: Option<f64>,
}

impl SoluteTransport {
    /// Create a new builder.
    pub fn builder() -> SoluteTransportBuilder {
        SoluteTransportBuilder {
            cell_size: None,
            diffusivity_liquid: None,
            diffusivity_solid: None,
        }
    }

    /// Largest stable timestep, `Lc² / (4 D_max)`.
    pub fn stability_limit(&self) -> f64 {
        let d_max = self.diffusivity_liquid.max(self.diffusivity_solid);
        self.cell_size * self.cell_size / (4.0 * d_max)
    }

    fn diffusivity(&self, phase: Phase) -> f64 {
        match phase {
            Phase::Solid => self.diffusivity_solid,
            Phase::Liquid => self.diffusivity_liquid,
        }
    }

    /// One explicit sweep from `prev` into `out`.
    fn sweep(&self, grid: Grid2D, occupancy: &[Phase], prev: &[f64], out: &mut [f64], dt: f64) {
        let r = dt / (self.cell_size * self.cell_size);
        for (idx, slot) in out.iter_mut().enumerate() {
            let (i, j) = grid.coords(idx);
            let d = self.diffusivity(occupancy[idx]);
            let mut acc = 0.0;
            for n in grid.neighbours(i, j, Neighbourhood::VonNeumann) {
                let dn = self.diffusivity(occupancy[n]);
                acc += 2.0 * d * dn / (d + dn) * (prev[n] - prev[idx]);
            }
            *slot = prev[idx] + r * acc;
        }
    }
}

impl SoluteTransportBuilder {
    /// Cell edge length in metres.
    pub fn cell_size(mut self, lc: f64) -> Self {
        self.cell_size = Some(lc);
        self
    }

    /// Solute diffusivity in the liquid, m²/s.
    pub fn diffusivity_liquid(mut self, d: f64) -> Self {
        self.diffusivity_liquid = Some(d);
        self
    }

    /// Solute diffusivity in the solid, m²/s.
    pub fn diffusivity_solid(mut self, d: f64) -> Self {
        self.diffusivity_solid = Some(d);
        self
    }

    /// Build the stage.
    ///
    /// # Errors
    ///
    /// Returns `Err` if any parameter is missing, non-finite or not
    /// positive.
    pub fn build(self) -> Result<SoluteTransport, String> {
        let check = |name: &str, value: Option<f64>| -> Result<f64, String> {
            let v = value.ok_or_else(|| format!("{name} is required"))?;
            if !(v > 0.0) || !v.is_finite() {
                return Err(format!("{name} must be finite and > 0, got {v}"));
            }
            Ok(v)
        };
        Ok(SoluteTransport {
            cell_size: check("cell_size", self.cell_size)?,
            diffusivity_liquid: check("diffusivity_liquid", self.diffusivity_liquid)?,
            diffusivity_solid: check("diffusivity_solid", self.diffusivity_solid)?,
        })
    }
}

impl Propagator for SoluteTransport {
    fn name(&self) -> &str {
        "SoluteTransport"
    }

    fn reads(&self) -> FieldSet {
        [FieldId::Occupancy, FieldId::Concentration]
            .into_iter()
            .collect()
    }

    fn writes(&self) -> Vec<(FieldId, WriteMode)> {
        vec![(FieldId::Concentration, WriteMode::Incremental)]
    }

    fn max_dt(&self) -> Option<f64> {
        Some(self.stability_limit())
    }

    fn step(&self, ctx: &mut StepContext<'_>) -> Result<(), PropagatorError> {
        let dt = ctx.dt();
        let limit = self.stability_limit();
        if dt > limit * (1.0 + STABILITY_TOLERANCE) {
            return Err(PropagatorError::StabilityViolated {
                field: FieldId::Concentration,
                dt,
                limit,
            });
        }
        if dt > limit {
            log::warn!("dt {dt:.3e} exceeds the diffusion limit {limit:.3e} within tolerance");
        }

        let grid = ctx.grid();
        let (state, scratch) = ctx.parts_mut();
        let (transfer, back) = scratch.transfer_and_back_buffer();
        {
            let fields = state.split_mut();
            for (c, t) in fields.concentration.iter_mut().zip(transfer) {
                *c += *t;
            }
            self.sweep(grid, fields.occupancy, fields.concentration, back, dt);
        }

        if let Some((cell, &value)) = back.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(PropagatorError::NonFinite {
                field: FieldId::Concentration,
                cell,
                value,
            });
        }
        state.swap_concentration(back)
    }
}
