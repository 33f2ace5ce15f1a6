//! Adaptive timestep selection.
//!
//! The next Δt is the tightest of three bounds: the kinetic bound
//! `Lc / (cfl · V_max)` (only once something grows), the explicit
//! diffusion bound `Lc² / (4 D_max)`, and an optional fixed cap.

use std::error::Error;
use std::fmt;

use dendrite_core::{FieldId, Instability, StepError, StepId};

/// A maximum velocity the controller cannot use.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TimeStepError {
    /// V_max is NaN or infinite.
    NonFiniteVelocity {
        /// The offending value.
        value: f64,
    },
    /// V_max is negative.
    NegativeVelocity {
        /// The offending value.
        value: f64,
    },
}

impl TimeStepError {
    /// Attach step context, reporting against the velocity field.
    pub fn into_step_error(self, step: StepId) -> StepError {
        let kind = match self {
            Self::NonFiniteVelocity { value } => Instability::NonFinite { cell: None, value },
            Self::NegativeVelocity { value } => Instability::Negative { value },
        };
        StepError::NumericalInstability {
            step,
            field: FieldId::Velocity,
            kind,
        }
    }
}

impl fmt::Display for TimeStepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonFiniteVelocity { value } => write!(f, "non-finite max velocity {value}"),
            Self::NegativeVelocity { value } => write!(f, "negative max velocity {value}"),
        }
    }
}

impl Error for TimeStepError {}

/// Chooses Δt for the next step from this step's maximum velocity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeStepController {
    cell_size: f64,
    cfl_factor: f64,
    diffusion_limit: f64,
    dt_cap: Option<f64>,
}

impl TimeStepController {
    /// Controller for cells of edge `cell_size` with maximum
    /// diffusivity `d_max`.
    ///
    /// Parameters are assumed validated by
    /// [`SimulationConfig::validate`](crate::SimulationConfig::validate).
    pub fn new(cell_size: f64, cfl_factor: f64, d_max: f64, dt_cap: Option<f64>) -> Self {
        Self {
            cell_size,
            cfl_factor,
            diffusion_limit: cell_size * cell_size / (4.0 * d_max),
            dt_cap,
        }
    }

    /// `Lc² / (4 D_max)`.
    pub fn diffusion_limit(&self) -> f64 {
        self.diffusion_limit
    }

    /// Δt for the next step.
    pub fn next_dt(&self, v_max: f64) -> Result<f64, TimeStepError> {
        if !v_max.is_finite() {
            return Err(TimeStepError::NonFiniteVelocity { value: v_max });
        }
        if v_max < 0.0 {
            return Err(TimeStepError::NegativeVelocity { value: v_max });
        }
        let mut dt = self.diffusion_limit;
        if v_max > 0.0 {
            // Divide in sequence; the product overflows for huge velocities.
            dt = dt.min(self.cell_size / self.cfl_factor / v_max);
        }
        if let Some(cap) = self.dt_cap {
            dt = dt.min(cap);
        }
        Ok(dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LC: f64 = 0.25e-6;

    fn controller() -> TimeStepController {
        TimeStepController::new(LC, 5.0, 3e-9, None)
    }

    #[test]
    fn zero_velocity_uses_diffusion_bound() {
        let c = controller();
        let expected = LC * LC / (4.0 * 3e-9);
        assert!((c.diffusion_limit() - expected).abs() < 1e-20);
        assert_eq!(c.next_dt(0.0), Ok(c.diffusion_limit()));
    }

    #[test]
    fn fast_growth_uses_kinetic_bound() {
        let c = controller();
        // Lc / (5 * 0.1) = 5e-7, below the ~5.2e-6 diffusion bound.
        let dt = c.next_dt(0.1).unwrap();
        assert!((dt - 5e-7).abs() < 1e-20);
    }

    #[test]
    fn slow_growth_keeps_diffusion_bound() {
        let c = controller();
        assert_eq!(c.next_dt(1e-6), Ok(c.diffusion_limit()));
    }

    #[test]
    fn cap_applies() {
        let c = TimeStepController::new(LC, 5.0, 3e-9, Some(1e-7));
        assert_eq!(c.next_dt(0.0), Ok(1e-7));
        assert_eq!(c.next_dt(0.001), Ok(1e-7));
    }

    #[test]
    fn bad_velocity_rejected() {
        let c = controller();
        assert!(matches!(
            c.next_dt(f64::NAN),
            Err(TimeStepError::NonFiniteVelocity { .. })
        ));
        assert!(matches!(
            c.next_dt(f64::INFINITY),
            Err(TimeStepError::NonFiniteVelocity { .. })
        ));
        assert_eq!(
            c.next_dt(-1.0),
            Err(TimeStepError::NegativeVelocity { value: -1.0 })
        );
    }

    #[test]
    fn errors_map_to_velocity_instability() {
        let err = TimeStepError::NegativeVelocity { value: -2.0 }.into_step_error(StepId(7));
        assert_eq!(
            err,
            StepError::NumericalInstability {
                step: StepId(7),
                field: FieldId::Velocity,
                kind: Instability::Negative { value: -2.0 },
            }
        );
    }

    #[test]
    fn next_dt_is_positive_and_finite_for_any_valid_velocity() {
        let c = controller();
        for v in [0.0, 1e-300, 1e-9, 1.0, 1e6, f64::MAX] {
            let dt = c.next_dt(v).unwrap();
            assert!(dt.is_finite() && dt > 0.0, "v = {v}, dt = {dt}");
        }
    }

    #[test]
    fn huge_velocity_shrinks_dt_without_reaching_zero() {
        let c = TimeStepController::new(0.25e-6, 5.0, 3e-9, None);
        let dt = c.next_dt(1e308).unwrap();
        assert!(dt > 0.0);
        assert!(dt < c.next_dt(1e300).unwrap());
    }
}
