//! Error types for the dendrite solidification engine.
//!
//! Organized by subsystem: [`PropagatorError`] for failures inside one
//! pipeline stage, and [`StepError`] for what the simulation driver
//! reports to its caller.

use std::error::Error;
use std::fmt;

use crate::field::FieldId;
use crate::id::StepId;

/// Errors from an individual propagator's `step()`.
///
/// The driver converts these into [`StepError`] with the current step
/// index attached via [`StepError::from_propagator`].
#[derive(Clone, Debug, PartialEq)]
pub enum PropagatorError {
    /// The propagator could not run (missing input, size mismatch).
    ExecutionFailed {
        /// Human-readable description of the failure.
        reason: String,
    },
    /// A non-finite value appeared in a field the propagator wrote.
    NonFinite {
        /// The field containing the value.
        field: FieldId,
        /// Flat index of the first offending cell.
        cell: usize,
        /// The offending value.
        value: f64,
    },
    /// The step's dt exceeds this propagator's stability bound.
    StabilityViolated {
        /// The field whose update would be unstable.
        field: FieldId,
        /// The dt that was supplied.
        dt: f64,
        /// The largest stable dt.
        limit: f64,
    },
}

impl fmt::Display for PropagatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExecutionFailed { reason } => write!(f, "execution failed: {reason}"),
            Self::NonFinite { field, cell, value } => {
                write!(f, "non-finite value {value} in field '{field}' at cell {cell}")
            }
            Self::StabilityViolated { field, dt, limit } => {
                write!(
                    f,
                    "dt {dt:e} exceeds stability limit {limit:e} for field '{field}'"
                )
            }
        }
    }
}

impl Error for PropagatorError {}

/// The kind of numerical failure behind [`StepError::NumericalInstability`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Instability {
    /// A NaN or infinity was found.
    NonFinite {
        /// Flat index of the offending cell, if the value is per-cell.
        cell: Option<usize>,
        /// The offending value.
        value: f64,
    },
    /// A quantity that must be non-negative went negative.
    Negative {
        /// The offending value.
        value: f64,
    },
    /// The timestep exceeds a stability bound.
    DtExceedsLimit {
        /// The dt that was used.
        dt: f64,
        /// The largest stable dt.
        limit: f64,
    },
}

impl fmt::Display for Instability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonFinite { cell, value } => {
                write!(f, "non-finite value {value}")?;
                if let Some(idx) = cell {
                    write!(f, " at cell {idx}")?;
                }
                Ok(())
            }
            Self::Negative { value } => write!(f, "negative value {value}"),
            Self::DtExceedsLimit { dt, limit } => {
                write!(f, "dt {dt:e} exceeds stability limit {limit:e}")
            }
        }
    }
}

/// Errors from the simulation driver during `step()` or `run()`.
///
/// Every variant is fatal for the current run: after the first error the
/// driver refuses further steps with [`StepError::RunAborted`].
#[derive(Clone, Debug, PartialEq)]
pub enum StepError {
    /// A propagator failed for a non-numerical reason.
    PropagatorFailed {
        /// Name of the failing propagator.
        name: String,
        /// The underlying propagator error.
        reason: PropagatorError,
    },
    /// A field blew up or a stability bound was exceeded.
    NumericalInstability {
        /// The step during which the failure occurred.
        step: StepId,
        /// The affected field.
        field: FieldId,
        /// What went wrong.
        kind: Instability,
    },
    /// `step()` was called after an earlier fatal error.
    RunAborted {
        /// The step at which the run was aborted.
        at: StepId,
    },
}

impl StepError {
    /// Attach step context to a propagator failure.
    ///
    /// Numerical failures become [`StepError::NumericalInstability`];
    /// everything else is wrapped in [`StepError::PropagatorFailed`].
    pub fn from_propagator(step: StepId, name: &str, err: PropagatorError) -> Self {
        match err {
            PropagatorError::NonFinite { field, cell, value } => Self::NumericalInstability {
                step,
                field,
                kind: Instability::NonFinite {
                    cell: Some(cell),
                    value,
                },
            },
            PropagatorError::StabilityViolated { field, dt, limit } => {
                Self::NumericalInstability {
                    step,
                    field,
                    kind: Instability::DtExceedsLimit { dt, limit },
                }
            }
            other @ PropagatorError::ExecutionFailed { .. } => Self::PropagatorFailed {
                name: name.to_string(),
                reason: other,
            },
        }
    }
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PropagatorFailed { name, reason } => {
                write!(f, "propagator '{name}' failed: {reason}")
            }
            Self::NumericalInstability { step, field, kind } => {
                write!(f, "numerical instability at step {step} in field '{field}': {kind}")
            }
            Self::RunAborted { at } => {
                write!(f, "run was aborted at step {at}; no further steps allowed")
            }
        }
    }
}

impl Error for StepError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::PropagatorFailed { reason, .. } => Some(reason),
            _ => None,
        }
    }
}
