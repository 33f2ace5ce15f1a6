//! Pipeline validation.
//!
//! [`validate_pipeline`] runs once before the first step to check the
//! propagator sequence for structural errors: write conflicts, derived
//! fields read before they are produced, and an initial timestep that
//! exceeds a stage's stability bound.

use dendrite_core::{FieldId, FieldSet};
use indexmap::IndexMap;

use crate::propagator::{Propagator, WriteMode};

use std::error::Error;
use std::fmt;

// ── Errors ─────────────────────────────────────────────────────────

/// A detected write-write conflict between two propagators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteConflict {
    /// The contested field.
    pub field: FieldId,
    /// Name of the first writer (earlier in pipeline order).
    pub first_writer: String,
    /// Name of the second writer (later in pipeline order).
    pub second_writer: String,
}

/// Errors from pipeline validation.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// No propagators registered.
    EmptyPipeline,

    /// Two or more propagators write the same field.
    WriteConflict(Vec<WriteConflict>),

    /// A derived field is read before any earlier stage writes it.
    UnproducedRead {
        /// Which propagator.
        propagator: String,
        /// The derived field it reads.
        field: FieldId,
    },

    /// A persistent field is declared [`WriteMode::Full`], which would
    /// discard the state carried from the previous step.
    PersistentFullWrite {
        /// Which propagator.
        propagator: String,
        /// The persistent field.
        field: FieldId,
    },

    /// The configured dt exceeds a propagator's `max_dt`.
    DtTooLarge {
        /// The dt that was requested.
        configured_dt: f64,
        /// The tightest `max_dt` constraint.
        max_supported: f64,
        /// Which propagator constrains it.
        constraining_propagator: String,
    },

    /// The configured dt is not a valid timestep (NaN, infinity, zero, or negative).
    InvalidDt {
        /// The invalid dt value.
        value: f64,
    },

    /// A propagator's `max_dt()` returned a non-finite or non-positive value.
    InvalidMaxDt {
        /// Which propagator.
        propagator: String,
        /// The invalid max_dt value.
        value: f64,
    },
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPipeline => write!(f, "pipeline has no propagators"),
            Self::WriteConflict(conflicts) => {
                write!(f, "write-write conflicts: ")?;
                for (i, c) in conflicts.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(
                        f,
                        "field '{}' written by '{}' and '{}'",
                        c.field, c.first_writer, c.second_writer,
                    )?;
                }
                Ok(())
            }
            Self::UnproducedRead { propagator, field } => {
                write!(
                    f,
                    "propagator '{propagator}' reads derived field '{field}' \
                     before any earlier stage writes it"
                )
            }
            Self::PersistentFullWrite { propagator, field } => {
                write!(
                    f,
                    "propagator '{propagator}' declares a full write of persistent field '{field}'"
                )
            }
            Self::DtTooLarge {
                configured_dt,
                max_supported,
                constraining_propagator,
            } => {
                write!(
                    f,
                    "dt {configured_dt:e} exceeds max_dt {max_supported:e} \
                     (constrained by '{constraining_propagator}')"
                )
            }
            Self::InvalidDt { value } => {
                write!(f, "dt must be finite and positive, got {value}")
            }
            Self::InvalidMaxDt { propagator, value } => {
                write!(
                    f,
                    "propagator '{propagator}' returned invalid max_dt: {value} \
                     (must be finite and positive)"
                )
            }
        }
    }
}

impl Error for PipelineError {}

// ── Validation ─────────────────────────────────────────────────────

/// Validate a propagator pipeline against an initial timestep.
///
/// Checks performed (all before the first step):
///
/// 1. `dt` is finite and positive.
/// 2. Pipeline is non-empty.
/// 3. No write-write conflicts (two propagators writing the same field).
/// 4. Persistent fields are never declared [`WriteMode::Full`].
/// 5. Every derived field a stage reads is written by an earlier stage.
/// 6. `dt <= min(max_dt)` across all propagators.
pub fn validate_pipeline(propagators: &[Box<dyn Propagator>], dt: f64) -> Result<(), PipelineError> {
    // 1. dt must be finite and positive
    if !dt.is_finite() || dt <= 0.0 {
        return Err(PipelineError::InvalidDt { value: dt });
    }

    // 2. Non-empty
    if propagators.is_empty() {
        return Err(PipelineError::EmptyPipeline);
    }

    // 3. Write-write conflicts
    {
        let mut last_writer: IndexMap<FieldId, usize> = IndexMap::new();
        let mut conflicts: Vec<WriteConflict> = Vec::new();

        for (i, prop) in propagators.iter().enumerate() {
            for (field, _mode) in prop.writes() {
                if let Some(&j) = last_writer.get(&field) {
                    conflicts.push(WriteConflict {
                        field,
                        first_writer: propagators[j].name().to_string(),
                        second_writer: prop.name().to_string(),
                    });
                }
                last_writer.insert(field, i);
            }
        }
        if !conflicts.is_empty() {
            return Err(PipelineError::WriteConflict(conflicts));
        }
    }

    // 4. Persistent fields keep their state
    for prop in propagators {
        for (field, mode) in prop.writes() {
            if field.is_persistent() && mode == WriteMode::Full {
                return Err(PipelineError::PersistentFullWrite {
                    propagator: prop.name().to_string(),
                    field,
                });
            }
        }
    }

    // 5. Derived fields are produced before they are consumed
    {
        let mut available = FieldSet::persistent();
        for prop in propagators {
            for field in prop.reads().iter() {
                if !available.contains(field) {
                    return Err(PipelineError::UnproducedRead {
                        propagator: prop.name().to_string(),
                        field,
                    });
                }
            }
            for (field, _) in prop.writes() {
                available.insert(field);
            }
        }
    }

    // 6. dt validation
    let mut min_max_dt = f64::INFINITY;
    let mut constraining = String::new();
    for prop in propagators {
        if let Some(max) = prop.max_dt() {
            if !max.is_finite() || max <= 0.0 {
                return Err(PipelineError::InvalidMaxDt {
                    propagator: prop.name().to_string(),
                    value: max,
                });
            }
            if max < min_max_dt {
                min_max_dt = max;
                constraining = prop.name().to_string();
            }
        }
    }
    if dt > min_max_dt {
        return Err(PipelineError::DtTooLarge {
            configured_dt: dt,
            max_supported: min_max_dt,
            constraining_propagator: constraining,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::StepContext;
    use dendrite_core::PropagatorError;

    // ── Test propagators ───────────────────────────────────────

    /// Configurable declaration-only propagator.
    struct Decl {
        name: &'static str,
        reads: FieldSet,
        writes: Vec<(FieldId, WriteMode)>,
        max_dt: Option<f64>,
    }

    impl Decl {
        fn new(name: &'static str, reads: &[FieldId], writes: &[(FieldId, WriteMode)]) -> Self {
            Self {
                name,
                reads: reads.iter().copied().collect(),
                writes: writes.to_vec(),
                max_dt: None,
            }
        }

        fn with_max_dt(mut self, max: f64) -> Self {
            self.max_dt = Some(max);
            self
        }

        fn boxed(self) -> Box<dyn Propagator> {
            Box::new(self)
        }
    }

    impl Propagator for Decl {
        fn name(&self) -> &str {
            self.name
        }
        fn reads(&self) -> FieldSet {
            self.reads
        }
        fn writes(&self) -> Vec<(FieldId, WriteMode)> {
            self.writes.clone()
        }
        fn max_dt(&self) -> Option<f64> {
            self.max_dt
        }
        fn step(&self, _ctx: &mut StepContext<'_>) -> Result<(), PropagatorError> {
            Ok(())
        }
    }

    fn classify() -> Decl {
        Decl::new(
            "classify",
            &[FieldId::Occupancy],
            &[(FieldId::Classification, WriteMode::Full)],
        )
    }

    fn grow() -> Decl {
        Decl::new(
            "grow",
            &[FieldId::Classification, FieldId::FractionSolid],
            &[(FieldId::FractionSolid, WriteMode::Incremental)],
        )
    }

    #[test]
    fn valid_two_stage_pipeline() {
        let props = vec![classify().boxed(), grow().boxed()];
        assert!(validate_pipeline(&props, 1e-6).is_ok());
    }

    #[test]
    fn empty_pipeline_rejected() {
        assert_eq!(validate_pipeline(&[], 1e-6), Err(PipelineError::EmptyPipeline));
    }

    #[test]
    fn invalid_dt_rejected() {
        let props = vec![classify().boxed()];
        for dt in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                validate_pipeline(&props, dt),
                Err(PipelineError::InvalidDt { .. })
            ));
        }
    }

    #[test]
    fn write_conflict_detected() {
        let other = Decl::new(
            "other",
            &[],
            &[(FieldId::FractionSolid, WriteMode::Incremental)],
        );
        let props = vec![classify().boxed(), grow().boxed(), other.boxed()];
        match validate_pipeline(&props, 1e-6) {
            Err(PipelineError::WriteConflict(conflicts)) => {
                assert_eq!(conflicts.len(), 1);
                assert_eq!(conflicts[0].field, FieldId::FractionSolid);
                assert_eq!(conflicts[0].first_writer, "grow");
                assert_eq!(conflicts[0].second_writer, "other");
            }
            other => panic!("expected WriteConflict, got {other:?}"),
        }
    }

    #[test]
    fn derived_read_before_write_rejected() {
        let props = vec![grow().boxed(), classify().boxed()];
        assert_eq!(
            validate_pipeline(&props, 1e-6),
            Err(PipelineError::UnproducedRead {
                propagator: "grow".into(),
                field: FieldId::Classification,
            })
        );
    }

    #[test]
    fn persistent_full_write_rejected() {
        let bad = Decl::new("bad", &[], &[(FieldId::Concentration, WriteMode::Full)]);
        let props = vec![bad.boxed()];
        assert!(matches!(
            validate_pipeline(&props, 1e-6),
            Err(PipelineError::PersistentFullWrite { field: FieldId::Concentration, .. })
        ));
    }

    #[test]
    fn dt_constrained_by_tightest() {
        let props = vec![
            classify().with_max_dt(1e-3).boxed(),
            grow().with_max_dt(5e-6).boxed(),
        ];
        assert!(validate_pipeline(&props, 5e-6).is_ok());
        match validate_pipeline(&props, 1e-5) {
            Err(PipelineError::DtTooLarge {
                max_supported,
                constraining_propagator,
                ..
            }) => {
                assert_eq!(max_supported, 5e-6);
                assert_eq!(constraining_propagator, "grow");
            }
            other => panic!("expected DtTooLarge, got {other:?}"),
        }
    }

    #[test]
    fn invalid_max_dt_rejected() {
        let props = vec![classify().with_max_dt(f64::NAN).boxed()];
        assert!(matches!(
            validate_pipeline(&props, 1e-6),
            Err(PipelineError::InvalidMaxDt { .. })
        ));
    }
}
