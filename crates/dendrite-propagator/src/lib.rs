//! Propagator trait, grid state, and step context for dendrite simulations.
//!
//! A simulation step is a fixed sequence of [`Propagator`]s. Each one
//! receives a [`StepContext`] giving it exclusive access to the
//! [`GridState`] and the per-step [`StepScratch`] buffers, then returns
//! before the next one runs. [`validate_pipeline`] checks the sequence
//! once, before the first step.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod context;
pub mod pipeline;
pub mod propagator;
pub mod scratch;
pub mod state;

pub use context::StepContext;
pub use pipeline::{validate_pipeline, PipelineError, WriteConflict};
pub use propagator::{Propagator, WriteMode};
pub use scratch::{CaptureBuffers, StepScratch};
pub use state::{FieldsMut, GridState};
