//! Simulation engine for dendritic solidification.
//!
//! Provides [`SimulationDriver`], which owns the grid state and runs the
//! propagator pipeline step by step, together with the immutable
//! [`SimulationConfig`], named [`Preset`]s, the adaptive
//! [`TimeStepController`], and the per-step and end-of-run outputs.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod driver;
pub mod metrics;
pub mod pipeline;
pub mod preset;
pub mod snapshot;
pub mod summary;
pub mod timestep;

pub use config::{
    ConfigError, DomainConfig, GrowthConfig, MaterialConstants, NucleationConfig, OutputConfig,
    SeedSite, SimulationConfig, Termination, TimeConfig,
};
pub use driver::SimulationDriver;
pub use metrics::StepMetrics;
pub use pipeline::standard_pipeline;
pub use preset::Preset;
pub use snapshot::FieldSnapshot;
pub use summary::{ConcentrationStats, RunSummary};
pub use timestep::{TimeStepController, TimeStepError};
