//! Dendrite: a cellular-automaton model of dendritic solidification.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all dendrite sub-crates. For most users, adding `dendrite` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use dendrite::prelude::*;
//!
//! // A small grid so the example runs quickly.
//! let mut config = SimulationConfig::preset(Preset::QuickTest);
//! config.domain.sizex = 21;
//! config.domain.sizey = 21;
//! config.time.termination = Termination::Steps(80);
//!
//! let mut driver = SimulationDriver::new(config).unwrap();
//! let summary = driver.run().unwrap();
//! assert_eq!(summary.steps, 80);
//! assert!(summary.solid_count > 1);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `dendrite-core` | Field IDs, phases, step counter, error types |
//! | [`space`] | `dendrite-space` | The 2D grid and its neighbourhoods |
//! | [`propagator`] | `dendrite-propagator` | Propagator trait, grid state, pipeline validation |
//! | [`propagators`] | `dendrite-propagators` | Classification, geometry, normal, kinetics, transport |
//! | [`engine`] | `dendrite-engine` | Configuration, presets, timestep control, driver |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types and IDs (`dendrite-core`).
///
/// Contains [`types::FieldId`], [`types::FieldSet`], the per-cell
/// [`types::Phase`] and [`types::CellClass`] labels, and the error types
/// surfaced by propagators and the driver.
pub use dendrite_core as types;

/// The rectangular grid (`dendrite-space`).
///
/// [`space::Grid2D`] handles indexing and bounded von Neumann and Moore
/// neighbourhoods.
pub use dendrite_space as space;

/// Propagator trait, grid state and pipeline validation
/// (`dendrite-propagator`).
///
/// The [`propagator::Propagator`] trait is the extension point for
/// custom pipeline stages.
pub use dendrite_propagator as propagator;

/// The physics stages (`dendrite-propagators`).
///
/// Includes [`propagators::InterfaceClassifier`],
/// [`propagators::GeometricFactor`], [`propagators::NormalEstimator`],
/// [`propagators::GrowthKinetics`] and [`propagators::SoluteTransport`].
pub use dendrite_propagators as propagators;

/// Simulation driver and configuration (`dendrite-engine`).
pub use dendrite_engine as engine;

/// Common imports for typical usage.
///
/// ```rust
/// use dendrite::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use dendrite_core::{CellClass, FieldId, FieldSet, Phase, StepId};

    // Errors
    pub use dendrite_core::{Instability, PropagatorError, StepError};

    // Space
    pub use dendrite_space::{Grid2D, Neighbourhood};

    // Propagator
    pub use dendrite_propagator::{GridState, Propagator, StepContext, WriteMode};

    // Engine
    pub use dendrite_engine::{
        ConfigError, FieldSnapshot, MaterialConstants, Preset, RunSummary, SeedSite,
        SimulationConfig, SimulationDriver, StepMetrics, Termination,
    };
}
