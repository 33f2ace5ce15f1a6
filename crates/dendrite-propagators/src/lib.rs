//! Physics propagators for the dendrite solidification engine.
//!
//! # Pipeline order (each step)
//!
//! 1. [`InterfaceClassifier`]: reads(occupancy, fraction_solid) → writes(classification)
//! 2. [`GeometricFactor`]: reads(fraction_solid, occupancy, classification) → writes(curvature, area_factor)
//! 3. [`NormalEstimator`]: reads(fraction_solid, classification) → writes(normal_angle)
//! 4. [`GrowthKinetics`]: reads(everything above, concentration) → writes(velocity, fraction_solid, occupancy)
//! 5. [`SoluteTransport`]: reads(occupancy, concentration) → writes(concentration)
//!
//! Stages 2–4 act only on the interface worklist built by stage 1. Solute
//! rejected at capture is staged in the scratch transfer buffer and
//! applied by stage 5, so concentration has a single writer.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod geometry;
pub mod interface;
pub mod kinetics;
pub mod normal;
pub mod transport;

pub use geometry::{area_factor, curvature, GeometricFactor};
pub use interface::{classify_cell, InterfaceClassifier};
pub use kinetics::{anisotropy, GrowthKinetics, GrowthKineticsBuilder};
pub use normal::{estimate_normal, NormalEstimator, GRADIENT_EPSILON};
pub use transport::{SoluteTransport, SoluteTransportBuilder};
