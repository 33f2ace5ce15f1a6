//! Spatial topology for dendrite simulations.
//!
//! [`Grid2D`] is a fixed-size rectangular lattice stored in row-major
//! order. Its neighbourhood accessors return only in-grid cells, so every
//! consumer sees zero-flux domain edges without special-casing boundaries.
//!
//! # Neighbourhoods
//!
//! - [`Neighbourhood::VonNeumann`]: 4-connected, used by solute transport
//! - [`Neighbourhood::Moore`]: 8-connected, used by interface detection,
//!   the geometric factor, and solute rejection at capture

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod edge;
pub mod error;
pub mod grid;

pub use edge::{resolve_axis, EdgeBehavior};
pub use error::SpaceError;
pub use grid::{Grid2D, Neighbourhood};
