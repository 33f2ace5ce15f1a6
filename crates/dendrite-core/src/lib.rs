//! Core types for the dendrite solidification engine.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by every other crate in the workspace: field
//! identifiers and sets, per-cell phase and classification labels, the
//! step counter, and the error types surfaced by propagators and the
//! simulation driver.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod field;
pub mod id;
pub mod phase;

pub use error::{Instability, PropagatorError, StepError};
pub use field::{FieldId, FieldSet};
pub use id::StepId;
pub use phase::{CellClass, Phase};
