//! Error types for grid construction and coordinate queries.

use std::fmt;

/// Errors arising from grid construction or coordinate lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpaceError {
    /// A coordinate is outside the grid.
    CoordOutOfBounds {
        /// The x index.
        i: i64,
        /// The y index.
        j: i64,
        /// Human-readable description of the valid range.
        bounds: String,
    },
    /// Attempted to construct a grid with zero cells.
    EmptySpace,
    /// A dimension exceeds the maximum representable coordinate.
    DimensionTooLarge {
        /// Which axis.
        name: &'static str,
        /// The requested size.
        value: u32,
        /// The largest supported size.
        max: u32,
    },
    /// The total cell count does not fit the index type.
    CellCountOverflow {
        /// Requested x size.
        sizex: u32,
        /// Requested y size.
        sizey: u32,
    },
}

impl fmt::Display for SpaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CoordOutOfBounds { i, j, bounds } => {
                write!(f, "coordinate ({i}, {j}) out of bounds: {bounds}")
            }
            Self::EmptySpace => write!(f, "grid must have at least one cell"),
            Self::DimensionTooLarge { name, value, max } => {
                write!(f, "{name} = {value} exceeds maximum {max}")
            }
            Self::CellCountOverflow { sizex, sizey } => {
                write!(f, "grid {sizex}x{sizey} has too many cells")
            }
        }
    }
}

impl std::error::Error for SpaceError {}
