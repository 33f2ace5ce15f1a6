//! Rectangular 2D grid with bounded neighbourhood queries.

use crate::edge::{resolve_axis, EdgeBehavior};
use crate::error::SpaceError;
use smallvec::SmallVec;

/// All 8 offsets: the four axial directions first, then the diagonals.
const OFFSETS_8: [(i32, i32); 8] = [
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-1, -1),
    (-1, 1),
    (1, -1),
    (1, 1),
];

/// Which cells count as neighbours of a given cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Neighbourhood {
    /// The four axial neighbours.
    VonNeumann,
    /// The four axial neighbours plus the four diagonals.
    Moore,
}

impl Neighbourhood {
    /// The `(di, dj)` offsets of this neighbourhood, axial ones first.
    pub fn offsets(self) -> &'static [(i32, i32)] {
        match self {
            Self::VonNeumann => &OFFSETS_8[..4],
            Self::Moore => &OFFSETS_8,
        }
    }
}

/// A fixed-size `sizex * sizey` lattice stored in row-major order.
///
/// Cell `(i, j)` lives at flat index `i * sizey + j`. Coordinates are
/// signed so that stencil offsets can step outside the grid before being
/// resolved; every accessor that returns flat indices yields in-grid
/// cells only.
///
/// # Examples
///
/// ```
/// use dendrite_space::{Grid2D, Neighbourhood};
///
/// let grid = Grid2D::new(4, 4).unwrap();
/// // Corners have 3 Moore neighbours, interior cells have 8.
/// assert_eq!(grid.neighbours(0, 0, Neighbourhood::Moore).len(), 3);
/// assert_eq!(grid.neighbours(1, 1, Neighbourhood::Moore).len(), 8);
/// assert_eq!(grid.neighbours(0, 0, Neighbourhood::VonNeumann).len(), 2);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Grid2D {
    sizex: u32,
    sizey: u32,
}

impl Grid2D {
    /// Maximum size of either axis; coordinates use `i32`.
    pub const MAX_DIM: u32 = i32::MAX as u32;

    /// Create a grid with `sizex * sizey` cells.
    ///
    /// Returns `Err(SpaceError::EmptySpace)` if either dimension is 0,
    /// `Err(SpaceError::DimensionTooLarge)` if either exceeds `i32::MAX`,
    /// or `Err(SpaceError::CellCountOverflow)` if the cell count exceeds
    /// `u32::MAX`.
    pub fn new(sizex: u32, sizey: u32) -> Result<Self, SpaceError> {
        if sizex == 0 || sizey == 0 {
            return Err(SpaceError::EmptySpace);
        }
        if sizex > Self::MAX_DIM {
            return Err(SpaceError::DimensionTooLarge {
                name: "sizex",
                value: sizex,
                max: Self::MAX_DIM,
            });
        }
        if sizey > Self::MAX_DIM {
            return Err(SpaceError::DimensionTooLarge {
                name: "sizey",
                value: sizey,
                max: Self::MAX_DIM,
            });
        }
        if (sizex as u64) * (sizey as u64) > u32::MAX as u64 {
            return Err(SpaceError::CellCountOverflow { sizex, sizey });
        }
        Ok(Self { sizex, sizey })
    }

    /// Number of cells along x.
    pub fn sizex(&self) -> u32 {
        self.sizex
    }

    /// Number of cells along y.
    pub fn sizey(&self) -> u32 {
        self.sizey
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        (self.sizex as usize) * (self.sizey as usize)
    }

    /// The centre cell, `(sizex / 2, sizey / 2)`.
    pub fn center(&self) -> (i32, i32) {
        ((self.sizex / 2) as i32, (self.sizey / 2) as i32)
    }

    /// Whether `(i, j)` lies inside the grid.
    pub fn contains(&self, i: i32, j: i32) -> bool {
        i >= 0 && j >= 0 && (i as u32) < self.sizex && (j as u32) < self.sizey
    }

    /// Flat index of an in-grid cell.
    ///
    /// Callers must pass in-grid coordinates; use
    /// [`checked_index`](Self::checked_index) for untrusted input.
    pub fn index(&self, i: i32, j: i32) -> usize {
        debug_assert!(self.contains(i, j), "({i}, {j}) outside grid");
        (i as usize) * (self.sizey as usize) + (j as usize)
    }

    /// Flat index of `(i, j)`, or an error if it lies outside the grid.
    pub fn checked_index(&self, i: i32, j: i32) -> Result<usize, SpaceError> {
        if self.contains(i, j) {
            Ok(self.index(i, j))
        } else {
            Err(SpaceError::CoordOutOfBounds {
                i: i as i64,
                j: j as i64,
                bounds: format!("[0, {}) x [0, {})", self.sizex, self.sizey),
            })
        }
    }

    /// Coordinates of a flat index.
    pub fn coords(&self, idx: usize) -> (i32, i32) {
        let sy = self.sizey as usize;
        ((idx / sy) as i32, (idx % sy) as i32)
    }

    /// Flat index of `(i, j)` with each axis clamped into the grid.
    pub fn clamped_index(&self, i: i32, j: i32) -> usize {
        let ci = resolve_axis(i, self.sizex, EdgeBehavior::Clamp).unwrap_or(0);
        let cj = resolve_axis(j, self.sizey, EdgeBehavior::Clamp).unwrap_or(0);
        self.index(ci, cj)
    }

    /// In-grid neighbours of `(i, j)` together with their offsets.
    ///
    /// Out-of-grid positions are omitted, so edge cells have fewer
    /// neighbours. Axial neighbours come before diagonal ones.
    pub fn neighbours_with_offsets(
        &self,
        i: i32,
        j: i32,
        nb: Neighbourhood,
    ) -> SmallVec<[(i32, i32, usize); 8]> {
        let mut result = SmallVec::new();
        for &(di, dj) in nb.offsets() {
            let ni = resolve_axis(i + di, self.sizex, EdgeBehavior::Absorb);
            let nj = resolve_axis(j + dj, self.sizey, EdgeBehavior::Absorb);
            if let (Some(ni), Some(nj)) = (ni, nj) {
                result.push((di, dj, self.index(ni, nj)));
            }
        }
        result
    }

    /// Flat indices of the in-grid neighbours of `(i, j)`.
    pub fn neighbours(&self, i: i32, j: i32, nb: Neighbourhood) -> SmallVec<[usize; 8]> {
        self.neighbours_with_offsets(i, j, nb)
            .into_iter()
            .map(|(_, _, idx)| idx)
            .collect()
    }

    /// Flat indices of the in-grid members of the 3x3 block centred on
    /// `(i, j)`, including the centre itself.
    pub fn window3x3(&self, i: i32, j: i32) -> SmallVec<[usize; 9]> {
        let mut result = SmallVec::new();
        if self.contains(i, j) {
            result.push(self.index(i, j));
        }
        result.extend(self.neighbours(i, j, Neighbourhood::Moore));
        result
    }
}
