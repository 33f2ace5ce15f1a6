//! Edge (boundary) handling for out-of-grid stencil positions.

/// How a stencil position outside the grid is resolved.
///
/// Neighbourhood queries always use [`EdgeBehavior::Absorb`] so that only
/// in-grid cells contribute. Finite-difference stencils that need a value
/// at every offset use [`EdgeBehavior::Clamp`], which degrades a centred
/// difference to a one-sided one at the boundary.
///
/// # Examples
///
/// ```
/// use dendrite_space::{resolve_axis, EdgeBehavior};
///
/// assert_eq!(resolve_axis(-1, 5, EdgeBehavior::Absorb), None);
/// assert_eq!(resolve_axis(-1, 5, EdgeBehavior::Clamp), Some(0));
/// assert_eq!(resolve_axis(3, 5, EdgeBehavior::Absorb), Some(3));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgeBehavior {
    /// Out-of-grid positions map to the nearest edge cell.
    Clamp,
    /// Out-of-grid positions are omitted.
    Absorb,
}

/// Resolve a single axis value under the given edge behavior.
///
/// Returns `Some(resolved)` or `None` for Absorb out-of-bounds.
pub fn resolve_axis(val: i32, len: u32, edge: EdgeBehavior) -> Option<i32> {
    let n = len as i32;
    if val >= 0 && val < n {
        return Some(val);
    }
    match edge {
        EdgeBehavior::Absorb => None,
        EdgeBehavior::Clamp => Some(val.clamp(0, n - 1)),
    }
}
