//! Per-cell phase and interface classification labels.

/// Occupancy state of a cell.
///
/// The only legal transition is `Liquid -> Solid`; a captured cell never
/// remelts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Untransformed melt.
    #[default]
    Liquid,
    /// Fully captured solid.
    Solid,
}

impl Phase {
    /// Returns `true` for [`Phase::Solid`].
    pub fn is_solid(self) -> bool {
        matches!(self, Self::Solid)
    }
}

/// Result of interface classification for one cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CellClass {
    /// Liquid with no solid neighbour and zero fraction solid.
    #[default]
    InteriorLiquid,
    /// Captured solid; excluded from further growth.
    InteriorSolid,
    /// Liquid cell eligible for growth this step.
    Interface,
}

impl CellClass {
    /// Returns `true` for [`CellClass::Interface`].
    pub fn is_interface(self) -> bool {
        matches!(self, Self::Interface)
    }
}
