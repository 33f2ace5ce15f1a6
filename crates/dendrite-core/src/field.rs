//! Field identifiers and the [`FieldSet`] bitset.

use std::fmt;

/// Identifies one per-cell field of the grid state.
///
/// Persistent fields carry state from one step to the next. Derived
/// fields are recomputed every step from the persistent ones and must be
/// written by a propagator earlier in the pipeline before anything reads
/// them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldId {
    /// Occupancy map (liquid / solid). Persistent.
    Occupancy,
    /// Fraction solid in `[0, 1]`. Persistent.
    FractionSolid,
    /// Solute concentration in wt%. Persistent.
    Concentration,
    /// Interface classification of each cell. Derived.
    Classification,
    /// Curvature geometric factor `G` in 1/m. Derived.
    Curvature,
    /// Interface-area factor scaling the fraction-solid increment. Derived.
    AreaFactor,
    /// Interface normal angle in radians, absent on zero gradients. Derived.
    NormalAngle,
    /// Interface velocity in m/s. Derived.
    Velocity,
}

impl FieldId {
    /// Every field, in declaration order.
    pub const ALL: [FieldId; 8] = [
        FieldId::Occupancy,
        FieldId::FractionSolid,
        FieldId::Concentration,
        FieldId::Classification,
        FieldId::Curvature,
        FieldId::AreaFactor,
        FieldId::NormalAngle,
        FieldId::Velocity,
    ];

    /// Stable snake_case name used in diagnostics and logs.
    pub fn name(self) -> &'static str {
        match self {
            Self::Occupancy => "occupancy",
            Self::FractionSolid => "fraction_solid",
            Self::Concentration => "concentration",
            Self::Classification => "classification",
            Self::Curvature => "curvature",
            Self::AreaFactor => "area_factor",
            Self::NormalAngle => "normal_angle",
            Self::Velocity => "velocity",
        }
    }

    /// Physical unit annotation, if the field carries one.
    pub fn units(self) -> Option<&'static str> {
        match self {
            Self::Concentration => Some("wt%"),
            Self::Curvature => Some("1/m"),
            Self::NormalAngle => Some("rad"),
            Self::Velocity => Some("m/s"),
            Self::Occupancy | Self::FractionSolid | Self::Classification | Self::AreaFactor => None,
        }
    }

    /// Whether the field carries state across steps.
    pub fn is_persistent(self) -> bool {
        matches!(
            self,
            Self::Occupancy | Self::FractionSolid | Self::Concentration
        )
    }

    fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A set of [`FieldId`]s stored as a bitmask.
///
/// Used by propagators to declare which fields they read and write,
/// enabling the pipeline validator to check write conflicts and
/// read-before-write ordering of derived fields.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FieldSet {
    bits: u16,
}

impl FieldSet {
    /// Create an empty field set.
    pub const fn empty() -> Self {
        Self { bits: 0 }
    }

    /// The set of all persistent fields.
    pub fn persistent() -> Self {
        FieldId::ALL
            .into_iter()
            .filter(|f| f.is_persistent())
            .collect()
    }

    /// Insert a field into the set.
    pub fn insert(&mut self, field: FieldId) {
        self.bits |= field.bit();
    }

    /// Check whether the set contains a field.
    pub fn contains(&self, field: FieldId) -> bool {
        self.bits & field.bit() != 0
    }

    /// Return the union of two sets (`self | other`).
    pub fn union(&self, other: &Self) -> Self {
        Self {
            bits: self.bits | other.bits,
        }
    }

    /// Return the intersection of two sets (`self & other`).
    pub fn intersection(&self, other: &Self) -> Self {
        Self {
            bits: self.bits & other.bits,
        }
    }

    /// Return the set difference (`self - other`).
    pub fn difference(&self, other: &Self) -> Self {
        Self {
            bits: self.bits & !other.bits,
        }
    }

    /// Check whether `self` is a subset of `other`.
    pub fn is_subset(&self, other: &Self) -> bool {
        self.bits & !other.bits == 0
    }

    /// Returns `true` if the set contains no fields.
    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Returns the number of fields in the set.
    pub fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Iterate over the fields in the set, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = FieldId> + '_ {
        FieldId::ALL.into_iter().filter(|f| self.contains(*f))
    }
}

impl FromIterator<FieldId> for FieldSet {
    fn from_iter<I: IntoIterator<Item = FieldId>>(iter: I) -> Self {
        let mut set = Self::empty();
        for field in iter {
            set.insert(field);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_field_set() -> impl Strategy<Value = FieldSet> {
        prop::collection::vec(0usize..FieldId::ALL.len(), 0..8)
            .prop_map(|ids| ids.into_iter().map(|i| FieldId::ALL[i]).collect::<FieldSet>())
    }

    #[test]
    fn persistent_set_is_state_fields() {
        let p = FieldSet::persistent();
        assert_eq!(p.len(), 3);
        assert!(p.contains(FieldId::Occupancy));
        assert!(p.contains(FieldId::FractionSolid));
        assert!(p.contains(FieldId::Concentration));
        assert!(!p.contains(FieldId::Curvature));
    }

    #[test]
    fn names_are_unique() {
        let mut names: Vec<_> = FieldId::ALL.iter().map(|f| f.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), FieldId::ALL.len());
    }

    proptest! {
        #[test]
        fn union_commutative(a in arb_field_set(), b in arb_field_set()) {
            prop_assert_eq!(a.union(&b), b.union(&a));
        }

        #[test]
        fn intersection_distributes_over_union(
            a in arb_field_set(),
            b in arb_field_set(),
            c in arb_field_set(),
        ) {
            prop_assert_eq!(
                a.intersection(&b.union(&c)),
                a.intersection(&b).union(&a.intersection(&c))
            );
        }

        #[test]
        fn difference_removes_common(a in arb_field_set(), b in arb_field_set()) {
            let diff = a.difference(&b);
            for field in diff.iter() {
                prop_assert!(a.contains(field));
                prop_assert!(!b.contains(field));
            }
            prop_assert!(diff.is_subset(&a));
        }

        #[test]
        fn len_matches_iter_count(a in arb_field_set()) {
            prop_assert_eq!(a.len(), a.iter().count());
        }
    }
}
