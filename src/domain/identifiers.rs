//! Numeric identifiers for stored elements
//!
//! Rows in the core tables are keyed by `BIGSERIAL` columns, so identifiers
//! are `i64` newtypes rather than UUIDs. The element id `1` is reserved for
//! the seed row created during baseline schema setup and is exempt from
//! post-test search-index cleanup.

use nutype::nutype;

/// Identifier for any indexable element (entries, users, assets)
#[nutype(derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    AsRef,
    Display
))]
pub struct ElementId(i64);

impl ElementId {
    /// The reserved seed element created during baseline schema setup.
    pub fn seed() -> Self {
        Self::new(1)
    }

    pub fn is_seed(&self) -> bool {
        self.into_inner() == 1
    }
}

/// Identifier for an entry row
#[nutype(derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    AsRef,
    Display
))]
pub struct EntryId(i64);

/// Identifier for a section row
#[nutype(derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    AsRef,
    Display
))]
pub struct SectionId(i64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_element_id_is_one() {
        assert_eq!(ElementId::seed().into_inner(), 1);
        assert!(ElementId::seed().is_seed());
        assert!(!ElementId::new(2).is_seed());
    }

    #[test]
    fn identifiers_compare_by_value() {
        assert_eq!(EntryId::new(7), EntryId::new(7));
        assert_ne!(SectionId::new(1), SectionId::new(2));
    }
}
