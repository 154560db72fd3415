//! Structural sections of a site
//!
//! Every entry belongs to exactly one section, and every section owns one
//! physical content table named after its handle.

use serde::{Deserialize, Serialize};

use crate::domain::identifiers::SectionId;
use crate::domain::types::SectionHandle;

/// A structural section of a site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    id: SectionId,
    handle: SectionHandle,
}

impl Section {
    pub fn new(id: SectionId, handle: SectionHandle) -> Self {
        Self { id, handle }
    }

    pub fn id(&self) -> SectionId {
        self.id
    }

    pub fn handle(&self) -> &SectionHandle {
        &self.handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_exposes_its_handle() {
        let handle = SectionHandle::try_new("blog".to_string()).unwrap();
        let section = Section::new(SectionId::new(3), handle.clone());
        assert_eq!(section.handle(), &handle);
        assert_eq!(section.id(), SectionId::new(3));
    }
}
