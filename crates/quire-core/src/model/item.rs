use super::ids::{ItemId, ParentId, SectionId};
use super::kind::ParentKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one ordered group: a parent plus an optional section.
///
/// Unsectioned kinds always carry `section_id: None`, so both cases share the
/// same reconciliation path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupKey {
    pub parent_id: ParentId,
    pub section_id: Option<SectionId>,
}

impl GroupKey {
    #[must_use]
    pub const fn new(parent_id: ParentId, section_id: Option<SectionId>) -> Self {
        Self {
            parent_id,
            section_id,
        }
    }

    #[must_use]
    pub const fn unsectioned(parent_id: ParentId) -> Self {
        Self::new(parent_id, None)
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.section_id {
            Some(section) => write!(f, "{}/{}", self.parent_id, section),
            None => write!(f, "{}/-", self.parent_id),
        }
    }
}

/// A record participating in a position-ordered group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderedItem {
    pub id: ItemId,
    pub parent_id: ParentId,
    pub section_id: Option<SectionId>,
    /// `None` for rows written before ordering was tracked.
    pub position: Option<i64>,
}

impl OrderedItem {
    #[must_use]
    pub const fn group_key(&self) -> GroupKey {
        GroupKey::new(self.parent_id, self.section_id)
    }
}

/// A resolved parent record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParentRef {
    pub kind: ParentKind,
    pub id: ParentId,
}

impl fmt::Display for ParentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}
