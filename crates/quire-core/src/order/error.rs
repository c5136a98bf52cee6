use crate::error::ErrorCode;
use crate::model::ids::join_ids;
use crate::model::{ItemId, ItemKind, ParentKind};

/// Why a reorder (or group lifecycle change) was refused or failed.
///
/// Every variant except [`ReorderError::Store`] is raised before the first
/// position write, so the group is untouched. `Store` failures roll back the
/// whole transaction.
#[derive(Debug, thiserror::Error)]
pub enum ReorderError {
    /// One or more ids do not resolve to records of the kind.
    #[error("Some {} could not be found: {}", .kind.plural(), join_ids(.missing))]
    NotFound { kind: ItemKind, missing: Vec<ItemId> },

    /// The records span more than one parent, or no single parent could be resolved.
    #[error("{} must be from one {}", sentence_case(.kind.plural()), .kind.parent_kind().noun())]
    MultipleParents { kind: ItemKind },

    /// The records are not all in the declared section, or that section is
    /// not owned by the resolved parent.
    #[error(
        "{} must be from one specified section in the {}, or no section",
        sentence_case(.kind.plural()),
        .kind.parent_kind().noun()
    )]
    SectionMismatch { kind: ItemKind },

    /// The actor may not modify the parent.
    #[error("You do not have permission to modify this {}.", .parent.noun())]
    Unauthorized { parent: ParentKind },

    /// The store rejected a read or write; nothing was persisted.
    #[error("reorder transaction failed: {0}")]
    Store(#[from] rusqlite::Error),
}

impl ReorderError {
    /// Machine-readable code associated with this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound { .. } => ErrorCode::ItemNotFound,
            Self::MultipleParents { .. } => ErrorCode::MultipleParents,
            Self::SectionMismatch { .. } => ErrorCode::SectionMismatch,
            Self::Unauthorized { .. } => ErrorCode::Unauthorized,
            Self::Store(_) => ErrorCode::TransactionFailed,
        }
    }

    /// Optional remediation hint for operators and agents.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }

    /// Whether retrying the same request could succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Store(_))
    }
}

fn sentence_case(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
mod tests {
    use super::ReorderError;
    use crate::error::ErrorCode;
    use crate::model::{ItemId, ItemKind, ParentKind};

    #[test]
    fn messages_name_the_collection() {
        let missing = ReorderError::NotFound {
            kind: ItemKind::Post,
            missing: vec![ItemId(4), ItemId(9)],
        };
        assert_eq!(missing.to_string(), "Some posts could not be found: 4, 9");

        let parents = ReorderError::MultipleParents {
            kind: ItemKind::BoardSection,
        };
        assert_eq!(parents.to_string(), "Sections must be from one continuity");

        let section = ReorderError::SectionMismatch {
            kind: ItemKind::Post,
        };
        assert_eq!(
            section.to_string(),
            "Posts must be from one specified section in the continuity, or no section"
        );

        let galleries = ReorderError::MultipleParents {
            kind: ItemKind::CharacterGallery,
        };
        assert_eq!(galleries.to_string(), "Galleries must be from one character");
    }

    #[test]
    fn unauthorized_reveals_nothing_about_ids() {
        let err = ReorderError::Unauthorized {
            parent: ParentKind::Board,
        };
        assert_eq!(
            err.to_string(),
            "You do not have permission to modify this continuity."
        );
        assert_eq!(err.code(), ErrorCode::Unauthorized);
        assert!(!err.is_transient());
    }

    #[test]
    fn store_errors_are_transient() {
        let err = ReorderError::from(rusqlite::Error::QueryReturnedNoRows);
        assert_eq!(err.code(), ErrorCode::TransactionFailed);
        assert!(err.is_transient());
        assert!(err.hint().is_some());
    }
}
