//! Membership validation: the requested ids must form one coherent group.
//!
//! Checks run in a fixed order and stop at the first failure:
//! 1. every id resolves to a record of the kind (`NotFound`)
//! 2. the records, plus any declared parent, name exactly one existing parent
//!    (`MultipleParents`)
//! 3. the records all sit in the declared section, and that section belongs
//!    to the parent (`SectionMismatch`)

use super::error::ReorderError;
use crate::db::query;
use crate::model::{GroupKey, ItemId, ItemKind, OrderedItem, ParentId, ParentRef, SectionId};
use rusqlite::Connection;
use std::collections::{BTreeSet, HashMap};

/// A validated request: the single parent, the group key, and the requested
/// records in request order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Membership {
    pub parent: ParentRef,
    pub key: GroupKey,
    pub items: Vec<OrderedItem>,
}

/// Validate that `ids` (already deduplicated) belong to one group.
///
/// `declared_parent` lets callers name the parent explicitly; it is required
/// for an empty list, which otherwise resolves to no parent at all.
///
/// # Errors
///
/// Returns [`ReorderError::NotFound`], [`ReorderError::MultipleParents`], or
/// [`ReorderError::SectionMismatch`] when the ids do not form one group, and
/// [`ReorderError::Store`] when a lookup fails.
pub fn validate_membership(
    conn: &Connection,
    kind: ItemKind,
    ids: &[ItemId],
    declared_section: Option<SectionId>,
    declared_parent: Option<ParentId>,
) -> Result<Membership, ReorderError> {
    let mut by_id: HashMap<ItemId, OrderedItem> = query::fetch_items(conn, kind, ids)?
        .into_iter()
        .map(|item| (item.id, item))
        .collect();

    let missing: Vec<ItemId> = ids
        .iter()
        .copied()
        .filter(|id| !by_id.contains_key(id))
        .collect();
    if !missing.is_empty() {
        return Err(ReorderError::NotFound { kind, missing });
    }

    let items: Vec<OrderedItem> = ids.iter().filter_map(|id| by_id.remove(id)).collect();

    let parent = single_parent(conn, kind, &items, declared_parent)?;
    check_section(conn, kind, &items, declared_section, parent.id)?;

    Ok(Membership {
        parent,
        key: GroupKey::new(parent.id, declared_section),
        items,
    })
}

fn single_parent(
    conn: &Connection,
    kind: ItemKind,
    items: &[OrderedItem],
    declared: Option<ParentId>,
) -> Result<ParentRef, ReorderError> {
    let mut parents: BTreeSet<ParentId> = items.iter().map(|item| item.parent_id).collect();
    parents.extend(declared);

    let mut only = parents.into_iter();
    let (Some(parent_id), None) = (only.next(), only.next()) else {
        return Err(ReorderError::MultipleParents { kind });
    };

    let parent = ParentRef {
        kind: kind.parent_kind(),
        id: parent_id,
    };
    if !query::parent_exists(conn, parent)? {
        return Err(ReorderError::MultipleParents { kind });
    }
    Ok(parent)
}

fn check_section(
    conn: &Connection,
    kind: ItemKind,
    items: &[OrderedItem],
    declared: Option<SectionId>,
    parent: ParentId,
) -> Result<(), ReorderError> {
    let mismatch = || ReorderError::SectionMismatch { kind };

    if items.iter().any(|item| item.section_id != declared) {
        return Err(mismatch());
    }

    let Some(section) = declared else {
        return Ok(());
    };

    // Unsectioned kinds never accept a section, existing or not.
    let Some(section_kind) = kind.section_kind() else {
        return Err(mismatch());
    };

    match query::section_parent(conn, section_kind, section)? {
        Some(owner) if owner == parent => Ok(()),
        _ => Err(mismatch()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    /// Boards 1 and 2; board 1 has sections 10 and 11, board 2 has section 20.
    fn test_db() -> Connection {
        let conn = open_in_memory().expect("open in-memory store");
        conn.execute_batch(
            "INSERT INTO users (id, username, created_at_us) VALUES (1, 'marri', 1);
             INSERT INTO boards (id, name, creator_id, created_at_us)
                 VALUES (1, 'Sandboxes', 1, 1), (2, 'Effulgence', 1, 1);
             INSERT INTO board_sections (id, board_id, name, section_order, created_at_us)
                 VALUES (10, 1, 'Act I', 0, 1), (11, 1, 'Act II', 1, 1), (20, 2, 'Book 1', 0, 1);
             INSERT INTO posts (id, board_id, section_id, user_id, subject, section_order, created_at_us)
                 VALUES (1, 1, NULL, 1, 'a', 0, 1),
                        (2, 1, NULL, 1, 'b', 1, 1),
                        (3, 1, 10, 1, 'c', 0, 1),
                        (4, 1, 11, 1, 'd', 0, 1),
                        (5, 2, NULL, 1, 'e', 0, 1),
                        (6, 2, 20, 1, 'f', 0, 1);",
        )
        .expect("seed");
        conn
    }

    fn ids(raw: &[i64]) -> Vec<ItemId> {
        raw.iter().copied().map(ItemId).collect()
    }

    #[test]
    fn accepts_unsectioned_posts_from_one_board() {
        let conn = test_db();
        let membership =
            validate_membership(&conn, ItemKind::Post, &ids(&[2, 1]), None, None).expect("valid");
        assert_eq!(membership.parent.id, ParentId(1));
        assert_eq!(membership.key, GroupKey::unsectioned(ParentId(1)));
        let order: Vec<_> = membership.items.iter().map(|item| item.id).collect();
        assert_eq!(order, ids(&[2, 1]));
    }

    #[test]
    fn reports_missing_ids_in_request_order() {
        let conn = test_db();
        let err = validate_membership(&conn, ItemKind::Post, &ids(&[9, 1, 7]), None, None)
            .expect_err("missing ids");
        match err {
            ReorderError::NotFound { kind, missing } => {
                assert_eq!(kind, ItemKind::Post);
                assert_eq!(missing, ids(&[9, 7]));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_posts_from_two_boards() {
        let conn = test_db();
        let err = validate_membership(&conn, ItemKind::Post, &ids(&[1, 5]), None, None)
            .expect_err("split parentage");
        assert!(matches!(err, ReorderError::MultipleParents { .. }));
    }

    #[test]
    fn declared_parent_must_match_items() {
        let conn = test_db();
        let err = validate_membership(&conn, ItemKind::Post, &ids(&[1]), None, Some(ParentId(2)))
            .expect_err("wrong parent");
        assert!(matches!(err, ReorderError::MultipleParents { .. }));

        let ok = validate_membership(&conn, ItemKind::Post, &ids(&[1]), None, Some(ParentId(1)));
        assert!(ok.is_ok());
    }

    #[test]
    fn empty_list_needs_an_existing_declared_parent() {
        let conn = test_db();
        let err = validate_membership(&conn, ItemKind::Post, &[], None, None)
            .expect_err("no parent");
        assert!(matches!(err, ReorderError::MultipleParents { .. }));

        let err = validate_membership(&conn, ItemKind::Post, &[], None, Some(ParentId(99)))
            .expect_err("unknown parent");
        assert!(matches!(err, ReorderError::MultipleParents { .. }));

        let membership =
            validate_membership(&conn, ItemKind::Post, &[], Some(SectionId(10)), Some(ParentId(1)))
                .expect("empty list with declared group");
        assert_eq!(membership.key, GroupKey::new(ParentId(1), Some(SectionId(10))));
        assert!(membership.items.is_empty());
    }

    #[test]
    fn rejects_posts_from_two_sections() {
        let conn = test_db();
        let err = validate_membership(&conn, ItemKind::Post, &ids(&[3, 4]), Some(SectionId(10)), None)
            .expect_err("split sections");
        assert!(matches!(err, ReorderError::SectionMismatch { .. }));
    }

    #[test]
    fn sectioned_posts_need_the_section_declared() {
        let conn = test_db();
        let err = validate_membership(&conn, ItemKind::Post, &ids(&[3]), None, None)
            .expect_err("undeclared section");
        assert!(matches!(err, ReorderError::SectionMismatch { .. }));

        let membership =
            validate_membership(&conn, ItemKind::Post, &ids(&[3]), Some(SectionId(10)), None)
                .expect("declared section");
        assert_eq!(membership.key.section_id, Some(SectionId(10)));
    }

    #[test]
    fn unknown_or_foreign_section_is_a_mismatch() {
        let conn = test_db();
        let err =
            validate_membership(&conn, ItemKind::Post, &[], Some(SectionId(404)), Some(ParentId(1)))
                .expect_err("missing section");
        assert!(matches!(err, ReorderError::SectionMismatch { .. }));

        let err =
            validate_membership(&conn, ItemKind::Post, &[], Some(SectionId(20)), Some(ParentId(1)))
                .expect_err("section of another board");
        assert!(matches!(err, ReorderError::SectionMismatch { .. }));
    }

    #[test]
    fn unsectioned_kind_rejects_any_section() {
        let conn = test_db();
        let err = validate_membership(
            &conn,
            ItemKind::BoardSection,
            &ids(&[10, 11]),
            Some(SectionId(10)),
            None,
        )
        .expect_err("section on unsectioned kind");
        assert!(matches!(err, ReorderError::SectionMismatch { .. }));

        let ok = validate_membership(&conn, ItemKind::BoardSection, &ids(&[11, 10]), None, None);
        assert!(ok.is_ok());
    }
}
