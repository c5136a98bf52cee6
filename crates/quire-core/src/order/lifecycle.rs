//! Single-item group changes that ride on the same reconciliation path:
//! appending, inserting at an index, removing, and moving between groups.
//!
//! These run after the caller has already authorized the change, so they do
//! not consult an [`AccessGate`](super::access::AccessGate).

use super::ReorderOptions;
use super::error::ReorderError;
use super::reconcile::{self, ApplyStats};
use crate::db::query;
use crate::model::{GroupKey, ItemId, ItemKind, OrderedItem, ParentRef, SectionId};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use tracing::info;

/// Position a new member of `key` should take.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn append_position(conn: &Connection, kind: ItemKind, key: GroupKey) -> rusqlite::Result<i64> {
    query::next_position(conn, kind, key)
}

fn load(conn: &Connection, kind: ItemKind, id: ItemId) -> Result<OrderedItem, ReorderError> {
    query::get_item(conn, kind, id)?.ok_or_else(|| ReorderError::NotFound {
        kind,
        missing: vec![id],
    })
}

fn begin(conn: &mut Connection) -> rusqlite::Result<Transaction<'_>> {
    conn.transaction_with_behavior(TransactionBehavior::Immediate)
}

/// Place an existing member at `index` within its own group (clamped to the
/// end), shifting the others.
///
/// # Errors
///
/// Returns [`ReorderError::NotFound`] for an unknown id, or a store error.
pub fn insert_at(
    conn: &mut Connection,
    kind: ItemKind,
    id: ItemId,
    index: usize,
    options: ReorderOptions,
) -> Result<Vec<ItemId>, ReorderError> {
    let tx = begin(conn)?;
    let item = load(&tx, kind, id)?;
    let key = item.group_key();

    let mut order: Vec<OrderedItem> = query::group_members(&tx, kind, key)?
        .into_iter()
        .filter(|member| member.id != id)
        .collect();
    order.insert(index.min(order.len()), item);

    let stats = reconcile::reconcile_group(&tx, kind, key, &order, options)?;
    let ids = query::group_ids(&tx, kind, key)?;
    tx.commit()?;

    info!(kind = %kind, id = %id, group = %key, index, written = stats.written, "inserted member");
    Ok(ids)
}

/// Delete a member and close the gap it leaves. Deleting a board section
/// first moves its posts to the end of the continuity's unsectioned posts.
///
/// Returns the remaining ids of the member's former group.
///
/// # Errors
///
/// Returns [`ReorderError::NotFound`] for an unknown id, or a store error.
pub fn remove_and_compact(
    conn: &mut Connection,
    kind: ItemKind,
    id: ItemId,
    options: ReorderOptions,
) -> Result<Vec<ItemId>, ReorderError> {
    let tx = begin(conn)?;
    let item = load(&tx, kind, id)?;
    let key = item.group_key();

    if kind == ItemKind::BoardSection {
        release_section_posts(&tx, item)?;
    }

    query::delete_item(&tx, kind, id)?;
    let stats = reconcile::reconcile_group(&tx, kind, key, &[], options)?;
    let ids = query::group_ids(&tx, kind, key)?;
    tx.commit()?;

    info!(kind = %kind, id = %id, group = %key, written = stats.written, "removed member");
    Ok(ids)
}

/// Posts of a section being deleted join the unsectioned group, keeping
/// their relative order.
fn release_section_posts(tx: &Transaction<'_>, section: OrderedItem) -> rusqlite::Result<()> {
    let from = GroupKey::new(section.parent_id, Some(SectionId(section.id.get())));
    let to = GroupKey::unsectioned(section.parent_id);

    let posts = query::group_members(tx, ItemKind::Post, from)?;
    let mut next = query::next_position(tx, ItemKind::Post, to)?;
    for post in &posts {
        query::set_group(tx, ItemKind::Post, post.id, to, next)?;
        next += 1;
    }
    Ok(())
}

/// Move a member to another group (new section and/or parent), appending it
/// there, then close the gap in the group it left.
///
/// Returns the ids of the target group.
///
/// # Errors
///
/// - [`ReorderError::NotFound`] for an unknown id
/// - [`ReorderError::MultipleParents`] when the target parent does not exist
/// - [`ReorderError::SectionMismatch`] when the target section is not owned
///   by the target parent, or `kind` is unsectioned
pub fn move_to_group(
    conn: &mut Connection,
    kind: ItemKind,
    id: ItemId,
    target: GroupKey,
    options: ReorderOptions,
) -> Result<Vec<ItemId>, ReorderError> {
    let tx = begin(conn)?;
    let item = load(&tx, kind, id)?;
    let source = item.group_key();

    check_target(&tx, kind, target)?;

    let source_stats = if source == target {
        ApplyStats::default()
    } else {
        let position = query::next_position(&tx, kind, target)?;
        query::set_group(&tx, kind, id, target, position)?;
        reconcile::reconcile_group(&tx, kind, source, &[], options)?
    };
    let ids = query::group_ids(&tx, kind, target)?;
    tx.commit()?;

    info!(
        kind = %kind,
        id = %id,
        from = %source,
        to = %target,
        written = source_stats.written,
        "moved member"
    );
    Ok(ids)
}

fn check_target(conn: &Connection, kind: ItemKind, target: GroupKey) -> Result<(), ReorderError> {
    let parent = ParentRef {
        kind: kind.parent_kind(),
        id: target.parent_id,
    };
    if !query::parent_exists(conn, parent)? {
        return Err(ReorderError::MultipleParents { kind });
    }

    let Some(section) = target.section_id else {
        return Ok(());
    };
    let Some(section_kind) = kind.section_kind() else {
        return Err(ReorderError::SectionMismatch { kind });
    };
    if query::section_parent(conn, section_kind, section)? == Some(target.parent_id) {
        Ok(())
    } else {
        Err(ReorderError::SectionMismatch { kind })
    }
}
