//! Typed SQLite lookups used by the ordering core.
//!
//! Every function takes a shared `&Connection`, so the same helpers run on a
//! plain connection or inside a `Transaction` (which derefs to one). Table and
//! column names come from the closed [`ItemKind`] mapping, never from input.

use crate::model::{
    ActorId, GroupKey, ItemId, ItemKind, ORDER_COLUMN, OrderedItem, ParentId, ParentRef, Role,
    SectionId, SectionKind,
};
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};
use std::str::FromStr;

// ---------------------------------------------------------------------------
// SQL fragments
// ---------------------------------------------------------------------------

/// Ids bound per `IN (...)` lookup; well under SQLite's bound-variable limit.
const FETCH_CHUNK: usize = 500;

/// Natural order of a group: numbered rows first, then legacy NULL rows, ties by id.
fn natural_order() -> String {
    format!("ORDER BY {ORDER_COLUMN} IS NULL, {ORDER_COLUMN} ASC, id ASC")
}

fn select_columns(kind: ItemKind) -> String {
    format!(
        "SELECT id, {parent}, {section}, {ORDER_COLUMN} FROM {table}",
        parent = kind.parent_column(),
        section = kind.section_column().unwrap_or("NULL"),
        table = kind.table(),
    )
}

/// `WHERE` clause selecting one group; binds `?1` (parent) and `?2` (section).
fn group_predicate(kind: ItemKind) -> String {
    match kind.section_column() {
        Some(section) => format!("{} = ?1 AND {section} IS ?2", kind.parent_column()),
        None => format!("{} = ?1 AND ?2 IS NULL", kind.parent_column()),
    }
}

fn row_to_ordered_item(row: &Row<'_>) -> rusqlite::Result<OrderedItem> {
    Ok(OrderedItem {
        id: row.get(0)?,
        parent_id: row.get(1)?,
        section_id: row.get(2)?,
        position: row.get(3)?,
    })
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

// ---------------------------------------------------------------------------
// Ordered items
// ---------------------------------------------------------------------------

/// Fetch the items with the given ids. Missing ids are silently absent from
/// the result; order follows the natural group order, not `ids`.
///
/// Ids are looked up a few hundred at a time, so any number of ids can be
/// requested. Each row appears once even when its id is repeated.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn fetch_items(
    conn: &Connection,
    kind: ItemKind,
    ids: &[ItemId],
) -> rusqlite::Result<Vec<OrderedItem>> {
    let mut items = Vec::with_capacity(ids.len());
    for chunk in ids.chunks(FETCH_CHUNK) {
        let sql = format!(
            "{} WHERE id IN ({})",
            select_columns(kind),
            placeholders(chunk.len())
        );
        let mut stmt = conn.prepare_cached(&sql)?;
        let rows = stmt.query_map(params_from_iter(chunk.iter()), row_to_ordered_item)?;
        for row in rows {
            items.push(row?);
        }
    }

    items.sort_by_key(|item| (item.position.is_none(), item.position, item.id));
    items.dedup_by_key(|item| item.id);
    Ok(items)
}

/// Fetch a single item by id.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_item(
    conn: &Connection,
    kind: ItemKind,
    id: ItemId,
) -> rusqlite::Result<Option<OrderedItem>> {
    let sql = format!("{} WHERE id = ?1", select_columns(kind));
    conn.query_row(&sql, params![id], row_to_ordered_item)
        .optional()
}

/// All members of one group in natural order.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn group_members(
    conn: &Connection,
    kind: ItemKind,
    key: GroupKey,
) -> rusqlite::Result<Vec<OrderedItem>> {
    let sql = format!(
        "{} WHERE {} {}",
        select_columns(kind),
        group_predicate(kind),
        natural_order()
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![key.parent_id, key.section_id], row_to_ordered_item)?;
    rows.collect()
}

/// Ids of one group in natural order.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn group_ids(conn: &Connection, kind: ItemKind, key: GroupKey) -> rusqlite::Result<Vec<ItemId>> {
    Ok(group_members(conn, kind, key)?
        .into_iter()
        .map(|item| item.id)
        .collect())
}

/// Every distinct group currently holding at least one item of `kind`.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn group_keys(conn: &Connection, kind: ItemKind) -> rusqlite::Result<Vec<GroupKey>> {
    let sql = format!(
        "SELECT DISTINCT {parent}, {section} FROM {table} ORDER BY 1, 2",
        parent = kind.parent_column(),
        section = kind.section_column().unwrap_or("NULL"),
        table = kind.table(),
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], |row| Ok(GroupKey::new(row.get(0)?, row.get(1)?)))?;
    rows.collect()
}

/// Position one past the current maximum of the group (0 for an empty group).
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn next_position(conn: &Connection, kind: ItemKind, key: GroupKey) -> rusqlite::Result<i64> {
    let sql = format!(
        "SELECT COALESCE(MAX({ORDER_COLUMN}) + 1, 0) FROM {} WHERE {}",
        kind.table(),
        group_predicate(kind)
    );
    conn.query_row(&sql, params![key.parent_id, key.section_id], |row| row.get(0))
}

/// Write one position. Returns the number of rows changed (0 or 1).
///
/// # Errors
///
/// Returns an error if the update fails (including trigger/constraint aborts).
pub fn set_position(
    conn: &Connection,
    kind: ItemKind,
    id: ItemId,
    position: i64,
) -> rusqlite::Result<usize> {
    let sql = format!("UPDATE {} SET {ORDER_COLUMN} = ?1 WHERE id = ?2", kind.table());
    conn.prepare_cached(&sql)?.execute(params![position, id])
}

/// Move an item to another group, placing it at `position`.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn set_group(
    conn: &Connection,
    kind: ItemKind,
    id: ItemId,
    key: GroupKey,
    position: i64,
) -> rusqlite::Result<usize> {
    let sql = match kind.section_column() {
        Some(section) => format!(
            "UPDATE {} SET {} = ?1, {section} = ?2, {ORDER_COLUMN} = ?3 WHERE id = ?4",
            kind.table(),
            kind.parent_column()
        ),
        None => format!(
            "UPDATE {} SET {} = ?1, {ORDER_COLUMN} = ?3 WHERE id = ?4 AND ?2 IS NULL",
            kind.table(),
            kind.parent_column()
        ),
    };
    conn.execute(&sql, params![key.parent_id, key.section_id, position, id])
}

/// Delete one item row.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn delete_item(conn: &Connection, kind: ItemKind, id: ItemId) -> rusqlite::Result<usize> {
    let sql = format!("DELETE FROM {} WHERE id = ?1", kind.table());
    conn.execute(&sql, params![id])
}

// ---------------------------------------------------------------------------
// Parents and sections
// ---------------------------------------------------------------------------

/// Whether the parent row exists.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn parent_exists(conn: &Connection, parent: ParentRef) -> rusqlite::Result<bool> {
    let sql = format!(
        "SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?1)",
        parent.kind.table()
    );
    conn.query_row(&sql, params![parent.id], |row| row.get(0))
}

/// The parent owning a section, or `None` when the section does not exist.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn section_parent(
    conn: &Connection,
    kind: SectionKind,
    section: SectionId,
) -> rusqlite::Result<Option<ParentId>> {
    let sql = format!(
        "SELECT {} FROM {} WHERE id = ?1",
        kind.parent_kind().foreign_key(),
        kind.table()
    );
    conn.query_row(&sql, params![section], |row| row.get(0))
        .optional()
}

// ---------------------------------------------------------------------------
// Users and authorship
// ---------------------------------------------------------------------------

/// Role of a user, or `None` when the user does not exist.
///
/// # Errors
///
/// Returns an error if the query fails or the stored role is unknown.
pub fn user_role(conn: &Connection, user: ActorId) -> rusqlite::Result<Option<Role>> {
    let raw: Option<String> = conn
        .query_row("SELECT role FROM users WHERE id = ?1", params![user], |row| {
            row.get(0)
        })
        .optional()?;

    raw.map(|value| {
        Role::from_str(&value).map_err(|error| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(error),
            )
        })
    })
    .transpose()
}

/// Creator of a board, or `None` when the board does not exist.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn board_creator(conn: &Connection, board: ParentId) -> rusqlite::Result<Option<ActorId>> {
    conn.query_row(
        "SELECT creator_id FROM boards WHERE id = ?1",
        params![board],
        |row| row.get(0),
    )
    .optional()
}

/// Whether `user` is a non-cameo co-author of `board`.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn is_board_writer(conn: &Connection, board: ParentId, user: ActorId) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM board_authors
            WHERE board_id = ?1 AND user_id = ?2 AND cameo = 0
        )",
        params![board, user],
        |row| row.get(0),
    )
}

/// Owner of a character, or `None` when the character does not exist.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn character_owner(
    conn: &Connection,
    character: ParentId,
) -> rusqlite::Result<Option<ActorId>> {
    conn.query_row(
        "SELECT user_id FROM characters WHERE id = ?1",
        params![character],
        |row| row.get(0),
    )
    .optional()
}

/// Schema version recorded in `store_meta`.
///
/// # Errors
///
/// Returns an error if `store_meta` is missing or unreadable.
pub fn schema_version(conn: &Connection) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT schema_version FROM store_meta WHERE id = 1",
        [],
        |row| row.get(0),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
