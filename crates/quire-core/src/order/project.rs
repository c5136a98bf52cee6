//! Canonical read-back of a group after reconciliation.

use crate::db::query;
use crate::model::{GroupKey, ItemId, ItemKind};
use rusqlite::Connection;
use serde::Serialize;

/// The ordered ids of one group, ready for output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupListing {
    pub kind: ItemKind,
    #[serde(flatten)]
    pub key: GroupKey,
    pub ids: Vec<ItemId>,
}

/// Ids of the group in ascending position.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn ordered_ids(conn: &Connection, kind: ItemKind, key: GroupKey) -> rusqlite::Result<Vec<ItemId>> {
    query::group_ids(conn, kind, key)
}

/// Full listing of the group in ascending position.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn listing(conn: &Connection, kind: ItemKind, key: GroupKey) -> rusqlite::Result<GroupListing> {
    Ok(GroupListing {
        kind,
        key,
        ids: ordered_ids(conn, kind, key)?,
    })
}
