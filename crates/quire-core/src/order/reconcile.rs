//! Position planning and transactional application.
//!
//! Planning is pure: given the requested records (in target order) and the
//! rest of the group (in natural order) it yields one write per member, with
//! positions `0..n` in that concatenated order. Applying the plan is a series
//! of single-row updates that the caller runs inside one transaction.

use super::ReorderOptions;
use crate::db::query;
use crate::model::{GroupKey, ItemId, ItemKind, OrderedItem};
use rusqlite::Connection;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, trace};

/// One planned position assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PositionWrite {
    pub id: ItemId,
    /// Position before reconciliation (`None` for legacy unnumbered rows).
    pub from: Option<i64>,
    pub to: i64,
}

impl PositionWrite {
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.from == Some(self.to)
    }
}

/// Counters from applying a plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ApplyStats {
    pub planned: usize,
    pub written: usize,
    pub skipped: usize,
}

/// Drop repeated ids, keeping the first occurrence of each.
#[must_use]
pub fn dedup_ids(ids: &[ItemId]) -> Vec<ItemId> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

/// Members of `members` not named in `requested`, keeping their order.
#[must_use]
pub fn remainder(members: Vec<OrderedItem>, requested: &[OrderedItem]) -> Vec<OrderedItem> {
    let requested: HashSet<ItemId> = requested.iter().map(|item| item.id).collect();
    members
        .into_iter()
        .filter(|item| !requested.contains(&item.id))
        .collect()
}

/// Assign `0..` to `requested` in order, then continue through `rest`.
#[must_use]
pub fn plan_positions(requested: &[OrderedItem], rest: &[OrderedItem]) -> Vec<PositionWrite> {
    requested
        .iter()
        .chain(rest)
        .zip(0_i64..)
        .map(|(item, to)| PositionWrite {
            id: item.id,
            from: item.position,
            to,
        })
        .collect()
}

/// Persist a plan. Call inside a transaction; a failing write leaves the
/// transaction to be rolled back by the caller.
///
/// # Errors
///
/// Returns the first store error; writes before it are only undone by
/// rolling back the enclosing transaction.
pub fn apply_plan(
    conn: &Connection,
    kind: ItemKind,
    plan: &[PositionWrite],
    options: ReorderOptions,
) -> rusqlite::Result<ApplyStats> {
    let mut stats = ApplyStats {
        planned: plan.len(),
        ..ApplyStats::default()
    };

    for write in plan {
        if options.skip_unchanged_writes && write.is_noop() {
            stats.skipped += 1;
            continue;
        }
        trace!(kind = %kind, id = %write.id, from = ?write.from, to = write.to, "position write");
        query::set_position(conn, kind, write.id, write.to)?;
        stats.written += 1;
    }

    Ok(stats)
}

/// Renumber a whole group: `requested` first, every other member after it.
///
/// # Errors
///
/// Returns an error if reading the group or any write fails.
pub fn reconcile_group(
    conn: &Connection,
    kind: ItemKind,
    key: GroupKey,
    requested: &[OrderedItem],
    options: ReorderOptions,
) -> rusqlite::Result<ApplyStats> {
    let rest = remainder(query::group_members(conn, kind, key)?, requested);
    let plan = plan_positions(requested, &rest);
    debug!(
        kind = %kind,
        group = %key,
        requested = requested.len(),
        remainder = rest.len(),
        "planned group positions"
    );
    apply_plan(conn, kind, &plan, options)
}
