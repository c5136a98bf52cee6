//! Structural checks on stored group positions.
//!
//! A healthy group holds positions exactly `0..n` for its `n` members. The
//! report lists every deviation rather than stopping at the first one.

use crate::db::query;
use crate::model::{GroupKey, ItemId, ItemKind};
use rusqlite::Connection;
use serde::Serialize;
use std::collections::BTreeMap;

/// One way a group's positions can be malformed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "problem", rename_all = "snake_case")]
pub enum PositionProblem {
    /// The row has no position at all.
    Unpositioned { id: ItemId },
    /// Several rows share a position.
    Duplicate { position: i64, ids: Vec<ItemId> },
    /// No row holds this position although the group is large enough to need it.
    Gap { position: i64 },
    /// The row's position is at or beyond the member count.
    OutOfRange { id: ItemId, position: i64 },
}

/// Verification result for one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupReport {
    pub kind: ItemKind,
    #[serde(flatten)]
    pub key: GroupKey,
    /// Members in natural order.
    pub ids: Vec<ItemId>,
    pub problems: Vec<PositionProblem>,
}

impl GroupReport {
    #[must_use]
    pub fn is_contiguous(&self) -> bool {
        self.problems.is_empty()
    }
}

/// Check one group.
///
/// # Errors
///
/// Returns an error if reading the group fails.
pub fn verify_group(conn: &Connection, kind: ItemKind, key: GroupKey) -> rusqlite::Result<GroupReport> {
    let members = query::group_members(conn, kind, key)?;
    let count = i64::try_from(members.len()).unwrap_or(i64::MAX);

    let mut problems = Vec::new();
    let mut by_position: BTreeMap<i64, Vec<ItemId>> = BTreeMap::new();
    for item in &members {
        match item.position {
            None => problems.push(PositionProblem::Unpositioned { id: item.id }),
            Some(position) if position >= count => problems.push(PositionProblem::OutOfRange {
                id: item.id,
                position,
            }),
            Some(position) => by_position.entry(position).or_default().push(item.id),
        }
    }

    for (position, ids) in &by_position {
        if ids.len() > 1 {
            problems.push(PositionProblem::Duplicate {
                position: *position,
                ids: ids.clone(),
            });
        }
    }

    for position in 0..count {
        if !by_position.contains_key(&position) {
            problems.push(PositionProblem::Gap { position });
        }
    }

    Ok(GroupReport {
        kind,
        key,
        ids: members.iter().map(|item| item.id).collect(),
        problems,
    })
}

/// Check every group that currently holds items of `kind`.
///
/// # Errors
///
/// Returns an error if any read fails.
pub fn verify_all(conn: &Connection, kind: ItemKind) -> rusqlite::Result<Vec<GroupReport>> {
    query::group_keys(conn, kind)?
        .into_iter()
        .map(|key| verify_group(conn, kind, key))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use crate::model::ParentId;

    fn seeded(positions: &[Option<i64>]) -> Connection {
        let conn = open_in_memory().expect("store");
        conn.execute_batch(
            "INSERT INTO users (id, username, created_at_us) VALUES (1, 'marri', 1);
             INSERT INTO boards (id, name, creator_id, created_at_us) VALUES (1, 'Sandboxes', 1, 1);",
        )
        .expect("seed");
        for position in positions {
            conn.execute(
                "INSERT INTO board_sections (board_id, name, section_order, created_at_us)
                 VALUES (1, 'section', ?1, 1)",
                [position],
            )
            .expect("insert section");
        }
        conn
    }

    fn report(positions: &[Option<i64>]) -> GroupReport {
        let conn = seeded(positions);
        verify_group(&conn, ItemKind::BoardSection, GroupKey::unsectioned(ParentId(1)))
            .expect("verify")
    }

    #[test]
    fn contiguous_group_passes() {
        let report = report(&[Some(1), Some(0), Some(2)]);
        assert!(report.is_contiguous(), "{:?}", report.problems);
        assert_eq!(report.ids, vec![ItemId(2), ItemId(1), ItemId(3)]);
    }

    #[test]
    fn empty_group_passes() {
        assert!(report(&[]).is_contiguous());
    }

    #[test]
    fn detects_duplicates_gaps_and_nulls() {
        let report = report(&[Some(0), Some(0), None, Some(7)]);
        assert!(report.problems.contains(&PositionProblem::Duplicate {
            position: 0,
            ids: vec![ItemId(1), ItemId(2)],
        }));
        assert!(report.problems.contains(&PositionProblem::Unpositioned { id: ItemId(3) }));
        assert!(report.problems.contains(&PositionProblem::OutOfRange {
            id: ItemId(4),
            position: 7,
        }));
        for position in 1..4 {
            assert!(report.problems.contains(&PositionProblem::Gap { position }));
        }
    }

    #[test]
    fn verify_all_covers_each_group() {
        let conn = seeded(&[Some(0), Some(1)]);
        conn.execute_batch(
            "INSERT INTO boards (id, name, creator_id, created_at_us) VALUES (2, 'Other', 1, 1);
             INSERT INTO board_sections (board_id, name, section_order, created_at_us)
                 VALUES (2, 'broken', 3, 1);",
        )
        .expect("seed second board");

        let reports = verify_all(&conn, ItemKind::BoardSection).expect("verify all");
        assert_eq!(reports.len(), 2);
        assert!(reports[0].is_contiguous());
        assert!(!reports[1].is_contiguous());
    }
}
