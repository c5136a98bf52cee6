//! Ordered-list reconciliation.
//!
//! A reorder takes a caller-supplied ordering of some members of one group
//! and renumbers the whole group so positions stay `0..n`:
//!
//! 1. [`validate`] checks the ids form one group (one parent, one section)
//! 2. [`access`] checks the actor may edit the parent
//! 3. [`reconcile`] assigns the requested ids `0..k` and the untouched
//!    members `k..n` in their existing relative order
//! 4. [`project`] reads back the group in its new order
//!
//! Steps 1–4 run in a single `BEGIN IMMEDIATE` transaction. Any failure
//! drops the transaction, so no partial renumbering is ever visible.

pub mod access;
pub mod error;
pub mod lifecycle;
pub mod project;
pub mod reconcile;
pub mod validate;
pub mod verify;

pub use access::{AccessGate, EditorGate};
pub use error::ReorderError;

use crate::model::{ActorId, GroupKey, ItemId, ItemKind, ParentId, ParentRef, SectionId};
use rusqlite::{Connection, TransactionBehavior};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Tunables for applying position writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderOptions {
    /// Skip rows whose position is already correct.
    pub skip_unchanged_writes: bool,
}

impl Default for ReorderOptions {
    fn default() -> Self {
        Self {
            skip_unchanged_writes: true,
        }
    }
}

/// A requested order for (part of) one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderRequest {
    pub kind: ItemKind,
    /// Target order; duplicates are ignored after their first occurrence.
    pub ordered_ids: Vec<ItemId>,
    /// Section the ids must all belong to; `None` means "no section".
    #[serde(default)]
    pub section_id: Option<SectionId>,
    /// Parent the ids must all belong to. Required for an empty list.
    #[serde(default)]
    pub parent_id: Option<ParentId>,
}

impl ReorderRequest {
    #[must_use]
    pub const fn new(kind: ItemKind, ordered_ids: Vec<ItemId>) -> Self {
        Self {
            kind,
            ordered_ids,
            section_id: None,
            parent_id: None,
        }
    }

    /// Re-contiguate a group without promoting any member.
    #[must_use]
    pub const fn compact(kind: ItemKind, key: GroupKey) -> Self {
        Self {
            kind,
            ordered_ids: Vec::new(),
            section_id: key.section_id,
            parent_id: Some(key.parent_id),
        }
    }

    #[must_use]
    pub fn in_section(mut self, section_id: Option<SectionId>) -> Self {
        self.section_id = section_id;
        self
    }

    #[must_use]
    pub fn for_parent(mut self, parent_id: ParentId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }
}

/// Runs reorders against a store, authorizing through `G`.
#[derive(Debug, Clone, Default)]
pub struct Reorderer<G> {
    gate: G,
    options: ReorderOptions,
}

impl<G: AccessGate> Reorderer<G> {
    #[must_use]
    pub fn new(gate: G) -> Self {
        Self {
            gate,
            options: ReorderOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: ReorderOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub const fn options(&self) -> ReorderOptions {
        self.options
    }

    /// Apply `request` and return the group's full id list in its new order.
    ///
    /// # Errors
    ///
    /// Returns a validation error ([`ReorderError::NotFound`],
    /// [`ReorderError::MultipleParents`], [`ReorderError::SectionMismatch`]),
    /// [`ReorderError::Unauthorized`], or [`ReorderError::Store`]. In every
    /// case no position has changed.
    ///
    /// Validation runs after the write lock is taken. While another
    /// connection holds that lock, every request fails with a busy
    /// [`ReorderError::Store`] first, even one that would later be rejected
    /// as `NotFound` or `MultipleParents`. A retry after a busy error can
    /// still return a validation error.
    pub fn reorder(
        &self,
        conn: &mut Connection,
        request: &ReorderRequest,
        actor: ActorId,
    ) -> Result<Vec<ItemId>, ReorderError> {
        let kind = request.kind;
        let section = request.section_id;
        self.reorder_then(conn, request, actor, |tx, parent| {
            Ok(project::ordered_ids(tx, kind, GroupKey::new(parent.id, section))?)
        })
    }

    /// Apply `request`, then hand the resolved parent to `then` instead of
    /// listing the group. `then` runs inside the same transaction, so any
    /// writes it makes commit or roll back together with the reorder.
    ///
    /// # Errors
    ///
    /// As [`Reorderer::reorder`], plus any error returned by `then`.
    pub fn reorder_then<T, F>(
        &self,
        conn: &mut Connection,
        request: &ReorderRequest,
        actor: ActorId,
        then: F,
    ) -> Result<T, ReorderError>
    where
        F: FnOnce(&Connection, ParentRef) -> Result<T, ReorderError>,
    {
        let kind = request.kind;
        let ids = reconcile::dedup_ids(&request.ordered_ids);

        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let membership = validate::validate_membership(
            &tx,
            kind,
            &ids,
            request.section_id,
            request.parent_id,
        )
        .inspect_err(|err| {
            warn!(kind = %kind, requested = ids.len(), code = %err.code(), "reorder rejected");
        })?;

        if !self.gate.authorized(&tx, membership.parent, actor)? {
            warn!(kind = %kind, parent = %membership.parent, actor = %actor, "reorder forbidden");
            return Err(ReorderError::Unauthorized {
                parent: membership.parent.kind,
            });
        }

        let stats = reconcile::reconcile_group(
            &tx,
            kind,
            membership.key,
            &membership.items,
            self.options,
        )?;
        let out = then(&tx, membership.parent)?;
        tx.commit()?;

        info!(
            kind = %kind,
            group = %membership.key,
            actor = %actor,
            planned = stats.planned,
            written = stats.written,
            skipped = stats.skipped,
            "reorder committed"
        );
        Ok(out)
    }
}
