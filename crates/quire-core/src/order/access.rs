//! Authorization seam between validation and the first write.

use crate::db::query;
use crate::model::{ActorId, ParentKind, ParentRef, Role};
use rusqlite::Connection;

/// Decides whether an actor may modify a parent's ordered groups.
///
/// The gate runs inside the reorder transaction, so it sees the same
/// snapshot the writes will be applied to.
pub trait AccessGate {
    /// # Errors
    ///
    /// Returns an error if a lookup the decision depends on fails.
    fn authorized(
        &self,
        conn: &Connection,
        parent: ParentRef,
        actor: ActorId,
    ) -> rusqlite::Result<bool>;
}

impl<F> AccessGate for F
where
    F: Fn(ParentRef, ActorId) -> bool,
{
    fn authorized(
        &self,
        _conn: &Connection,
        parent: ParentRef,
        actor: ActorId,
    ) -> rusqlite::Result<bool> {
        Ok(self(parent, actor))
    }
}

/// Store-backed forum permissions.
///
/// - admins edit everything; readers edit nothing
/// - a continuity is editable by its creator and its non-cameo co-authors
/// - a character is editable by its owner and by moderators
#[derive(Debug, Clone, Copy, Default)]
pub struct EditorGate;

impl AccessGate for EditorGate {
    fn authorized(
        &self,
        conn: &Connection,
        parent: ParentRef,
        actor: ActorId,
    ) -> rusqlite::Result<bool> {
        let Some(role) = query::user_role(conn, actor)? else {
            return Ok(false);
        };
        if role == Role::Reader {
            return Ok(false);
        }

        match parent.kind {
            ParentKind::Board => {
                if role.edits_any_continuity() {
                    return Ok(true);
                }
                if query::board_creator(conn, parent.id)? == Some(actor) {
                    return Ok(true);
                }
                query::is_board_writer(conn, parent.id, actor)
            }
            ParentKind::Character => {
                if role.edits_any_character() {
                    return Ok(true);
                }
                Ok(query::character_owner(conn, parent.id)? == Some(actor))
            }
        }
    }
}
