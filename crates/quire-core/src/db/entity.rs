//! Minimal create helpers for the forum records the ordering core touches.
//!
//! Ordered records are appended one past the highest position in their
//! group. Wrap calls in a transaction when other writers may append to the
//! same group concurrently.

use crate::model::{ActorId, GroupKey, ItemId, ItemKind, ParentId, Role, SectionId, SectionKind};
use anyhow::{Context, Result, bail};
use rusqlite::{Connection, params};

use super::query;

fn now_us() -> i64 {
    chrono::Utc::now().timestamp_micros()
}

/// Fields for a new post.
#[derive(Debug, Clone)]
pub struct NewPost<'a> {
    pub board_id: ParentId,
    pub section_id: Option<SectionId>,
    pub user_id: ActorId,
    pub subject: &'a str,
}

/// Insert a user.
///
/// # Errors
///
/// Returns an error if the username is taken or the insert fails.
pub fn create_user(conn: &Connection, username: &str, role: Role) -> Result<ActorId> {
    conn.execute(
        "INSERT INTO users (username, role, created_at_us) VALUES (?1, ?2, ?3)",
        params![username, role.to_string(), now_us()],
    )
    .with_context(|| format!("insert user '{username}'"))?;
    Ok(ActorId(conn.last_insert_rowid()))
}

/// Insert a board (continuity) created by `creator`.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn create_board(conn: &Connection, name: &str, creator: ActorId) -> Result<ParentId> {
    conn.execute(
        "INSERT INTO boards (name, creator_id, created_at_us) VALUES (?1, ?2, ?3)",
        params![name, creator, now_us()],
    )
    .with_context(|| format!("insert board '{name}'"))?;
    Ok(ParentId(conn.last_insert_rowid()))
}

/// Add (or update) a co-author on a board.
///
/// # Errors
///
/// Returns an error if the upsert fails.
pub fn add_board_author(
    conn: &Connection,
    board: ParentId,
    user: ActorId,
    cameo: bool,
) -> Result<()> {
    conn.execute(
        "INSERT INTO board_authors (board_id, user_id, cameo) VALUES (?1, ?2, ?3)
         ON CONFLICT (board_id, user_id) DO UPDATE SET cameo = excluded.cameo",
        params![board, user, cameo],
    )
    .with_context(|| format!("add author {user} to board {board}"))?;
    Ok(())
}

fn insert_ordered(
    conn: &Connection,
    kind: ItemKind,
    key: GroupKey,
    sql: &str,
    values: &[&dyn rusqlite::ToSql],
) -> Result<ItemId> {
    let position = query::next_position(conn, kind, key)
        .with_context(|| format!("compute next {} position in {key}", kind.noun()))?;
    let mut bound: Vec<&dyn rusqlite::ToSql> = values.to_vec();
    bound.push(&position);
    conn.execute(sql, bound.as_slice())
        .with_context(|| format!("insert {} into {key}", kind.noun()))?;
    Ok(ItemId(conn.last_insert_rowid()))
}

/// Insert a board section (subcontinuity) at the end of the board's sections.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn create_section(conn: &Connection, board: ParentId, name: &str) -> Result<SectionId> {
    let now = now_us();
    let id = insert_ordered(
        conn,
        ItemKind::BoardSection,
        GroupKey::unsectioned(board),
        "INSERT INTO board_sections (board_id, name, created_at_us, section_order)
         VALUES (?1, ?2, ?3, ?4)",
        &[&board, &name, &now],
    )?;
    Ok(SectionId(id.get()))
}

/// Insert a post at the end of its `(board, section)` group.
///
/// # Errors
///
/// Returns an error if the section belongs to another board or the insert fails.
pub fn create_post(conn: &Connection, post: &NewPost<'_>) -> Result<ItemId> {
    if let Some(section) = post.section_id {
        let owner = query::section_parent(conn, SectionKind::BoardSection, section)
            .context("look up post section")?;
        if owner != Some(post.board_id) {
            bail!(
                "section {section} does not belong to continuity {}",
                post.board_id
            );
        }
    }

    let now = now_us();
    insert_ordered(
        conn,
        ItemKind::Post,
        GroupKey::new(post.board_id, post.section_id),
        "INSERT INTO posts (board_id, section_id, user_id, subject, created_at_us, section_order)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        &[&post.board_id, &post.section_id, &post.user_id, &post.subject, &now],
    )
}

/// Insert a character owned by `owner`.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn create_character(conn: &Connection, owner: ActorId, name: &str) -> Result<ParentId> {
    conn.execute(
        "INSERT INTO characters (user_id, name, created_at_us) VALUES (?1, ?2, ?3)",
        params![owner, name, now_us()],
    )
    .with_context(|| format!("insert character '{name}'"))?;
    Ok(ParentId(conn.last_insert_rowid()))
}

/// Insert a gallery owned by `owner`. Returns the gallery row id.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn create_gallery(conn: &Connection, owner: ActorId, name: &str) -> Result<i64> {
    conn.execute(
        "INSERT INTO galleries (user_id, name, created_at_us) VALUES (?1, ?2, ?3)",
        params![owner, name, now_us()],
    )
    .with_context(|| format!("insert gallery '{name}'"))?;
    Ok(conn.last_insert_rowid())
}

/// Attach a gallery to a character at the end of the character's galleries.
///
/// # Errors
///
/// Returns an error if the gallery is already attached or the insert fails.
pub fn link_gallery(conn: &Connection, character: ParentId, gallery: i64) -> Result<ItemId> {
    insert_ordered(
        conn,
        ItemKind::CharacterGallery,
        GroupKey::unsectioned(character),
        "INSERT INTO characters_galleries (character_id, gallery_id, section_order)
         VALUES (?1, ?2, ?3)",
        &[&character, &gallery],
    )
}
