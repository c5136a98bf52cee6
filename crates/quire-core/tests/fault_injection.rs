//! Fault-injection tests for the reorder transaction.
//!
//! A trigger aborts the N-th position write; every earlier write in the same
//! reorder must be rolled back with it. A second connection holding the write
//! lock checks that a busy store fails cleanly instead of half-applying.


use std::time::Duration;

use fixtures::{Forum, numbered, pick};
use quire_core::db::{self, entity, query};
use quire_core::model::{GroupKey, ItemId, ItemKind, Role};
use quire_core::order::{EditorGate, ReorderError, ReorderOptions, Reorderer, ReorderRequest};
use rusqlite::Connection;

/// Abort the position write after `budget` successful ones.
fn arm_write_budget(conn: &Connection, budget: i64) {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS write_budget (remaining INTEGER NOT NULL);
         DELETE FROM write_budget;
         CREATE TRIGGER IF NOT EXISTS posts_write_budget
         BEFORE UPDATE OF section_order ON posts
         BEGIN
             SELECT RAISE(ABORT, 'injected write failure')
             WHERE (SELECT remaining FROM write_budget) <= 0;
             UPDATE write_budget SET remaining = remaining - 1;
         END;",
    )
    .expect("install trigger");
    conn.execute("INSERT INTO write_budget (remaining) VALUES (?1)", [budget])
        .expect("set budget");
}

fn remaining_budget(conn: &Connection) -> i64 {
    conn.query_row("SELECT remaining FROM write_budget", [], |row| row.get(0))
        .expect("read budget")
}

#[test]
fn failure_on_any_write_rolls_back_all_earlier_writes() {
    // Reversing six posts writes every row, so failures at writes 1..=6 are
    // all reachable.
    for budget in 0..6 {
        let mut forum = Forum::new();
        let posts = forum.posts(forum.board, None, 6);
        arm_write_budget(&forum.conn, budget);

        let request = ReorderRequest::new(ItemKind::Post, pick(&posts, &[5, 4, 3, 2, 1, 0]));
        let err = Reorderer::new(EditorGate)
            .reorder(&mut forum.conn, &request, forum.owner)
            .expect_err("injected failure");

        assert!(matches!(err, ReorderError::Store(_)), "budget {budget}: {err}");
        assert!(err.is_transient());
        assert!(err.to_string().contains("injected write failure"));
        assert_eq!(
            forum.positions(ItemKind::Post, GroupKey::unsectioned(forum.board)),
            numbered(&posts),
            "budget {budget} left a partial renumbering"
        );
        assert_eq!(remaining_budget(&forum.conn), budget, "trigger side effects roll back too");
    }
}

#[test]
fn skipped_writes_do_not_consume_the_budget() {
    let mut forum = Forum::new();
    let posts = forum.posts(forum.board, None, 4);
    // [C, A] rewrites A, B and C; D already sits at 3.
    arm_write_budget(&forum.conn, 3);

    let request = ReorderRequest::new(ItemKind::Post, pick(&posts, &[2, 0]));
    let order = Reorderer::new(EditorGate)
        .reorder(&mut forum.conn, &request, forum.owner)
        .expect("three writes fit the budget");
    assert_eq!(order, pick(&posts, &[2, 0, 1, 3]));
    assert_eq!(remaining_budget(&forum.conn), 0);
}

#[test]
fn writing_every_row_exhausts_the_same_budget() {
    let mut forum = Forum::new();
    let posts = forum.posts(forum.board, None, 4);
    arm_write_budget(&forum.conn, 3);

    let request = ReorderRequest::new(ItemKind::Post, pick(&posts, &[2, 0]));
    let err = Reorderer::new(EditorGate)
        .with_options(ReorderOptions {
            skip_unchanged_writes: false,
        })
        .reorder(&mut forum.conn, &request, forum.owner)
        .expect_err("fourth write aborts");
    assert!(err.is_transient());
    assert_eq!(
        forum.positions(ItemKind::Post, GroupKey::unsectioned(forum.board)),
        numbered(&posts)
    );
}

#[test]
fn refusal_happens_before_any_write() {
    let mut forum = Forum::new();
    let posts = forum.posts(forum.board, None, 3);
    let stranger = forum.user("stranger", Role::Regular);
    arm_write_budget(&forum.conn, 0);

    let request = ReorderRequest::new(ItemKind::Post, pick(&posts, &[2]));
    let err = Reorderer::new(EditorGate)
        .reorder(&mut forum.conn, &request, stranger)
        .expect_err("stranger refused");
    assert!(matches!(err, ReorderError::Unauthorized { .. }));
}

#[test]
fn busy_store_fails_without_partial_writes() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("quire.sqlite3");

    let mut writer = db::open_store(&path, Duration::from_millis(50)).expect("open writer");
    let owner = entity::create_user(&writer, "marri", Role::Regular).expect("owner");
    let board = entity::create_board(&writer, "Sandboxes", owner).expect("board");
    let posts: Vec<_> = (0..3)
        .map(|n| {
            entity::create_post(
                &writer,
                &entity::NewPost {
                    board_id: board,
                    section_id: None,
                    user_id: owner,
                    subject: &format!("post {n}"),
                },
            )
            .expect("post")
        })
        .collect();

    let holder = db::open_store(&path, Duration::from_millis(50)).expect("open holder");
    holder.execute_batch("BEGIN IMMEDIATE").expect("take write lock");

    let request = ReorderRequest::new(ItemKind::Post, pick(&posts, &[2]));
    let err = Reorderer::new(EditorGate)
        .reorder(&mut writer, &request, owner)
        .expect_err("lock held elsewhere");
    assert!(err.is_transient(), "{err}");

    holder.execute_batch("ROLLBACK").expect("release write lock");
    let members = query::group_ids(&writer, ItemKind::Post, GroupKey::unsectioned(board))
        .expect("read back");
    assert_eq!(members, posts);

    let order = Reorderer::new(EditorGate)
        .reorder(&mut writer, &request, owner)
        .expect("retry succeeds once the lock is free");
    assert_eq!(order, pick(&posts, &[2, 0, 1]));
}

#[test]
fn busy_store_reports_busy_before_validating_unknown_ids() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("quire.sqlite3");

    let mut writer = db::open_store(&path, Duration::from_millis(50)).expect("open writer");
    let owner = entity::create_user(&writer, "marri", Role::Regular).expect("owner");

    let holder = db::open_store(&path, Duration::from_millis(50)).expect("open holder");
    holder.execute_batch("BEGIN IMMEDIATE").expect("take write lock");

    let request = ReorderRequest::new(ItemKind::Post, vec![ItemId(404)]);
    let err = Reorderer::new(EditorGate)
        .reorder(&mut writer, &request, owner)
        .expect_err("lock held elsewhere");
    assert!(matches!(err, ReorderError::Store(_)), "{err}");
    assert!(err.is_transient());

    holder.execute_batch("ROLLBACK").expect("release write lock");
    let err = Reorderer::new(EditorGate)
        .reorder(&mut writer, &request, owner)
        .expect_err("unknown id");
    assert!(matches!(err, ReorderError::NotFound { .. }), "{err}");
    assert!(!err.is_transient());
}
