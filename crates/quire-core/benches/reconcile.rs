use criterion::{BatchSize, BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use quire_core::db::{self, entity};
use quire_core::model::{ActorId, ItemId, ItemKind, OrderedItem, ParentId, Role};
use quire_core::order::reconcile::{plan_positions, remainder};
use quire_core::order::{EditorGate, Reorderer, ReorderRequest};
use rusqlite::Connection;

const GROUP_SIZES: [usize; 3] = [16, 256, 2_048];

fn members(size: usize) -> Vec<OrderedItem> {
    (0..size)
        .map(|n| {
            let id = i64::try_from(n).unwrap_or(i64::MAX);
            OrderedItem {
                id: ItemId(id + 1),
                parent_id: ParentId(1),
                section_id: None,
                position: Some(id),
            }
        })
        .collect()
}

fn seeded_board(size: usize) -> (Connection, ActorId, Vec<ItemId>) {
    let conn = db::open_in_memory().expect("open store");
    let owner = entity::create_user(&conn, "bench", Role::Regular).expect("owner");
    let board = entity::create_board(&conn, "Bench", owner).expect("board");
    let posts = (0..size)
        .map(|_| {
            entity::create_post(
                &conn,
                &entity::NewPost {
                    board_id: board,
                    section_id: None,
                    user_id: owner,
                    subject: "bench",
                },
            )
            .expect("post")
        })
        .collect();
    (conn, owner, posts)
}

fn bench_plan(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile.plan");

    for size in GROUP_SIZES {
        let all = members(size);
        // Move the back quarter to the front.
        let requested: Vec<OrderedItem> = all[size - size / 4..].to_vec();
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::from_parameter(size), &all, |b, all| {
            b.iter(|| {
                let rest = remainder(all.clone(), &requested);
                black_box(plan_positions(&requested, &rest))
            });
        });
    }

    group.finish();
}

fn bench_reorder(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile.reorder");
    group.sample_size(20);

    for size in GROUP_SIZES {
        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(BenchmarkId::new("reverse", size), |b| {
            b.iter_batched(
                || seeded_board(size),
                |(mut conn, owner, posts)| {
                    let request =
                        ReorderRequest::new(ItemKind::Post, posts.into_iter().rev().collect());
                    black_box(
                        Reorderer::new(EditorGate)
                            .reorder(&mut conn, &request, owner)
                            .expect("reorder"),
                    )
                },
                BatchSize::LargeInput,
            );
        });

        group.bench_function(BenchmarkId::new("promote_one", size), |b| {
            b.iter_batched(
                || seeded_board(size),
                |(mut conn, owner, posts)| {
                    let last = posts.last().copied().into_iter().collect();
                    let request = ReorderRequest::new(ItemKind::Post, last);
                    black_box(
                        Reorderer::new(EditorGate)
                            .reorder(&mut conn, &request, owner)
                            .expect("reorder"),
                    )
                },
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_plan, bench_reorder);
criterion_main!(benches);
