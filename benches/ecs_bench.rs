#![allow(dead_code)]
//! Benchmarks for core ECS operations: spawn, archetype transition, destroy,
//! and typed query iteration.
//!
//! Run with: cargo bench

use archetype_ecs::World;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

#[derive(Debug, Copy, Clone)]
struct Position {
    x: f32,
    y: f32,
    z: f32,
}

#[derive(Debug, Copy, Clone)]
struct Velocity {
    x: f32,
    y: f32,
    z: f32,
}

#[derive(Debug, Copy, Clone)]
struct Health(u32);

fn bench_spawn(c: &mut Criterion) {
    let mut group = c.benchmark_group("spawn");

    group.bench_function("spawn_1k_single_component", |b| {
        b.iter(|| {
            let mut world = World::new();
            for i in 0..1_000 {
                let _ = world.create_with((Position {
                    x: i as f32,
                    y: 0.0,
                    z: 0.0,
                },));
            }
            black_box(&world);
        });
    });

    group.bench_function("spawn_1k_three_components", |b| {
        b.iter(|| {
            let mut world = World::new();
            for i in 0..1_000 {
                let _ = world.create_with((
                    Position {
                        x: i as f32,
                        y: 0.0,
                        z: 0.0,
                    },
                    Velocity {
                        x: 1.0,
                        y: 0.0,
                        z: 0.0,
                    },
                    Health(100),
                ));
            }
            black_box(&world);
        });
    });

    group.finish();
}

fn bench_archetype_transition(c: &mut Criterion) {
    c.bench_function("add_component_1k_transitions", |b| {
        b.iter_batched(
            || {
                let mut world = World::new();
                let entities: Vec<_> = (0..1_000)
                    .map(|i| {
                        world
                            .create_with((Position {
                                x: i as f32,
                                y: 0.0,
                                z: 0.0,
                            },))
                            .unwrap()
                    })
                    .collect();
                (world, entities)
            },
            |(mut world, entities)| {
                for e in entities {
                    world
                        .add_component(
                            e,
                            Velocity {
                                x: 1.0,
                                y: 0.0,
                                z: 0.0,
                            },
                        )
                        .unwrap();
                }
                black_box(&world);
            },
            criterion::BatchSize::SmallInput,
        );
    });
}

fn bench_destroy(c: &mut Criterion) {
    c.bench_function("destroy_1k_entities", |b| {
        b.iter_batched(
            || {
                let mut world = World::new();
                let entities: Vec<_> = (0..1_000)
                    .map(|i| {
                        world
                            .create_with((Position {
                                x: i as f32,
                                y: 0.0,
                                z: 0.0,
                            },))
                            .unwrap()
                    })
                    .collect();
                (world, entities)
            },
            |(mut world, entities)| {
                for e in entities {
                    world.destroy(e, false).unwrap();
                }
                black_box(&world);
            },
            criterion::BatchSize::SmallInput,
        );
    });
}

fn bench_query(c: &mut Criterion) {
    let mut world = World::new();
    for i in 0..10_000 {
        let _ = world.create_with((
            Position {
                x: i as f32,
                y: 0.0,
                z: 0.0,
            },
            Velocity {
                x: 1.0,
                y: 0.0,
                z: 0.0,
            },
        ));
    }

    c.bench_function("query_10k_position_velocity", |b| {
        b.iter(|| {
            for (_, (pos, vel)) in world.query::<(Position, Velocity)>() {
                pos.x += vel.x;
                pos.y += vel.y;
                pos.z += vel.z;
            }
        });
    });
}

criterion_group!(
    benches,
    bench_spawn,
    bench_archetype_transition,
    bench_destroy,
    bench_query
);
criterion_main!(benches);
