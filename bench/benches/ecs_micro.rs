//! ECS microbenchmarks using Criterion.
//!
//! These benchmarks measure individual ECS operations in isolation:
//! - Entity create/destroy
//! - Attach/detach churn
//! - Collect (the cross-table join) and a full schedule cycle
//! - Blueprint instantiation

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rusty_ecs::ecs::{
    Attributes, Blueprint, Collected, Result, Schedule, System, World, WorldId,
};
use rusty_ecs_bench::{components::*, workload};

// =============================================================================
// Create Benchmarks
// =============================================================================

fn bench_create(c: &mut Criterion) {
    let mut group = c.benchmark_group("create");

    for count in [100, 1_000, 10_000] {
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("single_component", count), &count, |b, &n| {
            b.iter(|| {
                let world = World::new(WorldId::new(0));
                for _ in 0..n {
                    black_box(world.spawn(Position::default()).unwrap());
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("three_components", count), &count, |b, &n| {
            b.iter(|| {
                let world = World::new(WorldId::new(0));
                for _ in 0..n {
                    black_box(
                        world
                            .spawn((Position::default(), Velocity::default(), Rotation::default()))
                            .unwrap(),
                    );
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("create_destroy", count), &count, |b, &n| {
            b.iter(|| {
                let world = World::new(WorldId::new(0));
                let entities: Vec<_> = (0..n)
                    .map(|_| world.spawn((Position::default(), Velocity::default())).unwrap())
                    .collect();
                for entity in entities {
                    black_box(world.destroy(entity));
                }
            });
        });
    }

    group.finish();
}

// =============================================================================
// Churn Benchmarks
// =============================================================================

fn bench_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("churn");
    let (world, entities) = workload::mixed_world(1_000, 0.5);

    for steps in [100, 1_000] {
        group.throughput(Throughput::Elements(steps as u64));
        group.bench_with_input(BenchmarkId::new("attach_detach", steps), &steps, |b, &n| {
            let mut rng = workload::rng();
            b.iter(|| workload::churn(&world, &entities, n, &mut rng));
        });
    }

    group.finish();
}

// =============================================================================
// Collect Benchmarks
// =============================================================================

struct Motion;

impl System for Motion {
    type Managed = (Position, Velocity);

    fn process(&mut self, collected: &Collected) -> Result<()> {
        for row in collected.rows() {
            let velocity = *row.get::<Velocity>().unwrap();
            let mut position = row.get_mut::<Position>().unwrap();
            position.x += velocity.x;
            position.y += velocity.y;
            position.z += velocity.z;
        }
        Ok(())
    }
}

fn bench_collect(c: &mut Criterion) {
    let mut group = c.benchmark_group("collect");

    for count in [1_000, 10_000] {
        for moving in [0.1, 0.9] {
            let (world, _) = workload::mixed_world(count, moving);
            let label = format!("{}_moving_{}", count, (moving * 100.0) as u32);
            group.throughput(Throughput::Elements(count as u64));

            group.bench_function(BenchmarkId::new("join_two", &label), |b| {
                b.iter(|| black_box(world.collect::<(Position, Velocity)>().len()));
            });

            group.bench_function(BenchmarkId::new("join_three", &label), |b| {
                b.iter(|| black_box(world.collect::<(Position, Velocity, Rotation)>().len()));
            });

            let mut schedule = Schedule::new();
            schedule.add_system(Motion, &world);
            group.bench_function(BenchmarkId::new("motion_cycle", &label), |b| {
                b.iter(|| schedule.run(&world).unwrap());
            });
        }
    }

    group.finish();
}

// =============================================================================
// Instantiate Benchmarks
// =============================================================================

fn bench_instantiate(c: &mut Criterion) {
    let mut group = c.benchmark_group("instantiate");
    let blueprint = Blueprint::builder()
        .component::<Position>()
        .component::<Velocity>()
        .instance(Health { current: 50, max: 80 })
        .instance(Inventory {
            items: (0..32).collect(),
        })
        .build();

    for count in [100, 1_000] {
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("generic", count), &count, |b, &n| {
            b.iter(|| {
                let world = World::new(WorldId::new(0));
                for _ in 0..n {
                    black_box(world.instantiate(&blueprint, None, Attributes::new()).unwrap());
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("named", count), &count, |b, &n| {
            b.iter(|| {
                let world = World::new(WorldId::new(0));
                for _ in 0..n {
                    black_box(
                        world
                            .instantiate(&blueprint, Some("Trader"), Attributes::new())
                            .unwrap(),
                    );
                }
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_create,
    bench_churn,
    bench_collect,
    bench_instantiate
);
criterion_main!(benches);
