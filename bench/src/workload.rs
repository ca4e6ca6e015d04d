//! Seeded worlds and workloads.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rusty_ecs::ecs::{Selector, World, WorldId, entity};

use crate::components::{Health, Position, Rotation, Velocity};

/// Seed used by every workload so runs are comparable.
pub const SEED: u64 = 0x5EED;

/// Build a world of `count` entities where roughly `moving` (0.0..=1.0) of them also carry a
/// velocity. Every entity has a position; a third carry rotation.
pub fn mixed_world(count: usize, moving: f64) -> (World, Vec<entity::Id>) {
    let world = World::new(WorldId::new(0));
    let mut rng = ChaCha8Rng::seed_from_u64(SEED);
    let mut entities = Vec::with_capacity(count);

    for i in 0..count {
        let position = Position {
            x: rng.gen_range(-100.0..100.0),
            y: rng.gen_range(-100.0..100.0),
            z: 0.0,
        };
        let entity = world
            .spawn(position)
            .expect("position is a component");
        if rng.gen_bool(moving) {
            world
                .attach(
                    entity,
                    Velocity {
                        x: rng.gen_range(-1.0..1.0),
                        y: rng.gen_range(-1.0..1.0),
                        z: 0.0,
                    },
                )
                .expect("entity exists");
        }
        if i % 3 == 0 {
            world
                .attach(entity, Rotation::default())
                .expect("entity exists");
        }
        entities.push(entity);
    }

    (world, entities)
}

/// Randomly attach and detach health on the given entities `steps` times.
pub fn churn(world: &World, entities: &[entity::Id], steps: usize, rng: &mut ChaCha8Rng) {
    for _ in 0..steps {
        let entity = entities[rng.gen_range(0..entities.len())];
        if rng.gen_bool(0.5) {
            world
                .attach(entity, Health::default())
                .expect("entity exists");
        } else {
            world
                .detach(entity, Selector::of::<Health>())
                .expect("health is registered");
        }
    }
}

/// A fresh seeded generator.
pub fn rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(SEED)
}
