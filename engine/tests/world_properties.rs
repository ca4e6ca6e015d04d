//! End-to-end behavior of a world: lifecycle, joins, archetypes and concurrency.

use std::{sync::Arc, thread};

use rusty_ecs::ecs::{
    Attributes, Blueprint, Collected, Component, Error, Result, Schedule, Selector, System, World,
    WorldId,
};

#[derive(Component, Clone, Default, Debug, PartialEq)]
struct Position {
    x: f64,
    y: f64,
    z: f64,
}

#[derive(Component, Clone, Default, Debug, PartialEq)]
struct Velocity {
    x: f64,
    y: f64,
    z: f64,
}

#[derive(Component, Clone, Default, Debug, PartialEq)]
struct Name(String);

fn world() -> World {
    let _ = env_logger::builder().is_test(true).try_init();
    World::new(WorldId::new(1))
}

struct Motion;

impl System for Motion {
    type Managed = (Position, Velocity);

    fn process(&mut self, collected: &Collected) -> Result<()> {
        for row in collected.rows() {
            let velocity = row.get::<Velocity>().unwrap().clone();
            let mut position = row.get_mut::<Position>().unwrap();
            position.x += velocity.x;
            position.y += velocity.y;
            position.z += velocity.z;
        }
        Ok(())
    }
}

#[test]
fn motion_system_moves_position_once_per_cycle() {
    // Given
    let world = world();
    let entity = world
        .spawn((
            Position::default(),
            Velocity {
                x: 1.0,
                y: 0.0,
                z: 0.0,
            },
        ))
        .unwrap();
    let mut schedule = Schedule::new();
    schedule.add_system(Motion, &world);

    // When
    schedule.run(&world).unwrap();

    // Then
    assert_eq!(
        world.get::<Position>(entity).unwrap().value::<Position>(),
        Some(Position {
            x: 1.0,
            y: 0.0,
            z: 0.0
        })
    );
}

#[test]
fn processing_sees_only_entities_with_every_managed_type() {
    // Given - Entity 1 has only Position, entity 2 has both
    let world = world();
    let partial = world.spawn(Position::default()).unwrap();
    let complete = world
        .spawn((Position::default(), Velocity::default()))
        .unwrap();
    let seen = Arc::new(recorder::Seen::default());
    let mut schedule = Schedule::new();
    {
        let seen = Arc::clone(&seen);
        schedule.add_system(
            rusty_ecs::ecs::system::from_fn::<(Position, Velocity), _>("observer", move |c| {
                seen.record(c.entities());
                Ok(())
            }),
            &world,
        );
    }

    // When
    schedule.run(&world).unwrap();

    // Then
    let entities = seen.take();
    assert!(entities.contains(&complete));
    assert!(!entities.contains(&partial));
}

#[test]
fn destroy_leaves_no_residue_in_the_store() {
    // Given
    let world = world();
    let entity = world
        .spawn((Position::default(), Velocity::default(), Name("a".into())))
        .unwrap();

    // When
    world.destroy(entity);

    // Then
    assert!(!world.store().holds(entity));
    assert!(!world.contains(entity));
}

#[test]
fn attach_then_detach_round_trips_the_component_set() {
    // Given
    let world = world();
    let entity = world.spawn(Position::default()).unwrap();
    let before = world.spec_of(entity).unwrap();

    // When
    world.attach(entity, Velocity::default()).unwrap();
    world.detach(entity, Selector::of::<Velocity>()).unwrap();

    // Then
    assert_eq!(world.spec_of(entity).unwrap(), before);
    let velocity = world.components().get::<Velocity>().unwrap();
    assert!(!world.store().contains(velocity, entity));
}

#[test]
fn blueprint_instances_are_independent() {
    // Given
    let world = world();
    let blueprint = Blueprint::builder()
        .component::<Position>()
        .component::<Velocity>()
        .build();
    let first = world
        .instantiate(&blueprint, None, Attributes::new())
        .unwrap();
    let second = world
        .instantiate(&blueprint, None, Attributes::new())
        .unwrap();

    // When - Detach Velocity from the first and mutate its Position
    world.detach(first, Selector::of::<Velocity>()).unwrap();
    world
        .get::<Position>(first)
        .unwrap()
        .set(Position {
            x: 9.0,
            y: 9.0,
            z: 9.0,
        })
        .unwrap();

    // Then
    assert_ne!(first, second);
    assert!(world.get::<Velocity>(second).is_some());
    assert_eq!(
        world.get::<Position>(second).unwrap().value::<Position>(),
        Some(Position::default())
    );
}

#[test]
fn concurrent_attaches_lose_no_updates() {
    // Given
    let world = Arc::new(world());
    let positions: Vec<_> = (0..200).map(|_| world.spawn(()).unwrap()).collect();
    let velocities: Vec<_> = (0..200).map(|_| world.spawn(()).unwrap()).collect();

    // When - Two threads attach two different types to two different entity sets
    let a = {
        let world = Arc::clone(&world);
        thread::spawn(move || {
            for entity in positions {
                world.attach(entity, Position::default()).unwrap();
            }
        })
    };
    let b = {
        let world = Arc::clone(&world);
        thread::spawn(move || {
            for entity in velocities {
                world.attach(entity, Velocity::default()).unwrap();
            }
        })
    };
    a.join().unwrap();
    b.join().unwrap();

    // Then
    let position = world.components().get::<Position>().unwrap();
    let velocity = world.components().get::<Velocity>().unwrap();
    assert_eq!(world.store().len(position), 200);
    assert_eq!(world.store().len(velocity), 200);
}

#[test]
fn collectors_never_see_half_created_entities() {
    // Given
    let world = Arc::new(world());
    world.register_component::<Position>();
    world.register_component::<Velocity>();

    // When - One thread creates and destroys two-component entities while another collects
    let writer = {
        let world = Arc::clone(&world);
        thread::spawn(move || {
            for _ in 0..500 {
                let entity = world
                    .spawn((Position::default(), Velocity::default()))
                    .unwrap();
                world.destroy(entity);
            }
        })
    };

    // Then - Every collected row has both instances
    while !writer.is_finished() {
        let collected = world.collect::<(Position, Velocity)>();
        assert!(collected.len() <= 1);
        assert_eq!(collected.column::<Position>().unwrap().len(), collected.len());
        assert_eq!(collected.column::<Velocity>().unwrap().len(), collected.len());
    }
    writer.join().unwrap();
}

#[test]
fn contract_violations_surface_as_errors() {
    // Given
    let world = world();
    let entity = world.spawn(()).unwrap();

    // Then
    assert!(matches!(
        world.attach(entity, rusty_ecs::ecs::component::Value::erased(1u8)),
        Err(Error::InvalidComponent { .. })
    ));
    assert!(matches!(
        world.detach(entity, "Unheard"),
        Err(Error::UnknownComponentSelector { .. })
    ));
    let missing = rusty_ecs::ecs::entity::Id::new(7_000);
    let err = world.attach(missing, Position::default()).unwrap_err();
    assert_eq!(err.to_string(), "entity #7000 is not registered in this world");
}

/// A tiny recorder shared between a system closure and the test body.
mod recorder {
    use std::sync::Mutex;

    use rusty_ecs::ecs::entity;

    #[derive(Default)]
    pub struct Seen(Mutex<Vec<entity::Id>>);

    impl Seen {
        pub fn record(&self, entities: &[entity::Id]) {
            self.0.lock().unwrap().extend_from_slice(entities);
        }

        pub fn take(&self) -> Vec<entity::Id> {
            std::mem::take(&mut *self.0.lock().unwrap())
        }
    }
}
