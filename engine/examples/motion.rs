use std::{sync::Arc, thread, time::Duration};

use log::info;
use rusty_ecs::{
    Config,
    ecs::{
        Attribute, Attributes, Blueprint, Collected, Component, Result, Schedule, System, World,
        WorldId,
    },
};

#[derive(Component, Clone, Default, Debug)]
struct Position {
    x: f64,
    y: f64,
}

#[derive(Component, Clone, Default, Debug)]
struct Velocity {
    x: f64,
    y: f64,
}

#[derive(Component, Clone, Default, Debug)]
struct Fuel(u32);

struct Motion;

impl System for Motion {
    type Managed = (Position, Velocity);

    fn name(&self) -> &str {
        "motion"
    }

    fn process(&mut self, collected: &Collected) -> Result<()> {
        for row in collected.rows() {
            let Some(velocity) = row.get::<Velocity>().map(|v| v.clone()) else {
                continue;
            };
            if let Some(mut position) = row.get_mut::<Position>() {
                position.x += velocity.x;
                position.y += velocity.y;
            }
        }
        Ok(())
    }
}

/// Burns one unit of fuel per cycle and parks the ship when it runs dry.
struct Engine;

impl System for Engine {
    type Managed = (Fuel, Velocity);

    fn name(&self) -> &str {
        "engine"
    }

    fn process(&mut self, collected: &Collected) -> Result<()> {
        for row in collected.rows() {
            let Some(mut fuel) = row.get_mut::<Fuel>() else {
                continue;
            };
            if fuel.0 == 0 {
                if let Some(mut velocity) = row.get_mut::<Velocity>() {
                    *velocity = Velocity::default();
                }
            } else {
                fuel.0 -= 1;
            }
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    let config = Config::from_toml(
        "cycle_interval_ms = 5\narchetype_cache_capacity = 8\nlog_level = \"debug\"\n",
    )?;
    env_logger::Builder::new()
        .filter_level(config.log_level)
        .parse_default_env()
        .init();

    let world = Arc::new(World::with_config(WorldId::new(1), config));

    let ship = Blueprint::builder()
        .component::<Position>()
        .instance(Velocity { x: 1.0, y: 0.5 })
        .instance(Fuel(20))
        .build();

    let mut attributes = Attributes::new();
    attributes.insert("faction".into(), Attribute::from("traders"));
    let trader = world.instantiate(&ship, Some("Trader"), attributes)?;
    let drifter = world.spawn((Position::default(), Velocity { x: -0.25, y: 0.0 }))?;

    let mut schedule = Schedule::new();
    schedule.add_system(Motion, &world);
    let engine = schedule.add_system(Engine, &world);

    // Drive both systems cooperatively for a few frames
    for _ in 0..10 {
        schedule.run(&world)?;
    }

    // Then let the engine burn the remaining fuel on its own
    schedule.stop(engine);
    let mut background = Schedule::new();
    let burner = background.add_system(Engine, &world);
    if let Some(worker) = background.spawn(burner, Arc::clone(&world)) {
        thread::sleep(Duration::from_millis(200));
        worker.join()?;
    }
    schedule.run(&world)?;

    for entity in [trader, drifter] {
        let kind = world
            .kind_of(entity)
            .and_then(|kind| kind.name().map(str::to_owned))
            .unwrap_or_else(|| "entity".into());
        let position = world
            .get::<Position>(entity)
            .and_then(|handle| handle.value::<Position>())
            .unwrap_or_default();
        info!(
            "{} {}: position ({:.2}, {:.2}), faction {:?}",
            kind,
            entity,
            position.x,
            position.y,
            world.attribute(entity, "faction")
        );
    }

    Ok(())
}
