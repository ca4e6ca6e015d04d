//! An Entity-Component-System runtime.
//!
//! Components are plain data attached to opaque entity ids; systems declare the component types
//! they manage and process the joined data of those types each cycle. Everything lives in a
//! [`World`](ecs::World), an explicit context object, so several independent worlds can coexist in
//! one process.
//!
//! ```ignore
//! use rusty_ecs::ecs::{Component, Schedule, World, WorldId};
//!
//! #[derive(Component, Clone, Default)]
//! struct Position { x: f32 }
//!
//! #[derive(Component, Clone, Default)]
//! struct Velocity { dx: f32 }
//!
//! let world = World::new(WorldId::new(1));
//! world.spawn((Position { x: 0.0 }, Velocity { dx: 1.0 }))?;
//!
//! let mut schedule = Schedule::new();
//! schedule.add_system(Motion, &world);
//! schedule.run(&world)?;
//! ```

// Allow the derive macro to refer to `::rusty_ecs` from inside this crate.
extern crate self as rusty_ecs;

pub mod config;
pub mod ecs;
pub mod logging;

pub use config::Config;
