//! Schedule management for running ECS systems.
//!
//! The [`Schedule`] holds systems in registration order. Each system can be driven two ways:
//!
//! - **Cooperatively**: [`Schedule::run`] performs one collect/process cycle of every system that
//!   has not been stopped, in registration order, on the calling thread.
//! - **Independently**: [`Schedule::spawn`] hands a system to a [`Worker`] thread that cycles it
//!   until it is stopped.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use rusty_ecs::ecs::{schedule::Schedule, world::{Id, World}};
//!
//! let world = Arc::new(World::new(Id::new(1)));
//! let mut schedule = Schedule::new();
//!
//! let motion = schedule.add_system(Motion, &world);
//! let audio = schedule.add_system(Audio, &world);
//!
//! // Drive everything once per frame
//! schedule.run(&world)?;
//!
//! // Or let a system run on its own
//! let worker = schedule.spawn(audio, Arc::clone(&world)).unwrap();
//! worker.join()?;
//! ```
//!
//! # Ordering
//!
//! Within one [`Schedule::run`] systems execute in registration order. Independently driven
//! systems have no ordering relative to anything else; if two systems must run in a particular
//! order, drive them cooperatively.

mod worker;

use std::sync::Arc;

use log::{debug, warn};

use crate::ecs::{
    error::Result,
    system::{self, State, System},
    world::World,
};

pub use worker::{Command, Worker};

/// The ordered list of systems of an application.
#[derive(Default)]
pub struct Schedule {
    systems: system::Registry,
}

impl Schedule {
    /// Create an empty schedule.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a system, resolving its managed component types against the world.
    ///
    /// The managed set is fixed from here on and the system is bound to this world; running it
    /// against another world fails with [`Error::WorldMismatch`](crate::ecs::Error::WorldMismatch).
    /// Tables are created for managed types that have none yet.
    pub fn add_system<S: System>(&mut self, system: S, world: &World) -> system::Id {
        let spec = world.components().spec::<S::Managed>();
        let columns = world.columns(&spec);
        self.systems.register(Box::new(system), world.id(), spec, columns)
    }

    /// Run one cycle of every system that has not been stopped, in registration order.
    ///
    /// Stops at the first system that fails and returns its error.
    pub fn run(&self, world: &World) -> Result<()> {
        debug!("running {} system(s)", self.systems.len());
        for entry in self.systems.iter() {
            entry.cycle(world)?;
        }
        Ok(())
    }

    /// Run one cycle of a single system.
    pub fn run_system(&self, id: system::Id, world: &World) -> Result<()> {
        match self.systems.get(id) {
            Some(entry) => entry.cycle(world),
            None => {
                warn!("run of unknown system {:?} ignored", id);
                Ok(())
            }
        }
    }

    /// Halt a system. It finishes a cycle already in flight and never starts another.
    ///
    /// Returns false if the system is unknown.
    pub fn stop(&self, id: system::Id) -> bool {
        self.systems.get(id).map(|entry| entry.stop()).is_some()
    }

    /// The state of a system.
    pub fn state(&self, id: system::Id) -> Option<State> {
        self.systems.get(id).map(|entry| entry.state())
    }

    /// The name of a system.
    pub fn name(&self, id: system::Id) -> Option<&str> {
        self.systems.get(id).map(|entry| entry.name())
    }

    /// Drive a system on its own worker thread until it is stopped.
    ///
    /// Returns `None` if the system is unknown.
    pub fn spawn(&self, id: system::Id, world: Arc<World>) -> Option<Worker> {
        let entry = Arc::clone(self.systems.get(id)?);
        let interval = world.config().cycle_interval();
        Some(Worker::spawn(entry, world, interval))
    }

    /// The registered systems.
    #[inline]
    pub fn systems(&self) -> &system::Registry {
        &self.systems
    }

    /// The number of registered systems.
    #[inline]
    pub fn len(&self) -> usize {
        self.systems.len()
    }

    /// Returns true if no system is registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }
}
