//! Systems: behavior units that process the joined data of the component types they manage.
//!
//! # Overview
//!
//! A system declares a fixed set of managed component types through [`System::Managed`] and
//! implements one processing entry point, [`System::process`]. Each cycle the scheduler *collects*
//! the store's table for every managed type, joins them on entity id (only entities holding every
//! managed type survive), and hands the result to `process` as a [`Collected`]:
//!
//! ```rust,ignore
//! use rusty_ecs::ecs::{Component, system::{Collected, System}, Result};
//!
//! #[derive(Component, Clone, Default)]
//! struct Position { x: f32, y: f32 }
//!
//! #[derive(Component, Clone, Default)]
//! struct Velocity { dx: f32, dy: f32 }
//!
//! struct Motion;
//!
//! impl System for Motion {
//!     type Managed = (Position, Velocity);
//!
//!     fn process(&mut self, collected: &Collected) -> Result<()> {
//!         for row in collected.rows() {
//!             let velocity = row.get::<Velocity>().unwrap();
//!             let mut position = row.get_mut::<Position>().unwrap();
//!             position.x += velocity.dx;
//!             position.y += velocity.dy;
//!         }
//!         Ok(())
//!     }
//! }
//! ```
//!
//! Closures can stand in for a full implementation with [`from_fn`]:
//!
//! ```rust,ignore
//! let gravity = system::from_fn::<Velocity, _>("gravity", |collected| {
//!     for row in collected.rows() {
//!         row.get_mut::<Velocity>().unwrap().dy -= 9.8;
//!     }
//!     Ok(())
//! });
//! ```
//!
//! Systems never reference one another; they communicate only through the component store.
//!
//! # Lifecycle
//!
//! ```text
//! Registered ─► Collecting ─► Processing ─┐
//!                   ▲                     │
//!                   └─────────────────────┘
//!        (any state) ─► Stopped
//! ```
//!
//! A system that skips `process` fails with
//! [`Error::UnimplementedProcessing`](crate::ecs::Error::UnimplementedProcessing) the first time it
//! is driven.

mod collect;
pub mod registry;

use std::{any::type_name, fmt, marker::PhantomData};

use crate::ecs::{
    component::IntoSpec,
    error::{Error, Result},
};

pub use collect::{Collected, Row};
pub use registry::Registry;

/// A system identifier, issued in registration order.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id(u32);

impl Id {
    /// Construct a new system Id from a raw u32 value.
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the index of this system if it were to live in indexable storage (e.g. Vec)
    #[inline]
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Where a system is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    /// Added to a schedule, never run.
    Registered,

    /// Gathering its managed tables, or idle between cycles waiting to gather again.
    Collecting,

    /// Inside its processing entry point.
    Processing,

    /// Halted. Terminal.
    Stopped,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            State::Registered => "registered",
            State::Collecting => "collecting",
            State::Processing => "processing",
            State::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// A behavior unit operating on the component types it manages.
pub trait System: Send + 'static {
    /// The managed component types. Resolved once, when the system is added to a schedule.
    type Managed: IntoSpec;

    /// A name for logs and errors.
    fn name(&self) -> &str {
        type_name::<Self>()
    }

    /// Process one cycle of collected data, mutating component instances in place.
    ///
    /// The default body fails with [`Error::UnimplementedProcessing`].
    fn process(&mut self, collected: &Collected) -> Result<()> {
        let _ = collected;
        Err(Error::UnimplementedProcessing {
            system: self.name().to_owned(),
        })
    }
}

/// Object-safe view of a [`System`] for storage in the registry.
pub(crate) trait Dynamic: Send {
    fn name(&self) -> &str;
    fn process(&mut self, collected: &Collected) -> Result<()>;
}

impl<S: System> Dynamic for S {
    fn name(&self) -> &str {
        System::name(self)
    }

    fn process(&mut self, collected: &Collected) -> Result<()> {
        System::process(self, collected)
    }
}

/// A system backed by a closure.
pub struct FnSystem<M, F> {
    name: String,
    body: F,
    managed: PhantomData<fn() -> M>,
}

/// Wrap a closure as a system managing `M`.
pub fn from_fn<M, F>(name: impl Into<String>, body: F) -> FnSystem<M, F>
where
    M: IntoSpec + 'static,
    F: FnMut(&Collected) -> Result<()> + Send + 'static,
{
    FnSystem {
        name: name.into(),
        body,
        managed: PhantomData,
    }
}

impl<M, F> System for FnSystem<M, F>
where
    M: IntoSpec + 'static,
    F: FnMut(&Collected) -> Result<()> + Send + 'static,
{
    type Managed = M;

    fn name(&self) -> &str {
        &self.name
    }

    fn process(&mut self, collected: &Collected) -> Result<()> {
        (self.body)(collected)
    }
}
