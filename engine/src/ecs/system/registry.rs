//! System registry for storing registered systems in order.
//!
//! Each entry pairs the boxed system with its resolved managed types and its [`State`]. Entries
//! are shared (`Arc`) so an independently driven worker can hold on to its system while the
//! schedule keeps serving state queries.

use std::sync::Arc;

use log::{debug, error};
use parking_lot::Mutex;

use crate::ecs::{
    component::{Info, Spec},
    error::{Error, Result},
    system::{Collected, Dynamic, Id, State},
    world::{self, World},
};

/// A registered system.
pub struct Entry {
    id: Id,
    name: String,
    world: world::Id,
    spec: Spec,
    columns: Vec<Info>,
    state: Mutex<State>,
    system: Mutex<Box<dyn Dynamic>>,
}

impl Entry {
    /// The system id.
    #[inline]
    pub fn id(&self) -> Id {
        self.id
    }

    /// The system name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The world the system was added against.
    #[inline]
    pub fn world(&self) -> world::Id {
        self.world
    }

    /// The managed component types.
    #[inline]
    pub fn spec(&self) -> &Spec {
        &self.spec
    }

    /// The current state.
    #[inline]
    pub fn state(&self) -> State {
        *self.state.lock()
    }

    /// Halt the system. A cycle already in flight completes; no further cycle starts.
    pub fn stop(&self) {
        let mut state = self.state.lock();
        if *state != State::Stopped {
            debug!("stopping system `{}` ({})", self.name, *state);
            *state = State::Stopped;
        }
    }

    /// Move to `next` unless the system has been stopped. Returns false if stopped.
    fn advance(&self, next: State) -> bool {
        let mut state = self.state.lock();
        if *state == State::Stopped {
            return false;
        }
        *state = next;
        true
    }

    /// Run one collect/process cycle against the world.
    ///
    /// A stopped system does nothing. Processing errors are logged and returned. A world other
    /// than the one the system was added against fails with [`Error::WorldMismatch`].
    pub(crate) fn cycle(&self, world: &World) -> Result<()> {
        self.check_world(world)?;

        // Serializes cycles of this system when it is driven from several places.
        let mut system = self.system.lock();

        if !self.advance(State::Collecting) {
            return Ok(());
        }
        let collected: Collected = world.collect_columns(&self.columns);

        if !self.advance(State::Processing) {
            return Ok(());
        }
        let result = system.process(&collected);
        self.advance(State::Collecting);

        if let Err(err) = &result {
            error!(
                "system `{}` failed processing {} entities: {}",
                self.name,
                collected.len(),
                err
            );
        }
        result
    }

    /// Managed infos are only valid in the registry that issued them.
    fn check_world(&self, world: &World) -> Result<()> {
        let components = world.components();
        if world.id() == self.world && self.columns.iter().all(|info| components.owns(info)) {
            return Ok(());
        }
        let err = Error::WorldMismatch {
            system: self.name.clone(),
            expected: self.world,
            found: world.id(),
        };
        error!("{}", err);
        Err(err)
    }
}

/// Registered systems, in registration order.
#[derive(Default)]
pub struct Registry {
    systems: Vec<Arc<Entry>>,
}

impl Registry {
    /// Create a new, empty system registry.
    #[inline]
    pub const fn new() -> Self {
        Self {
            systems: Vec::new(),
        }
    }

    /// Register a system with its resolved managed types and return its identifier.
    pub(crate) fn register(
        &mut self,
        system: Box<dyn Dynamic>,
        world: world::Id,
        spec: Spec,
        columns: Vec<Info>,
    ) -> Id {
        let id = Id(self.systems.len() as u32);
        let name = system.name().to_owned();
        debug!(
            "registered system `{}` as {:?} in world {:?} managing {:?}",
            name, id, world, columns
        );

        self.systems.push(Arc::new(Entry {
            id,
            name,
            world,
            spec,
            columns,
            state: Mutex::new(State::Registered),
            system: Mutex::new(system),
        }));
        id
    }

    /// Retrieve a system by its identifier.
    #[inline]
    pub fn get(&self, id: Id) -> Option<&Arc<Entry>> {
        self.systems.get(id.index())
    }

    /// Iterate the systems in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Entry>> {
        self.systems.iter()
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
