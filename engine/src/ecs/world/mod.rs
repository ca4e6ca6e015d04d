//! The World is the context object holding one independent ECS: its component types, component
//! store, entities and archetype cache.
//!
//! # Architecture
//!
//! The World coordinates several subsystems:
//! - **Component Registry**: Issues component ids and records component metadata
//! - **Store**: One table per component type, entity → instance
//! - **Entity Registry**: The live entities and their slots, behind a read/write lock
//! - **Entity Allocator**: Monotonic, never reused entity ids
//! - **Archetype Factory**: Builds entities from blueprints, caching resolved kinds
//!
//! Any number of worlds may exist in one process; nothing is shared between them.
//!
//! # Concurrency
//!
//! A World is `Send + Sync` and meant to be shared through an `Arc` with scheduler workers. Every
//! operation that changes entity slots (spawn, attach, detach, destroy, instantiate) holds the
//! entity lock for writing across all of its store mutations, and collection holds it for reading
//! while it snapshots the managed tables. A collector therefore never observes an entity with only
//! part of its components attached. Component values themselves are guarded per instance, so
//! systems mutate them in place without holding the entity lock.
//!
//! # Example
//!
//! ```ignore
//! use rusty_ecs::ecs::world::{Id, World};
//!
//! let world = World::new(Id::new(1));
//!
//! // Spawn an entity with components
//! let entity = world.spawn((Position { x: 0.0, y: 0.0 }, Velocity { dx: 1.0, dy: 0.0 }))?;
//!
//! // Read a component
//! let position = world.get::<Position>(entity).unwrap();
//! assert_eq!(position.get::<Position>().unwrap().x, 0.0);
//!
//! // Destroy the entity
//! world.destroy(entity);
//! ```

use std::sync::Arc;

use log::{debug, error};
use parking_lot::RwLock;

use crate::{
    config::Config,
    ecs::{
        archetype::{self, Attribute, Attributes, Blueprint, Kind},
        component::{self, Component, Handle, Info, IntoSpec, Set, Spec},
        entity::{self, Selector},
        error::Result,
        storage::Store,
        system::Collected,
    },
};

/// A world identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id(u32);

impl Id {
    /// Create a new world identifier.
    #[inline]
    pub const fn new(id: u32) -> Self {
        Id(id)
    }

    /// Get the raw identifier value.
    #[inline]
    pub const fn id(&self) -> u32 {
        self.0
    }
}

/// The World is the central container for all entities, components, and their relationships.
pub struct World {
    /// The world's unique identifier.
    id: Id,

    /// Tunables the world was built with.
    config: Config,

    /// The registry of all known component types in the world.
    components: component::Registry,

    /// The component tables.
    store: Store,

    /// The live entities. Writers hold this across multi-table mutations.
    entities: RwLock<entity::Registry>,

    /// The world's entity allocator.
    allocator: entity::Allocator,

    /// Builds entities from blueprints.
    archetypes: archetype::Factory,
}

impl World {
    /// Create a world with the default configuration.
    pub fn new(id: Id) -> Self {
        Self::with_config(id, Config::default())
    }

    /// Create a world with the given configuration.
    pub fn with_config(id: Id, config: Config) -> Self {
        debug!("creating world {:?}", id);
        Self {
            id,
            components: component::Registry::new(),
            store: Store::new(),
            entities: RwLock::new(entity::Registry::new()),
            allocator: entity::Allocator::new(),
            archetypes: archetype::Factory::new(config.archetype_cache_capacity),
            config,
        }
    }

    /// The world id.
    #[inline]
    pub fn id(&self) -> Id {
        self.id
    }

    /// The configuration the world was built with.
    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The component registry of this world.
    #[inline]
    pub fn components(&self) -> &component::Registry {
        &self.components
    }

    /// Read access to the component store of this world. Tables change only through the world.
    #[inline]
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// The archetype factory of this world.
    #[inline]
    pub fn archetypes(&self) -> &archetype::Factory {
        &self.archetypes
    }

    /// Register a component type and make sure it has a table.
    pub fn register_component<C: Component>(&self) -> component::Id {
        let id = self.components.register::<C>();
        self.store.register(id);
        id
    }

    /// Create an entity holding the given components.
    ///
    /// Fails with [`Error::InvalidComponent`](crate::ecs::Error::InvalidComponent) if a value is
    /// not a component; nothing is created in that case.
    pub fn spawn<S: Set>(&self, set: S) -> Result<entity::Id> {
        let values = set.into_values();
        let mut entities = self.entities.write();
        entities
            .create(values, &self.components, &self.store, &self.allocator)
            .inspect_err(|err| error!("spawn in world {:?} failed: {}", self.id, err))
    }

    /// Attach components to an existing entity, replacing any instance of the same type.
    ///
    /// Values are applied in order; on failure the values before the offending one stay attached.
    pub fn attach<S: Set>(&self, entity: entity::Id, set: S) -> Result<()> {
        let values = set.into_values();
        let mut entities = self.entities.write();
        entities
            .attach(entity, values, &self.components, &self.store)
            .inspect_err(|err| error!("attach to entity {} failed: {}", entity, err))
    }

    /// Detach the components matched by the selector, returning the detached instances.
    ///
    /// Detaching something that is not attached is a no-op.
    pub fn detach(
        &self,
        entity: entity::Id,
        selector: impl Into<Selector>,
    ) -> Result<Vec<Handle>> {
        let selector = selector.into();
        let mut entities = self.entities.write();
        entities
            .detach(entity, &selector, &self.components, &self.store)
            .inspect_err(|err| {
                error!("detach {} from entity {} failed: {}", selector, entity, err)
            })
    }

    /// Detach every component of an entity and forget it. Returns false if it did not exist.
    pub fn destroy(&self, entity: entity::Id) -> bool {
        let mut entities = self.entities.write();
        let destroyed = entities.destroy(entity, &self.store);
        if !destroyed {
            debug!("destroy of unknown entity {} ignored", entity);
        }
        destroyed
    }

    /// Build an entity from a blueprint.
    ///
    /// With a `name` the entity is tagged with the named archetype [`Kind`]. Attributes are merged
    /// into the entity either way.
    pub fn instantiate(
        &self,
        blueprint: &Blueprint,
        name: Option<&str>,
        attributes: Attributes,
    ) -> Result<entity::Id> {
        let mut entities = self.entities.write();
        self.archetypes
            .instantiate(
                blueprint,
                name,
                attributes,
                &self.components,
                &mut entities,
                &self.store,
                &self.allocator,
            )
            .inspect_err(|err| {
                error!(
                    "instantiate {:?} (name {:?}) failed: {}",
                    blueprint.id(),
                    name,
                    err
                )
            })
    }

    /// Get the instance of `C` attached to an entity.
    pub fn get<C: Component>(&self, entity: entity::Id) -> Option<Handle> {
        let id = self.components.get::<C>()?;
        self.component(entity, id)
    }

    /// Get the instance of a component type attached to an entity.
    pub fn component(&self, entity: entity::Id, component: component::Id) -> Option<Handle> {
        self.entities.read().get(entity, component).cloned()
    }

    /// Returns true if the entity exists.
    pub fn contains(&self, entity: entity::Id) -> bool {
        self.entities.read().contains(entity)
    }

    /// The number of live entities.
    pub fn entity_count(&self) -> usize {
        self.entities.read().len()
    }

    /// The set of component types attached to an entity.
    pub fn spec_of(&self, entity: entity::Id) -> Option<Spec> {
        self.entities.read().spec_of(entity)
    }

    /// The archetype kind an entity was built as, if it was built with a name.
    pub fn kind_of(&self, entity: entity::Id) -> Option<Arc<Kind>> {
        self.entities.read().kind_of(entity)
    }

    /// An extra attribute grafted onto an entity.
    pub fn attribute(&self, entity: entity::Id, name: &str) -> Option<Attribute> {
        self.entities.read().attribute(entity, name)
    }

    /// Collect and join the tables of the component types in `S`.
    pub fn collect<S: IntoSpec>(&self) -> Collected {
        let spec = self.components.spec::<S>();
        let columns = self.columns(&spec);
        self.collect_columns(&columns)
    }

    /// Resolve a component spec to the infos of its types, making sure each has a table.
    pub(crate) fn columns(&self, spec: &Spec) -> Vec<Info> {
        spec.ids()
            .iter()
            .filter_map(|id| {
                self.store.register(*id);
                self.components.get_info_by_id(*id)
            })
            .collect()
    }

    /// Collect and join the given component tables under the entity read lock.
    pub(crate) fn collect_columns(&self, columns: &[Info]) -> Collected {
        let _entities = self.entities.read();
        Collected::gather(&self.store, columns)
    }
}
