//! The component store: one table per component type, mapping entity → component instance.
//!
//! The store is an *index*. The owning [`Entity`](crate::ecs::entity::Entity) holds the canonical
//! reference to each attached instance, and the store holds a second reference so systems can
//! iterate a component type in bulk without walking entities.
//!
//! # Concurrency
//!
//! Tables live in a `DashMap`, so every mutation of one type's table (insert, replace, remove) is
//! serialized against readers of that same table by the map's shard lock, while tables of other
//! types remain independently accessible. Operations that touch several tables at once (entity
//! creation and destruction) are made atomic by the world, which holds its entity lock across the
//! whole sequence.
//!
//! Absence is never an error here: lookups and removals of entries that do not exist return
//! `None`.

mod table;

use dashmap::{DashMap, mapref::one::Ref};
use log::trace;

use crate::ecs::{
    component::{self, Handle},
    entity,
};

pub use table::{COMPACT_THRESHOLD, Table};

/// A read guard over one component type's table.
///
/// This is a live view, not a copy: the table's shard stays read-locked for as long as the guard
/// is held, so hold it only for the duration of a bulk read.
pub type TableRef<'a> = Ref<'a, component::Id, Table>;

/// Process-wide (per world) map from component type to its table.
///
/// Outside the crate the store is read only. Writes happen through the [`World`](crate::ecs::World),
/// which keeps entity slots and tables in step under its entity lock:
///
/// ```compile_fail
/// use rusty_ecs::ecs::{Component, World, WorldId};
///
/// #[derive(Component, Clone, Default)]
/// struct Marker;
///
/// let world = World::new(WorldId::new(1));
/// let entity = world.spawn(Marker).unwrap();
/// let id = world.register_component::<Marker>();
/// world.store().remove(id, entity);
/// ```
#[derive(Default)]
pub struct Store {
    tables: DashMap<component::Id, Table>,
}

impl Store {
    /// Construct an empty store.
    #[inline]
    pub fn new() -> Self {
        Self {
            tables: DashMap::new(),
        }
    }

    /// Ensure a table exists for the given component type. Idempotent.
    pub(crate) fn register(&self, component: component::Id) {
        self.tables.entry(component).or_default();
    }

    /// Insert or replace the entry for `entity` under `component`, returning the previous instance
    /// if one existed.
    ///
    /// The store does not touch the back reference of either instance. Callers replacing an
    /// attached instance must detach the previous one themselves.
    pub(crate) fn put(
        &self,
        component: component::Id,
        entity: entity::Id,
        instance: Handle,
    ) -> Option<Handle> {
        trace!("store put {:?} for {}", component, entity);
        self.tables
            .entry(component)
            .or_default()
            .insert(entity, instance)
    }

    /// Get the instance of `component` stored for `entity`.
    pub fn get(&self, component: component::Id, entity: entity::Id) -> Option<Handle> {
        self.tables
            .get(&component)
            .and_then(|table| table.get(entity).cloned())
    }

    /// Remove the entry for `entity` under `component`, returning the removed instance. Removing a
    /// missing entry is a no-op.
    pub(crate) fn remove(&self, component: component::Id, entity: entity::Id) -> Option<Handle> {
        trace!("store remove {:?} for {}", component, entity);
        self.tables
            .get_mut(&component)
            .and_then(|mut table| table.remove(entity))
    }

    /// Get a read view of the table for `component`, if the type has a table.
    #[inline]
    pub fn table(&self, component: component::Id) -> Option<TableRef<'_>> {
        self.tables.get(&component)
    }

    /// Returns true if `entity` has an entry under `component`.
    pub fn contains(&self, component: component::Id, entity: entity::Id) -> bool {
        self.tables
            .get(&component)
            .is_some_and(|table| table.contains(entity))
    }

    /// The number of entries under `component`.
    pub fn len(&self, component: component::Id) -> usize {
        self.tables.get(&component).map_or(0, |table| table.len())
    }

    /// The number of component types with a table.
    #[inline]
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Returns true if any table still references `entity`.
    pub fn holds(&self, entity: entity::Id) -> bool {
        self.tables.iter().any(|table| table.contains(entity))
    }
}
