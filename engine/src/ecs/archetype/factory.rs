use std::{any::Any, sync::Arc};

use log::{debug, trace};
use parking_lot::Mutex;

use crate::ecs::{
    archetype::{Attributes, Blueprint, Entry, Id, Kind, cache::Lru},
    component::{self, Handle, Info, Instance},
    entity,
    error::{Error, Result},
    storage::Store,
};

/// The cache key: blueprint identity plus the optional subtype name.
type Key = (Id, Option<String>);

/// Builds entities from blueprints.
///
/// The factory caches each blueprint's resolved [`Kind`]. Entities and their component instances
/// are never cached; every instantiation builds fresh ones.
pub struct Factory {
    kinds: Mutex<Lru<Key, Arc<Kind>>>,
}

impl Factory {
    /// Construct a factory caching up to `capacity` kinds.
    pub fn new(capacity: usize) -> Self {
        Self {
            kinds: Mutex::new(Lru::new(capacity)),
        }
    }

    /// Resolve a blueprint to its kind, consulting the cache first.
    ///
    /// Fails with [`Error::InvalidComponent`] if an entry is not a registered component type or
    /// an instance of one. Failures are not cached.
    pub fn kind(
        &self,
        blueprint: &Blueprint,
        name: Option<&str>,
        components: &component::Registry,
    ) -> Result<Arc<Kind>> {
        let key = (blueprint.id(), name.map(str::to_owned));
        if let Some(kind) = self.kinds.lock().get(&key) {
            trace!("archetype cache hit for blueprint {:?}", blueprint.id());
            return Ok(kind);
        }

        let infos = blueprint
            .entries()
            .iter()
            .map(|entry| {
                resolve(entry, components)
                    .ok_or_else(|| Error::invalid_component(entry.describe(), "instantiate"))
            })
            .collect::<Result<Vec<_>>>()?;

        let kind = Arc::new(Kind::new(key.1.clone(), blueprint.id(), infos));
        debug!(
            "built archetype kind {:?} for blueprint {:?}",
            kind.name(),
            blueprint.id()
        );
        self.kinds.lock().insert(key, Arc::clone(&kind));
        Ok(kind)
    }

    /// Build fresh component instances for every blueprint entry and register a new entity
    /// holding them.
    ///
    /// With a `name` the entity carries the named kind. The attributes are merged into the entity
    /// either way.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn instantiate(
        &self,
        blueprint: &Blueprint,
        name: Option<&str>,
        attributes: Attributes,
        components: &component::Registry,
        entities: &mut entity::Registry,
        store: &Store,
        allocator: &entity::Allocator,
    ) -> Result<entity::Id> {
        let kind = self.kind(blueprint, name, components)?;
        let handles = blueprint
            .entries()
            .iter()
            .zip(kind.components())
            .map(|(entry, info)| build(entry, *info))
            .collect::<Result<Vec<_>>>()?;

        let kind = name.is_some().then_some(kind);
        Ok(entities.build(handles, kind, attributes, store, allocator))
    }

    /// The number of cached kinds.
    pub fn cached(&self) -> usize {
        self.kinds.lock().len()
    }

    /// The maximum number of cached kinds.
    pub fn capacity(&self) -> usize {
        self.kinds.lock().capacity()
    }
}

/// The component type an entry builds.
fn resolve(entry: &Entry, components: &component::Registry) -> Option<Info> {
    match entry {
        Entry::Type(token) | Entry::Instance(token, _) => components.resolve(token),
        Entry::Erased(prototype) => components.get_info_by_type_id(Any::type_id(&**prototype)),
    }
}

/// A fresh instance for one entry: default-constructed for types, a deep copy for prototypes.
fn build(entry: &Entry, info: Info) -> Result<Handle> {
    match entry {
        Entry::Type(_) => Ok(Instance::new(info, info.construct())),
        Entry::Instance(_, prototype) | Entry::Erased(prototype) => info
            .duplicate(&**prototype)
            .map(|copy| Instance::new(info, copy))
            .ok_or_else(|| Error::invalid_component(entry.describe(), "instantiate")),
    }
}
