use std::{collections::HashMap, sync::Arc};

use log::{debug, trace};

use crate::ecs::{
    archetype::{Attribute, Attributes, Kind},
    component::{self, Handle, Spec, Value},
    entity::{Allocator, Entity, Id, selector::Target},
    error::{Error, Result},
    storage::Store,
};

use super::Selector;

/// The live entities of a world.
///
/// The registry owns the entity → slot association and keeps the component store in step with it:
/// every instance sitting in a slot has exactly one store entry under `(type, entity)` and its back
/// reference points at the entity. The registry does not lock anything itself; the world holds it
/// behind a lock so that a multi-table mutation appears atomic to collectors.
#[derive(Debug, Default)]
pub struct Registry {
    entities: HashMap<Id, Entity>,
}

impl Registry {
    /// Construct an empty entity registry.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an entity with the given component values attached.
    ///
    /// Every value is resolved before an identifier is allocated, so a failed create consumes no
    /// identifier and leaves nothing behind in the store.
    pub fn create(
        &mut self,
        values: Vec<Value>,
        components: &component::Registry,
        store: &Store,
        allocator: &Allocator,
    ) -> Result<Id> {
        let handles = values
            .into_iter()
            .map(|value| value.resolve(components, "create"))
            .collect::<Result<Vec<_>>>()?;
        Ok(self.build(handles, None, Attributes::new(), store, allocator))
    }

    /// Register a new entity holding already resolved instances, with an optional archetype kind
    /// and extra attributes.
    pub(crate) fn build(
        &mut self,
        handles: Vec<Handle>,
        kind: Option<Arc<Kind>>,
        attributes: Attributes,
        store: &Store,
        allocator: &Allocator,
    ) -> Id {
        let id = allocator.alloc();
        let mut entity = Entity::new(id);
        if let Some(kind) = kind {
            entity.set_kind(kind);
        }
        entity.merge_attributes(attributes);
        self.entities.insert(id, entity);

        for handle in handles {
            self.place(id, handle, store);
        }

        debug!(
            "created entity {} with {} component(s)",
            id,
            self.entities.get(&id).map_or(0, Entity::len)
        );
        id
    }

    /// Attach component values to an existing entity.
    ///
    /// Values are applied in order. If a value fails to resolve, the values before it stay
    /// attached and the error is returned.
    pub fn attach(
        &mut self,
        id: Id,
        values: Vec<Value>,
        components: &component::Registry,
        store: &Store,
    ) -> Result<()> {
        if !self.entities.contains_key(&id) {
            return Err(Error::EntityNotFound(id));
        }

        for value in values {
            let handle = value.resolve(components, "attach")?;
            self.place(id, handle, store);
        }
        Ok(())
    }

    /// Put an instance into the entity's slot for its type.
    ///
    /// An instance owned by another entity is detached there first. An instance already occupying
    /// the slot is detached and orphaned.
    fn place(&mut self, id: Id, handle: Handle, store: &Store) {
        let component = handle.id();

        match handle.owner() {
            Some(owner) if owner == id => {
                let occupied = self
                    .entities
                    .get(&id)
                    .and_then(|entity| entity.get(component))
                    .is_some_and(|current| Arc::ptr_eq(current, &handle));
                if occupied {
                    return;
                }
            }
            Some(owner) => self.release(owner, &Target::Instance(Arc::clone(&handle)), store),
            None => {}
        }

        let Some(entity) = self.entities.get_mut(&id) else {
            return;
        };
        if let Some(previous) = entity.insert(Arc::clone(&handle)) {
            trace!("replacing {:?} on entity {}", previous, id);
            previous.set_owner(None);
        }
        store.put(component, id, Arc::clone(&handle));
        handle.set_owner(Some(id));
        trace!("attached {:?} to entity {}", handle, id);
    }

    /// Detach the components matched by `selector` from an entity, returning the detached
    /// instances.
    ///
    /// Slots that are already empty, and entities that do not exist, are silently skipped. Only a
    /// selector that cannot be resolved at all is an error.
    pub fn detach(
        &mut self,
        id: Id,
        selector: &Selector,
        components: &component::Registry,
        store: &Store,
    ) -> Result<Vec<Handle>> {
        let targets = selector.resolve(components)?;
        let Some(entity) = self.entities.get_mut(&id) else {
            return Ok(Vec::new());
        };

        let mut detached = Vec::new();
        for target in &targets {
            if let Some(handle) = take(entity, target) {
                store.remove(handle.id(), id);
                handle.set_owner(None);
                detached.push(handle);
            }
        }

        debug!("detached {} component(s) from entity {}", detached.len(), id);
        Ok(detached)
    }

    /// Remove one target from an entity, keeping the store in step.
    fn release(&mut self, id: Id, target: &Target, store: &Store) {
        let Some(entity) = self.entities.get_mut(&id) else {
            return;
        };
        if let Some(handle) = take(entity, target) {
            store.remove(handle.id(), id);
            handle.set_owner(None);
        }
    }

    /// Detach every component of an entity and forget it. The identifier is never reissued.
    ///
    /// Returns false if the entity did not exist.
    pub fn destroy(&mut self, id: Id, store: &Store) -> bool {
        let Some(mut entity) = self.entities.remove(&id) else {
            return false;
        };

        for handle in entity.drain() {
            store.remove(handle.id(), id);
            handle.set_owner(None);
        }
        debug!("destroyed entity {}", id);
        true
    }

    /// Get the instance of a component type attached to an entity.
    #[inline]
    pub fn get(&self, id: Id, component: component::Id) -> Option<&Handle> {
        self.entities.get(&id).and_then(|entity| entity.get(component))
    }

    /// Get an entity by id.
    #[inline]
    pub fn entity(&self, id: Id) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Returns true if the entity exists.
    #[inline]
    pub fn contains(&self, id: Id) -> bool {
        self.entities.contains_key(&id)
    }

    /// The number of live entities.
    #[inline]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns true if there are no live entities.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Iterate the ids of live entities, in no particular order.
    pub fn ids(&self) -> impl Iterator<Item = Id> + '_ {
        self.entities.keys().copied()
    }

    /// The set of component types attached to an entity.
    pub fn spec_of(&self, id: Id) -> Option<Spec> {
        self.entities.get(&id).map(Entity::spec)
    }

    /// The archetype kind an entity was built as.
    pub fn kind_of(&self, id: Id) -> Option<Arc<Kind>> {
        self.entities.get(&id).and_then(|entity| entity.kind().cloned())
    }

    /// An extra attribute of an entity.
    pub fn attribute(&self, id: Id, name: &str) -> Option<Attribute> {
        self.entities
            .get(&id)
            .and_then(|entity| entity.attribute(name).cloned())
    }
}

/// Take the instance a target names out of an entity's slots.
fn take(entity: &mut Entity, target: &Target) -> Option<Handle> {
    match target {
        Target::Type(component) => entity.remove(*component),
        Target::Instance(handle) => {
            let component = handle.id();
            entity
                .get(component)
                .is_some_and(|current| Arc::ptr_eq(current, handle))
                .then(|| entity.remove(component))
                .flatten()
        }
    }
}
