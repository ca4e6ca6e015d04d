use std::{
    any::Any,
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use parking_lot::{
    MappedRwLockReadGuard, MappedRwLockWriteGuard, RwLock, RwLockReadGuard, RwLockWriteGuard,
};

use crate::ecs::{
    component::{Component, Id, Info, registry::Erased},
    entity,
    error::{Error, Result},
};

/// Sentinel stored in the owner slot while an instance is detached.
const DETACHED: u64 = u64::MAX;

/// A shared component instance.
///
/// Once attached, the owning [`Entity`](entity::Entity) and the component store reference the same
/// instance through this handle. The entity is the canonical owner; the store is an index.
pub type Handle = Arc<Instance>;

/// A single component value tagged with its component type and, while attached, its owning
/// entity.
pub struct Instance {
    /// The component type of the value.
    info: Info,

    /// The owning entity id, or [`DETACHED`].
    owner: AtomicU64,

    /// The value itself, always of the type described by `info`.
    value: RwLock<Erased>,
}

impl Instance {
    /// Build a detached instance from a component value.
    pub(crate) fn new(info: Info, value: Erased) -> Handle {
        debug_assert_eq!(Any::type_id(&*value), info.type_id());
        Arc::new(Self {
            info,
            owner: AtomicU64::new(DETACHED),
            value: RwLock::new(value),
        })
    }

    /// The component type id of this instance.
    #[inline]
    pub fn id(&self) -> Id {
        self.info.id()
    }

    /// The component type info of this instance.
    #[inline]
    pub fn info(&self) -> &Info {
        &self.info
    }

    /// The entity this instance is attached to, if any.
    #[inline]
    pub fn owner(&self) -> Option<entity::Id> {
        match self.owner.load(Ordering::Acquire) {
            DETACHED => None,
            id => Some(entity::Id::new(id)),
        }
    }

    /// Returns true if the instance is currently attached to an entity.
    #[inline]
    pub fn is_attached(&self) -> bool {
        self.owner().is_some()
    }

    /// Update the owning-entity back reference.
    #[inline]
    pub(crate) fn set_owner(&self, owner: Option<entity::Id>) {
        let raw = owner.map_or(DETACHED, |id| id.raw());
        self.owner.store(raw, Ordering::Release);
    }

    /// Returns true if the instance holds a value of type `C`.
    #[inline]
    pub fn is<C: Component>(&self) -> bool {
        self.info.type_id() == std::any::TypeId::of::<C>()
    }

    /// Borrow the value as `C`. Returns `None` if the instance holds another type.
    pub fn get<C: Component>(&self) -> Option<MappedRwLockReadGuard<'_, C>> {
        RwLockReadGuard::try_map(self.value.read(), |value| value.downcast_ref::<C>()).ok()
    }

    /// Mutably borrow the value as `C`. Returns `None` if the instance holds another type.
    pub fn get_mut<C: Component>(&self) -> Option<MappedRwLockWriteGuard<'_, C>> {
        RwLockWriteGuard::try_map(self.value.write(), |value| value.downcast_mut::<C>()).ok()
    }

    /// Get a copy of the value as `C`.
    pub fn value<C: Component>(&self) -> Option<C> {
        self.get::<C>().map(|value| value.clone())
    }

    /// Overwrite the value, returning the previous one.
    pub fn set<C: Component>(&self, value: C) -> Result<C> {
        match self.get_mut::<C>() {
            Some(mut current) => Ok(std::mem::replace(&mut *current, value)),
            None => Err(Error::TypeMismatch {
                expected: std::any::type_name::<C>(),
                found: self.info.name(),
            }),
        }
    }

    /// Build a fresh, detached deep copy of this instance.
    pub fn duplicate(&self) -> Handle {
        let value = self.value.read();
        let copy = self
            .info
            .duplicate(&**value)
            // The value is always of the type described by `info`.
            .unwrap_or_else(|| self.info.construct());
        Instance::new(self.info, copy)
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("component", &self.info.short_name())
            .field("owner", &self.owner())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::component::Registry;
    use rusty_ecs_macros::Component;

    #[derive(Component, Clone, Default, Debug, PartialEq)]
    struct Position {
        x: f32,
        y: f32,
    }

    #[derive(Component, Clone, Default, Debug, PartialEq)]
    struct Label(String);

    fn instance<C: Component>(registry: &Registry, value: C) -> Handle {
        registry.register::<C>();
        Instance::new(registry.get_info::<C>().unwrap(), Box::new(value))
    }

    #[test]
    fn typed_get_and_set() {
        // Given
        let registry = Registry::new();
        let handle = instance(&registry, Position { x: 1.0, y: 2.0 });

        // When
        let previous = handle.set(Position { x: 3.0, y: 4.0 }).unwrap();

        // Then
        assert_eq!(previous, Position { x: 1.0, y: 2.0 });
        assert_eq!(handle.value::<Position>(), Some(Position { x: 3.0, y: 4.0 }));
        assert!(handle.is::<Position>());
        assert!(handle.get::<Label>().is_none());
    }

    #[test]
    fn set_with_wrong_type_fails() {
        // Given
        let registry = Registry::new();
        let handle = instance(&registry, Position::default());

        // When
        let result = handle.set(Label("nope".into()));

        // Then
        assert!(matches!(result, Err(Error::TypeMismatch { .. })));
        assert_eq!(handle.value::<Position>(), Some(Position::default()));
    }

    #[test]
    fn mutate_in_place() {
        // Given
        let registry = Registry::new();
        let handle = instance(&registry, Position::default());

        // When
        {
            let mut position = handle.get_mut::<Position>().unwrap();
            position.x += 5.0;
        }

        // Then
        assert_eq!(handle.get::<Position>().unwrap().x, 5.0);
    }

    #[test]
    fn owner_back_reference() {
        // Given
        let registry = Registry::new();
        let handle = instance(&registry, Label("a".into()));
        assert!(!handle.is_attached());

        // When
        handle.set_owner(Some(entity::Id::new(3)));

        // Then
        assert_eq!(handle.owner(), Some(entity::Id::new(3)));

        // When
        handle.set_owner(None);

        // Then
        assert_eq!(handle.owner(), None);
    }

    #[test]
    fn duplicate_is_detached_and_independent() {
        // Given
        let registry = Registry::new();
        let handle = instance(&registry, Label("original".into()));
        handle.set_owner(Some(entity::Id::new(1)));

        // When
        let copy = handle.duplicate();
        copy.set(Label("copy".into())).unwrap();

        // Then
        assert!(!copy.is_attached());
        assert_eq!(handle.value::<Label>(), Some(Label("original".into())));
        assert_eq!(copy.value::<Label>(), Some(Label("copy".into())));
    }
}
