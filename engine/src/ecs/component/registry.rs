use std::{
    any::{Any, TypeId, type_name},
    fmt,
    sync::atomic::{AtomicU32, Ordering},
};

use dashmap::DashMap;
use parking_lot::RwLock;

use crate::ecs::component::{Component, Id, IntoSpec, Spec};

/// Type-erased component value as stored behind a [`Handle`](super::Handle).
pub(crate) type Erased = Box<dyn Any + Send + Sync>;

/// Metadata describing a registered component type.
#[derive(Clone, Copy)]
pub struct Info {
    /// The registry that issued this info.
    origin: u32,
    /// The component id issued by the registry.
    id: Id,
    /// The rust type identity backing the component.
    type_id: TypeId,
    /// Fully qualified type name.
    name: &'static str,
    /// Builds a default value of the component.
    construct: fn() -> Erased,
    /// Deep copies a value of the component, `None` if the value is of another type.
    duplicate: fn(&(dyn Any + Send + Sync)) -> Option<Erased>,
}

impl Info {
    /// Build the info for component type `C` under the given id of the registry `origin`.
    pub(crate) fn new<C: Component>(origin: u32, id: Id) -> Self {
        Self {
            origin,
            id,
            type_id: TypeId::of::<C>(),
            name: type_name::<C>(),
            construct: construct::<C>,
            duplicate: duplicate::<C>,
        }
    }

    /// The component id.
    #[inline]
    pub fn id(&self) -> Id {
        self.id
    }

    /// The rust type identity of the component.
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// The fully qualified type name of the component.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The type name without its module path.
    pub fn short_name(&self) -> &'static str {
        short_name(self.name)
    }

    /// Build a default-constructed value of this component.
    #[inline]
    pub(crate) fn construct(&self) -> Erased {
        (self.construct)()
    }

    /// Deep copy a value of this component.
    #[inline]
    pub(crate) fn duplicate(&self, value: &(dyn Any + Send + Sync)) -> Option<Erased> {
        (self.duplicate)(value)
    }
}

impl fmt::Debug for Info {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Info")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish()
    }
}

impl PartialEq for Info {
    fn eq(&self, other: &Self) -> bool {
        self.origin == other.origin && self.id == other.id && self.type_id == other.type_id
    }
}

impl Eq for Info {}

fn construct<C: Component>() -> Erased {
    Box::new(C::default())
}

fn duplicate<C: Component>(value: &(dyn Any + Send + Sync)) -> Option<Erased> {
    value
        .downcast_ref::<C>()
        .map(|value| Box::new(value.clone()) as Erased)
}

/// Strip the module path from a type name, keeping any generic arguments intact.
fn short_name(name: &'static str) -> &'static str {
    let base = name.split('<').next().unwrap_or(name);
    match base.rfind("::") {
        Some(index) => &name[index + 2..],
        None => name,
    }
}

/// A runtime "component type" value.
///
/// Tokens are how a component *type* travels through the dynamic parts of the API (blueprint
/// entries, attach values, detach selectors). A token built with [`Token::of`] knows how to register
/// its component; a token built with [`Token::foreign`] can name any type and only resolves if that
/// type has already been registered as a component.
#[derive(Clone, Copy)]
pub struct Token {
    type_id: TypeId,
    name: &'static str,
    register: Option<fn(&Registry) -> Id>,
}

impl Token {
    /// A token for the component type `C`.
    pub fn of<C: Component>() -> Self {
        Self {
            type_id: TypeId::of::<C>(),
            name: type_name::<C>(),
            register: Some(Registry::register::<C>),
        }
    }

    /// A token for an arbitrary type, which may or may not be a registered component.
    pub fn foreign<T: Any>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: type_name::<T>(),
            register: None,
        }
    }

    /// The rust type identity this token names.
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// The fully qualified type name this token names.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({})", self.name)
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for Token {}

/// A thread-safe component registry. This is responsible for managing component types and their
/// identifiers within a world.
///
/// The registry uses lock-free reads for TypeId→ComponentId lookups via `DashMap`, making the
/// common read path highly performant. Component registration uses minimal locking - only a
/// single shard of the DashMap and a write lock for the component info vector.
///
/// Component ids are only meaningful within the registry that issued them. Every registry carries
/// a process-unique origin, stamped into its [`Info`]s, so infos and handles from another world's
/// registry can be told apart with [`Registry::owns`].
pub struct Registry {
    /// Process-unique identity of this registry.
    origin: u32,

    /// Map from TypeId to component Id. Lock-free reads via sharded concurrent hashmap.
    type_map: DashMap<TypeId, Id>,

    /// List of registered component entries. Protected by RwLock for rare writes.
    components: RwLock<Vec<Option<Info>>>,

    /// Next available component identifier.
    next_id: AtomicU32,
}

static NEXT_ORIGIN: AtomicU32 = AtomicU32::new(0);

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Create a new component registry.
    #[inline]
    pub fn new() -> Self {
        Self {
            origin: NEXT_ORIGIN.fetch_add(1, Ordering::Relaxed),
            type_map: DashMap::new(),
            components: RwLock::new(Vec::new()),
            next_id: AtomicU32::new(0),
        }
    }

    /// Register a new component type and get its unique identifier.
    ///
    /// This method is thread-safe and can be called concurrently. If the component type is
    /// already registered, returns the existing ID. Otherwise, allocates a new ID and stores
    /// the component info.
    pub fn register<C: Component>(&self) -> Id {
        let type_id = TypeId::of::<C>();

        // Fast path: check if already registered (lock-free read)
        if let Some(id) = self.type_map.get(&type_id) {
            return *id;
        }

        // Slow path: the entry API keeps two racing threads from both allocating an id.
        *self
            .type_map
            .entry(type_id)
            .or_insert_with(|| {
                let id = Id(self.next_id.fetch_add(1, Ordering::Relaxed));

                let mut components = self.components.write();
                let index = id.index();
                if index >= components.len() {
                    components.resize(index + 1, None);
                }
                components[index] = Some(Info::new::<C>(self.origin, id));

                id
            })
            .value()
    }

    /// Get the component ID for a provided type `C`, if registered.
    #[inline]
    pub fn get<C: Component>(&self) -> Option<Id> {
        self.get_by_type_id(TypeId::of::<C>())
    }

    /// Get the component ID for a rust type identity, if that type is a registered component.
    #[inline]
    pub fn get_by_type_id(&self, type_id: TypeId) -> Option<Id> {
        self.type_map.get(&type_id).map(|entry| *entry.value())
    }

    /// Get the component info for a provided type `C`, if registered.
    #[inline]
    pub fn get_info<C: Component>(&self) -> Option<Info> {
        let id = self.get::<C>()?;
        self.get_info_by_id(id)
    }

    /// Get component info by ID.
    #[inline]
    pub fn get_info_by_id(&self, id: Id) -> Option<Info> {
        self.components.read().get(id.index()).and_then(|i| *i)
    }

    /// Get component info for a rust type identity, if that type is a registered component.
    #[inline]
    pub fn get_info_by_type_id(&self, type_id: TypeId) -> Option<Info> {
        self.get_by_type_id(type_id)
            .and_then(|id| self.get_info_by_id(id))
    }

    /// Resolve a token to its component info, registering the type when the token knows how.
    pub fn resolve(&self, token: &Token) -> Option<Info> {
        match token.register {
            Some(register) => self.get_info_by_id(register(self)),
            None => self.get_info_by_type_id(token.type_id),
        }
    }

    /// Returns true if the info was issued by this registry.
    #[inline]
    pub fn owns(&self, info: &Info) -> bool {
        info.origin == self.origin && self.get_info_by_id(info.id).as_ref() == Some(info)
    }

    /// Find a registered component by name.
    ///
    /// The fully qualified type name always matches. A short name (no module path) matches only
    /// when exactly one registered component carries it.
    pub fn find(&self, name: &str) -> Option<Info> {
        let components = self.components.read();
        let registered = || components.iter().flatten();

        if let Some(info) = registered().find(|info| info.name == name) {
            return Some(*info);
        }

        let mut matches = registered().filter(|info| info.short_name() == name);
        match (matches.next(), matches.next()) {
            (Some(info), None) => Some(*info),
            _ => None,
        }
    }

    /// The number of registered component types.
    #[inline]
    pub fn len(&self) -> usize {
        self.type_map.len()
    }

    /// Returns true if no component type has been registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.type_map.is_empty()
    }

    /// Get a component specification for a generic type `IS` which implements [`IntoSpec`].
    #[inline]
    pub fn spec<IS: IntoSpec>(&self) -> Spec {
        IS::into_spec(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusty_ecs_macros::Component;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn component_registration() {
        // Given
        #[derive(Component, Clone, Default, Debug)]
        struct Position();

        #[derive(Component, Clone, Default, Debug)]
        struct Velocity();

        let registry = Registry::new();

        // When
        let pos_id = registry.register::<Position>();
        let vel_id = registry.register::<Velocity>();

        // Then
        assert_ne!(pos_id, vel_id);
        assert_eq!(registry.components.read().len(), 2);
        assert_eq!(
            *registry.type_map.get(&TypeId::of::<Position>()).unwrap(),
            pos_id
        );
        assert_eq!(
            *registry.type_map.get(&TypeId::of::<Velocity>()).unwrap(),
            vel_id
        );

        // Then - Registering the same type again should result in the same id
        assert_eq!(registry.register::<Position>(), pos_id);
    }

    #[test]
    fn component_info_retrieval() {
        // Given
        #[derive(Component, Clone, Default, Debug)]
        struct Health();

        let registry = Registry::new();
        let health_id = registry.register::<Health>();

        // When
        let retrieved = registry.get_info::<Health>().unwrap();

        // Then
        assert_eq!(health_id, retrieved.id());
        assert_eq!(retrieved.short_name(), "Health");

        // When - Retrieving a non-registered component
        #[derive(Component, Clone, Default, Debug)]
        struct Mana();

        // Then
        assert!(registry.get_info::<Mana>().is_none());
    }

    #[test]
    fn token_resolution() {
        // Given
        #[derive(Component, Clone, Default, Debug)]
        struct Health();

        let registry = Registry::new();

        // When - A foreign token for a type that is not registered
        let foreign = Token::foreign::<Health>();

        // Then
        assert!(registry.resolve(&foreign).is_none());

        // When - A component token registers on demand
        let info = registry.resolve(&Token::of::<Health>()).unwrap();

        // Then - And the foreign token now resolves too
        assert_eq!(registry.resolve(&foreign), Some(info));
        assert!(registry.resolve(&Token::foreign::<String>()).is_none());
    }

    #[test]
    fn infos_belong_to_their_registry() {
        // Given
        #[derive(Component, Clone, Default, Debug)]
        struct Position;

        #[derive(Component, Clone, Default, Debug)]
        struct Velocity;

        let first = Registry::new();
        let second = Registry::new();
        first.register::<Position>();
        second.register::<Velocity>();
        second.register::<Position>();

        // When
        let position = first.get_info::<Position>().unwrap();
        let velocity = second.get_info::<Velocity>().unwrap();

        // Then - Same id, different registries
        assert_eq!(position.id(), velocity.id());
        assert!(first.owns(&position));
        assert!(!second.owns(&position));
        assert!(!first.owns(&velocity));
        assert_ne!(Some(position), second.get_info::<Position>());
    }

    #[test]
    fn find_by_name() {
        // Given
        mod a {
            #[derive(rusty_ecs_macros::Component, Clone, Default)]
            pub struct Shared;
        }
        mod b {
            #[derive(rusty_ecs_macros::Component, Clone, Default)]
            pub struct Shared;
        }
        #[derive(Component, Clone, Default)]
        struct Unique;

        let registry = Registry::new();
        let a_id = registry.register::<a::Shared>();
        registry.register::<b::Shared>();
        let unique_id = registry.register::<Unique>();

        // Then - Short names resolve only when unambiguous
        assert_eq!(registry.find("Unique").map(|i| i.id()), Some(unique_id));
        assert!(registry.find("Shared").is_none());

        // Then - Full names always resolve
        assert_eq!(
            registry.find(type_name::<a::Shared>()).map(|i| i.id()),
            Some(a_id)
        );
        assert!(registry.find("Missing").is_none());
    }

    #[test]
    fn construct_and_duplicate() {
        // Given
        #[derive(Component, Clone, Default, Debug, PartialEq)]
        struct Health(u32);

        let registry = Registry::new();
        registry.register::<Health>();
        let info = registry.get_info::<Health>().unwrap();

        // When
        let fresh = info.construct();
        let copy = info.duplicate(&Health(12)).unwrap();

        // Then
        assert_eq!(fresh.downcast_ref::<Health>(), Some(&Health(0)));
        assert_eq!(copy.downcast_ref::<Health>(), Some(&Health(12)));
        assert!(info.duplicate(&7u32).is_none());
    }

    #[test]
    fn concurrent_registration() {
        // Given
        #[derive(Component, Clone, Default, Debug)]
        struct Position();

        #[derive(Component, Clone, Default, Debug)]
        struct Velocity();

        #[derive(Component, Clone, Default, Debug)]
        struct Health();

        let registry = Arc::new(Registry::new());

        // When - Multiple threads register components concurrently
        let handles: Vec<_> = (0..12)
            .map(|i| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || match i % 3 {
                    0 => registry.register::<Position>(),
                    1 => registry.register::<Velocity>(),
                    _ => registry.register::<Health>(),
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        // Then - All threads that registered the same type should get the same ID
        let pos_ids: Vec<_> = results.iter().step_by(3).copied().collect();
        let vel_ids: Vec<_> = results.iter().skip(1).step_by(3).copied().collect();
        let health_ids: Vec<_> = results.iter().skip(2).step_by(3).copied().collect();

        assert!(pos_ids.iter().all(|&id| id == pos_ids[0]));
        assert!(vel_ids.iter().all(|&id| id == vel_ids[0]));
        assert!(health_ids.iter().all(|&id| id == health_ids[0]));

        // And all three types have different IDs
        assert_ne!(pos_ids[0], vel_ids[0]);
        assert_ne!(pos_ids[0], health_ids[0]);
        assert_ne!(vel_ids[0], health_ids[0]);
        assert_eq!(registry.len(), 3);
    }
}
