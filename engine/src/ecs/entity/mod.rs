//! Entity management for the ECS (Entity Component System).
//!
//! This module provides the entity identifier, its allocator, the per-entity slot map and the
//! registry that mediates attach/detach against the component store.
//!
//! # Architecture
//!
//! - **[`Id`]**: An opaque, monotonically increasing identifier. Identifiers are never reissued,
//!   even after the entity is destroyed, so a stale identifier can never alias a newer entity.
//!
//! - **[`Allocator`]**: Hands out identifiers from an atomic counter.
//!
//! - **[`Entity`]**: The identifier plus its named slots: at most one attached component
//!   instance per component type, an optional archetype [`Kind`](crate::ecs::archetype::Kind)
//!   and any extra attributes grafted on at construction.
//!
//! - **[`Registry`]**: The live entities of a world, with the create/attach/detach/destroy
//!   operations that keep entities and the component store consistent.
//!
//! - **[`Selector`]**: What to detach: a component type, an instance, a name, or several.

mod registry;
mod selector;

use std::{
    collections::HashMap,
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use crate::ecs::{
    archetype::{Attribute, Attributes, Kind},
    component::{self, Handle},
};

pub use registry::Registry;
pub use selector::Selector;

/// An entity identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id(u64);

impl Id {
    /// Construct an entity id from its raw value.
    #[inline]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw id value.
    #[inline]
    pub const fn raw(&self) -> u64 {
        self.0
    }

    /// Get the index of this entity if it were to live in indexable storage (e.g. a bitset)
    #[inline]
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl From<u64> for Id {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An allocator for entity identifiers.
///
/// Identifiers come from a monotonically increasing counter and are retired permanently once
/// issued. There is no dead pool.
#[derive(Default, Debug)]
pub struct Allocator {
    /// Next fresh ID to allocate.
    next_id: AtomicU64,
}

impl Allocator {
    /// Construct a new entity allocator starting from ID 0.
    #[inline]
    pub const fn new() -> Self {
        Self {
            next_id: AtomicU64::new(0),
        }
    }

    /// Allocate a new, never before issued entity id.
    #[inline]
    pub fn alloc(&self) -> Id {
        Id(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// The number of ids issued so far.
    #[inline]
    pub fn issued(&self) -> u64 {
        self.next_id.load(Ordering::Relaxed)
    }
}

/// A live entity: its id and the component instances attached to it.
#[derive(Debug)]
pub struct Entity {
    /// The unique identifier of the entity.
    id: Id,

    /// Attached instances, exactly one per component type.
    slots: HashMap<component::Id, Handle>,

    /// The archetype subtype this entity was built as, if it was built from a named blueprint.
    kind: Option<Arc<Kind>>,

    /// Extra named attributes grafted on at construction.
    attributes: Attributes,
}

impl Entity {
    /// Construct an entity with no components attached.
    pub(crate) fn new(id: Id) -> Self {
        Self {
            id,
            slots: HashMap::new(),
            kind: None,
            attributes: Attributes::new(),
        }
    }

    /// Get the id of this entity.
    #[inline]
    pub fn id(&self) -> Id {
        self.id
    }

    /// The instance occupying the slot for `component`, if any.
    #[inline]
    pub fn get(&self, component: component::Id) -> Option<&Handle> {
        self.slots.get(&component)
    }

    /// Returns true if a component of type `component` is attached.
    #[inline]
    pub fn has(&self, component: component::Id) -> bool {
        self.slots.contains_key(&component)
    }

    /// The set of component types currently attached.
    pub fn spec(&self) -> component::Spec {
        self.slots.keys().copied().collect()
    }

    /// Iterate the attached instances.
    pub fn components(&self) -> impl Iterator<Item = &Handle> {
        self.slots.values()
    }

    /// The number of attached components.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if nothing is attached.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The archetype subtype of this entity, if it was built from a named blueprint.
    #[inline]
    pub fn kind(&self) -> Option<&Arc<Kind>> {
        self.kind.as_ref()
    }

    /// The name of this entity's subtype, if any.
    pub fn kind_name(&self) -> Option<&str> {
        self.kind.as_ref().and_then(|kind| kind.name())
    }

    /// Look up an extra attribute by name.
    #[inline]
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// All extra attributes.
    #[inline]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub(crate) fn set_kind(&mut self, kind: Arc<Kind>) {
        self.kind = Some(kind);
    }

    pub(crate) fn merge_attributes(&mut self, attributes: Attributes) {
        self.attributes.extend(attributes);
    }

    /// Place an instance into its slot, returning the previous occupant.
    pub(crate) fn insert(&mut self, instance: Handle) -> Option<Handle> {
        self.slots.insert(instance.id(), instance)
    }

    /// Take the instance out of the slot for `component`.
    pub(crate) fn remove(&mut self, component: component::Id) -> Option<Handle> {
        self.slots.remove(&component)
    }

    /// Take every instance out of the entity.
    pub(crate) fn drain(&mut self) -> impl Iterator<Item = Handle> + '_ {
        self.slots.drain().map(|(_, handle)| handle)
    }
}

#[test]
fn allocator_uniqueness() {
    // Given
    let allocator = Allocator::default();

    // When
    let mut entities: Vec<_> = (0..200).map(|_| allocator.alloc()).collect();

    // Then - No dupes generated
    let pre_len = entities.len();
    entities.sort();
    entities.dedup();
    assert_eq!(pre_len, entities.len());
    assert_eq!(allocator.issued(), 200);
}

#[test]
fn allocator_is_monotonic() {
    // Given
    let allocator = Allocator::new();

    // When
    let e1 = allocator.alloc();
    let e2 = allocator.alloc();
    let e3 = allocator.alloc();

    // Then - Sequential ids, never reused
    assert_eq!(e1, Id(0));
    assert_eq!(e2, Id(1));
    assert_eq!(e3, Id(2));
}

#[test]
fn concurrent_allocation() {
    // Given
    let allocator = Arc::new(Allocator::new());

    // When
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let allocator = Arc::clone(&allocator);
            std::thread::spawn(move || (0..100).map(|_| allocator.alloc()).collect::<Vec<_>>())
        })
        .collect();
    let mut ids: Vec<_> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();

    // Then
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 800);
}

#[test]
fn id_display_and_index() {
    // Given
    let id = Id::from(42);

    // Then
    assert_eq!(id.to_string(), "#42");
    assert_eq!(id.index(), 42);
    assert_eq!(id.raw(), 42);
}
