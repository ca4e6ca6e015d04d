//! Archetypes: reusable blueprints for constructing entities with a predetermined component set.
//!
//! A [`Blueprint`] is an ordered, immutable list of entries. Each entry is either a component type
//! (default-constructed per entity) or a prototype instance (deep-copied per entity). Instantiating
//! a blueprint through the [`Factory`] always produces a fresh entity with fresh instances; two
//! entities built from the same blueprint never share a component.
//!
//! Resolving a blueprint's entries against the component registry (its "type construction") is
//! memoized as a [`Kind`] in a bounded LRU keyed by blueprint identity and subtype name.

pub mod cache;
mod factory;

use std::{
    any::Any,
    collections::HashMap,
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use crate::ecs::component::{Component, Erased, Info, Spec, Token};

pub use factory::Factory;

/// Source of blueprint identities. Blueprints are process-wide values so their ids are too.
static NEXT_BLUEPRINT: AtomicU64 = AtomicU64::new(0);

/// The identity of a blueprint, shared by all of its clones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id(u64);

impl Id {
    /// The raw id value.
    #[inline]
    pub const fn raw(&self) -> u64 {
        self.0
    }
}

/// One entry of a blueprint.
pub enum Entry {
    /// A component type, default-constructed for every entity.
    Type(Token),

    /// A typed prototype instance, deep-copied for every entity.
    Instance(Token, Erased),

    /// A prototype of unknown type. It must be an instance of a registered component when the
    /// blueprint is instantiated.
    Erased(Erased),
}

impl Entry {
    /// A short description of the entry for logs and errors.
    pub fn describe(&self) -> String {
        match self {
            Entry::Type(token) => format!("type {}", token.name()),
            Entry::Instance(token, _) => token.name().to_owned(),
            Entry::Erased(_) => "erased value".to_owned(),
        }
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entry({})", self.describe())
    }
}

/// An immutable, cheaply cloneable archetype blueprint.
///
/// Clones share the same identity and the same entries.
#[derive(Clone)]
pub struct Blueprint {
    inner: Arc<Inner>,
}

struct Inner {
    id: Id,
    entries: Vec<Entry>,
}

impl Blueprint {
    /// Build a blueprint from a list of entries.
    pub fn new(entries: Vec<Entry>) -> Self {
        Self {
            inner: Arc::new(Inner {
                id: Id(NEXT_BLUEPRINT.fetch_add(1, Ordering::Relaxed)),
                entries,
            }),
        }
    }

    /// Start an empty blueprint builder.
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// The identity of this blueprint.
    #[inline]
    pub fn id(&self) -> Id {
        self.inner.id
    }

    /// The entries, in declaration order.
    #[inline]
    pub fn entries(&self) -> &[Entry] {
        &self.inner.entries
    }

    /// The number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    /// Returns true if the blueprint has no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }
}

impl fmt::Debug for Blueprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blueprint")
            .field("id", &self.inner.id)
            .field("entries", &self.inner.entries)
            .finish()
    }
}

/// Accumulates blueprint entries in order.
#[derive(Default)]
pub struct Builder {
    entries: Vec<Entry>,
}

impl Builder {
    /// Add a component type to default-construct.
    pub fn component<C: Component>(mut self) -> Self {
        self.entries.push(Entry::Type(Token::of::<C>()));
        self
    }

    /// Add a prototype instance to copy.
    pub fn instance<C: Component>(mut self, prototype: C) -> Self {
        self.entries
            .push(Entry::Instance(Token::of::<C>(), Box::new(prototype)));
        self
    }

    /// Add a prototype whose type is only checked at instantiation.
    pub fn erased(mut self, prototype: impl Any + Send + Sync) -> Self {
        self.entries.push(Entry::Erased(Box::new(prototype)));
        self
    }

    /// Add a prepared entry.
    pub fn entry(mut self, entry: Entry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Finish the blueprint, issuing its identity.
    pub fn build(self) -> Blueprint {
        Blueprint::new(self.entries)
    }
}

/// An extra named attribute grafted onto an entity at construction.
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<bool> for Attribute {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Attribute {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Attribute {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Attribute {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for Attribute {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Named attributes by name.
pub type Attributes = HashMap<String, Attribute>;

/// A resolved blueprint: the component type of every entry, and optionally a subtype name.
///
/// Entities built from a named instantiation carry their kind, so `kind.name()` reads as the
/// entity's type.
#[derive(Debug)]
pub struct Kind {
    name: Option<String>,
    blueprint: Id,
    components: Vec<Info>,
}

impl Kind {
    pub(crate) fn new(name: Option<String>, blueprint: Id, components: Vec<Info>) -> Self {
        Self {
            name,
            blueprint,
            components,
        }
    }

    /// The subtype name, if the kind was built with one.
    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The blueprint this kind was resolved from.
    #[inline]
    pub fn blueprint(&self) -> Id {
        self.blueprint
    }

    /// The component type of each blueprint entry, in entry order.
    #[inline]
    pub fn components(&self) -> &[Info] {
        &self.components
    }

    /// The set of component types an entity of this kind starts with.
    pub fn spec(&self) -> Spec {
        self.components.iter().map(Info::id).collect()
    }
}

#[cfg(test)]
mod tests {
    use rusty_ecs_macros::Component;

    use super::*;

    #[derive(Component, Clone, Default, Debug, PartialEq)]
    struct Position(f32);

    #[test]
    fn clones_share_identity() {
        // Given
        let blueprint = Blueprint::builder()
            .component::<Position>()
            .instance(Position(3.0))
            .erased(7u32)
            .build();

        // When
        let clone = blueprint.clone();
        let other = Blueprint::builder().component::<Position>().build();

        // Then
        assert_eq!(clone.id(), blueprint.id());
        assert_ne!(other.id(), blueprint.id());
        assert_eq!(blueprint.len(), 3);
        assert!(matches!(blueprint.entries()[0], Entry::Type(_)));
        assert_eq!(blueprint.entries()[2].describe(), "erased value");
    }

    #[test]
    fn attributes_convert() {
        let attributes: Attributes = [
            ("alive".to_owned(), Attribute::from(true)),
            ("name".to_owned(), Attribute::from("orc")),
        ]
        .into_iter()
        .collect();

        assert_eq!(attributes["alive"], Attribute::Bool(true));
        assert_eq!(attributes["name"], Attribute::Text("orc".to_owned()));
    }
}
