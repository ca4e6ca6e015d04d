//! Component management for the ECS.
//!
//! This module provides the infrastructure for registering component types and for holding
//! component instances. Components are behavior-free data containers that can be attached to
//! entities.
//!
//! ## Architecture
//!
//! The component system consists of several key types:
//!
//! - [`Component`]: The trait that all component types must implement
//! - [`Id`]: A unique identifier issued when a component type is registered
//! - [`Registry`]: Thread-safe registration and lookup of component types
//! - [`Info`]: Metadata about a component type (names, constructor, duplicator)
//! - [`Token`]: A runtime "component type" value used at the dynamic boundary
//! - [`Handle`]: A shared component instance with its owning-entity back reference
//! - [`Value`]: Anything that may be handed to create/attach (instance, handle, type, erased)
//! - [`Spec`]: A specification describing a set of component types
//!
//! ## Thread Safety
//!
//! The [`Registry`] is designed for concurrent access:
//! - Lock-free reads for component ID lookups using `DashMap`
//! - Minimal locking for registration (only when a new type is first registered)
//! - Component registration is idempotent and thread-safe
//!
//! Each [`Handle`] guards its value with its own read/write lock, so systems running on different
//! threads can mutate distinct instances without contending on the store.
//!
//! ## Usage
//!
//! ```ignore
//! use rusty_ecs::ecs::component::{Component, Registry};
//!
//! #[derive(Component, Clone, Default)]
//! struct Position { x: f32, y: f32 }
//!
//! let registry = Registry::new();
//! let pos_id = registry.register::<Position>();
//! ```

mod handle;
mod registry;
mod set;
mod spec;
mod value;

pub use handle::{Handle, Instance};
pub(crate) use registry::Erased;
pub use registry::{Info, Registry, Token};
pub use set::Set;
pub use spec::{IntoSpec, Spec};
pub use value::Value;

/// A component identifier. This is a unique identifier for a component type within a
/// [`Registry`], issued at registration time.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id(u32);

impl Id {
    /// Construct a new component Id from a raw u32 value.
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the index of this component if it were to live in indexable storage (e.g. Vec)
    #[inline]
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for Id {
    #[inline]
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

/// A trait representing a component in the ECS (Entity Component System).
///
/// Components are plain data. `Default` lets a component type stand in for an instance (it is
/// default-constructed on demand), and `Clone` lets blueprints hand every constructed entity its
/// own copy of a prototype instance.
///
/// Implement it with `#[derive(Component)]`.
pub trait Component: 'static + Sized + Send + Sync + Clone + Default {}
