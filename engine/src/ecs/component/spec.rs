use crate::{
    all_tuples,
    ecs::component::{Component, Id, Registry},
};

/// A specification for a set of component types: the components an entity holds, the components
/// a blueprint builds, or the components a system manages.
///
/// This is a sorted, de-duplicated vector of component IDs, so it can be used as a Hash key and
/// compared regardless of declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Spec {
    ids: Vec<Id>,
}

impl Spec {
    /// An empty component specification.
    pub const EMPTY: Self = Spec { ids: Vec::new() };

    /// Construct a new Spec from the given component IDs.
    #[inline]
    pub fn new(ids: impl Into<Vec<Id>>) -> Self {
        let mut ids = ids.into();
        ids.sort();
        ids.dedup();
        ids.shrink_to_fit();

        Self { ids }
    }

    /// Get the component IDs in this specification.
    #[inline]
    pub fn ids(&self) -> &[Id] {
        &self.ids
    }

    /// Determine if this specification contains the given component ID.
    #[inline]
    pub fn contains(&self, id: Id) -> bool {
        self.ids.binary_search(&id).is_ok()
    }

    /// Determine if this specification contains all component IDs in the other specification.
    #[inline]
    pub fn contains_all(&self, other: &Spec) -> bool {
        other.ids.iter().all(|id| self.contains(*id))
    }

    /// Create a new spec that is the union with the other spec.
    #[inline]
    pub fn union(&self, other: &Spec) -> Self {
        let mut ids = Vec::with_capacity(self.ids.len() + other.ids.len());
        ids.extend_from_slice(&self.ids);
        ids.extend_from_slice(&other.ids);
        Self::new(ids)
    }

    /// Get the components in self that are not in other (set difference).
    #[inline]
    pub fn difference(&self, other: &Spec) -> Self {
        let ids: Vec<_> = self
            .ids
            .iter()
            .copied()
            .filter(|id| !other.contains(*id))
            .collect();
        Self { ids } // Already sorted
    }

    /// Returns true if this spec is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Returns the number of component IDs in this spec.
    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }
}

impl From<Vec<Id>> for Spec {
    #[inline]
    fn from(value: Vec<Id>) -> Self {
        Spec::new(value)
    }
}

impl FromIterator<Id> for Spec {
    fn from_iter<T: IntoIterator<Item = Id>>(iter: T) -> Self {
        Spec::new(iter.into_iter().collect::<Vec<_>>())
    }
}

/// Trait for converting a type into a component specification (`Spec`).
///
/// Component types register themselves with the registry as a side effect.
pub trait IntoSpec<Marker = ()> {
    /// Convert the type into a component specification using the given registry.
    fn into_spec(registry: &Registry) -> Spec;
}

/// [`IntoSpec`] implementation for the empty tuple.
impl IntoSpec for () {
    fn into_spec(_registry: &Registry) -> Spec {
        Spec::EMPTY
    }
}

/// [`IntoSpec`] implementation for single component types.
impl<C: Component> IntoSpec for C {
    fn into_spec(registry: &Registry) -> Spec {
        Spec::new([registry.register::<C>()])
    }
}

/// [`IntoSpec`] implementation for tuples of other [`IntoSpec`] types.
macro_rules! tuple_spec {
    ($($name: ident),*) => {
        impl<$($name: IntoSpec),*> IntoSpec for ($($name,)*) {
            fn into_spec(registry: &Registry) -> Spec {
                let mut ids = Vec::new();
                $(
                    ids.extend(<$name>::into_spec(registry).ids());
                )*
                Spec::new(ids)
            }
        }
    }
}

// Implement the tuple -> Spec for all tuples up to 26 elements.
all_tuples!(tuple_spec);
