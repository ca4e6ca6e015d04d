use std::collections::HashMap;

use fixedbitset::FixedBitSet;

use crate::ecs::{component::Handle, entity};

/// Bitsets at least this long are rebuilt on removal once they outgrow the live entries.
pub const COMPACT_THRESHOLD: usize = 1024;

/// The instances of a single component type, keyed by owning entity.
///
/// Alongside the map the table maintains a bitset of member entity indices (bit N set means
/// entity N has an entry) for constant time membership checks. Entity ids are never reused, so the
/// bitset is rebuilt from the live entries whenever it grows past [`COMPACT_THRESHOLD`] and more
/// than four bits per entry. Its length stays bounded by the highest live entity index rather
/// than by every id ever inserted.
#[derive(Debug, Default)]
pub struct Table {
    /// Instances by owning entity.
    entries: HashMap<entity::Id, Handle>,

    /// Membership bitset, indexed by entity index.
    members: FixedBitSet,
}

impl Table {
    /// Construct an empty table.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the instance for `entity`, returning the previous one.
    pub(crate) fn insert(&mut self, entity: entity::Id, instance: Handle) -> Option<Handle> {
        let index = entity.index();
        if index >= self.members.len() {
            self.members.grow(index + 1);
        }
        self.members.insert(index);
        self.entries.insert(entity, instance)
    }

    /// Remove the instance for `entity`, if present.
    pub(crate) fn remove(&mut self, entity: entity::Id) -> Option<Handle> {
        let removed = self.entries.remove(&entity)?;
        self.members.set(entity.index(), false);
        if self.members.len() >= COMPACT_THRESHOLD && self.members.len() > 4 * self.entries.len() {
            self.compact();
        }
        Some(removed)
    }

    /// Rebuild the bitset to just cover the highest live entity index.
    fn compact(&mut self) {
        let len = self
            .entries
            .keys()
            .map(|entity| entity.index() + 1)
            .max()
            .unwrap_or(0);
        let mut members = FixedBitSet::with_capacity(len);
        for entity in self.entries.keys() {
            members.insert(entity.index());
        }
        self.members = members;
    }

    /// Get the instance for `entity`, if present.
    #[inline]
    pub fn get(&self, entity: entity::Id) -> Option<&Handle> {
        self.entries.get(&entity)
    }

    /// Returns true if `entity` has an instance in this table.
    #[inline]
    pub fn contains(&self, entity: entity::Id) -> bool {
        self.members.contains(entity.index())
    }

    /// The membership bitset of this table.
    #[inline]
    pub fn members(&self) -> &FixedBitSet {
        &self.members
    }

    /// The member entities in ascending id order.
    pub fn entity_ids(&self) -> Vec<entity::Id> {
        let mut ids: Vec<_> = self.entries.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Iterate `(entity, instance)` pairs in ascending entity order.
    pub fn iter(&self) -> impl Iterator<Item = (entity::Id, &Handle)> + '_ {
        self.entity_ids()
            .into_iter()
            .filter_map(|entity| self.entries.get(&entity).map(|handle| (entity, handle)))
    }

    /// The number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table has no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
