use std::any::TypeId;

use parking_lot::{MappedRwLockReadGuard, MappedRwLockWriteGuard};

use crate::ecs::{
    component::{Component, Handle, Info},
    entity,
    storage::Store,
};

/// The data a system processes in one cycle: the joined tables of its managed component types.
///
/// Only entities that hold *every* managed type appear. Rows are in ascending entity order and
/// every column has one instance per row. The handles are a snapshot taken under the world's
/// entity lock; the instances behind them are live and may be mutated in place.
#[derive(Debug, Default)]
pub struct Collected {
    entities: Vec<entity::Id>,
    columns: Vec<Column>,
}

#[derive(Debug)]
struct Column {
    info: Info,
    handles: Vec<Handle>,
}

impl Collected {
    /// Gather the given component types from the store, keeping only entities present in every
    /// table.
    ///
    /// An empty type list, or a type without a table, yields no entities. Callers must hold the
    /// world's entity lock for reading so no entity is observed mid-mutation.
    pub(crate) fn gather(store: &Store, infos: &[Info]) -> Self {
        let Some(entities) = join(store, infos) else {
            return Self {
                entities: Vec::new(),
                columns: infos.iter().map(|info| Column::empty(*info)).collect(),
            };
        };

        let columns = infos
            .iter()
            .map(|info| {
                let handles = match store.table(info.id()) {
                    Some(table) => entities
                        .iter()
                        .filter_map(|entity| table.get(*entity).cloned())
                        .collect(),
                    None => Vec::new(),
                };
                Column {
                    info: *info,
                    handles,
                }
            })
            .collect();

        Self { entities, columns }
    }

    /// The joined entities, in ascending order.
    #[inline]
    pub fn entities(&self) -> &[entity::Id] {
        &self.entities
    }

    /// The number of joined entities.
    #[inline]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns true if no entity holds every managed type.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// The component types collected, in component id order.
    pub fn components(&self) -> impl Iterator<Item = &Info> {
        self.columns.iter().map(|column| &column.info)
    }

    /// The column of instances for a component type, aligned with [`entities`](Self::entities).
    pub fn column<C: Component>(&self) -> Option<&[Handle]> {
        self.column_index(TypeId::of::<C>())
            .map(|index| self.columns[index].handles.as_slice())
    }

    /// Iterate one collected table: `(entity, instance)` pairs of type `C`.
    ///
    /// Yields nothing if `C` is not a managed type.
    pub fn iter<C: Component>(&self) -> impl Iterator<Item = (entity::Id, &Handle)> {
        self.entities
            .iter()
            .copied()
            .zip(self.column::<C>().unwrap_or_default())
    }

    /// Iterate the joined rows.
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        (0..self.entities.len()).map(move |index| Row {
            collected: self,
            index,
        })
    }

    fn column_index(&self, type_id: TypeId) -> Option<usize> {
        self.columns
            .iter()
            .position(|column| column.info.type_id() == type_id)
    }
}

impl Column {
    fn empty(info: Info) -> Self {
        Self {
            info,
            handles: Vec::new(),
        }
    }
}

/// The entities present in every table, ascending. `None` if there is nothing to join.
///
/// Starts from the smallest table and filters it through the others, so the work is bounded by
/// the smallest live entry count. Only one table guard is held at a time.
fn join(store: &Store, infos: &[Info]) -> Option<Vec<entity::Id>> {
    let mut smallest: Option<(usize, usize)> = None;
    for (index, info) in infos.iter().enumerate() {
        let len = store.table(info.id())?.len();
        if smallest.is_none_or(|(_, least)| len < least) {
            smallest = Some((index, len));
        }
    }
    let (driver, _) = smallest?;

    let mut entities = store.table(infos[driver].id())?.entity_ids();
    for (index, info) in infos.iter().enumerate() {
        if index == driver || entities.is_empty() {
            continue;
        }
        let table = store.table(info.id())?;
        entities.retain(|entity| table.contains(*entity));
    }
    Some(entities)
}

/// One joined entity and its managed instances.
#[derive(Clone, Copy)]
pub struct Row<'a> {
    collected: &'a Collected,
    index: usize,
}

impl<'a> Row<'a> {
    /// The entity of this row.
    #[inline]
    pub fn entity(&self) -> entity::Id {
        self.collected.entities[self.index]
    }

    /// The instance of `C` in this row, if `C` is a managed type.
    pub fn handle<C: Component>(&self) -> Option<&'a Handle> {
        self.collected
            .column::<C>()
            .and_then(|column| column.get(self.index))
    }

    /// Read the component `C` of this row.
    pub fn get<C: Component>(&self) -> Option<MappedRwLockReadGuard<'a, C>> {
        self.handle::<C>().and_then(|handle| handle.get::<C>())
    }

    /// Write the component `C` of this row in place.
    pub fn get_mut<C: Component>(&self) -> Option<MappedRwLockWriteGuard<'a, C>> {
        self.handle::<C>().and_then(|handle| handle.get_mut::<C>())
    }
}
