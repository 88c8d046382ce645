use std::any::Any;
use std::cmp::Ordering;
use std::fmt;

use atomic_refcell::AtomicRefCell;

use super::Component;
use crate::entity::Entity;
use crate::storage::SparseSet;

/// Typed storage for every component of one type.
///
/// Wraps a [`SparseSet`] and remembers the dense slot of the most
/// recently accessed entity, shortcutting repeated lookups of the same
/// component. The cache is an optimization only; it is dropped on any
/// structural change that could move the cached slot.
pub struct Pool<C: Component> {
    set: SparseSet<C>,
    /// Dense slot of the last entity accessed through a caching path.
    cached: Option<(Entity, usize)>,
}

/// The type-erased surface of a [`Pool`].
///
/// Lets a heterogeneous collection of pools be cleared, resized and
/// queried for size without knowing their component types.
pub(crate) trait AnyPool {
    /// Removes the entity's component, if any.
    fn remove(&self, entity: Entity);

    /// The count of stored components.
    fn len(&self) -> usize;

    /// Removes all components.
    fn clear(&self);

    /// Reserves capacity for `additional` more components.
    fn reserve(&self, additional: usize);

    /// The pool as [`Any`], for downcasting to its typed form.
    fn as_any(&self) -> &dyn Any;
}

impl<C: Component> Pool<C> {
    /// Creates a new empty pool.
    pub fn new() -> Self {
        let set = SparseSet::new();
        let cached = None;

        Self { set, cached }
    }

    /// The count of stored components.
    pub fn len(&self) -> usize {
        self.set.len()
    }

    /// Returns `true` if the pool stores no components.
    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// Returns `true` if the pool contains the entity.
    pub fn contains(&self, entity: Entity) -> bool {
        matches!(self.cached, Some((cached, _)) if cached == entity)
            || self.set.contains(entity)
    }

    /// Returns a reference to the entity's component.
    ///
    /// Reads the cache but doesn't update it.
    pub fn get(&self, entity: Entity) -> Option<&C> {
        if let Some((cached, index)) = self.cached {
            if cached == entity {
                return self.set.components().get(index);
            }
        }

        self.set.get(entity)
    }

    /// Returns a mutable reference to the entity's component, caching its
    /// slot for the next access.
    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut C> {
        let index = match self.cached {
            Some((cached, index)) if cached == entity => index,
            _ => {
                let index = self.set.index_of(entity)?;

                self.cached = Some((entity, index));

                index
            }
        };

        self.set.components_mut().get_mut(index)
    }

    /// Inserts a component for an entity.
    ///
    /// Never overwrites: inserting for an entity already in the pool
    /// keeps the stored component.
    pub fn insert(&mut self, entity: Entity, component: C) {
        self.set.insert(entity, component);
        self.cached = self.set.index_of(entity).map(|index| (entity, index));
    }

    /// Returns a mutable reference to the entity's component, inserting
    /// one built by `f` if the entity is not in the pool.
    pub fn get_or_insert_with(&mut self, entity: Entity, f: impl FnOnce() -> C) -> &mut C {
        let index = match self.set.index_of(entity) {
            Some(index) => index,
            None => {
                self.set.insert(entity, f());

                self.set.len() - 1
            }
        };

        self.cached = Some((entity, index));

        &mut self.set.components_mut()[index]
    }

    /// Removes an entity's component, returning it.
    ///
    /// Removing an entity that is not in the pool is a no-op.
    pub fn remove(&mut self, entity: Entity) -> Option<C> {
        let component = self.set.remove(entity)?;

        // the swap may have moved the cached slot
        self.cached = None;

        Some(component)
    }

    /// Removes all components.
    pub fn clear(&mut self) {
        self.set.clear();
        self.cached = None;
    }

    /// Reserves capacity for `additional` more components.
    pub fn reserve(&mut self, additional: usize) {
        self.set.reserve(additional);
    }

    /// Minimizes the memory held by the pool.
    pub fn shrink_to_fit(&mut self) {
        self.set.shrink_to_fit();
    }

    /// Reorders the pool by a comparison over component values.
    pub fn sort_by(&mut self, compare: impl FnMut(&C, &C) -> Ordering) {
        self.set.sort_by(compare);
        self.cached = None;
    }

    /// The entities of the pool, in dense order.
    pub fn entities(&self) -> &[Entity] {
        self.set.entities()
    }

    /// Iterates over the entities and their components.
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &C)> {
        self.set.iter()
    }
}

impl<C: Component> AnyPool for AtomicRefCell<Pool<C>> {
    fn remove(&self, entity: Entity) {
        self.borrow_mut().remove(entity);
    }

    fn len(&self) -> usize {
        self.borrow().len()
    }

    fn clear(&self) {
        self.borrow_mut().clear();
    }

    fn reserve(&self, additional: usize) {
        self.borrow_mut().reserve(additional);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<C: Component + fmt::Debug> fmt::Debug for Pool<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.set, f)
    }
}

impl<C: Component> Default for Pool<C> {
    fn default() -> Self {
        Self::new()
    }
}
