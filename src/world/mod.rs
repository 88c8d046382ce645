//! Defines the [`World`], the facade over entity and component storage.

use std::fmt;
use std::mem;
use std::ops::{Deref, DerefMut};
use std::slice;

use atomic_refcell::{AtomicRef, AtomicRefMut};
use thiserror::Error;

use crate::component::{AnyPool, Component, Pools};
use crate::entity::{Entities, Entity, EntityNotFound};
use crate::view::{ComponentSet, View};


/// Stores all entities and routes component operations to their per-type
/// pools.
///
/// Every component operation checks the entity first and reports
/// [`EntityNotFound`] for dead handles before touching any pool; the
/// pools themselves never see an invalid entity through this surface.
#[derive(Debug)]
pub struct World {
    pub(crate) entities: Entities,
    pub(crate) pools: Pools,
}

/// An iterator over the live entities of a [`World`].
#[derive(Clone)]
pub struct EntitiesIter<'w> {
    inner: slice::Iter<'w, Entity>,
}

/// A shared borrow of one entity's component.
pub struct Comp<'w, C: Component> {
    inner: AtomicRef<'w, C>,
}

/// A unique borrow of one entity's component.
pub struct CompMut<'w, C: Component> {
    inner: AtomicRefMut<'w, C>,
}

/// An error when accessing a component of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ComponentError {
    /// The entity is not alive.
    #[error(transparent)]
    EntityNotFound(#[from] EntityNotFound),
    /// The entity is alive but has no component of the requested type.
    #[error("missing component for {0:?}")]
    MissingComponent(Entity),
}

impl World {
    /// Creates a new empty world.
    pub fn new() -> Self {
        let entities = Entities::new();
        let pools = Pools::new();

        Self { entities, pools }
    }

    /// Creates a world with room for `capacity` entities.
    pub fn with_capacity(capacity: usize) -> Self {
        let entities = Entities::with_capacity(capacity);
        let pools = Pools::new();

        Self { entities, pools }
    }

    /// The count of live entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if no entities are live.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// The slot capacity of the entity allocator.
    pub fn capacity(&self) -> usize {
        self.entities.capacity()
    }

    /// Returns `true` if the entity is currently alive.
    pub fn contains(&self, entity: Entity) -> bool {
        self.entities.contains(entity)
    }

    /// Iterates over the live entities, in no particular order.
    pub fn iter(&self) -> EntitiesIter<'_> {
        EntitiesIter { inner: self.entities.iter() }
    }

    /// Creates a new entity without components.
    pub fn spawn(&mut self) -> Entity {
        self.entities.alloc()
    }

    /// Destroys an entity and all of its components.
    ///
    /// Returns an error if the entity is not alive.
    pub fn despawn(&mut self, entity: Entity) -> Result<(), EntityNotFound> {
        self.check(entity)?;

        for pool in self.pools.iter() {
            pool.remove(entity);
        }

        self.entities.free(entity);

        Ok(())
    }

    /// Inserts a component for an entity, creating the pool for `C` on
    /// first use.
    ///
    /// Never overwrites: inserting a component the entity already has
    /// keeps the stored value (see [`World::replace`]).
    pub fn insert<C: Component>(
        &mut self,
        entity: Entity,
        component: C,
    ) -> Result<(), EntityNotFound> {
        self.check(entity)?;

        self.pools.get_or_insert::<C>().borrow_mut().insert(entity, component);

        Ok(())
    }

    /// Inserts or overwrites a component for an entity.
    ///
    /// Returns the previous component if there was one.
    pub fn replace<C: Component>(
        &mut self,
        entity: Entity,
        component: C,
    ) -> Result<Option<C>, EntityNotFound> {
        self.check(entity)?;

        let mut pool = self.pools.get_or_insert::<C>().borrow_mut();

        if let Some(slot) = pool.get_mut(entity) {
            Ok(Some(mem::replace(slot, component)))
        } else {
            pool.insert(entity, component);

            Ok(None)
        }
    }

    /// Borrows the entity's component, inserting one built by `f` if the
    /// entity doesn't have it yet.
    pub fn get_or_insert_with<C: Component>(
        &mut self,
        entity: Entity,
        f: impl FnOnce() -> C,
    ) -> Result<CompMut<'_, C>, EntityNotFound> {
        self.check(entity)?;

        let pool = self.pools.get_or_insert::<C>().borrow_mut();
        let inner = AtomicRefMut::map(pool, |pool| pool.get_or_insert_with(entity, f));

        Ok(CompMut { inner })
    }

    /// Borrows an entity's component.
    ///
    /// Returns an error if the entity is dead or doesn't have the
    /// component.
    pub fn get<C: Component>(&self, entity: Entity) -> Result<Comp<'_, C>, ComponentError> {
        self.check(entity)?;

        let pool = self
            .pools
            .get::<C>()
            .ok_or(ComponentError::MissingComponent(entity))?
            .borrow();

        AtomicRef::filter_map(pool, |pool| pool.get(entity))
            .map(|inner| Comp { inner })
            .ok_or(ComponentError::MissingComponent(entity))
    }

    /// Mutably borrows an entity's component.
    ///
    /// Returns an error if the entity is dead or doesn't have the
    /// component.
    pub fn get_mut<C: Component>(
        &mut self,
        entity: Entity,
    ) -> Result<CompMut<'_, C>, ComponentError> {
        self.check(entity)?;

        let pool = self
            .pools
            .get::<C>()
            .ok_or(ComponentError::MissingComponent(entity))?
            .borrow_mut();

        AtomicRefMut::filter_map(pool, |pool| pool.get_mut(entity))
            .map(|inner| CompMut { inner })
            .ok_or(ComponentError::MissingComponent(entity))
    }

    /// Returns `true` if the entity is alive and has a component of type
    /// `C`.
    pub fn has<C: Component>(&self, entity: Entity) -> bool {
        self.entities.contains(entity)
            && self
                .pools
                .get::<C>()
                .is_some_and(|pool| pool.borrow().contains(entity))
    }

    /// Removes an entity's component, returning it.
    ///
    /// Fire-and-forget: removing from a dead entity, or removing a
    /// component the entity doesn't have, is a no-op.
    pub fn remove<C: Component>(&mut self, entity: Entity) -> Option<C> {
        if !self.entities.contains(entity) {
            return None;
        }

        self.pools.get::<C>()?.borrow_mut().remove(entity)
    }

    /// Returns a view over the entities that have every component type in
    /// `S`, creating missing pools on first use.
    pub fn view<S: ComponentSet>(&mut self) -> View<'_, S> {
        View::new(self)
    }

    /// Reserves capacity for `additional` more entities in the allocator
    /// and in every pool.
    pub fn reserve(&mut self, additional: usize) {
        self.entities.reserve(additional);

        for pool in self.pools.iter() {
            pool.reserve(additional);
        }
    }

    /// Destroys all entities and components.
    ///
    /// Pools stay registered; entity indices restart from zero and every
    /// previously issued handle resolves as dead.
    pub fn clear(&mut self) {
        for pool in self.pools.iter() {
            pool.clear();
        }

        self.entities.clear();
    }

    fn check(&self, entity: Entity) -> Result<(), EntityNotFound> {
        if self.entities.contains(entity) {
            Ok(())
        } else {
            Err(EntityNotFound(entity))
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for EntitiesIter<'_> {
    type Item = Entity;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().copied()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for EntitiesIter<'_> {}

impl<C: Component> Deref for Comp<'_, C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.inner
    }
}

impl<C: Component> Deref for CompMut<'_, C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.inner
    }
}

impl<C: Component> DerefMut for CompMut<'_, C> {
    fn deref_mut(&mut self) -> &mut C {
        &mut self.inner
    }
}

impl<C: Component + fmt::Debug> fmt::Debug for Comp<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.inner, f)
    }
}

impl<C: Component + fmt::Debug> fmt::Debug for CompMut<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.inner, f)
    }
}
