use std::collections::VecDeque;
use std::slice;

use crate::entity::Entity;

/// Allocates and recycles the entities of a [`World`](crate::world::World).
///
/// Freed slot indices are reissued in FIFO order, each reuse carrying the
/// slot's bumped version so stale handles stay invalid.
#[derive(Debug)]
pub struct Entities {
    /// Current version of each slot, indexed by slot index.
    versions: Vec<u32>,
    /// Currently live entities, in no particular order.
    live: Vec<Entity>,
    /// Freed slot indices awaiting reuse.
    recycled: VecDeque<u32>,
    /// The next never-used slot index.
    next_index: u32,
}

impl Entities {
    /// Creates a new empty allocator.
    pub fn new() -> Self {
        let versions = Vec::new();
        let live = Vec::new();
        let recycled = VecDeque::new();
        let next_index = 0;

        Self { versions, live, recycled, next_index }
    }

    /// Creates an allocator with room for `capacity` entities.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut entities = Self::new();

        entities.versions.reserve(capacity);
        entities.live.reserve(capacity);

        entities
    }

    /// The count of live entities.
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Returns `true` if no entities are live.
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// The slot capacity of the version table.
    pub fn capacity(&self) -> usize {
        self.versions.capacity()
    }

    /// Returns `true` if the entity is currently alive.
    ///
    /// Callable with any handle, including [`Entity::null`] (which is
    /// never alive).
    pub fn contains(&self, entity: Entity) -> bool {
        self.versions
            .get(entity.index() as usize)
            .is_some_and(|&version| version == entity.version())
    }

    /// Iterates over the live entities, in no particular order.
    pub fn iter(&self) -> slice::Iter<'_, Entity> {
        self.live.iter()
    }

    /// Allocates a new entity.
    ///
    /// Reuses the oldest freed slot if one is pending, otherwise claims
    /// the next fresh slot, doubling the version table as needed.
    pub fn alloc(&mut self) -> Entity {
        let index = if let Some(index) = self.recycled.pop_front() {
            index
        } else {
            let index = self.next_index;

            self.next_index += 1;

            if index as usize >= self.versions.len() {
                let grown = (self.versions.len() * 2).max(index as usize + 1);

                self.versions.resize(grown, 0);
            }

            index
        };
        let entity = Entity::new(index, self.versions[index as usize]);

        self.live.push(entity);

        entity
    }

    /// Frees an entity, allowing its slot to be reused.
    ///
    /// Bumps the slot version (wrapping at the version width) so the freed
    /// handle immediately fails [`Entities::contains`]. Freeing a handle
    /// that is not alive is a no-op; returns whether the entity was freed.
    pub fn free(&mut self, entity: Entity) -> bool {
        if !self.contains(entity) {
            return false;
        }

        if let Some(position) = self.live.iter().position(|&live| live == entity) {
            self.live.swap_remove(position);
        }

        let index = entity.index();

        self.versions[index as usize] = (entity.version() + 1) & Entity::VERSION_MASK;
        self.recycled.push_back(index);

        true
    }

    /// Reserves capacity for `additional` more entities.
    pub fn reserve(&mut self, additional: usize) {
        self.versions.reserve(additional);
        self.live.reserve(additional);
    }

    /// Releases all allocation state.
    ///
    /// Slot indices restart from zero; handles issued before the call
    /// resolve as dead because the version table they were checked
    /// against is gone.
    pub fn clear(&mut self) {
        self.versions.clear();
        self.versions.shrink_to_fit();
        self.live.clear();
        self.live.shrink_to_fit();
        self.recycled.clear();
        self.next_index = 0;
    }
}

impl Default for Entities {
    fn default() -> Self {
        Self::new()
    }
}
