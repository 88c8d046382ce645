//! Components and the typed pools that store them.

use std::any::TypeId;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::LazyLock;

use atomic_refcell::AtomicRefCell;
use dashmap::DashMap;

pub use self::pool::*;
use crate::storage::{SparseIndex, SparseMap};

mod pool;

/// A single value attached to an entity.
pub trait Component: 'static {}

impl<C: 'static> Component for C {}

/// A unique identifier for a [`Component`] type.
///
/// Ids are dense, assigned on first use and stable for the lifetime of
/// the process.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct ComponentId(usize);

impl ComponentId {
    pub fn of<C: Component>() -> Self {
        static REGISTRY: LazyLock<DashMap<TypeId, ComponentId>> =
            LazyLock::new(DashMap::new);
        static COUNTER: AtomicUsize = AtomicUsize::new(0);

        *REGISTRY
            .entry(TypeId::of::<C>())
            .or_insert_with(|| Self(COUNTER.fetch_add(1, Ordering::Relaxed)))
    }
}

impl SparseIndex for ComponentId {
    fn sparse_index(&self) -> usize {
        self.0
    }
}

/// Owns one type-erased [`Pool`] per component type in use.
pub(crate) struct Pools {
    inner: SparseMap<ComponentId, Box<dyn AnyPool>>,
}

impl Pools {
    pub fn new() -> Self {
        let inner = SparseMap::new();

        Self { inner }
    }

    /// Returns the pool for `C` if one has been created.
    pub fn get<C: Component>(&self) -> Option<&AtomicRefCell<Pool<C>>> {
        self.inner.get(&ComponentId::of::<C>()).map(|pool| {
            // SAFETY: pools are keyed by `ComponentId`, which is unique
            // per component type
            unsafe { pool.as_any().downcast_ref().unwrap_unchecked() }
        })
    }

    /// Returns the pool for `C`, creating it on first use.
    pub fn get_or_insert<C: Component>(&mut self) -> &AtomicRefCell<Pool<C>> {
        let pool = self.inner.get_or_insert_with(ComponentId::of::<C>(), || {
            Box::new(AtomicRefCell::new(Pool::<C>::new()))
        });

        // SAFETY: as in `Pools::get`
        unsafe { pool.as_any().downcast_ref().unwrap_unchecked() }
    }

    /// Iterates over every pool through its type-erased surface.
    pub fn iter(&self) -> impl Iterator<Item = &dyn AnyPool> {
        self.inner.iter().map(|pool| pool.as_ref())
    }
}

impl fmt::Debug for Pools {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pools").field("len", &self.inner.len()).finish_non_exhaustive()
    }
}

impl Default for Pools {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_ids_are_unique() {
        struct A;
        struct B;

        assert_ne!(ComponentId::of::<A>(), ComponentId::of::<B>());
    }

    #[test]
    fn component_ids_are_stable() {
        struct A;

        assert_eq!(ComponentId::of::<A>(), ComponentId::of::<A>());
    }

    #[test]
    fn pools_are_created_on_first_use() {
        struct A;

        let mut pools = Pools::new();

        assert!(pools.get::<A>().is_none());

        pools.get_or_insert::<A>();

        assert!(pools.get::<A>().is_some());
        assert_eq!(pools.iter().count(), 1);
    }
}
