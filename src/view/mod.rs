//! Iteration over entities sharing a set of components.

use atomic_refcell::AtomicRefCell;

use crate::component::{Component, Pool};
use crate::entity::Entity;
use crate::world::World;

#[cfg(test)]
mod tests;

/// A join over the pools of one or more component types.
///
/// [`View::each`] drives iteration from the pool with the fewest
/// components and visits exactly the entities present in every pool of
/// the set; which pool is smallest never changes the visited set, only
/// how much work it takes to produce.
///
/// Views borrow their pools at iteration time, so a component type may
/// appear at most once per set; a duplicate panics when the pool is
/// borrowed a second time. Visited components may be mutated freely, but
/// destroying entities or removing bound components mid-iteration is out
/// of contract.
pub struct View<'w, S: ComponentSet> {
    pools: S::Pools<'w>,
}

/// A set of component types that can be joined by a [`View`].
///
/// Implemented for tuples of up to 8 component types.
pub trait ComponentSet {
    /// One borrowed pool per component type in the set.
    type Pools<'w>;

    #[doc(hidden)]
    fn bind(world: &mut World) -> Self::Pools<'_>;
}

/// A visitor accepted by [`View::each`].
///
/// Implemented for closures of three shapes: `FnMut(Entity, &mut C...)`,
/// `FnMut(&mut C...)` and `FnMut(Entity)`. The marker `M` is inferred
/// from the closure's signature and only disambiguates the
/// implementations.
pub trait Visitor<T, M> {
    /// Visits one entity of the join.
    fn visit(&mut self, entity: Entity, components: T);
}

/// Marker for visitors that take the entity and its components.
pub struct EntityAndComponents;

/// Marker for visitors that take only the components.
pub struct ComponentsOnly;

/// Marker for visitors that take only the entity.
pub struct EntityOnly;

impl<'w, S: ComponentSet> View<'w, S> {
    pub(crate) fn new(world: &'w mut World) -> Self {
        Self { pools: S::bind(world) }
    }
}

macro_rules! impl_visitor {
    ($(($t:ident, $c:ident)),*) => {
        impl<F, $($t),*> Visitor<($($t,)*), EntityAndComponents> for F
        where
            F: FnMut(Entity, $($t),*),
        {
            fn visit(&mut self, entity: Entity, ($($c,)*): ($($t,)*)) {
                self(entity, $($c),*)
            }
        }

        impl<F, $($t),*> Visitor<($($t,)*), ComponentsOnly> for F
        where
            F: FnMut($($t),*),
        {
            fn visit(&mut self, _entity: Entity, ($($c,)*): ($($t,)*)) {
                self($($c),*)
            }
        }

        impl<F, $($t),*> Visitor<($($t,)*), EntityOnly> for F
        where
            F: FnMut(Entity),
        {
            fn visit(&mut self, entity: Entity, _components: ($($t,)*)) {
                self(entity)
            }
        }
    };
}

impl_visitor!((T0, c0));
impl_visitor!((T0, c0), (T1, c1));
impl_visitor!((T0, c0), (T1, c1), (T2, c2));
impl_visitor!((T0, c0), (T1, c1), (T2, c2), (T3, c3));
impl_visitor!((T0, c0), (T1, c1), (T2, c2), (T3, c3), (T4, c4));
impl_visitor!((T0, c0), (T1, c1), (T2, c2), (T3, c3), (T4, c4), (T5, c5));
impl_visitor!(
    (T0, c0),
    (T1, c1),
    (T2, c2),
    (T3, c3),
    (T4, c4),
    (T5, c5),
    (T6, c6)
);
impl_visitor!(
    (T0, c0),
    (T1, c1),
    (T2, c2),
    (T3, c3),
    (T4, c4),
    (T5, c5),
    (T6, c6),
    (T7, c7)
);

macro_rules! impl_view {
    // generates the if-else chain picking the first smallest pool as the
    // iteration driver
    (@drive $f:ident, $len:ident, [$driver:ident $($rest:ident)*], $all:tt) => {
        if $driver.len() == $len {
            impl_view!(@iterate $f, $len, $driver, $all);
        } else {
            impl_view!(@drive $f, $len, [$($rest)*], $all);
        }
    };
    (@drive $f:ident, $len:ident, [], $all:tt) => {};
    (@iterate $f:ident, $len:ident, $driver:ident, [$(($g:ident, $c:ident))*]) => {
        for i in 0..$len {
            let entity = $driver.entities()[i];

            // fetching from every pool doubles as the membership test
            if let ($(Some($c),)*) = ($($g.get_mut(entity),)*) {
                $f.visit(entity, ($($c,)*));
            }
        }
    };
    ($(($t:ident, $g:ident, $c:ident, $idx:tt)),*) => {
        impl<$($t: Component),*> ComponentSet for ($($t,)*) {
            type Pools<'w> = ($(&'w AtomicRefCell<Pool<$t>>,)*);

            fn bind(world: &mut World) -> Self::Pools<'_> {
                $(world.pools.get_or_insert::<$t>();)*

                let pools = &world.pools;

                ($(
                    // SAFETY: the pool was created above
                    unsafe { pools.get::<$t>().unwrap_unchecked() },
                )*)
            }
        }

        impl<'w, $($t: Component),*> View<'w, ($($t,)*)> {
            /// Calls the visitor for every entity present in all of the
            /// view's pools.
            ///
            /// The visitor may take `(Entity, &mut C...)`, `(&mut C...)`
            /// or `(Entity)`; its signature selects the shape.
            pub fn each<M, F>(&self, mut f: F)
            where
                F: for<'a> Visitor<($(&'a mut $t,)*), M>,
            {
                $(let mut $g = self.pools.$idx.borrow_mut();)*

                let Some(len) = [$($g.len()),*].into_iter().min() else {
                    return;
                };

                if len == 0 {
                    return;
                }

                impl_view!(@drive f, len, [$($g)*], [$(($g, $c))*]);
            }
        }
    };
}

impl_view!((T0, p0, c0, 0));
impl_view!((T0, p0, c0, 0), (T1, p1, c1, 1));
impl_view!((T0, p0, c0, 0), (T1, p1, c1, 1), (T2, p2, c2, 2));
impl_view!(
    (T0, p0, c0, 0),
    (T1, p1, c1, 1),
    (T2, p2, c2, 2),
    (T3, p3, c3, 3)
);
impl_view!(
    (T0, p0, c0, 0),
    (T1, p1, c1, 1),
    (T2, p2, c2, 2),
    (T3, p3, c3, 3),
    (T4, p4, c4, 4)
);
impl_view!(
    (T0, p0, c0, 0),
    (T1, p1, c1, 1),
    (T2, p2, c2, 2),
    (T3, p3, c3, 3),
    (T4, p4, c4, 4),
    (T5, p5, c5, 5)
);
impl_view!(
    (T0, p0, c0, 0),
    (T1, p1, c1, 1),
    (T2, p2, c2, 2),
    (T3, p3, c3, 3),
    (T4, p4, c4, 4),
    (T5, p5, c5, 5),
    (T6, p6, c6, 6)
);
impl_view!(
    (T0, p0, c0, 0),
    (T1, p1, c1, 1),
    (T2, p2, c2, 2),
    (T3, p3, c3, 3),
    (T4, p4, c4, 4),
    (T5, p5, c5, 5),
    (T6, p6, c6, 6),
    (T7, p7, c7, 7)
);
