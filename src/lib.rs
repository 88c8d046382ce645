//! A sparse-set ECS storage engine.
//!
//! Entities are versioned `u32` handles; each component type lives in its
//! own densely packed [`SparseSet`](storage::SparseSet), and
//! [views](view::View) join any number of pools, always driving iteration
//! from the smallest one.
//!
//! All mutation is single-threaded and synchronous. The interior
//! mutability around pools exists to split borrows between pools, not to
//! synchronize threads; mutating a [`World`](world::World) from multiple
//! threads without external synchronization is out of contract.

#![forbid(unsafe_op_in_unsafe_fn)]

pub mod component;
pub mod entity;
pub mod storage;
pub mod view;
pub mod world;

/// Re-export of the most commonly used items in this crate.
pub mod prelude {
    pub use crate::component::*;
    pub use crate::entity::*;
    pub use crate::storage::*;
    pub use crate::view::*;
    pub use crate::world::*;
}
