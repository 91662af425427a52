//! MEW HA Kernel
//!
//! The collaborators the master coordination core drives, at their
//! interface only:
//! - TransactionManager: begin/suspend/resume/commit/rollback of one bound context
//! - LockManager and LockReleaser: typed entity locks tied to a context
//! - IdGeneratorFactory: per-category monotonic id generators
//! - RelationshipTypeStore: the relationship type table
//!
//! The `memory` module holds an in-memory implementation of each.

mod error;
pub mod memory;
mod traits;

pub use error::{KernelError, KernelResult};
pub use traits::{
    IdGenerator, IdGeneratorFactory, LockManager, LockReleaser, RelationshipTypeStore,
    TransactionManager,
};
