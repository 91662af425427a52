//! In-memory reference kernel.
//!
//! Single-process implementations of every collaborator the master drives.
//! Used to run the coordination core end to end and in tests.

mod ids;
mod locks;
mod tx;
mod types;

use std::sync::Arc;

use mew_ha_core::IdCategory;

pub use ids::{MemoryIdGenerator, MemoryIdGeneratorFactory};
pub use locks::{LockTable, MemoryLockManager, MemoryLockReleaser};
pub use tx::{ContextState, MemoryTxManager};
pub use types::MemoryRelationshipTypeStore;

/// A full set of in-memory collaborators wired to one lock table.
pub struct MemoryKernel {
    pub tx: MemoryTxManager,
    pub locks: MemoryLockManager,
    pub releaser: MemoryLockReleaser,
    pub ids: Arc<MemoryIdGeneratorFactory>,
    pub types: Arc<MemoryRelationshipTypeStore>,
    table: Arc<LockTable>,
}

impl MemoryKernel {
    pub fn new() -> Self {
        Self::with_ids(MemoryIdGeneratorFactory::new())
    }

    /// A kernel over the given generators. Relationship type ids come from
    /// the factory's relationship-type generator when it has one.
    pub fn with_ids(ids: MemoryIdGeneratorFactory) -> Self {
        let table = Arc::new(LockTable::new());
        let type_ids = ids
            .generator(IdCategory::RelationshipType)
            .unwrap_or_else(|| Arc::new(MemoryIdGenerator::new()));

        Self {
            tx: MemoryTxManager::new(Arc::clone(&table)),
            locks: MemoryLockManager::new(Arc::clone(&table)),
            releaser: MemoryLockReleaser::new(Arc::clone(&table)),
            ids: Arc::new(ids),
            types: Arc::new(MemoryRelationshipTypeStore::new(type_ids)),
            table,
        }
    }

    /// The lock table shared by the lock manager, releaser and
    /// transaction manager.
    pub fn lock_table(&self) -> Arc<LockTable> {
        Arc::clone(&self.table)
    }
}

impl Default for MemoryKernel {
    fn default() -> Self {
        Self::new()
    }
}
