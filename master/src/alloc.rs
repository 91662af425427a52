//! Id block allocation for replicas.

use mew_ha_core::{IdAllocation, IdCategory, ID_BLOCK_SIZE};
use mew_ha_kernel::IdGeneratorFactory;

use crate::error::{MasterError, MasterResult};

/// Draws fixed-size blocks of ids from the master's generators.
///
/// Needs no execution context and adds no locking: the generators serialize
/// concurrent callers themselves.
pub struct IdBlockAllocator<'a> {
    generators: &'a dyn IdGeneratorFactory,
}

impl<'a> IdBlockAllocator<'a> {
    pub fn new(generators: &'a dyn IdGeneratorFactory) -> Self {
        Self { generators }
    }

    /// Draw [`ID_BLOCK_SIZE`] ids from the generator for `category`.
    pub fn allocate(&self, category: IdCategory) -> MasterResult<IdAllocation> {
        let generator = self.generators.generator_for(category).map_err(|err| {
            tracing::error!(%category, error = %err, "no id generator");
            MasterError::coordination_with(format!("no id generator for {}", category), err)
        })?;

        let mut ids = Vec::with_capacity(ID_BLOCK_SIZE);
        for _ in 0..ID_BLOCK_SIZE {
            let id = generator.next_id().map_err(|err| {
                tracing::error!(%category, drawn = ids.len(), error = %err, "id allocation failed");
                MasterError::coordination_with(format!("failed to allocate {} id", category), err)
            })?;
            ids.push(id);
        }

        // Read after drawing so the replica sees the generator's state
        // including its own block.
        let allocation = IdAllocation::new(ids, generator.high_id(), generator.defrag_count());
        tracing::debug!(
            %category,
            high_id = allocation.high_id(),
            defrag_count = allocation.defrag_count(),
            "id block allocated"
        );
        Ok(allocation)
    }
}
