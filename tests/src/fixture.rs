//! A master wired to the in-memory kernel through probes.

use std::sync::Arc;

use mew_ha_core::{EntityRef, NodeId, RelationshipId, TxKey};
use mew_ha_kernel::memory::{
    LockTable, MemoryIdGeneratorFactory, MemoryKernel, MemoryRelationshipTypeStore,
};
use mew_ha_master::{MasterBuilder, MasterConfig, MasterCoordinator};

use crate::probe::{Probe, ProbeLockManager, ProbeTxManager, ProbeTypeStore};

/// Everything a test needs to drive the master and look behind it.
pub struct Fixture {
    pub master: MasterCoordinator,
    pub probe: Probe,
    pub locks: Arc<LockTable>,
    pub ids: Arc<MemoryIdGeneratorFactory>,
    pub types: Arc<MemoryRelationshipTypeStore>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_config(MasterConfig::default())
    }

    pub fn with_config(config: MasterConfig) -> Self {
        Self::with_kernel(MemoryKernel::new(), config)
    }

    pub fn with_kernel(kernel: MemoryKernel, config: MasterConfig) -> Self {
        let probe = Probe::new();
        let locks = kernel.lock_table();
        let ids = Arc::clone(&kernel.ids);
        let types = Arc::clone(&kernel.types);

        let master = MasterBuilder::new()
            .config(config)
            .transaction_manager(ProbeTxManager::new(kernel.tx, probe.clone()))
            .lock_manager(ProbeLockManager::new(kernel.locks, probe.clone()))
            .lock_releaser(kernel.releaser)
            .id_generators(kernel.ids)
            .relationship_types(Arc::new(ProbeTypeStore::new(kernel.types, probe.clone())))
            .build()
            .unwrap_or_else(|err| panic!("fixture master failed to build: {}", err));

        Self {
            master,
            probe,
            locks,
            ids,
            types,
        }
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

pub fn key(owner_id: u32, local_tx_id: u32) -> TxKey {
    TxKey::new(owner_id, local_tx_id)
}

pub fn node(raw: u64) -> EntityRef {
    NodeId::new(raw).into()
}

pub fn rel(raw: u64) -> EntityRef {
    RelationshipId::new(raw).into()
}
