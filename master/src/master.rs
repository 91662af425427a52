//! The master's boundary operations.

use std::sync::Arc;

use mew_ha_core::{
    ContextHandle, EntityRef, IdAllocation, IdCategory, LockKind, LockOutcome, RelationshipTypeId,
    Response, SlaveContext, TransactionStream, TxKey,
};
use mew_ha_kernel::memory::MemoryKernel;
use mew_ha_kernel::{
    IdGeneratorFactory, LockManager, LockReleaser, RelationshipTypeStore, TransactionManager,
};
use parking_lot::Mutex;

use crate::alloc::IdBlockAllocator;
use crate::config::MasterConfig;
use crate::contexts::ActiveContexts;
use crate::error::{MasterError, MasterResult};
use crate::intern::NameInterner;
use crate::lock::LockCoordinator;
use crate::switch::{Engine, SwitchGuard};

/// Operations a replica calls on the master.
///
/// Every response carries a change stream for the replica to apply; the
/// master does not stream changes yet, so it is always empty.
pub trait Master {
    fn acquire_read_lock(
        &self,
        context: SlaveContext,
        local_tx_id: u32,
        entities: &[EntityRef],
    ) -> MasterResult<Response<LockOutcome>>;

    fn acquire_write_lock(
        &self,
        context: SlaveContext,
        local_tx_id: u32,
        entities: &[EntityRef],
    ) -> MasterResult<Response<LockOutcome>>;

    fn allocate_ids(
        &self,
        context: SlaveContext,
        category: IdCategory,
    ) -> MasterResult<Response<IdAllocation>>;

    fn create_relationship_type(
        &self,
        context: SlaveContext,
        local_tx_id: u32,
        name: &str,
    ) -> MasterResult<Response<RelationshipTypeId>>;

    /// Apply a replica's transaction to the master and commit it.
    /// Returns the committed transaction id per resource.
    fn commit_transaction(
        &self,
        context: SlaveContext,
        local_tx_id: u32,
        streams: Vec<(String, TransactionStream)>,
    ) -> MasterResult<Response<Vec<(String, u64)>>>;

    fn rollback_transaction(&self, context: SlaveContext, local_tx_id: u32)
        -> MasterResult<Response<()>>;

    /// Changes committed on the master since the replica last pulled.
    fn pull_updates(&self, context: SlaveContext) -> MasterResult<Response<()>>;
}

/// Runs remote transactions on one shared engine.
///
/// Each operation holds the engine lock from resolving the key's context
/// until the previous binding is restored, so operations from different
/// replicas never interleave on the engine. Id allocation and type lookups
/// do not need the engine and skip the lock.
pub struct MasterCoordinator {
    config: MasterConfig,
    engine: Mutex<Engine>,
    ids: Arc<dyn IdGeneratorFactory>,
    types: Arc<dyn RelationshipTypeStore>,
}

impl MasterCoordinator {
    pub fn builder() -> MasterBuilder {
        MasterBuilder::new()
    }

    pub fn config(&self) -> &MasterConfig {
        &self.config
    }

    /// Lock `entities` in order for the transaction `key`, beginning its
    /// context if this is the first time the master sees it.
    pub fn acquire_locks(
        &self,
        key: TxKey,
        kind: LockKind,
        entities: &[EntityRef],
    ) -> MasterResult<LockOutcome> {
        let mut engine = self.engine.lock();
        let mut guard = SwitchGuard::enter(&mut engine, key)?;
        let context = guard.target();

        let outcome = {
            let engine = guard.engine();
            LockCoordinator::new(engine.locks.as_ref(), engine.releaser.as_ref())
                .acquire(context, kind, entities)
        };
        if self.config.log_lock_batches {
            if let Ok(LockOutcome::Granted) = &outcome {
                tracing::debug!(%key, %context, %kind, count = entities.len(), "lock batch granted");
            }
        }
        guard.finish(outcome)
    }

    /// Draw a block of fresh ids. Needs no context.
    pub fn allocate_ids(&self, category: IdCategory) -> MasterResult<IdAllocation> {
        IdBlockAllocator::new(self.ids.as_ref()).allocate(category)
    }

    /// Id for the relationship type `name`, creating it if needed.
    ///
    /// Existing types are a plain lookup. A new type is created under the
    /// context of `key`, like any other work done for that transaction.
    pub fn intern_relationship_type(&self, key: TxKey, name: &str) -> MasterResult<RelationshipTypeId> {
        let interner = NameInterner::new(self.types.as_ref());
        if let Some(id) = interner.lookup(name) {
            return Ok(id);
        }

        let mut engine = self.engine.lock();
        let mut guard = SwitchGuard::enter(&mut engine, key)?;
        let created = interner.create(name, guard.engine().tx.as_ref());
        if let Ok(id) = &created {
            tracing::debug!(%key, name, id, "relationship type interned");
        }
        guard.finish(created)
    }

    /// Commit the transaction `key` with the changes the replica streamed.
    ///
    /// Applying streamed changes is not implemented: this always fails with
    /// [`MasterError::Unsupported`] once the key is known to be open, and
    /// leaves the transaction open.
    pub fn commit(
        &self,
        key: TxKey,
        streams: Vec<(String, TransactionStream)>,
    ) -> MasterResult<Vec<(String, u64)>> {
        let engine = self.engine.lock();
        if !engine.contexts.contains(key) {
            return Err(fault(format!("commit of {} which is not open", key)));
        }
        tracing::warn!(%key, streams = streams.len(), "commit with transaction streams is not supported");
        Err(MasterError::unsupported("commit_transaction"))
    }

    /// Roll back the transaction `key` and forget it.
    pub fn rollback(&self, key: TxKey) -> MasterResult<()> {
        let mut engine = self.engine.lock();
        if !engine.contexts.contains(key) {
            return Err(fault(format!("rollback of {} which is not open", key)));
        }

        let mut guard = SwitchGuard::enter(&mut engine, key)?;
        let rolled_back = {
            let engine = guard.engine();
            match engine.tx.rollback() {
                Ok(()) => {
                    engine.contexts.remove(key);
                    Ok(())
                }
                Err(err) => {
                    tracing::error!(%key, error = %err, "rollback failed");
                    Err(MasterError::coordination_with(
                        format!("failed to roll back {}", key),
                        err,
                    ))
                }
            }
        };
        if rolled_back.is_ok() {
            tracing::debug!(%key, "remote transaction rolled back");
        }
        guard.finish(rolled_back)
    }

    /// Changes for a replica to replay. Not implemented.
    pub fn pull_updates(&self) -> MasterResult<()> {
        Err(MasterError::unsupported("pull_updates"))
    }

    /// The context bound to the engine right now.
    pub fn bound_context(&self) -> Option<ContextHandle> {
        self.engine.lock().tx.current()
    }

    /// The context backing `key`, if it is open.
    pub fn context_for(&self, key: TxKey) -> Option<ContextHandle> {
        self.engine.lock().contexts.get(key)
    }

    /// Keys of every open remote transaction, sorted.
    pub fn open_transactions(&self) -> Vec<TxKey> {
        self.engine.lock().contexts.keys()
    }
}

fn fault(message: String) -> MasterError {
    tracing::error!(%message, "coordination fault");
    MasterError::coordination(message)
}

impl Master for MasterCoordinator {
    fn acquire_read_lock(
        &self,
        context: SlaveContext,
        local_tx_id: u32,
        entities: &[EntityRef],
    ) -> MasterResult<Response<LockOutcome>> {
        self.acquire_locks(context.tx(local_tx_id), LockKind::Read, entities)
            .map(Response::new)
    }

    fn acquire_write_lock(
        &self,
        context: SlaveContext,
        local_tx_id: u32,
        entities: &[EntityRef],
    ) -> MasterResult<Response<LockOutcome>> {
        self.acquire_locks(context.tx(local_tx_id), LockKind::Write, entities)
            .map(Response::new)
    }

    fn allocate_ids(
        &self,
        context: SlaveContext,
        category: IdCategory,
    ) -> MasterResult<Response<IdAllocation>> {
        tracing::trace!(slave_id = context.slave_id(), %category, "allocate ids");
        MasterCoordinator::allocate_ids(self, category).map(Response::new)
    }

    fn create_relationship_type(
        &self,
        context: SlaveContext,
        local_tx_id: u32,
        name: &str,
    ) -> MasterResult<Response<RelationshipTypeId>> {
        self.intern_relationship_type(context.tx(local_tx_id), name)
            .map(Response::new)
    }

    fn commit_transaction(
        &self,
        context: SlaveContext,
        local_tx_id: u32,
        streams: Vec<(String, TransactionStream)>,
    ) -> MasterResult<Response<Vec<(String, u64)>>> {
        self.commit(context.tx(local_tx_id), streams).map(Response::new)
    }

    fn rollback_transaction(
        &self,
        context: SlaveContext,
        local_tx_id: u32,
    ) -> MasterResult<Response<()>> {
        self.rollback(context.tx(local_tx_id)).map(Response::new)
    }

    fn pull_updates(&self, context: SlaveContext) -> MasterResult<Response<()>> {
        tracing::trace!(slave_id = context.slave_id(), "pull updates");
        MasterCoordinator::pull_updates(self).map(Response::new)
    }
}

/// Wires collaborators into a [`MasterCoordinator`].
#[derive(Default)]
pub struct MasterBuilder {
    config: MasterConfig,
    tx: Option<Box<dyn TransactionManager>>,
    locks: Option<Box<dyn LockManager>>,
    releaser: Option<Box<dyn LockReleaser>>,
    ids: Option<Arc<dyn IdGeneratorFactory>>,
    types: Option<Arc<dyn RelationshipTypeStore>>,
}

impl MasterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder with every collaborator taken from an in-memory kernel.
    pub fn memory(kernel: MemoryKernel) -> Self {
        Self::new()
            .transaction_manager(kernel.tx)
            .lock_manager(kernel.locks)
            .lock_releaser(kernel.releaser)
            .id_generators(kernel.ids)
            .relationship_types(kernel.types)
    }

    pub fn config(mut self, config: MasterConfig) -> Self {
        self.config = config;
        self
    }

    pub fn transaction_manager(mut self, tx: impl TransactionManager + 'static) -> Self {
        self.tx = Some(Box::new(tx));
        self
    }

    pub fn lock_manager(mut self, locks: impl LockManager + 'static) -> Self {
        self.locks = Some(Box::new(locks));
        self
    }

    pub fn lock_releaser(mut self, releaser: impl LockReleaser + 'static) -> Self {
        self.releaser = Some(Box::new(releaser));
        self
    }

    pub fn id_generators(mut self, ids: Arc<dyn IdGeneratorFactory>) -> Self {
        self.ids = Some(ids);
        self
    }

    pub fn relationship_types(mut self, types: Arc<dyn RelationshipTypeStore>) -> Self {
        self.types = Some(types);
        self
    }

    pub fn build(self) -> MasterResult<MasterCoordinator> {
        let tx = self
            .tx
            .ok_or_else(|| MasterError::missing_collaborator("transaction manager"))?;
        let locks = self
            .locks
            .ok_or_else(|| MasterError::missing_collaborator("lock manager"))?;
        let releaser = self
            .releaser
            .ok_or_else(|| MasterError::missing_collaborator("lock releaser"))?;
        let ids = self
            .ids
            .ok_or_else(|| MasterError::missing_collaborator("id generator factory"))?;
        let types = self
            .types
            .ok_or_else(|| MasterError::missing_collaborator("relationship type store"))?;

        Ok(MasterCoordinator {
            engine: Mutex::new(Engine {
                contexts: ActiveContexts::new(self.config.open_transaction_warn_threshold),
                tx,
                locks,
                releaser,
            }),
            config: self.config,
            ids,
            types,
        })
    }
}
