//! Collaborators that record what the master asks of them.
//!
//! Each wraps the matching in-memory collaborator and logs every call into a
//! shared [`Probe`]. The probe can also script failures.

use std::collections::HashMap;
use std::sync::Arc;

use mew_ha_core::{ContextHandle, EntityRef, LockKind, RelationshipTypeId};
use mew_ha_kernel::memory::{MemoryLockManager, MemoryRelationshipTypeStore, MemoryTxManager};
use mew_ha_kernel::{
    KernelError, KernelResult, LockManager, RelationshipTypeStore, TransactionManager,
};
use parking_lot::Mutex;

/// A call the master made on the transaction manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxEvent {
    Begin(ContextHandle),
    Suspend(Option<ContextHandle>),
    Resume(ContextHandle),
    Commit,
    Rollback,
}

/// A failure to inject for a lock request on one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedFailure {
    Deadlock(String),
    IllegalResource,
    System(String),
}

impl ScriptedFailure {
    fn to_error(&self, entity: EntityRef) -> KernelError {
        match self {
            ScriptedFailure::Deadlock(message) => KernelError::deadlock(message.clone()),
            ScriptedFailure::IllegalResource => KernelError::illegal_resource(entity),
            ScriptedFailure::System(message) => KernelError::system(message.clone()),
        }
    }
}

#[derive(Debug, Default)]
struct ProbeState {
    tx_events: Vec<TxEvent>,
    lock_attempts: Vec<(EntityRef, LockKind, ContextHandle)>,
    lock_failures: HashMap<EntityRef, ScriptedFailure>,
    type_creations: Vec<(String, Option<ContextHandle>)>,
    fail_begins: usize,
}

/// Shared record of calls made on the probing collaborators.
#[derive(Debug, Clone, Default)]
pub struct Probe {
    state: Arc<Mutex<ProbeState>>,
}

impl Probe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tx_events(&self) -> Vec<TxEvent> {
        self.state.lock().tx_events.clone()
    }

    /// Contexts begun, in order.
    pub fn begins(&self) -> Vec<ContextHandle> {
        self.state
            .lock()
            .tx_events
            .iter()
            .filter_map(|event| match event {
                TxEvent::Begin(handle) => Some(*handle),
                _ => None,
            })
            .collect()
    }

    pub fn lock_attempts(&self) -> Vec<(EntityRef, LockKind, ContextHandle)> {
        self.state.lock().lock_attempts.clone()
    }

    /// Entities a lock was requested on, in order.
    pub fn locked_entities(&self) -> Vec<EntityRef> {
        self.lock_attempts().into_iter().map(|(entity, _, _)| entity).collect()
    }

    /// Names passed to type creation, with the context bound at the time.
    pub fn type_creations(&self) -> Vec<(String, Option<ContextHandle>)> {
        self.state.lock().type_creations.clone()
    }

    /// Forget everything recorded so far. Scripted failures stay.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.tx_events.clear();
        state.lock_attempts.clear();
        state.type_creations.clear();
    }

    /// Make lock requests on `entity` fail.
    pub fn fail_lock(&self, entity: EntityRef, failure: ScriptedFailure) {
        self.state.lock().lock_failures.insert(entity, failure);
    }

    /// Make the next `count` begins fail.
    pub fn fail_begins(&self, count: usize) {
        self.state.lock().fail_begins = count;
    }

    fn record_tx(&self, event: TxEvent) {
        self.state.lock().tx_events.push(event);
    }
}

/// Transaction manager that records calls and can refuse to begin.
pub struct ProbeTxManager {
    inner: MemoryTxManager,
    probe: Probe,
}

impl ProbeTxManager {
    pub fn new(inner: MemoryTxManager, probe: Probe) -> Self {
        Self { inner, probe }
    }
}

impl TransactionManager for ProbeTxManager {
    fn begin(&mut self) -> KernelResult<ContextHandle> {
        {
            let mut state = self.probe.state.lock();
            if state.fail_begins > 0 {
                state.fail_begins -= 1;
                return Err(KernelError::system("begin refused by probe"));
            }
        }
        let handle = self.inner.begin()?;
        self.probe.record_tx(TxEvent::Begin(handle));
        Ok(handle)
    }

    fn current(&self) -> Option<ContextHandle> {
        self.inner.current()
    }

    fn suspend(&mut self) -> KernelResult<Option<ContextHandle>> {
        let suspended = self.inner.suspend()?;
        self.probe.record_tx(TxEvent::Suspend(suspended));
        Ok(suspended)
    }

    fn resume(&mut self, handle: ContextHandle) -> KernelResult<()> {
        self.inner.resume(handle)?;
        self.probe.record_tx(TxEvent::Resume(handle));
        Ok(())
    }

    fn commit(&mut self) -> KernelResult<()> {
        self.inner.commit()?;
        self.probe.record_tx(TxEvent::Commit);
        Ok(())
    }

    fn rollback(&mut self) -> KernelResult<()> {
        self.inner.rollback()?;
        self.probe.record_tx(TxEvent::Rollback);
        Ok(())
    }
}

/// Lock manager that records requests and injects scripted failures.
pub struct ProbeLockManager {
    inner: MemoryLockManager,
    probe: Probe,
}

impl ProbeLockManager {
    pub fn new(inner: MemoryLockManager, probe: Probe) -> Self {
        Self { inner, probe }
    }

    fn scripted(&self, entity: EntityRef, kind: LockKind, context: ContextHandle) -> KernelResult<()> {
        let mut state = self.probe.state.lock();
        state.lock_attempts.push((entity, kind, context));
        match state.lock_failures.get(&entity) {
            Some(failure) => Err(failure.to_error(entity)),
            None => Ok(()),
        }
    }
}

impl LockManager for ProbeLockManager {
    fn acquire_read(&self, entity: EntityRef, context: ContextHandle) -> KernelResult<()> {
        self.scripted(entity, LockKind::Read, context)?;
        self.inner.acquire_read(entity, context)
    }

    fn acquire_write(&self, entity: EntityRef, context: ContextHandle) -> KernelResult<()> {
        self.scripted(entity, LockKind::Write, context)?;
        self.inner.acquire_write(entity, context)
    }

    fn release(&self, entity: EntityRef, kind: LockKind, context: ContextHandle) -> KernelResult<()> {
        self.inner.release(entity, kind, context)
    }
}

/// Type store that records creation calls.
pub struct ProbeTypeStore {
    inner: Arc<MemoryRelationshipTypeStore>,
    probe: Probe,
}

impl ProbeTypeStore {
    pub fn new(inner: Arc<MemoryRelationshipTypeStore>, probe: Probe) -> Self {
        Self { inner, probe }
    }
}

impl RelationshipTypeStore for ProbeTypeStore {
    fn id_for(&self, name: &str) -> Option<RelationshipTypeId> {
        self.inner.id_for(name)
    }

    fn get_or_create(
        &self,
        name: &str,
        tx: &dyn TransactionManager,
    ) -> KernelResult<RelationshipTypeId> {
        self.probe
            .state
            .lock()
            .type_creations
            .push((name.to_string(), tx.current()));
        self.inner.get_or_create(name, tx)
    }
}
