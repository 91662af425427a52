//! In-memory transaction manager with a single bound-context slot.

use std::collections::HashMap;
use std::sync::Arc;

use mew_ha_core::ContextHandle;

use crate::error::{KernelError, KernelResult};
use crate::memory::locks::LockTable;
use crate::traits::TransactionManager;

/// State of an open execution context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    /// Bound to the engine.
    Active,
    /// Open but not bound.
    Suspended,
}

/// Transaction manager for the in-memory kernel.
///
/// Only open contexts are tracked. Finishing a context forgets it and
/// releases every lock attached to it in the shared lock table.
#[derive(Debug)]
pub struct MemoryTxManager {
    next_handle: u64,
    bound: Option<ContextHandle>,
    contexts: HashMap<ContextHandle, ContextState>,
    locks: Arc<LockTable>,
}

impl MemoryTxManager {
    pub fn new(locks: Arc<LockTable>) -> Self {
        Self {
            next_handle: 1,
            bound: None,
            contexts: HashMap::new(),
            locks,
        }
    }

    /// State of an open context. `None` once it has finished.
    pub fn state(&self, handle: ContextHandle) -> Option<ContextState> {
        self.contexts.get(&handle).copied()
    }

    /// Number of contexts that are begun and not yet finished.
    pub fn open_count(&self) -> usize {
        self.contexts.len()
    }

    fn finish(&mut self) -> KernelResult<ContextHandle> {
        let handle = self.bound.take().ok_or(KernelError::NoBoundContext)?;
        self.contexts.remove(&handle);
        self.locks.release_all(handle);
        Ok(handle)
    }
}

impl TransactionManager for MemoryTxManager {
    fn begin(&mut self) -> KernelResult<ContextHandle> {
        if let Some(bound) = self.bound {
            return Err(KernelError::not_supported(format!(
                "nested transactions are not supported, {} is bound",
                bound
            )));
        }

        let handle = ContextHandle::from_raw(self.next_handle);
        self.next_handle += 1;
        self.contexts.insert(handle, ContextState::Active);
        self.bound = Some(handle);

        tracing::trace!(context = %handle, "context begun");
        Ok(handle)
    }

    fn current(&self) -> Option<ContextHandle> {
        self.bound
    }

    fn suspend(&mut self) -> KernelResult<Option<ContextHandle>> {
        let suspended = self.bound.take();
        if let Some(handle) = suspended {
            self.contexts.insert(handle, ContextState::Suspended);
        }
        Ok(suspended)
    }

    fn resume(&mut self, handle: ContextHandle) -> KernelResult<()> {
        if let Some(bound) = self.bound {
            return Err(KernelError::AlreadyBound(bound));
        }

        match self.contexts.get(&handle) {
            Some(ContextState::Suspended) => {
                self.contexts.insert(handle, ContextState::Active);
                self.bound = Some(handle);
                Ok(())
            }
            _ => Err(KernelError::UnknownContext(handle)),
        }
    }

    fn commit(&mut self) -> KernelResult<()> {
        let handle = self.finish()?;
        tracing::trace!(context = %handle, "context committed");
        Ok(())
    }

    fn rollback(&mut self) -> KernelResult<()> {
        let handle = self.finish()?;
        tracing::trace!(context = %handle, "context rolled back");
        Ok(())
    }
}
