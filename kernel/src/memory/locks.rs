//! No-wait lock table.
//!
//! A request that conflicts with a lock held by another context is refused
//! at once with a deadlock signal instead of queueing. Nothing ever waits, so
//! there is no wait-for graph to maintain.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use mew_ha_core::{ContextHandle, EntityRef, LockKind};
use parking_lot::Mutex;

use crate::error::{KernelError, KernelResult};
use crate::traits::{LockManager, LockReleaser};

/// Re-entrant read/write holders of one entity.
#[derive(Debug, Default)]
struct EntityLocks {
    readers: HashMap<ContextHandle, u32>,
    writer: Option<(ContextHandle, u32)>,
}

impl EntityLocks {
    fn is_free(&self) -> bool {
        self.readers.is_empty() && self.writer.is_none()
    }

    /// Another context holding a lock that conflicts with `kind`.
    fn conflicting_holder(&self, kind: LockKind, context: ContextHandle) -> Option<ContextHandle> {
        if let Some((writer, _)) = self.writer {
            if writer != context {
                return Some(writer);
            }
        }
        match kind {
            LockKind::Read => None,
            LockKind::Write => self.readers.keys().copied().find(|&r| r != context),
        }
    }

    fn release(&mut self, kind: LockKind, context: ContextHandle) {
        match kind {
            LockKind::Read => {
                if let Some(count) = self.readers.get_mut(&context) {
                    *count -= 1;
                    if *count == 0 {
                        self.readers.remove(&context);
                    }
                }
            }
            LockKind::Write => {
                if let Some((writer, count)) = self.writer.as_mut() {
                    if *writer == context {
                        *count -= 1;
                        if *count == 0 {
                            self.writer = None;
                        }
                    }
                }
            }
        }
    }
}

#[derive(Debug, Default)]
struct TableState {
    entities: HashMap<EntityRef, EntityLocks>,
    deleted: HashSet<EntityRef>,
    attached: HashMap<ContextHandle, Vec<(EntityRef, LockKind)>>,
}

/// Lock state shared by the in-memory lock manager, lock releaser and
/// transaction manager.
#[derive(Debug, Default)]
pub struct LockTable {
    state: Mutex<TableState>,
}

impl LockTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant `kind` on `entity` to `context`, or refuse it immediately.
    pub fn acquire(&self, entity: EntityRef, kind: LockKind, context: ContextHandle) -> KernelResult<()> {
        let mut state = self.state.lock();
        if state.deleted.contains(&entity) {
            return Err(KernelError::illegal_resource(entity));
        }

        let locks = state.entities.entry(entity).or_default();
        if let Some(holder) = locks.conflicting_holder(kind, context) {
            return Err(KernelError::deadlock(format!(
                "{} can not take {} lock on {}, held by {}",
                context, kind, entity, holder
            )));
        }

        match kind {
            LockKind::Read => *locks.readers.entry(context).or_insert(0) += 1,
            LockKind::Write => match locks.writer.as_mut() {
                Some((_, count)) => *count += 1,
                None => locks.writer = Some((context, 1)),
            },
        }
        Ok(())
    }

    /// Record a granted lock so it is released when `context` finishes.
    pub fn attach(&self, entity: EntityRef, kind: LockKind, context: ContextHandle) {
        self.state
            .lock()
            .attached
            .entry(context)
            .or_default()
            .push((entity, kind));
    }

    /// Release one grant of `kind` on `entity` held by `context`.
    pub fn release(&self, entity: EntityRef, kind: LockKind, context: ContextHandle) {
        let mut state = self.state.lock();
        if let Some(locks) = state.entities.get_mut(&entity) {
            locks.release(kind, context);
            if locks.is_free() {
                state.entities.remove(&entity);
            }
        }
    }

    /// Release every lock attached to `context`.
    pub fn release_all(&self, context: ContextHandle) {
        let mut state = self.state.lock();
        let Some(attached) = state.attached.remove(&context) else {
            return;
        };
        for (entity, kind) in attached {
            if let Some(locks) = state.entities.get_mut(&entity) {
                locks.release(kind, context);
                if locks.is_free() {
                    state.entities.remove(&entity);
                }
            }
        }
    }

    /// Make later lock requests on `entity` fail as an illegal resource.
    pub fn mark_deleted(&self, entity: EntityRef) {
        self.state.lock().deleted.insert(entity);
    }

    pub fn is_locked(&self, entity: EntityRef) -> bool {
        self.state
            .lock()
            .entities
            .get(&entity)
            .is_some_and(|locks| !locks.is_free())
    }

    /// Whether `context` holds `kind` on `entity`.
    pub fn holds(&self, entity: EntityRef, kind: LockKind, context: ContextHandle) -> bool {
        let state = self.state.lock();
        let Some(locks) = state.entities.get(&entity) else {
            return false;
        };
        match kind {
            LockKind::Read => locks.readers.contains_key(&context),
            LockKind::Write => matches!(locks.writer, Some((w, _)) if w == context),
        }
    }

    /// Locks attached to `context`, in attach order.
    pub fn attached(&self, context: ContextHandle) -> Vec<(EntityRef, LockKind)> {
        self.state
            .lock()
            .attached
            .get(&context)
            .cloned()
            .unwrap_or_default()
    }
}

/// [`LockManager`] over a shared [`LockTable`].
#[derive(Debug, Clone)]
pub struct MemoryLockManager {
    table: Arc<LockTable>,
}

impl MemoryLockManager {
    pub fn new(table: Arc<LockTable>) -> Self {
        Self { table }
    }
}

impl LockManager for MemoryLockManager {
    fn acquire_read(&self, entity: EntityRef, context: ContextHandle) -> KernelResult<()> {
        self.table.acquire(entity, LockKind::Read, context)
    }

    fn acquire_write(&self, entity: EntityRef, context: ContextHandle) -> KernelResult<()> {
        self.table.acquire(entity, LockKind::Write, context)
    }

    fn release(&self, entity: EntityRef, kind: LockKind, context: ContextHandle) -> KernelResult<()> {
        self.table.release(entity, kind, context);
        Ok(())
    }
}

/// [`LockReleaser`] over a shared [`LockTable`].
#[derive(Debug, Clone)]
pub struct MemoryLockReleaser {
    table: Arc<LockTable>,
}

impl MemoryLockReleaser {
    pub fn new(table: Arc<LockTable>) -> Self {
        Self { table }
    }
}

impl LockReleaser for MemoryLockReleaser {
    fn attach(&self, entity: EntityRef, kind: LockKind, context: ContextHandle) -> KernelResult<()> {
        self.table.attach(entity, kind, context);
        Ok(())
    }
}
