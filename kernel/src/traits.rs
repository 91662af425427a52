//! Collaborator interfaces the master coordination core drives.

use std::sync::Arc;

use mew_ha_core::{ContextHandle, EntityRef, IdCategory, LockKind, RelationshipTypeId};

use crate::error::KernelResult;

/// Owns the execution contexts of the shared engine.
///
/// At most one context is bound to the engine at a time.
pub trait TransactionManager: Send {
    /// Begin a new execution context and bind it.
    ///
    /// Fails if a context is already bound.
    fn begin(&mut self) -> KernelResult<ContextHandle>;

    /// The context currently bound, if any.
    fn current(&self) -> Option<ContextHandle>;

    /// Unbind the current context, returning it. Unbinding when nothing is
    /// bound is not an error.
    fn suspend(&mut self) -> KernelResult<Option<ContextHandle>>;

    /// Bind a previously suspended context.
    fn resume(&mut self, handle: ContextHandle) -> KernelResult<()>;

    /// Commit the bound context and unbind it.
    ///
    /// The master does not commit replica transactions yet; this is the
    /// hook a streamed-commit path will drive.
    fn commit(&mut self) -> KernelResult<()>;

    /// Roll back the bound context and unbind it.
    fn rollback(&mut self) -> KernelResult<()>;
}

/// Grants typed locks on entities.
pub trait LockManager: Send + Sync {
    fn acquire_read(&self, entity: EntityRef, context: ContextHandle) -> KernelResult<()>;

    fn acquire_write(&self, entity: EntityRef, context: ContextHandle) -> KernelResult<()>;

    fn acquire(&self, entity: EntityRef, kind: LockKind, context: ContextHandle) -> KernelResult<()> {
        match kind {
            LockKind::Read => self.acquire_read(entity, context),
            LockKind::Write => self.acquire_write(entity, context),
        }
    }

    /// Give back one grant of `kind` on `entity` that was never attached.
    fn release(&self, entity: EntityRef, kind: LockKind, context: ContextHandle) -> KernelResult<()>;
}

/// Ties granted locks to a context so they are released when it finishes.
pub trait LockReleaser: Send + Sync {
    fn attach(&self, entity: EntityRef, kind: LockKind, context: ContextHandle) -> KernelResult<()>;
}

/// A monotonic id generator that reuses freed ids first.
///
/// Implementations serialize concurrent callers themselves.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> KernelResult<u64>;

    /// One past the highest id ever issued.
    fn high_id(&self) -> u64;

    /// Number of freed ids waiting to be reused.
    fn defrag_count(&self) -> u64;
}

pub trait IdGeneratorFactory: Send + Sync {
    fn generator_for(&self, category: IdCategory) -> KernelResult<Arc<dyn IdGenerator>>;
}

/// The table of relationship types known to the database.
pub trait RelationshipTypeStore: Send + Sync {
    /// Look up an existing type without side effects.
    fn id_for(&self, name: &str) -> Option<RelationshipTypeId>;

    /// Return the id for `name`, creating the type if it does not exist.
    /// Creation requires a context bound on `tx`.
    fn get_or_create(
        &self,
        name: &str,
        tx: &dyn TransactionManager,
    ) -> KernelResult<RelationshipTypeId>;
}
