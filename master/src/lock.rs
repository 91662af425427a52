//! Lock acquisition on behalf of a bound context.

use mew_ha_core::{ContextHandle, EntityRef, LockKind, LockOutcome};
use mew_ha_kernel::{KernelError, LockManager, LockReleaser};

use crate::error::{MasterError, MasterResult};

/// Takes batches of locks for the bound context and translates lock manager
/// signals into [`LockOutcome`]s.
pub struct LockCoordinator<'a> {
    locks: &'a dyn LockManager,
    releaser: &'a dyn LockReleaser,
}

impl<'a> LockCoordinator<'a> {
    pub fn new(locks: &'a dyn LockManager, releaser: &'a dyn LockReleaser) -> Self {
        Self { locks, releaser }
    }

    /// Lock `entities` in the given order for `context`.
    ///
    /// Each granted lock is attached to `context` straight away, so it is
    /// released when the context finishes. A deadlock stops the batch; locks
    /// granted before it stay attached. A lock that cannot be attached is
    /// released again before the fault is returned.
    pub fn acquire(
        &self,
        context: ContextHandle,
        kind: LockKind,
        entities: &[EntityRef],
    ) -> MasterResult<LockOutcome> {
        for &entity in entities {
            match self.locks.acquire(entity, kind, context) {
                Ok(()) => {}
                Err(KernelError::Deadlock { message }) => {
                    tracing::warn!(context = %context, %entity, %kind, %message, "lock refused: deadlock");
                    return Ok(LockOutcome::DeadlockDetected(message));
                }
                Err(KernelError::IllegalResource { entity }) => {
                    tracing::warn!(context = %context, %entity, %kind, "lock refused: resource unavailable");
                    return Ok(LockOutcome::ResourceUnavailable);
                }
                Err(err) => {
                    tracing::error!(context = %context, %entity, %kind, error = %err, "lock request failed");
                    return Err(MasterError::coordination_with(
                        format!("{} lock on {} for {} failed", kind, entity, context),
                        err,
                    ));
                }
            }

            if let Err(err) = self.releaser.attach(entity, kind, context) {
                // Unattached locks outlive the context, so hand this one back.
                if let Err(release) = self.locks.release(entity, kind, context) {
                    tracing::error!(context = %context, %entity, %kind, error = %release, "failed to release unattached lock");
                }
                tracing::error!(context = %context, %entity, %kind, error = %err, "failed to attach lock");
                return Err(MasterError::coordination_with(
                    format!("failed to attach {} lock on {} to {}", kind, entity, context),
                    err,
                ));
            }
        }
        Ok(LockOutcome::Granted)
    }
}
