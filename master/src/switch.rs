//! Context switching on the shared engine.
//!
//! The engine has one bound context. Every operation run on behalf of a
//! remote transaction borrows the engine: bind that transaction's context,
//! do the work, then hand the engine back to whatever was bound before. The
//! binding seen after an operation is the binding seen before it, whatever
//! the outcome.

use mew_ha_core::{ContextHandle, TxKey};
use mew_ha_kernel::{LockManager, LockReleaser, TransactionManager};

use crate::contexts::ActiveContexts;
use crate::error::{MasterError, MasterResult};

/// What was bound before a switch, and so what `switch_back` restores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviousContext {
    /// The target was already bound; switching back leaves it bound.
    Same,
    /// Nothing was bound; switching back unbinds the target.
    Unbound,
    /// Another context was bound; switching back rebinds it.
    Context(ContextHandle),
}

impl PreviousContext {
    /// The context to resume when switching back, if any.
    pub fn handle(&self) -> Option<ContextHandle> {
        match self {
            PreviousContext::Context(handle) => Some(*handle),
            _ => None,
        }
    }
}

/// A completed switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Switch {
    pub target: ContextHandle,
    pub previous: PreviousContext,
}

/// Bind the context for `key`, beginning one if the key is new.
///
/// On failure the binding is left as it was found.
pub fn switch_to(
    contexts: &mut ActiveContexts,
    tx: &mut dyn TransactionManager,
    key: TxKey,
) -> MasterResult<Switch> {
    let bound = tx.current();

    if let Some(target) = contexts.get(key) {
        if bound == Some(target) {
            return Ok(Switch {
                target,
                previous: PreviousContext::Same,
            });
        }

        let previous = suspend_bound(tx, bound)?;
        if let Err(err) = tx.resume(target) {
            tracing::error!(%key, context = %target, error = %err, "failed to resume context");
            restore(tx, previous);
            return Err(MasterError::coordination_with(
                format!("failed to resume {} for {}", target, key),
                err,
            ));
        }
        tracing::debug!(%key, context = %target, ?previous, "switched to context");
        return Ok(Switch { target, previous });
    }

    // Beginning binds the new context, so whatever is bound goes first.
    let previous = suspend_bound(tx, bound)?;
    match contexts.resolve_or_begin(key, || tx.begin()) {
        Ok(target) => {
            tracing::debug!(%key, context = %target, ?previous, "switched to new context");
            Ok(Switch { target, previous })
        }
        Err(err) => {
            restore(tx, previous);
            Err(err)
        }
    }
}

/// Undo a switch: unbind whatever is bound and rebind the previous context.
pub fn switch_back(tx: &mut dyn TransactionManager, previous: PreviousContext) -> MasterResult<()> {
    if previous == PreviousContext::Same {
        return Ok(());
    }

    tx.suspend()
        .map_err(|err| MasterError::coordination_with("failed to suspend on switch back", err))?;
    if let Some(handle) = previous.handle() {
        tx.resume(handle).map_err(|err| {
            MasterError::coordination_with(format!("failed to resume {} on switch back", handle), err)
        })?;
    }
    Ok(())
}

fn suspend_bound(
    tx: &mut dyn TransactionManager,
    bound: Option<ContextHandle>,
) -> MasterResult<PreviousContext> {
    let Some(handle) = bound else {
        return Ok(PreviousContext::Unbound);
    };
    tx.suspend().map_err(|err| {
        tracing::error!(context = %handle, error = %err, "failed to suspend context");
        MasterError::coordination_with(format!("failed to suspend {}", handle), err)
    })?;
    Ok(PreviousContext::Context(handle))
}

/// Best-effort return to `previous` after a failed switch.
fn restore(tx: &mut dyn TransactionManager, previous: PreviousContext) {
    if let Err(err) = switch_back(tx, previous) {
        tracing::error!(error = %err, ?previous, "failed to restore binding after failed switch");
    }
}

/// The collaborators that must only be used by one operation at a time.
pub(crate) struct Engine {
    pub contexts: ActiveContexts,
    pub tx: Box<dyn TransactionManager>,
    pub locks: Box<dyn LockManager>,
    pub releaser: Box<dyn LockReleaser>,
}

/// Holds the engine switched to one key's context.
///
/// [`SwitchGuard::finish`] switches back and merges any failure into the
/// operation's result. If the guard is dropped without finishing (a panic
/// in the operation), the switch back happens in `Drop`.
pub(crate) struct SwitchGuard<'e> {
    engine: &'e mut Engine,
    key: TxKey,
    switch: Switch,
    finished: bool,
}

impl<'e> SwitchGuard<'e> {
    pub fn enter(engine: &'e mut Engine, key: TxKey) -> MasterResult<Self> {
        let switch = switch_to(&mut engine.contexts, engine.tx.as_mut(), key)?;
        Ok(Self {
            engine,
            key,
            switch,
            finished: false,
        })
    }

    /// The context bound for the duration of the guard.
    pub fn target(&self) -> ContextHandle {
        self.switch.target
    }

    pub fn engine(&mut self) -> &mut Engine {
        &mut *self.engine
    }

    /// Switch back, then return `result`.
    ///
    /// An operation error wins over a switch-back error; the latter is
    /// logged. A switch-back error after a successful operation is returned.
    pub fn finish<T>(mut self, result: MasterResult<T>) -> MasterResult<T> {
        self.finished = true;
        let switched_back = switch_back(self.engine.tx.as_mut(), self.switch.previous);
        match (result, switched_back) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(err)) => {
                tracing::error!(key = %self.key, error = %err, "switch back failed");
                Err(err)
            }
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(back)) => {
                tracing::warn!(key = %self.key, error = %back, "switch back failed after operation error");
                Err(err)
            }
        }
    }
}

impl Drop for SwitchGuard<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if let Err(err) = switch_back(self.engine.tx.as_mut(), self.switch.previous) {
            tracing::error!(key = %self.key, error = %err, "switch back failed while unwinding");
        }
    }
}
