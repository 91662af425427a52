//! Signals raised by kernel collaborators.

use mew_ha_core::{ContextHandle, EntityRef, IdCategory};
use thiserror::Error;

/// Errors raised by the transaction manager, lock manager, id generators and
/// type store.
#[derive(Debug, Error)]
pub enum KernelError {
    /// The lock manager refused a lock to break a deadlock.
    #[error("deadlock detected: {message}")]
    Deadlock { message: String },

    /// The entity does not support locking (e.g. it was deleted).
    #[error("illegal resource: {entity}")]
    IllegalResource { entity: EntityRef },

    /// The operation is not supported in the manager's current state.
    #[error("not supported: {message}")]
    NotSupported { message: String },

    /// No execution context is bound to the engine.
    #[error("no execution context is bound")]
    NoBoundContext,

    /// An execution context is already bound to the engine.
    #[error("execution context {0} is already bound")]
    AlreadyBound(ContextHandle),

    /// The handle was not issued by this manager or has finished.
    #[error("unknown execution context: {0}")]
    UnknownContext(ContextHandle),

    /// No id generator is registered for the category.
    #[error("no id generator for {0}")]
    NoGenerator(IdCategory),

    /// Any other failure inside a collaborator.
    #[error("system error: {message}")]
    System { message: String },
}

impl KernelError {
    pub fn deadlock(message: impl Into<String>) -> Self {
        Self::Deadlock {
            message: message.into(),
        }
    }

    pub fn illegal_resource(entity: EntityRef) -> Self {
        Self::IllegalResource { entity }
    }

    pub fn not_supported(message: impl Into<String>) -> Self {
        Self::NotSupported {
            message: message.into(),
        }
    }

    pub fn system(message: impl Into<String>) -> Self {
        Self::System {
            message: message.into(),
        }
    }
}

/// Result type for kernel operations.
pub type KernelResult<T> = Result<T, KernelError>;
