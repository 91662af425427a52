//! Lock kinds and the translated outcome of a lock request.

use std::fmt;

/// The kind of lock requested on an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockKind {
    Read,
    Write,
}

impl fmt::Display for LockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockKind::Read => write!(f, "read"),
            LockKind::Write => write!(f, "write"),
        }
    }
}

/// Stable status code reported to replicas for a lock request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockStatus {
    OkLocked,
    NotLocked,
    DeadLocked,
}

/// Result of acquiring a batch of locks on behalf of a remote transaction.
///
/// Deadlock and unavailable resources are ordinary outcomes, not errors: the
/// replica decides whether to retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockOutcome {
    /// Every lock in the batch was granted.
    Granted,
    /// The lock manager refused a lock to break a deadlock.
    DeadlockDetected(String),
    /// The entity cannot be locked, e.g. it was deleted.
    ResourceUnavailable,
}

impl LockOutcome {
    pub fn deadlock(message: impl Into<String>) -> Self {
        Self::DeadlockDetected(message.into())
    }

    pub fn is_granted(&self) -> bool {
        matches!(self, LockOutcome::Granted)
    }

    pub fn status(&self) -> LockStatus {
        match self {
            LockOutcome::Granted => LockStatus::OkLocked,
            LockOutcome::DeadlockDetected(_) => LockStatus::DeadLocked,
            LockOutcome::ResourceUnavailable => LockStatus::NotLocked,
        }
    }

    /// The deadlock message, if this is a deadlock.
    pub fn deadlock_message(&self) -> Option<&str> {
        match self {
            LockOutcome::DeadlockDetected(message) => Some(message.as_str()),
            _ => None,
        }
    }
}
