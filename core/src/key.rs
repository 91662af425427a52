//! Keys that identify remote transactions and the contexts backing them.

use std::fmt;

/// Identifies the replica making a request to the master.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlaveContext {
    slave_id: u32,
}

impl SlaveContext {
    pub fn new(slave_id: u32) -> Self {
        Self { slave_id }
    }

    pub fn slave_id(&self) -> u32 {
        self.slave_id
    }

    /// Key for one of this replica's local transactions.
    pub fn tx(&self, local_tx_id: u32) -> TxKey {
        TxKey::new(self.slave_id, local_tx_id)
    }
}

/// Logical transaction key.
///
/// A remote transaction is only known to the master by the replica that owns
/// it and that replica's own transaction number. Two replicas may use the same
/// local number; the pair is what is unique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TxKey {
    pub owner_id: u32,
    pub local_tx_id: u32,
}

impl TxKey {
    pub fn new(owner_id: u32, local_tx_id: u32) -> Self {
        Self {
            owner_id,
            local_tx_id,
        }
    }

    /// Both halves packed into one value, owner in the high bits.
    pub fn packed(&self) -> u64 {
        (u64::from(self.owner_id) << 32) | u64::from(self.local_tx_id)
    }
}

impl fmt::Display for TxKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tx({}:{})", self.owner_id, self.local_tx_id)
    }
}

/// Opaque handle for an execution context begun by a transaction manager.
///
/// Only the transaction manager that issued a handle can interpret it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextHandle(u64);

impl ContextHandle {
    /// Wrap a raw value. Intended for transaction manager implementations.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ContextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx{}", self.0)
    }
}
