//! Registry of remote transactions open on the master.

use std::collections::HashMap;

use mew_ha_core::{ContextHandle, TxKey};
use mew_ha_kernel::KernelResult;

use crate::error::{MasterError, MasterResult};

/// Maps each open remote transaction to the execution context backing it.
///
/// An entry is created by the first operation that names a key and removed
/// when that key rolls back or commits. A key is never backed by more than
/// one context, and a context never backs more than one key.
#[derive(Debug)]
pub struct ActiveContexts {
    handles: HashMap<TxKey, ContextHandle>,
    owners: HashMap<ContextHandle, TxKey>,
    warn_threshold: usize,
}

impl ActiveContexts {
    pub fn new(warn_threshold: usize) -> Self {
        Self {
            handles: HashMap::new(),
            owners: HashMap::new(),
            warn_threshold,
        }
    }

    /// The context for `key`, without creating one.
    pub fn get(&self, key: TxKey) -> Option<ContextHandle> {
        self.handles.get(&key).copied()
    }

    pub fn contains(&self, key: TxKey) -> bool {
        self.handles.contains_key(&key)
    }

    /// The key a context was begun for.
    pub fn key_for(&self, handle: ContextHandle) -> Option<TxKey> {
        self.owners.get(&handle).copied()
    }

    /// The context for `key`, beginning one with `begin` if there is none.
    ///
    /// Nothing is recorded when `begin` fails.
    pub fn resolve_or_begin<F>(&mut self, key: TxKey, begin: F) -> MasterResult<ContextHandle>
    where
        F: FnOnce() -> KernelResult<ContextHandle>,
    {
        if let Some(handle) = self.get(key) {
            return Ok(handle);
        }

        let handle = begin().map_err(|err| {
            tracing::error!(%key, packed = key.packed(), error = %err, "failed to begin context");
            MasterError::coordination_with(format!("failed to begin a context for {}", key), err)
        })?;
        if let Some(owner) = self.key_for(handle) {
            tracing::error!(%key, context = %handle, %owner, "context handle already in use");
            return Err(MasterError::coordination(format!(
                "context {} begun for {} already backs {}",
                handle, key, owner
            )));
        }

        self.handles.insert(key, handle);
        self.owners.insert(handle, key);
        tracing::debug!(
            %key,
            packed = key.packed(),
            context = %handle,
            open = self.handles.len(),
            "remote transaction begun"
        );

        if self.handles.len() > self.warn_threshold {
            tracing::warn!(
                open = self.handles.len(),
                threshold = self.warn_threshold,
                "open remote transactions above threshold"
            );
        }
        Ok(handle)
    }

    /// Forget `key`. Only called once its context has finished.
    pub fn remove(&mut self, key: TxKey) -> Option<ContextHandle> {
        let handle = self.handles.remove(&key)?;
        self.owners.remove(&handle);
        Some(handle)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Open keys, sorted.
    pub fn keys(&self) -> Vec<TxKey> {
        let mut keys: Vec<TxKey> = self.handles.keys().copied().collect();
        keys.sort();
        keys
    }
}
