//! In-memory relationship type table.

use std::collections::HashMap;
use std::sync::Arc;

use mew_ha_core::{ContextHandle, RelationshipTypeId};
use parking_lot::RwLock;

use crate::error::{KernelError, KernelResult};
use crate::traits::{IdGenerator, RelationshipTypeStore, TransactionManager};

#[derive(Debug, Default)]
struct TypeTable {
    /// Type ID lookup by name.
    ids: HashMap<String, RelationshipTypeId>,
    /// Context that created each type.
    creators: HashMap<RelationshipTypeId, ContextHandle>,
}

/// Relationship types known to the in-memory kernel.
///
/// Types are never removed: once created a name keeps its id for the
/// lifetime of the store, whatever happens to the creating context.
pub struct MemoryRelationshipTypeStore {
    table: RwLock<TypeTable>,
    ids: Arc<dyn IdGenerator>,
}

impl MemoryRelationshipTypeStore {
    pub fn new(ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            table: RwLock::new(TypeTable::default()),
            ids,
        }
    }

    /// Get the number of types.
    pub fn len(&self) -> usize {
        self.table.read().ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The context a type was created under.
    pub fn created_by(&self, id: RelationshipTypeId) -> Option<ContextHandle> {
        self.table.read().creators.get(&id).copied()
    }

    /// Get a type name by ID.
    pub fn name_of(&self, id: RelationshipTypeId) -> Option<String> {
        self.table
            .read()
            .ids
            .iter()
            .find(|(_, type_id)| **type_id == id)
            .map(|(name, _)| name.clone())
    }
}

impl RelationshipTypeStore for MemoryRelationshipTypeStore {
    fn id_for(&self, name: &str) -> Option<RelationshipTypeId> {
        self.table.read().ids.get(name).copied()
    }

    fn get_or_create(
        &self,
        name: &str,
        tx: &dyn TransactionManager,
    ) -> KernelResult<RelationshipTypeId> {
        let creator = tx.current().ok_or(KernelError::NoBoundContext)?;

        let mut table = self.table.write();
        if let Some(&id) = table.ids.get(name) {
            return Ok(id);
        }

        let raw = self.ids.next_id()?;
        let id = RelationshipTypeId::try_from(raw)
            .map_err(|_| KernelError::system(format!("relationship type id {} out of range", raw)))?;
        table.ids.insert(name.to_string(), id);
        table.creators.insert(id, creator);

        tracing::debug!(name, id, context = %creator, "relationship type created");
        Ok(id)
    }
}
