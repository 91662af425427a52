//! Relationship type interning.

use mew_ha_core::RelationshipTypeId;
use mew_ha_kernel::{RelationshipTypeStore, TransactionManager};

use crate::error::{MasterError, MasterResult};

/// Maps relationship type names to stable ids, creating types on first use.
pub struct NameInterner<'a> {
    types: &'a dyn RelationshipTypeStore,
}

impl<'a> NameInterner<'a> {
    pub fn new(types: &'a dyn RelationshipTypeStore) -> Self {
        Self { types }
    }

    /// Id of an existing type. Pure read.
    pub fn lookup(&self, name: &str) -> Option<RelationshipTypeId> {
        self.types.id_for(name)
    }

    /// Id for `name`, creating the type under the context bound on `tx`.
    pub fn create(&self, name: &str, tx: &dyn TransactionManager) -> MasterResult<RelationshipTypeId> {
        self.types.get_or_create(name, tx).map_err(|err| {
            tracing::error!(name, error = %err, "relationship type creation failed");
            MasterError::coordination_with(format!("failed to create relationship type {:?}", name), err)
        })
    }
}
