//! Id categories and the blocks of ids handed to replicas.

use std::fmt;

/// Number of ids in every block handed out by the master.
pub const ID_BLOCK_SIZE: usize = 10;

/// The id spaces the master allocates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IdCategory {
    Node,
    Relationship,
    Property,
    PropertyIndex,
    RelationshipType,
    StringBlock,
    ArrayBlock,
}

impl IdCategory {
    pub const ALL: [IdCategory; 7] = [
        IdCategory::Node,
        IdCategory::Relationship,
        IdCategory::Property,
        IdCategory::PropertyIndex,
        IdCategory::RelationshipType,
        IdCategory::StringBlock,
        IdCategory::ArrayBlock,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            IdCategory::Node => "node",
            IdCategory::Relationship => "relationship",
            IdCategory::Property => "property",
            IdCategory::PropertyIndex => "property_index",
            IdCategory::RelationshipType => "relationship_type",
            IdCategory::StringBlock => "string_block",
            IdCategory::ArrayBlock => "array_block",
        }
    }
}

impl fmt::Display for IdCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A block of freshly allocated ids plus the generator's bookkeeping,
/// read after the block was drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdAllocation {
    ids: Vec<u64>,
    high_id: u64,
    defrag_count: u64,
}

impl IdAllocation {
    pub fn new(ids: Vec<u64>, high_id: u64, defrag_count: u64) -> Self {
        Self {
            ids,
            high_id,
            defrag_count,
        }
    }

    pub fn ids(&self) -> &[u64] {
        &self.ids
    }

    pub fn into_ids(self) -> Vec<u64> {
        self.ids
    }

    /// The generator's high-water mark: one past the highest id ever issued.
    pub fn high_id(&self) -> u64 {
        self.high_id
    }

    /// Number of reclaimed ids the generator still holds for reuse.
    pub fn defrag_count(&self) -> u64 {
        self.defrag_count
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
