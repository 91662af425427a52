//! In-memory id generators.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use mew_ha_core::IdCategory;
use parking_lot::Mutex;

use crate::error::{KernelError, KernelResult};
use crate::traits::{IdGenerator, IdGeneratorFactory};

#[derive(Debug, Default)]
struct GeneratorState {
    high_id: u64,
    free: VecDeque<u64>,
}

/// Monotonic generator that hands out freed ids before new ones.
#[derive(Debug, Default)]
pub struct MemoryIdGenerator {
    state: Mutex<GeneratorState>,
}

impl MemoryIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// A generator whose first new id is `high_id`.
    pub fn starting_at(high_id: u64) -> Self {
        Self {
            state: Mutex::new(GeneratorState {
                high_id,
                free: VecDeque::new(),
            }),
        }
    }

    /// Return an id for reuse. Ids never issued are ignored.
    pub fn free_id(&self, id: u64) {
        let mut state = self.state.lock();
        if id < state.high_id && !state.free.contains(&id) {
            state.free.push_back(id);
        }
    }
}

impl IdGenerator for MemoryIdGenerator {
    fn next_id(&self) -> KernelResult<u64> {
        let mut state = self.state.lock();
        if let Some(id) = state.free.pop_front() {
            return Ok(id);
        }

        let id = state.high_id;
        state.high_id = id
            .checked_add(1)
            .ok_or_else(|| KernelError::system("id space exhausted"))?;
        Ok(id)
    }

    fn high_id(&self) -> u64 {
        self.state.lock().high_id
    }

    fn defrag_count(&self) -> u64 {
        self.state.lock().free.len() as u64
    }
}

/// One [`MemoryIdGenerator`] per id category.
#[derive(Debug)]
pub struct MemoryIdGeneratorFactory {
    generators: HashMap<IdCategory, Arc<MemoryIdGenerator>>,
}

impl MemoryIdGeneratorFactory {
    /// Generators for every category, each starting at zero.
    pub fn new() -> Self {
        let generators = IdCategory::ALL
            .iter()
            .map(|&category| (category, Arc::new(MemoryIdGenerator::new())))
            .collect();
        Self { generators }
    }

    /// A factory with no generators registered.
    pub fn empty() -> Self {
        Self {
            generators: HashMap::new(),
        }
    }

    pub fn with_generator(mut self, category: IdCategory, generator: MemoryIdGenerator) -> Self {
        self.generators.insert(category, Arc::new(generator));
        self
    }

    /// The concrete generator, for callers that need to free ids.
    pub fn generator(&self, category: IdCategory) -> Option<Arc<MemoryIdGenerator>> {
        self.generators.get(&category).cloned()
    }
}

impl Default for MemoryIdGeneratorFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGeneratorFactory for MemoryIdGeneratorFactory {
    fn generator_for(&self, category: IdCategory) -> KernelResult<Arc<dyn IdGenerator>> {
        match self.generators.get(&category) {
            Some(generator) => Ok(Arc::clone(generator) as Arc<dyn IdGenerator>),
            None => Err(KernelError::NoGenerator(category)),
        }
    }
}
