//! Persona id allocation and ownership bookkeeping

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::graph::NodeId;
use crate::persona::{PersonaGraph, PersonaId};

/// Hands out strictly increasing persona ids, never reusing one
#[derive(Debug, Clone, Default)]
pub struct PersonaAllocator {
    next: u64,
}

impl PersonaAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start allocating at `first`
    pub fn starting_at(first: u64) -> Self {
        Self { next: first }
    }

    /// Hand out the next id.
    ///
    /// Fails once the id space is used up; `u64::MAX` itself is never handed out.
    pub fn allocate(&mut self) -> Result<PersonaId> {
        let next = self
            .next
            .checked_add(1)
            .ok_or(Error::PersonaIdsExhausted)?;
        let id = PersonaId(self.next);
        self.next = next;
        Ok(id)
    }

    /// Id the next call to `allocate` will return
    pub fn peek(&self) -> PersonaId {
        PersonaId(self.next)
    }
}

/// Personality map plus the set of personas each node currently owns.
///
/// This is the single writer of persona ownership: ids are only allocated and
/// bound through `&mut self`, so uniqueness holds even when egonet components
/// are computed in parallel.
#[derive(Debug, Clone)]
pub struct PersonaIndex<N> {
    allocator: PersonaAllocator,

    /// Persona → owning node
    owners: HashMap<PersonaId, N>,

    /// Node → personas it owns, in allocation order
    personas: HashMap<N, Vec<PersonaId>>,
}

impl<N: NodeId> Default for PersonaIndex<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: NodeId> PersonaIndex<N> {
    pub fn new() -> Self {
        Self::with_allocator(PersonaAllocator::new())
    }

    pub fn with_allocator(allocator: PersonaAllocator) -> Self {
        Self {
            allocator,
            owners: HashMap::new(),
            personas: HashMap::new(),
        }
    }

    pub fn allocate(&mut self) -> Result<PersonaId> {
        self.allocator.allocate()
    }

    /// Record that `persona` belongs to `node`
    pub fn bind(&mut self, persona: PersonaId, node: N) {
        if let Some(previous) = self.owners.insert(persona, node) {
            if let Some(owned) = self.personas.get_mut(&previous) {
                owned.retain(|&p| p != persona);
            }
        }
        self.personas.entry(node).or_default().push(persona);
    }

    /// Drop every persona owned by `node` from the index and from `graph`.
    ///
    /// Returns the retired ids.
    pub fn retire(&mut self, node: N, graph: &mut PersonaGraph) -> Vec<PersonaId> {
        let retired = self.personas.remove(&node).unwrap_or_default();
        for persona in &retired {
            self.owners.remove(persona);
            graph.remove_persona(*persona);
        }
        retired
    }

    /// Forget all ownership, keeping the allocator position
    pub fn clear(&mut self) {
        self.owners.clear();
        self.personas.clear();
    }

    pub fn owner(&self, persona: PersonaId) -> Option<N> {
        self.owners.get(&persona).copied()
    }

    pub fn personas_of(&self, node: N) -> &[PersonaId] {
        self.personas.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn personality_map(&self) -> &HashMap<PersonaId, N> {
        &self.owners
    }

    pub fn allocator(&self) -> &PersonaAllocator {
        &self.allocator
    }

    /// Number of live personas
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}
