//! Personas: per-component splits of original nodes

pub mod egonet;
pub mod graph;
pub mod index;

use std::collections::HashMap;
use std::fmt;

pub use egonet::{assign_personas, decompose, decompose_all, egonet_components};
pub use graph::{build_persona_graph, edge_to_persona_edge, repair_persona_graph, PersonaGraph};
pub use index::{PersonaAllocator, PersonaIndex};

/// Identifier of a persona, unique for the lifetime of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PersonaId(pub u64);

impl fmt::Display for PersonaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Neighbor → persona the neighbor was grouped into within one node's egonet
pub type ComponentMap<N> = HashMap<N, PersonaId>;

/// Component maps of every decomposed node
pub type ComponentMaps<N> = HashMap<N, ComponentMap<N>>;
