//! Persona graph construction and repair

use petgraph::graphmap::UnGraphMap;
use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::graph::{GraphStore, NodeId};
use crate::persona::{ComponentMaps, PersonaId};

/// Undirected, unweighted graph over live personas
#[derive(Debug, Clone, Default)]
pub struct PersonaGraph {
    graph: UnGraphMap<PersonaId, ()>,
}

impl PersonaGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a persona edge list; parallel edges collapse
    pub fn from_edges<I>(edges: I) -> Self
    where
        I: IntoIterator<Item = (PersonaId, PersonaId)>,
    {
        let mut graph = Self::new();
        for (a, b) in edges {
            graph.insert_edge(a, b);
        }
        graph
    }

    /// Insert an edge, creating missing personas. Returns `true` if it is new.
    pub fn insert_edge(&mut self, a: PersonaId, b: PersonaId) -> bool {
        self.graph.add_edge(a, b, ()).is_none()
    }

    /// Remove a persona and its incident edges
    pub fn remove_persona(&mut self, persona: PersonaId) -> bool {
        self.graph.remove_node(persona)
    }

    pub fn contains_persona(&self, persona: PersonaId) -> bool {
        self.graph.contains_node(persona)
    }

    pub fn contains_edge(&self, a: PersonaId, b: PersonaId) -> bool {
        self.graph.contains_edge(a, b)
    }

    pub fn personas(&self) -> impl Iterator<Item = PersonaId> + '_ {
        self.graph.nodes()
    }

    pub fn edges(&self) -> impl Iterator<Item = (PersonaId, PersonaId)> + '_ {
        self.graph.all_edges().map(|(a, b, _)| (a, b))
    }

    pub fn neighbors(&self, persona: PersonaId) -> impl Iterator<Item = PersonaId> + '_ {
        self.graph.neighbors(persona)
    }

    pub fn persona_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn as_graphmap(&self) -> &UnGraphMap<PersonaId, ()> {
        &self.graph
    }
}

/// Map an original edge to its persona edge.
///
/// Each endpoint contributes the persona the *other* endpoint's egonet placed
/// it in: `(components[u][v], components[v][u])`.
pub fn edge_to_persona_edge<N: NodeId>(
    components: &ComponentMaps<N>,
    u: N,
    v: N,
) -> Result<(PersonaId, PersonaId)> {
    let lookup = |node: N, neighbor: N| {
        components
            .get(&node)
            .and_then(|mapping| mapping.get(&neighbor))
            .copied()
            .ok_or_else(|| Error::missing_component(node, neighbor))
    };

    Ok((lookup(u, v)?, lookup(v, u)?))
}

/// Derive the persona graph from every original edge
pub fn build_persona_graph<N, S>(
    store: &S,
    components: &ComponentMaps<N>,
    parallel_threshold: usize,
) -> Result<PersonaGraph>
where
    N: NodeId,
    S: GraphStore<N> + ?Sized,
{
    let edges = store.edges();

    // Lookups only read the component maps; the first missing entry aborts
    let persona_edges: Vec<(PersonaId, PersonaId)> = if edges.len() >= parallel_threshold {
        edges
            .par_iter()
            .map(|&(u, v)| edge_to_persona_edge(components, u, v))
            .collect::<Result<_>>()?
    } else {
        edges
            .iter()
            .map(|&(u, v)| edge_to_persona_edge(components, u, v))
            .collect::<Result<_>>()?
    };

    // Personas only appear through their edges, so isolated nodes add nothing
    Ok(PersonaGraph::from_edges(persona_edges))
}

/// Re-derive the persona edges of every original edge incident to `nodes`.
///
/// Insertion is idempotent; edges away from `nodes` are left untouched.
/// Returns the number of persona edges that were not present before.
pub fn repair_persona_graph<'a, N, S, I>(
    graph: &mut PersonaGraph,
    store: &S,
    components: &ComponentMaps<N>,
    nodes: I,
) -> Result<usize>
where
    N: NodeId,
    S: GraphStore<N> + ?Sized,
    I: IntoIterator<Item = &'a N>,
{
    let mut inserted = 0;
    for &node in nodes {
        // Edges between two affected nodes are visited twice; the second insert is a no-op
        for (u, v) in store.edges_of(node) {
            let (a, b) = edge_to_persona_edge(components, u, v)?;
            if graph.insert_edge(a, b) {
                inserted += 1;
            }
        }
    }
    Ok(inserted)
}
