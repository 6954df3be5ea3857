//! Graph store abstraction and implementations

pub mod adjacency;
pub mod components;
pub mod graphmap;

use std::fmt::Debug;
use std::hash::Hash;

use crate::error::Result;

pub use adjacency::AdjacencyGraph;
pub use components::DisjointSets;

/// Identifier of a node in the original graph
pub trait NodeId: Copy + Eq + Hash + Ord + Debug + Send + Sync + 'static {}

impl<T> NodeId for T where T: Copy + Eq + Hash + Ord + Debug + Send + Sync + 'static {}

/// Simple undirected graph consumed by the ego-splitting core.
///
/// Implementations decide what happens on edges to unknown nodes: the core
/// never validates endpoints itself and propagates whatever `add_edge` reports.
pub trait GraphStore<N: NodeId> {
    /// All nodes, in the store's iteration order
    fn nodes(&self) -> Vec<N>;

    fn contains_node(&self, node: N) -> bool;

    fn node_count(&self) -> usize;

    /// Number of undirected edges
    fn edge_count(&self) -> usize;

    /// Open neighborhood of `node`; empty for unknown nodes
    fn neighbors(&self, node: N) -> Vec<N>;

    fn has_edge(&self, u: N, v: N) -> bool;

    /// Insert the undirected edge `(u, v)`.
    ///
    /// Returns `true` if the edge was not present before.
    fn add_edge(&mut self, u: N, v: N) -> Result<bool>;

    /// Every undirected edge exactly once
    fn edges(&self) -> Vec<(N, N)>;

    /// Edges incident to `node`, with `node` as the first endpoint
    fn edges_of(&self, node: N) -> Vec<(N, N)> {
        self.neighbors(node)
            .into_iter()
            .map(|other| (node, other))
            .collect()
    }

    /// Connected components of the subgraph induced on `nodes`
    fn induced_components(&self, nodes: &[N]) -> Vec<Vec<N>> {
        components::induced_components(self, nodes)
    }
}
