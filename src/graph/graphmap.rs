//! `GraphStore` for petgraph's `UnGraphMap`

use petgraph::graphmap::UnGraphMap;

use crate::error::{Error, Result};
use crate::graph::{GraphStore, NodeId};

/// Edges to unknown nodes create them, like most general-purpose graph libraries.
impl<N: NodeId> GraphStore<N> for UnGraphMap<N, ()> {
    fn nodes(&self) -> Vec<N> {
        UnGraphMap::<N, ()>::nodes(self).collect()
    }

    fn contains_node(&self, node: N) -> bool {
        UnGraphMap::<N, ()>::contains_node(self, node)
    }

    fn node_count(&self) -> usize {
        UnGraphMap::<N, ()>::node_count(self)
    }

    fn edge_count(&self) -> usize {
        UnGraphMap::<N, ()>::edge_count(self)
    }

    fn neighbors(&self, node: N) -> Vec<N> {
        if !UnGraphMap::<N, ()>::contains_node(self, node) {
            return Vec::new();
        }
        UnGraphMap::<N, ()>::neighbors(self, node)
            .filter(|&other| other != node)
            .collect()
    }

    fn has_edge(&self, u: N, v: N) -> bool {
        UnGraphMap::<N, ()>::contains_edge(self, u, v)
    }

    fn add_edge(&mut self, u: N, v: N) -> Result<bool> {
        if u == v {
            return Err(Error::SelfLoop(format!("{:?}", u)));
        }
        Ok(UnGraphMap::<N, ()>::add_edge(self, u, v, ()).is_none())
    }

    fn edges(&self) -> Vec<(N, N)> {
        self.all_edges()
            .filter(|(u, v, _)| u != v)
            .map(|(u, v, _)| (u, v))
            .collect()
    }
}
