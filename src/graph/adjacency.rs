//! Persistent adjacency-list graph store indexed by node

use std::collections::HashMap;
use std::mem;

use crate::error::{Error, Result};
use crate::graph::{GraphStore, NodeId};

/// Undirected simple graph with one sorted adjacency list per node.
///
/// Nodes are interned to dense indices on insertion; adjacency lists hold
/// indices and stay sorted so edge lookups are a binary search. Edges to
/// nodes that were never added are rejected with [`Error::UnknownNode`].
#[derive(Debug, Clone)]
pub struct AdjacencyGraph<N> {
    /// Mapping from node identifiers to dense indices
    id_to_index: HashMap<N, u32>,

    /// Node identifiers by dense index
    node_ids: Vec<N>,

    /// Sorted adjacency list for each node
    adjacency_lists: Vec<Vec<u32>>,

    /// Number of undirected edges
    edge_count: usize,
}

impl<N: NodeId> Default for AdjacencyGraph<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: NodeId> AdjacencyGraph<N> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an empty graph with room for `capacity` nodes
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            id_to_index: HashMap::with_capacity(capacity),
            node_ids: Vec::with_capacity(capacity),
            adjacency_lists: Vec::with_capacity(capacity),
            edge_count: 0,
        }
    }

    /// Build a graph from an edge list, creating endpoints as they appear
    pub fn from_edges<I>(edges: I) -> Result<Self>
    where
        I: IntoIterator<Item = (N, N)>,
    {
        let mut graph = Self::new();
        for (u, v) in edges {
            graph.add_node(u);
            graph.add_node(v);
            graph.insert_edge(u, v)?;
        }
        Ok(graph)
    }

    /// Add a node if it is not present yet.
    ///
    /// Returns `true` if the node was created.
    pub fn add_node(&mut self, node: N) -> bool {
        if self.id_to_index.contains_key(&node) {
            return false;
        }

        let idx = self.node_ids.len() as u32;
        self.id_to_index.insert(node, idx);
        self.node_ids.push(node);
        self.adjacency_lists.push(Vec::new());
        true
    }

    /// Number of neighbors of `node`, zero for unknown nodes
    pub fn degree(&self, node: N) -> usize {
        self.index_of(node)
            .map(|idx| self.adjacency_lists[idx as usize].len())
            .unwrap_or(0)
    }

    /// Estimate memory usage in bytes
    pub fn memory_usage(&self) -> usize {
        let base = mem::size_of::<Self>();
        let ids = self.node_ids.capacity() * mem::size_of::<N>();
        let index = self.id_to_index.capacity() * (mem::size_of::<N>() + mem::size_of::<u32>());
        let lists: usize = self
            .adjacency_lists
            .iter()
            .map(|list| mem::size_of::<Vec<u32>>() + list.capacity() * mem::size_of::<u32>())
            .sum();

        base + ids + index + lists
    }

    fn index_of(&self, node: N) -> Option<u32> {
        self.id_to_index.get(&node).copied()
    }

    fn require(&self, node: N) -> Result<u32> {
        self.index_of(node)
            .ok_or_else(|| Error::UnknownNode(format!("{:?}", node)))
    }

    fn insert_edge(&mut self, u: N, v: N) -> Result<bool> {
        if u == v {
            return Err(Error::SelfLoop(format!("{:?}", u)));
        }

        let u_idx = self.require(u)?;
        let v_idx = self.require(v)?;

        let u_list = &mut self.adjacency_lists[u_idx as usize];
        let pos = match u_list.binary_search(&v_idx) {
            Ok(_) => return Ok(false),
            Err(pos) => pos,
        };
        u_list.insert(pos, v_idx);

        let v_list = &mut self.adjacency_lists[v_idx as usize];
        if let Err(pos) = v_list.binary_search(&u_idx) {
            v_list.insert(pos, u_idx);
        }

        self.edge_count += 1;
        Ok(true)
    }
}

impl<N: NodeId> GraphStore<N> for AdjacencyGraph<N> {
    fn nodes(&self) -> Vec<N> {
        self.node_ids.clone()
    }

    fn contains_node(&self, node: N) -> bool {
        self.id_to_index.contains_key(&node)
    }

    fn node_count(&self) -> usize {
        self.node_ids.len()
    }

    fn edge_count(&self) -> usize {
        self.edge_count
    }

    fn neighbors(&self, node: N) -> Vec<N> {
        match self.index_of(node) {
            Some(idx) => self.adjacency_lists[idx as usize]
                .iter()
                .map(|&other| self.node_ids[other as usize])
                .collect(),
            None => Vec::new(),
        }
    }

    fn has_edge(&self, u: N, v: N) -> bool {
        match (self.index_of(u), self.index_of(v)) {
            (Some(u_idx), Some(v_idx)) => self.adjacency_lists[u_idx as usize]
                .binary_search(&v_idx)
                .is_ok(),
            _ => false,
        }
    }

    fn add_edge(&mut self, u: N, v: N) -> Result<bool> {
        self.insert_edge(u, v)
    }

    fn edges(&self) -> Vec<(N, N)> {
        let mut edges = Vec::with_capacity(self.edge_count);
        for (src, list) in self.adjacency_lists.iter().enumerate() {
            // Only emit each undirected edge from its lower index
            for &dst in list.iter().filter(|&&dst| dst as usize > src) {
                edges.push((self.node_ids[src], self.node_ids[dst as usize]));
            }
        }
        edges
    }
}
