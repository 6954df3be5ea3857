//! Edge list loading

pub mod parquet;
pub mod text;

use std::collections::HashMap;

use crate::error::Result;
use crate::graph::{AdjacencyGraph, GraphStore};

/// Interns external string ids to dense `u32` node ids
#[derive(Debug, Clone, Default)]
pub struct NodeInterner {
    id_to_index: HashMap<String, u32>,
    names: Vec<String>,
}

impl NodeInterner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the node id for `name`
    pub fn intern(&mut self, name: &str) -> u32 {
        if let Some(&idx) = self.id_to_index.get(name) {
            return idx;
        }

        let idx = self.names.len() as u32;
        self.id_to_index.insert(name.to_string(), idx);
        self.names.push(name.to_string());
        idx
    }

    pub fn get(&self, name: &str) -> Option<u32> {
        self.id_to_index.get(name).copied()
    }

    pub fn name(&self, node: u32) -> Option<&str> {
        self.names.get(node as usize).map(String::as_str)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Undirected edges over interned node ids
#[derive(Debug, Clone, Default)]
pub struct EdgeList {
    pub edges: Vec<(u32, u32)>,
}

impl EdgeList {
    /// Record an edge between two external ids, dropping self-loops.
    ///
    /// Returns `false` if the edge was a self-loop.
    pub fn push(&mut self, interner: &mut NodeInterner, src: &str, dst: &str) -> bool {
        let src_idx = interner.intern(src);
        let dst_idx = interner.intern(dst);
        if src_idx == dst_idx {
            return false;
        }
        self.edges.push((src_idx, dst_idx));
        true
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// Build an adjacency graph holding every interned node and the given edges.
///
/// Nodes known to the interner but absent from `edges` become isolated nodes.
pub fn build_graph(interner: &NodeInterner, edges: &EdgeList) -> Result<AdjacencyGraph<u32>> {
    let mut graph = AdjacencyGraph::with_capacity(interner.len());
    for node in 0..interner.len() as u32 {
        graph.add_node(node);
    }

    let mut duplicates = 0usize;
    for &(u, v) in &edges.edges {
        if !graph.add_edge(u, v)? {
            duplicates += 1;
        }
    }

    if duplicates > 0 {
        log::info!("Dropped {} duplicate edges", duplicates);
    }

    Ok(graph)
}

/// Load an edge list, choosing the reader from the file extension
pub fn load_edge_list(path: &str, interner: &mut NodeInterner) -> Result<EdgeList> {
    if path.ends_with(".parquet") {
        parquet::load_edge_list(path, interner, parquet::SOURCE_COLUMN, parquet::TARGET_COLUMN)
    } else {
        text::load_edge_list(path, interner)
    }
}
