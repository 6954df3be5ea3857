//! Overlapping community detection by ego-splitting.
//!
//! Every node is split into one persona per connected component of its
//! egonet, the personas are clustered without overlap, and the persona
//! clustering is projected back onto the original nodes. Edge insertions are
//! handled incrementally by re-decomposing only the affected nodes.

pub mod cluster;
pub mod config;
pub mod data;
pub mod error;
pub mod graph;
pub mod persona;
pub mod splitter;
pub mod storage;

pub use cluster::{ClusteringOracle, CommunityId, Louvain, Memberships, Partition};
pub use config::SplitterConfig;
pub use error::{Error, Result};
pub use graph::{AdjacencyGraph, GraphStore, NodeId};
pub use persona::{ComponentMap, PersonaAllocator, PersonaGraph, PersonaId, PersonaIndex};
pub use splitter::{affected_nodes, EgoNetSplitter};
