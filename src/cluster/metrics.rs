//! Community statistics measured on the original graph

use std::cmp::Reverse;
use std::collections::{BTreeSet, HashSet};

use serde::Serialize;

use crate::cluster::CommunityId;
use crate::graph::{GraphStore, NodeId};

/// Number of central members reported per community
const CENTRAL_NODE_COUNT: usize = 5;

/// Summary of one detected community
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommunityStats<N> {
    pub id: CommunityId,

    pub size: usize,

    /// Internal edges / possible undirected edges
    pub density: f32,

    /// Members with the highest internal degree, highest first
    pub central_nodes: Vec<N>,
}

impl<N: Copy> CommunityStats<N> {
    /// Same statistics with member ids rendered by `f`
    pub fn map_nodes<T, F: Fn(N) -> T>(&self, f: F) -> CommunityStats<T> {
        CommunityStats {
            id: self.id,
            size: self.size,
            density: self.density,
            central_nodes: self.central_nodes.iter().map(|&n| f(n)).collect(),
        }
    }
}

/// Compute statistics for one community
pub fn community_stats<N, S>(graph: &S, id: CommunityId, members: &BTreeSet<N>) -> CommunityStats<N>
where
    N: NodeId,
    S: GraphStore<N> + ?Sized,
{
    let degrees = internal_degrees(graph, members);

    CommunityStats {
        id,
        size: members.len(),
        density: density(&degrees),
        central_nodes: central_nodes(degrees),
    }
}

/// Degree of each member counting only edges to other members
fn internal_degrees<N, S>(graph: &S, members: &BTreeSet<N>) -> Vec<(N, usize)>
where
    N: NodeId,
    S: GraphStore<N> + ?Sized,
{
    let member_set: HashSet<N> = members.iter().copied().collect();

    members
        .iter()
        .map(|&node| {
            let degree = graph
                .neighbors(node)
                .into_iter()
                .filter(|other| member_set.contains(other))
                .count();
            (node, degree)
        })
        .collect()
}

fn density<N>(degrees: &[(N, usize)]) -> f32 {
    let n = degrees.len();
    if n <= 1 {
        return 1.0; // By convention, singleton communities have density 1
    }

    // Each internal edge is counted from both endpoints
    let actual_edges: usize = degrees.iter().map(|(_, d)| d).sum::<usize>() / 2;
    let potential_edges = n * (n - 1) / 2;

    actual_edges as f32 / potential_edges as f32
}

fn central_nodes<N: NodeId>(mut degrees: Vec<(N, usize)>) -> Vec<N> {
    degrees.sort_by_key(|&(node, degree)| (Reverse(degree), node));
    degrees
        .into_iter()
        .take(CENTRAL_NODE_COUNT)
        .map(|(node, _)| node)
        .collect()
}
