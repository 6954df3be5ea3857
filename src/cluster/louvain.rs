//! Louvain modularity optimization over the persona graph.
//!
//! Multi-level greedy optimization (Blondel et al. 2008):
//!
//! 1. **Local moving**: every vertex starts in its own community and is moved
//!    to the neighboring community with the highest modularity gain until no
//!    move improves modularity.
//! 2. **Aggregation**: communities collapse into single vertices; edges between
//!    communities are summed and internal edges become self-loops.
//! 3. Repeat on the aggregated graph until modularity stops improving.
//!
//! Vertices are visited in persona id order and ties keep the current
//! community, so the result is deterministic for a given persona graph.

use std::collections::{BTreeMap, HashMap};

use crate::cluster::{ClusteringOracle, CommunityId, Partition};
use crate::error::{Error, Result};
use crate::persona::{PersonaGraph, PersonaId};

/// Smallest gain that counts as an improvement during local moving
const GAIN_EPSILON: f64 = 1e-12;

type WeightedEdge = (usize, usize, f64);

/// Louvain community detection
#[derive(Debug, Clone)]
pub struct Louvain {
    /// Maximum passes over all vertices per level
    max_iter: usize,
    /// Maximum levels of aggregation
    max_levels: usize,
    /// Minimum modularity improvement to continue aggregating
    min_modularity_gain: f64,
}

impl Default for Louvain {
    fn default() -> Self {
        Self::new()
    }
}

impl Louvain {
    pub fn new() -> Self {
        Self {
            max_iter: 100,
            max_levels: 10,
            min_modularity_gain: 1e-7,
        }
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_max_levels(mut self, max_levels: usize) -> Self {
        self.max_levels = max_levels;
        self
    }

    pub fn with_min_modularity_gain(mut self, gain: f64) -> Self {
        self.min_modularity_gain = gain;
        self
    }

    /// Modularity of `partition` on `graph` at the given resolution.
    ///
    /// Personas missing from the partition are treated as singletons.
    pub fn modularity(graph: &PersonaGraph, partition: &Partition, resolution: f64) -> f64 {
        let (personas, edges) = indexed_edges(graph);
        let n = personas.len();

        let mut next_singleton = partition.values().max().map_or(0, |&c| c + 1);
        let communities: Vec<usize> = personas
            .iter()
            .map(|persona| {
                partition.get(persona).copied().unwrap_or_else(|| {
                    next_singleton += 1;
                    next_singleton - 1
                })
            })
            .collect();

        modularity_weighted(n, &edges, &vec![0.0; n], &communities, resolution)
    }

    /// Phase 1: local moving on a weighted graph.
    /// Returns (communities, improved).
    fn local_moving(
        &self,
        n: usize,
        edges: &[WeightedEdge],
        self_loops: &[f64],
        resolution: f64,
    ) -> (Vec<usize>, bool) {
        let mut adj: Vec<BTreeMap<usize, f64>> = vec![BTreeMap::new(); n];
        for &(i, j, w) in edges {
            *adj[i].entry(j).or_insert(0.0) += w;
            *adj[j].entry(i).or_insert(0.0) += w;
        }

        let m = total_weight(edges, self_loops);
        if m == 0.0 {
            return ((0..n).collect(), false);
        }

        let degrees = weighted_degrees(n, edges, self_loops);
        let mut communities: Vec<usize> = (0..n).collect();
        let mut community_degrees = degrees.clone();
        let mut any_improved = false;

        for _ in 0..self.max_iter {
            let mut improved = false;

            for node in 0..n {
                let current = communities[node];
                let ki = degrees[node];

                // Take the node out of its community before scoring
                community_degrees[current] -= ki;

                let mut community_weights: BTreeMap<usize, f64> = BTreeMap::new();
                for (&neighbor, &w) in &adj[node] {
                    *community_weights.entry(communities[neighbor]).or_insert(0.0) += w;
                }

                let gain = |ki_in: f64, sigma_tot: f64| ki_in - resolution * sigma_tot * ki / (2.0 * m);

                let mut best = current;
                let mut best_gain = gain(
                    community_weights.get(&current).copied().unwrap_or(0.0),
                    community_degrees[current],
                );

                for (&target, &ki_in) in &community_weights {
                    let candidate = gain(ki_in, community_degrees[target]);
                    if candidate > best_gain + GAIN_EPSILON {
                        best = target;
                        best_gain = candidate;
                    }
                }

                communities[node] = best;
                community_degrees[best] += ki;

                if best != current {
                    improved = true;
                    any_improved = true;
                }
            }

            if !improved {
                break;
            }
        }

        (communities, any_improved)
    }

    /// Phase 2: collapse communities into vertices.
    /// Returns (vertex count, edges, self-loops, old vertex → new vertex).
    fn aggregate(
        edges: &[WeightedEdge],
        self_loops: &[f64],
        communities: &[usize],
    ) -> (usize, Vec<WeightedEdge>, Vec<f64>, Vec<usize>) {
        let mut comm_to_new: HashMap<usize, usize> = HashMap::new();
        let mapping: Vec<usize> = communities
            .iter()
            .map(|&c| {
                let next = comm_to_new.len();
                *comm_to_new.entry(c).or_insert(next)
            })
            .collect();
        let n_new = comm_to_new.len();

        let mut new_self_loops = vec![0.0; n_new];
        for (i, &sl) in self_loops.iter().enumerate() {
            new_self_loops[mapping[i]] += sl;
        }

        let mut new_edge_weights: BTreeMap<(usize, usize), f64> = BTreeMap::new();
        for &(i, j, w) in edges {
            let ci = mapping[i];
            let cj = mapping[j];
            if ci == cj {
                new_self_loops[ci] += w;
                continue;
            }
            let key = if ci < cj { (ci, cj) } else { (cj, ci) };
            *new_edge_weights.entry(key).or_insert(0.0) += w;
        }

        let new_edges = new_edge_weights
            .into_iter()
            .map(|((i, j), w)| (i, j, w))
            .collect();

        (n_new, new_edges, new_self_loops, mapping)
    }

    /// Community of every vertex `0..n`
    fn detect(&self, n: usize, edges: Vec<WeightedEdge>, resolution: f64) -> Vec<usize> {
        if edges.is_empty() {
            return (0..n).collect();
        }

        // Original vertex → vertex at the current level
        let mut assignment: Vec<usize> = (0..n).collect();

        let mut current_n = n;
        let mut current_edges = edges;
        let mut current_self_loops = vec![0.0; n];
        let mut prev_modularity = f64::NEG_INFINITY;

        for level in 0..self.max_levels {
            let (partition, improved) =
                self.local_moving(current_n, &current_edges, &current_self_loops, resolution);

            if !improved {
                break;
            }

            let modularity = modularity_weighted(
                current_n,
                &current_edges,
                &current_self_loops,
                &partition,
                resolution,
            );

            let (new_n, new_edges, new_self_loops, mapping) =
                Self::aggregate(&current_edges, &current_self_loops, &partition);

            for vertex in assignment.iter_mut() {
                *vertex = mapping[*vertex];
            }

            log::debug!(
                "Louvain level {}: {} -> {} vertices, modularity {:.6}",
                level,
                current_n,
                new_n,
                modularity
            );

            if new_n == current_n || modularity - prev_modularity < self.min_modularity_gain {
                break;
            }

            prev_modularity = modularity;
            current_n = new_n;
            current_edges = new_edges;
            current_self_loops = new_self_loops;
        }

        assignment
    }
}

impl ClusteringOracle for Louvain {
    fn best_partition(&self, graph: &PersonaGraph, resolution: f64) -> Result<Partition> {
        if !resolution.is_finite() || resolution < 0.0 {
            return Err(Error::InvalidParameter {
                name: "resolution",
                message: format!("must be a finite value >= 0, got {}", resolution),
            });
        }

        let (personas, edges) = indexed_edges(graph);
        let communities = self.detect(personas.len(), edges, resolution);

        // Renumber densely in order of first appearance by persona id
        let mut dense: HashMap<usize, CommunityId> = HashMap::new();
        let partition = personas
            .into_iter()
            .zip(communities)
            .map(|(persona, community)| {
                let next = dense.len();
                (persona, *dense.entry(community).or_insert(next))
            })
            .collect();

        Ok(partition)
    }
}

/// Personas sorted by id, and unit-weight edges between their positions
fn indexed_edges(graph: &PersonaGraph) -> (Vec<PersonaId>, Vec<WeightedEdge>) {
    let mut personas: Vec<PersonaId> = graph.personas().collect();
    personas.sort_unstable();

    let position: HashMap<PersonaId, usize> = personas
        .iter()
        .enumerate()
        .map(|(i, &persona)| (persona, i))
        .collect();

    let mut edges: Vec<WeightedEdge> = graph
        .edges()
        .filter(|(a, b)| a != b)
        .map(|(a, b)| {
            let (i, j) = (position[&a], position[&b]);
            if i < j { (i, j, 1.0) } else { (j, i, 1.0) }
        })
        .collect();
    edges.sort_by(|x, y| (x.0, x.1).cmp(&(y.0, y.1)));

    (personas, edges)
}

fn total_weight(edges: &[WeightedEdge], self_loops: &[f64]) -> f64 {
    edges.iter().map(|(_, _, w)| w).sum::<f64>() + self_loops.iter().sum::<f64>()
}

fn weighted_degrees(n: usize, edges: &[WeightedEdge], self_loops: &[f64]) -> Vec<f64> {
    let mut degrees = vec![0.0; n];
    for &(i, j, w) in edges {
        degrees[i] += w;
        degrees[j] += w;
    }
    for (i, &sl) in self_loops.iter().enumerate() {
        // Self-loops count twice toward degree
        degrees[i] += 2.0 * sl;
    }
    degrees
}

fn modularity_weighted(
    n: usize,
    edges: &[WeightedEdge],
    self_loops: &[f64],
    communities: &[usize],
    resolution: f64,
) -> f64 {
    let m = total_weight(edges, self_loops);
    if m == 0.0 {
        return 0.0;
    }

    let degrees = weighted_degrees(n, edges, self_loops);

    let mut internal: HashMap<usize, f64> = HashMap::new();
    let mut totals: HashMap<usize, f64> = HashMap::new();

    for &(i, j, w) in edges {
        if communities[i] == communities[j] {
            *internal.entry(communities[i]).or_insert(0.0) += w;
        }
    }
    for (i, &sl) in self_loops.iter().enumerate() {
        *internal.entry(communities[i]).or_insert(0.0) += sl;
    }
    for (i, &degree) in degrees.iter().enumerate() {
        *totals.entry(communities[i]).or_insert(0.0) += degree;
    }

    totals
        .iter()
        .map(|(community, &total)| {
            let inside = internal.get(community).copied().unwrap_or(0.0);
            inside / m - resolution * (total / (2.0 * m)).powi(2)
        })
        .sum()
}
