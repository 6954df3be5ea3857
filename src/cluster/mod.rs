//! Clustering boundary: non-overlapping partitions of the persona graph

pub mod louvain;
pub mod metrics;
pub mod projection;

use std::collections::BTreeMap;

use crate::error::Result;
use crate::persona::{PersonaGraph, PersonaId};

pub use louvain::Louvain;
pub use metrics::{community_stats, CommunityStats};
pub use projection::{project, Memberships};

/// Dense community identifier produced by a clustering oracle
pub type CommunityId = usize;

/// Persona → community, ordered by persona id
pub type Partition = BTreeMap<PersonaId, CommunityId>;

/// Non-overlapping community detection over the persona graph
pub trait ClusteringOracle {
    /// Assign every persona of `graph` to exactly one community.
    ///
    /// Higher `resolution` yields smaller communities. A graph without edges
    /// must still produce a partition covering every persona.
    fn best_partition(&self, graph: &PersonaGraph, resolution: f64) -> Result<Partition>;
}

impl<O: ClusteringOracle + ?Sized> ClusteringOracle for Box<O> {
    fn best_partition(&self, graph: &PersonaGraph, resolution: f64) -> Result<Partition> {
        (**self).best_partition(graph, resolution)
    }
}
