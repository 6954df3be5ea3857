//! Projection of a persona partition back onto original nodes

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::cluster::{CommunityId, Partition};
use crate::error::{Error, Result};
use crate::graph::NodeId;
use crate::persona::PersonaId;

/// Overlapping community structure of the original graph
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Memberships<N: NodeId> {
    /// Node → one community per persona it owns, in persona id order
    pub overlapping: HashMap<N, Vec<CommunityId>>,

    /// Community → the original nodes it contains
    pub communities: BTreeMap<CommunityId, BTreeSet<N>>,
}

impl<N: NodeId> Memberships<N> {
    /// Number of nodes belonging to more than one distinct community
    pub fn overlapping_node_count(&self) -> usize {
        self.overlapping
            .values()
            .filter(|communities| communities.iter().collect::<BTreeSet<_>>().len() > 1)
            .count()
    }
}

/// Map every (persona, community) pair onto the persona's owner.
///
/// Every node in `nodes` gets an entry, empty when it owns no persona.
pub fn project<N, I>(
    partition: &Partition,
    personality_map: &HashMap<PersonaId, N>,
    nodes: I,
) -> Result<Memberships<N>>
where
    N: NodeId,
    I: IntoIterator<Item = N>,
{
    let mut overlapping: HashMap<N, Vec<CommunityId>> =
        nodes.into_iter().map(|node| (node, Vec::new())).collect();
    let mut communities: BTreeMap<CommunityId, BTreeSet<N>> = BTreeMap::new();

    for (&persona, &community) in partition {
        let owner = *personality_map
            .get(&persona)
            .ok_or(Error::UnknownPersona(persona))?;

        overlapping.entry(owner).or_default().push(community);
        communities.entry(community).or_default().insert(owner);
    }

    Ok(Memberships {
        overlapping,
        communities,
    })
}
