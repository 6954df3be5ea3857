//! Egonet decomposition: one persona per connected component of a neighborhood

use rayon::prelude::*;

use crate::error::Result;
use crate::graph::{GraphStore, NodeId};
use crate::persona::{ComponentMap, ComponentMaps, PersonaIndex};

/// Connected components of the subgraph induced on `node`'s open neighborhood.
///
/// `node` itself is never part of the result, even if the store reports it as
/// its own neighbor.
pub fn egonet_components<N, S>(store: &S, node: N) -> Vec<Vec<N>>
where
    N: NodeId,
    S: GraphStore<N> + ?Sized,
{
    // Open neighborhood, minus any self-loop the store might report
    let neighbors: Vec<N> = store
        .neighbors(node)
        .into_iter()
        .filter(|&other| other != node)
        .collect();

    if neighbors.is_empty() {
        return Vec::new();
    }

    store.induced_components(&neighbors)
}

/// Allocate one fresh persona per component and bind it to `node`
pub fn assign_personas<N: NodeId>(
    node: N,
    components: Vec<Vec<N>>,
    index: &mut PersonaIndex<N>,
) -> Result<ComponentMap<N>> {
    let mut mapping = ComponentMap::with_capacity(components.iter().map(Vec::len).sum());

    for component in components {
        let persona = index.allocate()?;
        index.bind(persona, node);
        // Every member of the component sees `node` through the same persona
        for other in component {
            mapping.insert(other, persona);
        }
    }

    Ok(mapping)
}

/// Decompose the egonet of a single node
pub fn decompose<N, S>(store: &S, node: N, index: &mut PersonaIndex<N>) -> Result<ComponentMap<N>>
where
    N: NodeId,
    S: GraphStore<N> + ?Sized,
{
    let components = egonet_components(store, node);
    assign_personas(node, components, index)
}

/// Decompose the egonets of `nodes`.
///
/// At or above `parallel_threshold` nodes the components are computed on the
/// rayon pool. Personas are always assigned serially in the order of `nodes`,
/// so both paths allocate identical ids.
pub fn decompose_all<N, S>(
    store: &S,
    nodes: &[N],
    index: &mut PersonaIndex<N>,
    parallel_threshold: usize,
) -> Result<ComponentMaps<N>>
where
    N: NodeId,
    S: GraphStore<N> + Sync + ?Sized,
{
    // Components only read the store, so they can be computed on any thread
    let components: Vec<Vec<Vec<N>>> = if nodes.len() >= parallel_threshold {
        log::debug!("Computing {} egonets in parallel", nodes.len());
        nodes
            .par_iter()
            .map(|&node| egonet_components(store, node))
            .collect()
    } else {
        nodes
            .iter()
            .map(|&node| egonet_components(store, node))
            .collect()
    };

    // Ids are handed out on this thread only, in node order
    let mut maps = ComponentMaps::with_capacity(nodes.len());
    for (&node, node_components) in nodes.iter().zip(components) {
        maps.insert(node, assign_personas(node, node_components, index)?);
    }
    Ok(maps)
}
