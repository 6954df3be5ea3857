use std::collections::{BTreeSet, HashMap, HashSet};

use petgraph::graphmap::UnGraphMap;

use ego_splitter::persona::edge_to_persona_edge;
use ego_splitter::{
    AdjacencyGraph, EgoNetSplitter, Error, GraphStore, NodeId, PersonaId, SplitterConfig,
};

type Signature<N> = (N, BTreeSet<N>);

fn scenario() -> AdjacencyGraph<char> {
    AdjacencyGraph::from_edges(vec![('a', 'b'), ('a', 'c'), ('b', 'c'), ('a', 'd')]).unwrap()
}

fn ring_with_chords(n: u32) -> Vec<(u32, u32)> {
    let mut edges: Vec<(u32, u32)> = (0..n).map(|i| (i, (i + 1) % n)).collect();
    edges.extend((0..n).step_by(3).map(|i| (i, (i + 5) % n)));
    edges
}

/// Persona → (owner, neighbors grouped into it), independent of persona ids
fn signatures<N, S>(splitter: &EgoNetSplitter<N, S>) -> HashMap<PersonaId, Signature<N>>
where
    N: NodeId,
    S: GraphStore<N> + Sync,
{
    let mut signatures: HashMap<PersonaId, Signature<N>> = HashMap::new();
    for (&owner, mapping) in splitter.component_maps() {
        for (&neighbor, &persona) in mapping {
            signatures
                .entry(persona)
                .or_insert_with(|| (owner, BTreeSet::new()))
                .1
                .insert(neighbor);
        }
    }
    signatures
}

/// Persona graph edges with personas replaced by their signatures
fn canonical_edges<N, S>(splitter: &EgoNetSplitter<N, S>) -> BTreeSet<(Signature<N>, Signature<N>)>
where
    N: NodeId,
    S: GraphStore<N> + Sync,
{
    let signatures = signatures(splitter);
    splitter
        .persona_graph()
        .edges()
        .map(|(a, b)| {
            let (sa, sb) = (signatures[&a].clone(), signatures[&b].clone());
            if sa <= sb {
                (sa, sb)
            } else {
                (sb, sa)
            }
        })
        .collect()
}

fn assert_consistent<N, S>(splitter: &EgoNetSplitter<N, S>)
where
    N: NodeId,
    S: GraphStore<N> + Sync,
{
    let graph = splitter.graph().unwrap();
    let persona_graph = splitter.persona_graph();

    // Every original edge maps to a persona edge that exists
    for (u, v) in graph.edges() {
        let (a, b) = edge_to_persona_edge(splitter.component_maps(), u, v).unwrap();
        assert!(persona_graph.contains_edge(a, b), "missing persona edge for {:?}", (u, v));
    }
    assert_eq!(persona_graph.edge_count(), graph.edge_count());

    // Live personas are exactly the persona graph vertices
    let live: HashSet<PersonaId> = splitter
        .persona_index()
        .personality_map()
        .keys()
        .copied()
        .collect();
    let vertices: HashSet<PersonaId> = persona_graph.personas().collect();
    assert_eq!(live, vertices);

    // A node's persona set is the image of its component map
    for node in graph.nodes() {
        let image: BTreeSet<PersonaId> = splitter
            .component_map(node)
            .map(|m| m.values().copied().collect())
            .unwrap_or_default();
        let owned: BTreeSet<PersonaId> = splitter.personas_of(node).iter().copied().collect();
        assert_eq!(image, owned, "persona set of {:?}", node);
    }
}

#[test]
fn test_scenario_component_map() {
    let mut splitter = EgoNetSplitter::new(SplitterConfig::default());
    splitter.fit(scenario()).unwrap();

    let a = splitter.component_map('a').unwrap();
    assert_eq!(a[&'b'], PersonaId(0));
    assert_eq!(a[&'c'], PersonaId(0));
    assert_eq!(a[&'d'], PersonaId(1));
    assert_eq!(splitter.personas_of('a'), &[PersonaId(0), PersonaId(1)]);
    assert_consistent(&splitter);
}

#[test]
fn test_component_consistency() {
    let mut splitter = EgoNetSplitter::new(SplitterConfig::default());
    let graph = AdjacencyGraph::from_edges(ring_with_chords(24)).unwrap();
    splitter.fit(graph).unwrap();

    let graph = splitter.graph().unwrap();
    for node in graph.nodes() {
        let mapping = splitter.component_map(node).unwrap();
        let components = graph.induced_components(&graph.neighbors(node));
        for x in graph.neighbors(node) {
            for y in graph.neighbors(node) {
                let same_component = components.iter().any(|c| c.contains(&x) && c.contains(&y));
                assert_eq!(mapping[&x] == mapping[&y], same_component);
            }
        }
    }
}

#[test]
fn test_stream_insert_touches_only_affected_nodes() {
    let mut splitter = EgoNetSplitter::new(SplitterConfig::default());
    splitter.fit(scenario()).unwrap();

    let c_before = splitter.component_map('c').unwrap().clone();
    let a_before = splitter.personas_of('a').to_vec();
    let b_before = splitter.personas_of('b').to_vec();
    let d_before = splitter.personas_of('d').to_vec();
    let first_new = splitter.persona_index().allocator().peek();

    splitter.stream_insert_edge(('d', 'b')).unwrap();

    // c's neighborhood did not change
    assert_eq!(splitter.component_map('c').unwrap(), &c_before);

    // a, b and d were re-decomposed with fresh ids
    for node in ['a', 'b', 'd'] {
        assert!(splitter.personas_of(node).iter().all(|&p| p >= first_new));
    }

    // b-c and b-d now connect a's neighborhood into a single component
    assert_eq!(splitter.personas_of('a').len(), 1);

    // Retired personas are gone everywhere
    for retired in a_before.iter().chain(&b_before).chain(&d_before) {
        assert_eq!(splitter.persona_index().owner(*retired), None);
        assert!(!splitter.persona_graph().contains_persona(*retired));
    }

    assert_consistent(&splitter);
}

#[test]
fn test_add_batch_matches_full_fit() {
    let base = ring_with_chords(30);
    let batch = vec![(0, 15), (2, 4), (7, 22), (10, 11), (29, 14), (1, 3)];

    let mut incremental = EgoNetSplitter::new(SplitterConfig::default());
    incremental
        .fit(AdjacencyGraph::from_edges(base.clone()).unwrap())
        .unwrap();
    let elapsed = incremental.add_batch(&batch).unwrap();
    assert!(elapsed >= 0.0);

    let mut all_edges = base;
    all_edges.extend(batch);
    let mut fresh = EgoNetSplitter::new(SplitterConfig::default());
    fresh.fit(AdjacencyGraph::from_edges(all_edges).unwrap()).unwrap();

    assert_consistent(&incremental);
    assert_eq!(canonical_edges(&incremental), canonical_edges(&fresh));
    assert_eq!(
        incremental.persona_graph().persona_count(),
        fresh.persona_graph().persona_count()
    );
}

#[test]
fn test_stream_add_batch_matches_full_fit() {
    let base = ring_with_chords(18);
    let batch = vec![(0, 9), (3, 4), (9, 12), (0, 2)];

    let mut streamed = EgoNetSplitter::new(SplitterConfig::default());
    streamed
        .fit(AdjacencyGraph::from_edges(base.clone()).unwrap())
        .unwrap();
    streamed.stream_add_batch(&batch).unwrap();

    let mut all_edges = base;
    all_edges.extend(batch);
    let mut fresh = EgoNetSplitter::new(SplitterConfig::default());
    fresh.fit(AdjacencyGraph::from_edges(all_edges).unwrap()).unwrap();

    assert_consistent(&streamed);
    assert_eq!(canonical_edges(&streamed), canonical_edges(&fresh));
}

#[test]
fn test_persona_ids_never_reused() {
    let mut splitter = EgoNetSplitter::new(SplitterConfig::default());
    splitter
        .fit(AdjacencyGraph::from_edges(ring_with_chords(12)).unwrap())
        .unwrap();

    let mut seen: HashSet<PersonaId> = splitter
        .persona_index()
        .personality_map()
        .keys()
        .copied()
        .collect();

    for edge in [(0, 6), (1, 7), (2, 8)] {
        let live_before: HashSet<PersonaId> = splitter
            .persona_index()
            .personality_map()
            .keys()
            .copied()
            .collect();
        splitter.stream_insert_edge(edge).unwrap();
        for &persona in splitter.persona_index().personality_map().keys() {
            if !live_before.contains(&persona) {
                assert!(seen.insert(persona), "persona {} handed out twice", persona);
            }
        }
    }

    // Refitting keeps allocating forward
    let peek = splitter.persona_index().allocator().peek();
    splitter.refit().unwrap();
    assert!(splitter
        .persona_index()
        .personality_map()
        .keys()
        .all(|&p| p >= peek));
}

#[test]
fn test_memberships_cover_isolated_nodes() {
    let mut graph = scenario();
    graph.add_node('z');

    let mut splitter = EgoNetSplitter::new(SplitterConfig::default());
    splitter.fit(graph).unwrap();

    let memberships = splitter.get_memberships().unwrap();
    assert_eq!(memberships.len(), 5);
    assert!(memberships[&'z'].is_empty());
    assert_eq!(memberships[&'a'].len(), 2);

    let overlaps = splitter.get_overlaps().unwrap();
    let members: BTreeSet<char> = overlaps.values().flatten().copied().collect();
    assert_eq!(members, ['a', 'b', 'c', 'd'].into_iter().collect());
}

#[test]
fn test_all_isolated_nodes() {
    let mut graph: AdjacencyGraph<u32> = AdjacencyGraph::new();
    for node in 0..4 {
        graph.add_node(node);
    }

    let mut splitter = EgoNetSplitter::new(SplitterConfig::default());
    splitter.fit(graph).unwrap();

    assert_eq!(splitter.persona_graph().persona_count(), 0);
    assert!(splitter.get_overlaps().unwrap().is_empty());
    assert!(splitter.get_memberships().unwrap().values().all(Vec::is_empty));
}

#[test]
fn test_hub_joins_two_communities() {
    // Node 0 bridges two triangles that share no other edge
    let edges = vec![
        (0, 1),
        (0, 2),
        (0, 3),
        (1, 2),
        (2, 3),
        (1, 3),
        (0, 4),
        (0, 5),
        (0, 6),
        (4, 5),
        (5, 6),
        (4, 6),
    ];
    let mut splitter = EgoNetSplitter::new(SplitterConfig::default());
    splitter.fit(AdjacencyGraph::from_edges(edges).unwrap()).unwrap();

    let hub: BTreeSet<usize> = splitter.get_memberships().unwrap()[&0]
        .iter()
        .copied()
        .collect();
    assert_eq!(hub.len(), 2);

    let overlaps = splitter.get_overlaps().unwrap();
    for community in hub {
        assert!(overlaps[&community].contains(&0));
    }
    assert_eq!(splitter.memberships().unwrap().overlapping_node_count(), 1);
}

#[test]
fn test_unknown_node_is_reported_by_store() {
    let mut splitter = EgoNetSplitter::new(SplitterConfig::default());
    splitter.fit(scenario()).unwrap();

    let err = splitter.stream_insert_edge(('a', 'q')).unwrap_err();
    assert!(matches!(err, Error::UnknownNode(_)));
    assert!(matches!(splitter.get_overlaps(), Err(Error::UninitializedState)));
}

#[test]
fn test_graphmap_store_creates_nodes() {
    let graph: UnGraphMap<u32, ()> = UnGraphMap::from_edges(&[(1, 2), (2, 3), (1, 3)]);

    let mut splitter = EgoNetSplitter::new(SplitterConfig::default());
    splitter.fit(graph).unwrap();
    splitter.add_batch(&[(3, 4), (4, 1)]).unwrap();

    let memberships = splitter.get_memberships().unwrap();
    assert_eq!(memberships.len(), 4);
    assert!(!memberships[&4].is_empty());
    assert_consistent(&splitter);
}

#[test]
fn test_parallel_fit_matches_serial() {
    let edges = ring_with_chords(40);

    let mut serial = EgoNetSplitter::new(SplitterConfig::new(1.0, usize::MAX, 1));
    serial.fit(AdjacencyGraph::from_edges(edges.clone()).unwrap()).unwrap();

    let mut parallel = EgoNetSplitter::new(SplitterConfig::new(1.0, 1, 1));
    parallel.fit(AdjacencyGraph::from_edges(edges).unwrap()).unwrap();

    assert_eq!(serial.component_maps(), parallel.component_maps());
    assert_eq!(serial.partition().unwrap(), parallel.partition().unwrap());
    assert_eq!(serial.get_overlaps().unwrap(), parallel.get_overlaps().unwrap());
}

#[test]
fn test_resolution_is_validated() {
    let mut splitter = EgoNetSplitter::new(SplitterConfig::with_resolution(-2.0));
    let err = splitter.fit(scenario()).unwrap_err();
    assert!(matches!(err, Error::InvalidParameter { name: "resolution", .. }));
}
