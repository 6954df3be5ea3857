//! Ego-splitting session: full fit and incremental edge updates

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::time::Instant;

use crate::cluster::{project, ClusteringOracle, CommunityId, Louvain, Memberships, Partition};
use crate::config::SplitterConfig;
use crate::error::{Error, Result};
use crate::graph::{GraphStore, NodeId};
use crate::persona::{
    build_persona_graph, decompose, decompose_all, repair_persona_graph, ComponentMap,
    ComponentMaps, PersonaAllocator, PersonaGraph, PersonaId, PersonaIndex,
};

/// Nodes whose egonets may have changed after inserting `edges` into `store`.
///
/// R = endpoints ∪ common neighbors of the endpoints, evaluated against the
/// store after the whole batch was applied. This is a heuristic: it does not
/// search for nodes whose component structure changed without being a direct
/// common neighbor of an inserted edge.
pub fn affected_nodes<N, S>(store: &S, edges: &[(N, N)]) -> BTreeSet<N>
where
    N: NodeId,
    S: GraphStore<N> + ?Sized,
{
    let mut affected = BTreeSet::new();
    for &(i, j) in edges {
        affected.insert(i);
        affected.insert(j);

        let i_neighbors: BTreeSet<N> = store.neighbors(i).into_iter().collect();
        affected.extend(
            store
                .neighbors(j)
                .into_iter()
                .filter(|w| i_neighbors.contains(w)),
        );
    }
    affected
}

/// Overlapping community detection by ego-splitting.
///
/// Owns the graph store, the persona index, every node's component map and the
/// persona graph. `fit` builds everything from scratch; `add_batch` and the
/// streaming calls re-decompose only the affected nodes and repair the persona
/// edges incident to them before re-clustering.
pub struct EgoNetSplitter<N, S, O = Louvain>
where
    N: NodeId,
    S: GraphStore<N>,
    O: ClusteringOracle,
{
    config: SplitterConfig,
    oracle: O,
    graph: Option<S>,
    index: PersonaIndex<N>,
    components: ComponentMaps<N>,
    persona_graph: PersonaGraph,
    partition: Option<Partition>,
    memberships: Option<Memberships<N>>,
}

impl<N, S> EgoNetSplitter<N, S, Louvain>
where
    N: NodeId,
    S: GraphStore<N> + Sync,
{
    /// Session clustering with the default Louvain oracle
    pub fn new(config: SplitterConfig) -> Self {
        Self::with_oracle(config, Louvain::new())
    }
}

impl<N, S, O> EgoNetSplitter<N, S, O>
where
    N: NodeId,
    S: GraphStore<N> + Sync,
    O: ClusteringOracle,
{
    pub fn with_oracle(config: SplitterConfig, oracle: O) -> Self {
        Self::with_allocator(config, oracle, PersonaAllocator::new())
    }

    /// Session drawing persona ids from `allocator`
    pub fn with_allocator(config: SplitterConfig, oracle: O, allocator: PersonaAllocator) -> Self {
        Self {
            config,
            oracle,
            graph: None,
            index: PersonaIndex::with_allocator(allocator),
            components: ComponentMaps::new(),
            persona_graph: PersonaGraph::new(),
            partition: None,
            memberships: None,
        }
    }

    /// Build personas, the persona graph and the clustering for `graph`.
    ///
    /// Returns the wall-clock seconds spent on decomposition and persona graph
    /// construction, excluding clustering.
    pub fn fit(&mut self, graph: S) -> Result<f64> {
        // Reject bad parameters before touching any state
        self.config.validate()?;
        if graph.node_count() == 0 {
            return Err(Error::EmptyGraph);
        }

        log::info!(
            "Fitting ego-splitter on {} nodes and {} edges",
            graph.node_count(),
            graph.edge_count()
        );

        self.graph = Some(graph);
        self.invalidate();

        // Split every node, then wire up the persona graph
        let start = Instant::now();
        self.create_egonets()?;
        self.create_persona_graph()?;
        let elapsed = start.elapsed().as_secs_f64();

        // Clustering is not part of the reported time
        self.create_partitions()?;
        Ok(elapsed)
    }

    /// Rebuild everything from the store currently held by the session
    pub fn refit(&mut self) -> Result<f64> {
        let graph = self.graph.take().ok_or(Error::UninitializedState)?;
        self.fit(graph)
    }

    /// Insert a batch of edges and update once for the whole batch.
    ///
    /// Returns the wall-clock seconds spent repairing personas and the persona
    /// graph, excluding clustering.
    pub fn add_batch(&mut self, edges: &[(N, N)]) -> Result<f64> {
        self.ensure_fitted()?;

        let graph = self.graph.as_mut().ok_or(Error::UninitializedState)?;
        for &(u, v) in edges {
            if let Err(err) = graph.add_edge(u, v) {
                // The store may hold part of the batch now; require a refit
                self.invalidate();
                return Err(err);
            }
        }

        // R is taken against the store with the whole batch applied
        let affected = affected_nodes(&*graph, edges);
        log::debug!(
            "Inserted {} edges, {} nodes affected",
            edges.len(),
            affected.len()
        );

        self.update(&affected)
    }

    /// Insert a single edge and update personas and clustering
    pub fn stream_insert_edge(&mut self, edge: (N, N)) -> Result<()> {
        self.add_batch(&[edge]).map(|_| ())
    }

    /// Insert edges one at a time, re-clustering after each
    pub fn stream_add_batch(&mut self, edges: &[(N, N)]) -> Result<()> {
        for &edge in edges {
            self.stream_insert_edge(edge)?;
        }
        Ok(())
    }

    /// Overlapping memberships: node → one community per persona
    pub fn get_memberships(&self) -> Result<&HashMap<N, Vec<CommunityId>>> {
        self.memberships
            .as_ref()
            .map(|m| &m.overlapping)
            .ok_or(Error::UninitializedState)
    }

    /// Community → original nodes it contains
    pub fn get_overlaps(&self) -> Result<&BTreeMap<CommunityId, BTreeSet<N>>> {
        self.memberships
            .as_ref()
            .map(|m| &m.communities)
            .ok_or(Error::UninitializedState)
    }

    pub fn memberships(&self) -> Result<&Memberships<N>> {
        self.memberships.as_ref().ok_or(Error::UninitializedState)
    }

    pub fn partition(&self) -> Result<&Partition> {
        self.partition.as_ref().ok_or(Error::UninitializedState)
    }

    pub fn graph(&self) -> Option<&S> {
        self.graph.as_ref()
    }

    pub fn persona_graph(&self) -> &PersonaGraph {
        &self.persona_graph
    }

    pub fn persona_index(&self) -> &PersonaIndex<N> {
        &self.index
    }

    pub fn component_map(&self, node: N) -> Option<&ComponentMap<N>> {
        self.components.get(&node)
    }

    pub fn component_maps(&self) -> &ComponentMaps<N> {
        &self.components
    }

    pub fn personas_of(&self, node: N) -> &[PersonaId] {
        self.index.personas_of(node)
    }

    pub fn config(&self) -> &SplitterConfig {
        &self.config
    }

    fn ensure_fitted(&self) -> Result<()> {
        if self.graph.is_none() || self.partition.is_none() {
            return Err(Error::UninitializedState);
        }
        Ok(())
    }

    fn invalidate(&mut self) {
        self.partition = None;
        self.memberships = None;
    }

    /// Fresh decomposition of every node
    fn create_egonets(&mut self) -> Result<()> {
        let graph = self.graph.as_ref().ok_or(Error::UninitializedState)?;
        log::info!("Creating egonets");

        // Ownership starts over, the allocator does not
        self.index.clear();
        let nodes = graph.nodes();
        self.components = decompose_all(
            graph,
            &nodes,
            &mut self.index,
            self.config.parallel_threshold,
        )?;

        log::info!(
            "Split {} nodes into {} personas",
            nodes.len(),
            self.index.len()
        );
        Ok(())
    }

    /// Retire and re-decompose the egonets of `nodes` in place
    fn refresh_egonets(&mut self, nodes: &BTreeSet<N>) -> Result<()> {
        let graph = self.graph.as_ref().ok_or(Error::UninitializedState)?;
        log::info!("Refreshing {} egonets", nodes.len());

        for &node in nodes {
            // Old personas leave the graph together with their edges
            self.index.retire(node, &mut self.persona_graph);
            let mapping = decompose(graph, node, &mut self.index)?;
            // The component map is replaced wholesale, never patched
            self.components.insert(node, mapping);
        }
        Ok(())
    }

    fn create_persona_graph(&mut self) -> Result<()> {
        let graph = self.graph.as_ref().ok_or(Error::UninitializedState)?;
        log::info!("Creating the persona graph");

        self.persona_graph =
            build_persona_graph(graph, &self.components, self.config.parallel_threshold)?;

        log::info!(
            "Persona graph has {} personas and {} edges",
            self.persona_graph.persona_count(),
            self.persona_graph.edge_count()
        );
        Ok(())
    }

    fn update_persona_graph(&mut self, nodes: &BTreeSet<N>) -> Result<()> {
        let graph = self.graph.as_ref().ok_or(Error::UninitializedState)?;
        log::info!("Updating the persona graph");

        let inserted =
            repair_persona_graph(&mut self.persona_graph, graph, &self.components, nodes)?;
        log::debug!("Re-derived {} persona edges", inserted);
        Ok(())
    }

    fn update(&mut self, affected: &BTreeSet<N>) -> Result<f64> {
        // The old partition no longer matches once personas change; if any
        // step below fails, reads stay unavailable until `refit`
        self.invalidate();

        // Re-egonet, then re-edge
        let start = Instant::now();
        self.refresh_egonets(affected)?;
        self.update_persona_graph(affected)?;
        let elapsed = start.elapsed().as_secs_f64();

        self.create_partitions()?;
        Ok(elapsed)
    }

    /// Cluster the persona graph and project the result onto original nodes
    fn create_partitions(&mut self) -> Result<()> {
        log::info!("Clustering the persona graph");
        self.invalidate();

        // The oracle must label every persona vertex and nothing else
        let partition = self
            .oracle
            .best_partition(&self.persona_graph, self.config.resolution)?;
        check_coverage(&self.persona_graph, &partition)?;

        // Every original node appears in the projection, isolated ones included
        let graph = self.graph.as_ref().ok_or(Error::UninitializedState)?;
        let memberships = project(&partition, self.index.personality_map(), graph.nodes())?;

        log::info!(
            "Found {} communities, {} nodes in more than one",
            memberships.communities.len(),
            memberships.overlapping_node_count()
        );

        self.partition = Some(partition);
        self.memberships = Some(memberships);
        Ok(())
    }
}

/// The partition must assign every persona vertex and nothing else
fn check_coverage(graph: &PersonaGraph, partition: &Partition) -> Result<()> {
    if let Some(missing) = graph.personas().find(|p| !partition.contains_key(p)) {
        return Err(Error::OracleContract(format!(
            "persona {} has no community",
            missing
        )));
    }
    if partition.len() != graph.persona_count() {
        return Err(Error::OracleContract(format!(
            "partition has {} personas, persona graph has {}",
            partition.len(),
            graph.persona_count()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::AdjacencyGraph;

    struct EmptyOracle;

    impl ClusteringOracle for EmptyOracle {
        fn best_partition(&self, _graph: &PersonaGraph, _resolution: f64) -> Result<Partition> {
            Ok(Partition::new())
        }
    }

    fn scenario_graph() -> AdjacencyGraph<char> {
        AdjacencyGraph::from_edges(vec![('a', 'b'), ('a', 'c'), ('b', 'c'), ('a', 'd')]).unwrap()
    }

    #[test]
    fn test_affected_nodes() {
        let mut graph = scenario_graph();
        graph.add_edge('d', 'b').unwrap();

        let affected = affected_nodes(&graph, &[('d', 'b')]);
        assert_eq!(affected, ['a', 'b', 'd'].into_iter().collect());
    }

    #[test]
    fn test_reads_before_fit() {
        let splitter: EgoNetSplitter<char, AdjacencyGraph<char>> =
            EgoNetSplitter::new(SplitterConfig::default());

        assert!(matches!(splitter.get_memberships(), Err(Error::UninitializedState)));
        assert!(matches!(splitter.get_overlaps(), Err(Error::UninitializedState)));
    }

    #[test]
    fn test_update_before_fit() {
        let mut splitter: EgoNetSplitter<char, AdjacencyGraph<char>> =
            EgoNetSplitter::new(SplitterConfig::default());

        assert!(matches!(
            splitter.stream_insert_edge(('a', 'b')),
            Err(Error::UninitializedState)
        ));
        assert!(matches!(splitter.refit(), Err(Error::UninitializedState)));
    }

    #[test]
    fn test_fit_empty_graph() {
        let mut splitter = EgoNetSplitter::new(SplitterConfig::default());
        let graph: AdjacencyGraph<u32> = AdjacencyGraph::new();
        assert!(matches!(splitter.fit(graph), Err(Error::EmptyGraph)));
    }

    #[test]
    fn test_oracle_contract_checked() {
        let mut splitter = EgoNetSplitter::with_oracle(SplitterConfig::default(), EmptyOracle);

        let err = splitter.fit(scenario_graph()).unwrap_err();
        assert!(matches!(err, Error::OracleContract(_)));
        assert!(splitter.get_memberships().is_err());
    }

    #[test]
    fn test_injected_allocator() {
        let mut splitter = EgoNetSplitter::with_allocator(
            SplitterConfig::default(),
            Louvain::new(),
            PersonaAllocator::starting_at(100),
        );
        splitter.fit(scenario_graph()).unwrap();

        assert_eq!(splitter.personas_of('a'), &[PersonaId(100), PersonaId(101)]);
    }

    #[test]
    fn test_allocator_exhausted_during_fit() {
        // Five personas are needed, three ids are left
        let mut splitter = EgoNetSplitter::with_allocator(
            SplitterConfig::default(),
            Louvain::new(),
            PersonaAllocator::starting_at(u64::MAX - 3),
        );

        let err = splitter.fit(scenario_graph()).unwrap_err();
        assert!(matches!(err, Error::PersonaIdsExhausted));
        assert!(matches!(splitter.get_memberships(), Err(Error::UninitializedState)));
    }

    #[test]
    fn test_allocator_exhausted_during_update() {
        let mut splitter = EgoNetSplitter::with_allocator(
            SplitterConfig::default(),
            Louvain::new(),
            PersonaAllocator::starting_at(u64::MAX - 6),
        );
        splitter.fit(scenario_graph()).unwrap();
        assert_eq!(splitter.persona_index().allocator().peek(), PersonaId(u64::MAX - 1));

        let err = splitter.stream_insert_edge(('d', 'b')).unwrap_err();
        assert!(matches!(err, Error::PersonaIdsExhausted));
        assert!(matches!(splitter.get_memberships(), Err(Error::UninitializedState)));
        assert!(matches!(
            splitter.stream_insert_edge(('c', 'd')),
            Err(Error::UninitializedState)
        ));
    }

    #[test]
    fn test_failed_insert_requires_refit() {
        let mut splitter = EgoNetSplitter::new(SplitterConfig::default());
        splitter.fit(scenario_graph()).unwrap();

        let err = splitter.add_batch(&[('b', 'd'), ('a', 'x')]).unwrap_err();
        assert!(matches!(err, Error::UnknownNode(_)));
        assert!(matches!(splitter.get_memberships(), Err(Error::UninitializedState)));

        splitter.refit().unwrap();
        assert!(splitter.graph().unwrap().has_edge('b', 'd'));
        assert_eq!(splitter.get_memberships().unwrap().len(), 4);
    }
}
