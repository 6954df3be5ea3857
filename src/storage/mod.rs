//! Results persistence module

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use itertools::Itertools;
use serde::Serialize;
use serde_json::{json, to_string_pretty};

use crate::cluster::{community_stats, ClusteringOracle, CommunityStats, Louvain};
use crate::error::{Error, Result};
use crate::graph::{GraphStore, NodeId};
use crate::splitter::EgoNetSplitter;

/// One entry of `communities.json`
#[derive(Debug, Serialize)]
struct CommunityRecord {
    #[serde(flatten)]
    stats: CommunityStats<String>,

    members: Vec<String>,
}

/// Save the memberships and communities of a fitted session to `output_dir`.
///
/// `name_of` renders node ids for output. Communities smaller than
/// `min_community_size` are left out of `communities.json` and the summary
/// statistics, but memberships are always written in full.
pub fn save_results<N, S, O, F>(
    splitter: &EgoNetSplitter<N, S, O>,
    name_of: F,
    output_dir: &str,
    min_community_size: usize,
) -> Result<()>
where
    N: NodeId,
    S: GraphStore<N> + Sync,
    O: ClusteringOracle,
    F: Fn(N) -> String,
{
    let graph = splitter.graph().ok_or(Error::UninitializedState)?;
    let memberships = splitter.memberships()?;

    log::info!(
        "Saving {} communities to {}",
        memberships.communities.len(),
        output_dir
    );

    fs::create_dir_all(output_dir)?;

    let stats: Vec<CommunityStats<N>> = memberships
        .communities
        .iter()
        .filter(|(_, members)| members.len() >= min_community_size)
        .map(|(&id, members)| community_stats(graph, id, members))
        .sorted_by(|a, b| b.size.cmp(&a.size).then(a.id.cmp(&b.id)))
        .collect();

    save_summary(splitter, &stats, output_dir)?;
    save_memberships(splitter, &name_of, output_dir)?;
    save_communities(splitter, &stats, &name_of, output_dir)?;

    log::info!("Results saved successfully");

    Ok(())
}

fn write_json(path: &Path, value: &serde_json::Value) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(to_string_pretty(value)?.as_bytes())?;
    Ok(())
}

/// Save summary information
fn save_summary<N, S, O>(
    splitter: &EgoNetSplitter<N, S, O>,
    stats: &[CommunityStats<N>],
    output_dir: &str,
) -> Result<()>
where
    N: NodeId,
    S: GraphStore<N> + Sync,
    O: ClusteringOracle,
{
    log::info!("Saving summary information");

    let graph = splitter.graph().ok_or(Error::UninitializedState)?;
    let memberships = splitter.memberships()?;
    let partition = splitter.partition()?;
    let persona_graph = splitter.persona_graph();
    let config = splitter.config();

    let total_members: usize = stats.iter().map(|s| s.size).sum();
    let community_count = if stats.is_empty() { 1.0 } else { stats.len() as f64 };

    let summary = json!({
        "config": config,
        "graph_stats": {
            "node_count": graph.node_count(),
            "edge_count": graph.edge_count(),
            "persona_count": persona_graph.persona_count(),
            "persona_edge_count": persona_graph.edge_count(),
            "avg_personas_per_node": persona_graph.persona_count() as f64 / graph.node_count().max(1) as f64,
        },
        "community_stats": {
            "community_count": memberships.communities.len(),
            "reported_community_count": stats.len(),
            "overlapping_node_count": memberships.overlapping_node_count(),
            "modularity": Louvain::modularity(persona_graph, partition, config.resolution),
            "largest_community_size": stats.first().map_or(0, |s| s.size),
            "smallest_community_size": stats.last().map_or(0, |s| s.size),
            "avg_community_size": total_members as f64 / community_count,
            "avg_density": stats.iter().map(|s| s.density as f64).sum::<f64>() / community_count,
        }
    });

    write_json(&Path::new(output_dir).join("summary.json"), &summary)
}

/// Save node → communities, sorted by node
fn save_memberships<N, S, O, F>(
    splitter: &EgoNetSplitter<N, S, O>,
    name_of: &F,
    output_dir: &str,
) -> Result<()>
where
    N: NodeId,
    S: GraphStore<N> + Sync,
    O: ClusteringOracle,
    F: Fn(N) -> String,
{
    log::info!("Saving node memberships");

    let memberships = splitter.get_memberships()?;
    let entries: serde_json::Map<String, serde_json::Value> = memberships
        .iter()
        .sorted_by_key(|(node, _)| **node)
        .map(|(&node, communities)| (name_of(node), json!(communities)))
        .collect();

    write_json(
        &Path::new(output_dir).join("memberships.json"),
        &serde_json::Value::Object(entries),
    )
}

/// Save per-community statistics and members
fn save_communities<N, S, O, F>(
    splitter: &EgoNetSplitter<N, S, O>,
    stats: &[CommunityStats<N>],
    name_of: &F,
    output_dir: &str,
) -> Result<()>
where
    N: NodeId,
    S: GraphStore<N> + Sync,
    O: ClusteringOracle,
    F: Fn(N) -> String,
{
    log::info!("Saving community information");

    let overlaps = splitter.get_overlaps()?;

    let records: Vec<CommunityRecord> = stats
        .iter()
        .map(|s| CommunityRecord {
            stats: s.map_nodes(name_of),
            members: overlaps
                .get(&s.id)
                .map(|members| members.iter().map(|&n| name_of(n)).collect())
                .unwrap_or_default(),
        })
        .collect();

    let communities_json = json!({ "communities": records });

    write_json(&Path::new(output_dir).join("communities.json"), &communities_json)
}
