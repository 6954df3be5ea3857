use anyhow::{Context, Result};
use clap::Parser;

use ego_splitter::data::{self, EdgeList, NodeInterner};
use ego_splitter::storage;
use ego_splitter::{EgoNetSplitter, GraphStore, SplitterConfig};

#[derive(Parser, Debug)]
#[clap(
    name = "ego-splitter",
    about = "Overlapping community detection with ego-splitting"
)]
struct Cli {
    /// Path to the input edge list (.parquet with source/target columns, or a text file)
    #[clap(long)]
    input: String,

    /// Optional edge list inserted incrementally after the initial fit
    #[clap(long)]
    batch: Option<String>,

    /// Apply the batch one edge at a time, re-clustering after each edge
    #[clap(long)]
    stream: bool,

    /// Output directory for results
    #[clap(long, default_value = "community_results")]
    output_dir: String,

    /// Clustering resolution (higher values give smaller communities)
    #[clap(long, default_value = "1.0")]
    resolution: f64,

    /// Minimum community size reported in communities.json
    #[clap(long, default_value = "1")]
    min_community_size: usize,

    /// Node count at which egonets are decomposed in parallel
    #[clap(long, default_value = "1000")]
    parallel_threshold: usize,

    /// Number of worker threads (0 = use all available cores)
    #[clap(long, default_value = "0")]
    threads: usize,

    /// Verbose logging
    #[clap(long, short)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Cli::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_millis()
        .init();

    let num_threads = if args.threads > 0 {
        args.threads
    } else {
        num_cpus::get()
    };

    log::info!("Using {} worker threads", num_threads);
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()?;

    let config = SplitterConfig::new(
        args.resolution,
        args.parallel_threshold,
        args.min_community_size,
    );
    config.validate()?;

    log::info!("Input: {}", args.input);
    log::info!("Output: {}", args.output_dir);

    // 1. Load edges; batch nodes are registered up front so the store accepts them later
    let mut interner = NodeInterner::new();
    let edges = data::load_edge_list(&args.input, &mut interner)
        .with_context(|| format!("failed to load {}", args.input))?;
    let batch = match &args.batch {
        Some(path) => data::load_edge_list(path, &mut interner)
            .with_context(|| format!("failed to load {}", path))?,
        None => EdgeList::default(),
    };

    let graph = data::build_graph(&interner, &edges)?;
    log::info!(
        "Loaded graph with {} nodes and {} edges",
        graph.node_count(),
        graph.edge_count()
    );

    // 2. Fit
    let mut splitter = EgoNetSplitter::new(config);
    let elapsed = splitter.fit(graph)?;
    log::info!("Persona graph built in {:.3}s", elapsed);

    // 3. Incremental updates
    if !batch.is_empty() {
        if args.stream {
            log::info!("Streaming {} edges", batch.len());
            splitter.stream_add_batch(&batch.edges)?;
        } else {
            log::info!("Adding a batch of {} edges", batch.len());
            let elapsed = splitter.add_batch(&batch.edges)?;
            log::info!("Batch update took {:.3}s", elapsed);
        }
    }

    // 4. Save results
    storage::save_results(
        &splitter,
        |node| interner.name(node).unwrap_or_default().to_string(),
        &args.output_dir,
        args.min_community_size,
    )?;

    log::info!("Analysis complete. Results saved to {}", args.output_dir);

    Ok(())
}
