//! Parquet edge list files

use polars::prelude::*;

use crate::data::{EdgeList, NodeInterner};
use crate::error::Result;

pub const SOURCE_COLUMN: &str = "source";
pub const TARGET_COLUMN: &str = "target";

/// Load an edge list from the `source_col` and `target_col` columns.
///
/// Columns of any type are cast to strings before interning; rows with a null
/// endpoint are skipped.
pub fn load_edge_list(
    path: &str,
    interner: &mut NodeInterner,
    source_col: &str,
    target_col: &str,
) -> Result<EdgeList> {
    log::info!("Reading parquet file: {}", path);

    if !std::path::Path::new(path).exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("file not found: {}", path),
        )
        .into());
    }

    let df = LazyFrame::scan_parquet(path, Default::default())?
        .select([col(source_col), col(target_col)])
        .collect()?;

    log::info!("File schema: {:?}", df.schema());
    log::info!("Loaded {} rows", df.height());

    let sources = df.column(source_col)?.cast(&DataType::String)?;
    let targets = df.column(target_col)?.cast(&DataType::String)?;
    let sources = sources.str()?;
    let targets = targets.str()?;

    let mut edges = EdgeList::default();
    let mut skipped = 0usize;

    for i in 0..df.height() {
        match (sources.get(i), targets.get(i)) {
            (Some(src), Some(dst)) => {
                if !edges.push(interner, src, dst) {
                    skipped += 1;
                }
            }
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        log::info!("Skipped {} rows with null endpoints or self-loops", skipped);
    }
    log::info!("Loaded {} edges over {} nodes", edges.len(), interner.len());

    Ok(edges)
}
