//! Error types for the ego-splitting pipeline

use crate::persona::PersonaId;

/// Result alias used across the library
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by graph stores, persona bookkeeping and the clustering boundary
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The graph store refused an edge because an endpoint does not exist
    #[error("unknown node: {0}")]
    UnknownNode(String),

    /// The graph store only holds simple graphs
    #[error("self-loop on node {0} is not allowed in a simple graph")]
    SelfLoop(String),

    /// A read or update was attempted before `fit` completed
    #[error("no partition available, call fit first")]
    UninitializedState,

    /// `fit` was called with a graph holding no nodes
    #[error("cannot fit an empty graph")]
    EmptyGraph,

    /// An edge lookup found no egonet decomposition entry
    #[error("node {node} has no persona recorded for neighbor {neighbor}")]
    MissingComponent { node: String, neighbor: String },

    /// The allocator ran out of persona ids
    #[error("persona id space exhausted")]
    PersonaIdsExhausted,

    /// The partition references a persona with no owner
    #[error("persona {0} has no owning node")]
    UnknownPersona(PersonaId),

    /// The clustering oracle returned a partition that does not cover its input
    #[error("clustering oracle broke its contract: {0}")]
    OracleContract(String),

    /// A configuration value is out of range
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter {
        name: &'static str,
        message: String,
    },

    /// Malformed line in a text edge list
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Polars(#[from] polars::prelude::PolarsError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn missing_component<N: std::fmt::Debug>(node: N, neighbor: N) -> Self {
        Error::MissingComponent {
            node: format!("{:?}", node),
            neighbor: format!("{:?}", neighbor),
        }
    }
}
