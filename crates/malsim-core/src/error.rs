use thiserror::Error;

/// Errors raised while building or querying an attack graph.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Duplicate node name: {name}")]
    DuplicateName { name: String },

    #[error("Unknown node referenced by {referenced_by}: {name}")]
    UnknownNode { name: String, referenced_by: String },

    #[error("Edge {parent} -> {child} points outside the graph ({node_count} nodes)")]
    DanglingEdge {
        parent: usize,
        child: usize,
        node_count: usize,
    },

    #[error("Self loop on node {name}")]
    SelfLoop { name: String },

    #[error("Attack graph contains a cycle through {name}")]
    Cycle { name: String },

    #[error("Invalid TTC for {distribution}: {reason}")]
    InvalidTtc {
        distribution: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, GraphError>;
