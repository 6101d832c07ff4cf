//! Error types for the malsim-pathfind crate.

use thiserror::Error;

use malsim_core::NodeId;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Graph error: {0}")]
    Graph(#[from] malsim_core::GraphError),

    #[error("At least one source node is required")]
    EmptySources,

    #[error("No cost defined for reachable node {name} ({node})")]
    MissingCost { node: NodeId, name: String },

    #[error("Invalid cost {cost} for node {name}: costs must be non-negative")]
    InvalidCost { name: String, cost: f64 },

    #[error("Invalid budget {budget}: budgets must be non-negative")]
    InvalidBudget { budget: f64 },

    #[error("Node not found: {name}")]
    NodeNotFound { name: String },

    #[error("Sample count must be at least 1")]
    ZeroSamples,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
