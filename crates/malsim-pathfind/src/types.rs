//! Request and response types for simulation operations.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use malsim_core::{AttackGraph, GraphSpec, NodeKind};

use crate::random::WalkStop;

/// Cost table keyed by node full name.
pub type NamedCosts = BTreeMap<String, f64>;

/// Request to compute the cheapest compromise path to a target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortestPathRequest {
    pub graph: GraphSpec,
    /// Already-compromised nodes the attacker starts from.
    pub sources: Vec<String>,
    pub target: String,
    /// Explicit per-node costs. If None, costs are estimated from TTCs.
    #[serde(default)]
    pub costs: Option<NamedCosts>,
    /// Seed for TTC estimation (overrides the configured seed).
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Cheapest compromise path to a target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortestPathResult {
    pub run_id: Uuid,
    pub target: String,
    /// None when the target is unreachable.
    pub cost: Option<f64>,
    pub reachable: bool,
    /// Compromise order. Ancestors shared by several AND prerequisites
    /// appear once per prerequisite. Empty when unreachable.
    pub path: Vec<String>,
    pub graph_stats: GraphStats,
    pub computed_at: DateTime<Utc>,
    pub computation_ms: u64,
}

/// Request for a randomized attack walk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomPathRequest {
    pub graph: GraphSpec,
    pub start: String,
    /// Stop once this node is compromised.
    #[serde(default)]
    pub target: Option<String>,
    /// Stop before exceeding this total cost.
    #[serde(default)]
    pub budget: Option<f64>,
    #[serde(default)]
    pub costs: Option<NamedCosts>,
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Result of a randomized attack walk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomPathResult {
    pub run_id: Uuid,
    pub total_cost: f64,
    pub visited: Vec<String>,
    /// Whether the target was compromised; None if no target was given.
    pub target_reached: Option<bool>,
    pub stop: WalkStop,
    pub computed_at: DateTime<Utc>,
    pub computation_ms: u64,
}

/// Request for a budgeted breadth sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreadthRequest {
    pub graph: GraphSpec,
    pub start: String,
    pub budget: f64,
    #[serde(default)]
    pub costs: Option<NamedCosts>,
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Result of a budgeted breadth sweep. Approximate: AND semantics are
/// ignored and nodes reached along several paths are listed repeatedly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreadthResult {
    pub run_id: Uuid,
    /// Cumulative path cost of the last node dequeued by the sweep.
    pub last_cost: f64,
    pub visited: Vec<String>,
    pub computed_at: DateTime<Utc>,
    pub computation_ms: u64,
}

/// How to produce a cost table.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CostMode {
    /// Monte Carlo estimate of each node's TTC.
    #[default]
    Ttc,
    /// Uniform random integers within the configured bounds.
    Uniform,
}

/// Request to generate a cost table for a graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostEstimateRequest {
    pub graph: GraphSpec,
    #[serde(default)]
    pub mode: CostMode,
    #[serde(default)]
    pub seed: Option<u64>,
}

/// A generated cost table, reusable as the `costs` field of other requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostTableResult {
    pub run_id: Uuid,
    pub mode: CostMode,
    pub costs: NamedCosts,
    pub computed_at: DateTime<Utc>,
    pub computation_ms: u64,
}

/// Statistics about the attack graph.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GraphStats {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub or_nodes: usize,
    pub and_nodes: usize,
}

impl GraphStats {
    pub fn of(graph: &AttackGraph) -> Self {
        let and_nodes = graph
            .nodes()
            .iter()
            .filter(|n| n.kind == NodeKind::And)
            .count();
        Self {
            total_nodes: graph.node_count(),
            total_edges: graph.edge_count(),
            or_nodes: graph.node_count() - and_nodes,
            and_nodes,
        }
    }
}
