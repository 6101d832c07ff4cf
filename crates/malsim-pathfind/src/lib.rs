//! malsim-pathfind: Path finding and attack simulation over AND/OR attack graphs.
//!
//! Computes minimum-cost compromise labels with a multi-source AND/OR
//! Dijkstra, backtraces them into compromise sequences, and runs two
//! exploratory traversals (a random walk over the attack surface and a
//! budgeted breadth sweep). Node costs come from an explicit table, from
//! Monte Carlo estimates of each node's time-to-compromise, or from a
//! uniform random draw.

pub mod algorithms;
pub mod breadth;
pub mod config;
pub mod costs;
pub mod error;
pub mod estimate;
pub mod random;
pub mod types;

pub use algorithms::{reconstruct, shortest_paths, MinCosts};
pub use breadth::{bounded_breadth, BreadthSweep};
pub use config::SimulationConfig;
pub use error::SimError;
pub use estimate::CostEstimator;
pub use random::{random_path, random_path_with, RandomWalk, WalkStop};
pub use types::{
    BreadthRequest, BreadthResult, CostEstimateRequest, CostMode, CostTableResult,
    RandomPathRequest, RandomPathResult, ShortestPathRequest, ShortestPathResult,
};

use chrono::Utc;
use malsim_core::{AttackGraph, CostMap, NodeId};
use rand::rngs::StdRng;
use rand::SeedableRng;
use uuid::Uuid;

use crate::types::{GraphStats, NamedCosts};

/// Runs simulation requests against graphs described in JSON.
#[derive(Debug, Clone, Default)]
pub struct SimulationEngine {
    config: SimulationConfig,
}

impl SimulationEngine {
    /// Create a new engine with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a custom simulation configuration. It is validated on each run.
    pub fn with_config(mut self, config: SimulationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Cheapest way to compromise `target` starting from `sources`.
    pub fn shortest_path(&self, request: ShortestPathRequest) -> error::Result<ShortestPathResult> {
        let start = std::time::Instant::now();
        let graph = AttackGraph::from_spec(&request.graph)?;

        let sources = request
            .sources
            .iter()
            .map(|name| resolve(&graph, name))
            .collect::<error::Result<Vec<_>>>()?;
        let target = resolve(&graph, &request.target)?;

        let mut rng = self.rng(request.seed);
        let costs = self.resolve_costs(&graph, request.costs.as_ref(), &mut rng)?;

        let labels = algorithms::shortest_paths(&graph, &sources, &costs)?;
        let reachable = labels.is_reachable(target);
        let path = if reachable {
            algorithms::reconstruct(&graph, &sources, target, &labels)
        } else {
            Vec::new()
        };

        let computation_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            target = %request.target,
            reachable,
            cost = labels.get(target),
            steps = path.len(),
            computation_ms,
            "Shortest path computed"
        );

        Ok(ShortestPathResult {
            run_id: Uuid::new_v4(),
            target: request.target,
            cost: reachable.then(|| labels.get(target)),
            reachable,
            path: names(&graph, &path),
            graph_stats: GraphStats::of(&graph),
            computed_at: Utc::now(),
            computation_ms,
        })
    }

    /// One random walk over the attack surface.
    pub fn random_path(&self, request: RandomPathRequest) -> error::Result<RandomPathResult> {
        let started = std::time::Instant::now();
        let graph = AttackGraph::from_spec(&request.graph)?;

        let start = resolve(&graph, &request.start)?;
        let target = request
            .target
            .as_deref()
            .map(|name| resolve(&graph, name))
            .transpose()?;

        let mut rng = self.rng(request.seed);
        let costs = self.resolve_costs(&graph, request.costs.as_ref(), &mut rng)?;

        let walk = random::random_path(&graph, start, &costs, target, request.budget, &mut rng)?;
        let target_reached = target.map(|t| walk.reached(t));

        let computation_ms = started.elapsed().as_millis() as u64;
        tracing::info!(
            start = %request.start,
            compromised = walk.visited.len(),
            total_cost = walk.total_cost,
            stop = ?walk.stop,
            computation_ms,
            "Random walk completed"
        );

        Ok(RandomPathResult {
            run_id: Uuid::new_v4(),
            total_cost: walk.total_cost,
            visited: names(&graph, &walk.visited),
            target_reached,
            stop: walk.stop,
            computed_at: Utc::now(),
            computation_ms,
        })
    }

    /// Approximate reach of a budget from a single start node.
    pub fn bounded_breadth(&self, request: BreadthRequest) -> error::Result<BreadthResult> {
        let started = std::time::Instant::now();
        let graph = AttackGraph::from_spec(&request.graph)?;
        let start = resolve(&graph, &request.start)?;

        let mut rng = self.rng(request.seed);
        let costs = self.resolve_costs(&graph, request.costs.as_ref(), &mut rng)?;

        let sweep = breadth::bounded_breadth(&graph, start, &costs, request.budget)?;

        let computation_ms = started.elapsed().as_millis() as u64;
        tracing::info!(
            start = %request.start,
            budget = request.budget,
            visited = sweep.visited.len(),
            computation_ms,
            "Breadth sweep completed"
        );

        Ok(BreadthResult {
            run_id: Uuid::new_v4(),
            last_cost: sweep.last_cost,
            visited: names(&graph, &sweep.visited),
            computed_at: Utc::now(),
            computation_ms,
        })
    }

    /// Generate a cost table for every node in the graph.
    pub fn estimate_costs(&self, request: CostEstimateRequest) -> error::Result<CostTableResult> {
        let started = std::time::Instant::now();
        self.config.validate()?;
        let graph = AttackGraph::from_spec(&request.graph)?;
        let mut rng = self.rng(request.seed);

        let costs = match request.mode {
            CostMode::Ttc => {
                CostEstimator::from_config(&self.config)?.graph_costs(&graph, &mut rng)?
            }
            CostMode::Uniform => costs::random_costs(
                &graph,
                self.config.random_cost_min,
                self.config.random_cost_max,
                &mut rng,
            )?,
        };

        let computation_ms = started.elapsed().as_millis() as u64;
        tracing::info!(
            mode = ?request.mode,
            nodes = costs.len(),
            computation_ms,
            "Cost table generated"
        );

        Ok(CostTableResult {
            run_id: Uuid::new_v4(),
            mode: request.mode,
            costs: costs::named_costs(&graph, &costs),
            computed_at: Utc::now(),
            computation_ms,
        })
    }

    /// Explicit table if given, otherwise TTC estimates.
    fn resolve_costs(
        &self,
        graph: &AttackGraph,
        table: Option<&NamedCosts>,
        rng: &mut StdRng,
    ) -> error::Result<CostMap> {
        self.config.validate()?;
        match table {
            Some(table) => costs::resolve_cost_table(graph, table),
            None => CostEstimator::from_config(&self.config)?.graph_costs(graph, rng),
        }
    }

    /// Request seed, then configured seed, then OS entropy.
    fn rng(&self, seed: Option<u64>) -> StdRng {
        match seed.or(self.config.seed) {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => {
                tracing::warn!("No seed configured; results will not be reproducible");
                StdRng::from_os_rng()
            }
        }
    }
}

fn resolve(graph: &AttackGraph, name: &str) -> error::Result<NodeId> {
    graph
        .node_by_name(name)
        .ok_or_else(|| SimError::NodeNotFound {
            name: name.to_string(),
        })
}

fn names(graph: &AttackGraph, nodes: &[NodeId]) -> Vec<String> {
    nodes.iter().map(|&n| graph.name(n).to_string()).collect()
}
