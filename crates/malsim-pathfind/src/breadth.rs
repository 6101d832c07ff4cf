//! Budget-bounded breadth sweep.
//!
//! An approximation of "how far can this budget go": plain BFS over child
//! edges that ignores AND semantics and does not deduplicate nodes reached
//! along several paths. Each discovered path carries its own cumulative
//! cost, and a child is only entered while that cost stays within budget.
//! Do not read the visit count as an authoritative compromise count.

use std::collections::VecDeque;

use malsim_core::{AttackGraph, CostMap, NodeId};

use crate::costs;
use crate::error::Result;

/// Outcome of a budgeted breadth sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct BreadthSweep {
    /// Cumulative path cost of the last node taken off the queue.
    pub last_cost: f64,
    /// Start node followed by every in-budget discovery, in BFS order.
    /// A node reached along several paths appears once per path.
    pub visited: Vec<NodeId>,
}

/// Sweep outward from `start` while each path's cumulative cost is within `budget`.
pub fn bounded_breadth(
    graph: &AttackGraph,
    start: NodeId,
    costs: &CostMap,
    budget: f64,
) -> Result<BreadthSweep> {
    costs::require_budget(budget)?;
    costs::require_known(graph, &[start])?;
    costs::require_costs(graph, &[start], costs)?;

    let mut visited = vec![start];
    let mut queue: VecDeque<(NodeId, f64)> = VecDeque::new();
    queue.push_back((start, 0.0));
    let mut last_cost = 0.0;

    while let Some((node, cost)) = queue.pop_front() {
        last_cost = cost;

        for &child in &graph.node(node).children {
            let next_cost = cost + costs::cost_of(graph, costs, child)?;
            if next_cost <= budget {
                visited.push(child);
                queue.push_back((child, next_cost));
            }
        }
    }

    tracing::debug!(
        start = %start,
        budget,
        visited = visited.len(),
        last_cost,
        "Budgeted breadth sweep finished"
    );

    Ok(BreadthSweep { last_cost, visited })
}
