//! Cost map validation and construction.

use std::collections::BTreeMap;

use malsim_core::{AttackGraph, CostMap, NodeId};
use rand::Rng;

use crate::error::{Result, SimError};

/// Every id must exist in the graph.
pub fn require_known(graph: &AttackGraph, nodes: &[NodeId]) -> Result<()> {
    match nodes.iter().find(|&&n| graph.get(n).is_none()) {
        Some(missing) => Err(SimError::NodeNotFound {
            name: missing.to_string(),
        }),
        None => Ok(()),
    }
}

/// Every node reachable from `roots` through a child edge must carry a
/// valid cost. Roots themselves are exempt unless reachable from another root.
pub fn require_costs(graph: &AttackGraph, roots: &[NodeId], costs: &CostMap) -> Result<()> {
    for node in graph.descendants(roots) {
        cost_of(graph, costs, node)?;
    }
    Ok(())
}

/// Look up the cost of entering `node`.
pub fn cost_of(graph: &AttackGraph, costs: &CostMap, node: NodeId) -> Result<f64> {
    let cost = costs
        .get(&node)
        .copied()
        .ok_or_else(|| SimError::MissingCost {
            node,
            name: graph.name(node).to_string(),
        })?;
    check_cost(graph.name(node), cost)?;
    Ok(cost)
}

/// A budget must be a non-negative number; `+inf` means unbounded.
pub fn require_budget(budget: f64) -> Result<()> {
    if budget.is_nan() || budget < 0.0 {
        return Err(SimError::InvalidBudget { budget });
    }
    Ok(())
}

fn check_cost(name: &str, cost: f64) -> Result<()> {
    if cost.is_nan() || cost < 0.0 {
        return Err(SimError::InvalidCost {
            name: name.to_string(),
            cost,
        });
    }
    Ok(())
}

/// Resolve a `{ full_name: cost }` table against the graph.
pub fn resolve_cost_table(graph: &AttackGraph, table: &BTreeMap<String, f64>) -> Result<CostMap> {
    let mut costs = CostMap::with_capacity(table.len());
    for (name, &cost) in table {
        let node = graph
            .node_by_name(name)
            .ok_or_else(|| SimError::NodeNotFound { name: name.clone() })?;
        check_cost(name, cost)?;
        costs.insert(node, cost);
    }
    Ok(costs)
}

/// Render a cost map keyed by node name, for output.
pub fn named_costs(graph: &AttackGraph, costs: &CostMap) -> BTreeMap<String, f64> {
    costs
        .iter()
        .map(|(&node, &cost)| (graph.name(node).to_string(), cost))
        .collect()
}

/// Assign every node an integer cost drawn uniformly from `min..=max`.
pub fn random_costs<R: Rng>(
    graph: &AttackGraph,
    min: u32,
    max: u32,
    rng: &mut R,
) -> Result<CostMap> {
    if min > max {
        return Err(SimError::Config(format!(
            "random cost range is empty: {min} > {max}"
        )));
    }
    Ok(graph
        .node_ids()
        .map(|node| (node, f64::from(rng.random_range(min..=max))))
        .collect())
}
