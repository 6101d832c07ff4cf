//! Core pathfinding: multi-source AND/OR Dijkstra and cheapest-path backtrace.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use malsim_core::{AttackGraph, CostMap, NodeId, NodeKind};

use crate::costs;
use crate::error::{Result, SimError};

/// Minimum cost to first compromise each node from a source set.
///
/// Unreached nodes hold `f64::INFINITY`.
#[derive(Debug, Clone, PartialEq)]
pub struct MinCosts {
    labels: Vec<f64>,
}

impl MinCosts {
    pub fn get(&self, node: NodeId) -> f64 {
        self.labels
            .get(node.index())
            .copied()
            .unwrap_or(f64::INFINITY)
    }

    pub fn is_reachable(&self, node: NodeId) -> bool {
        self.get(node).is_finite()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, f64)> + '_ {
        self.labels
            .iter()
            .enumerate()
            .map(|(i, &cost)| (NodeId(i), cost))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.labels
    }

    pub fn reachable_count(&self) -> usize {
        self.labels.iter().filter(|c| c.is_finite()).count()
    }
}

/// Multi-source shortest paths with AND/OR semantics.
///
/// An OR child costs its parent's label plus its own cost. An AND child
/// costs its own cost plus the labels of all necessary parents, summed
/// fresh on every relaxation. Sources start at 0 and labels only decrease.
///
/// Fails fast on an empty source set, or when a node reachable from the
/// sources has no (or a negative) cost. Unreachable nodes are not an error;
/// they keep an infinite label.
pub fn shortest_paths(
    graph: &AttackGraph,
    sources: &[NodeId],
    edge_costs: &CostMap,
) -> Result<MinCosts> {
    if sources.is_empty() {
        return Err(SimError::EmptySources);
    }
    costs::require_known(graph, sources)?;
    costs::require_costs(graph, sources, edge_costs)?;

    let mut min_cost = vec![f64::INFINITY; graph.node_count()];
    let mut heap = BinaryHeap::new();

    for &source in sources {
        min_cost[source.index()] = 0.0;
        heap.push(DijkstraState {
            cost: 0.0,
            node: source,
        });
    }

    let mut pops = 0usize;
    let mut stale = 0usize;

    while let Some(DijkstraState { cost, node }) = heap.pop() {
        // Lazy deletion: a cheaper label was recorded after this push.
        if cost > min_cost[node.index()] {
            stale += 1;
            continue;
        }
        pops += 1;

        for &child in &graph.node(node).children {
            let child_node = graph.node(child);
            let step = costs::cost_of(graph, edge_costs, child)?;

            let candidate = match child_node.kind {
                NodeKind::Or => min_cost[node.index()] + step,
                NodeKind::And => {
                    step + child_node
                        .necessary_parents()
                        .map(|p| min_cost[p.index()])
                        .sum::<f64>()
                }
            };

            if candidate < min_cost[child.index()] {
                min_cost[child.index()] = candidate;
                heap.push(DijkstraState {
                    cost: candidate,
                    node: child,
                });
            }
        }
    }

    let labels = MinCosts { labels: min_cost };
    tracing::debug!(
        sources = sources.len(),
        pops,
        stale,
        reachable = labels.reachable_count(),
        "Shortest path labels computed"
    );
    Ok(labels)
}

/// Backtrace the cheapest way to compromise `target` from `sources`.
///
/// OR nodes follow the parent with the lowest label (first parent wins on
/// ties); AND nodes concatenate the paths of every necessary parent in
/// parent order, then append themselves once. An ancestor shared by two
/// necessary parents therefore appears once per branch.
///
/// Returns an empty path when an OR target has no reachable parent. An
/// unreachable AND target yields the partial path of whichever parents
/// are reachable.
pub fn reconstruct(
    graph: &AttackGraph,
    sources: &[NodeId],
    target: NodeId,
    min_cost: &MinCosts,
) -> Vec<NodeId> {
    let sources: HashSet<NodeId> = sources.iter().copied().collect();
    let mut path = Vec::new();
    let mut work = vec![Backtrace::Visit(target)];

    while let Some(step) = work.pop() {
        let node = match step {
            Backtrace::Emit(node) => {
                path.push(node);
                continue;
            }
            Backtrace::Visit(node) => node,
        };

        if sources.contains(&node) {
            path.push(node);
            continue;
        }

        let entry = graph.node(node);
        match entry.kind {
            NodeKind::Or => {
                let mut cheapest: Option<(NodeId, f64)> = None;
                for link in &entry.parents {
                    let cost = min_cost.get(link.node);
                    let best = cheapest.map_or(f64::INFINITY, |(_, c)| c);
                    if cost < best {
                        cheapest = Some((link.node, cost));
                    }
                }

                if let Some((parent, _)) = cheapest {
                    work.push(Backtrace::Emit(node));
                    work.push(Backtrace::Visit(parent));
                }
            }
            NodeKind::And => {
                work.push(Backtrace::Emit(node));
                // Reversed so the first necessary parent is expanded first.
                let parents: Vec<NodeId> = entry.necessary_parents().collect();
                work.extend(parents.into_iter().rev().map(Backtrace::Visit));
            }
        }
    }

    path
}

/// Pending work for the backtrace stack.
enum Backtrace {
    /// Expand the cheapest way into this node.
    Visit(NodeId),
    /// Append this node once everything pushed after it is done.
    Emit(NodeId),
}

/// State for Dijkstra's priority queue (min-heap by cost).
#[derive(Debug, Clone, PartialEq)]
struct DijkstraState {
    cost: f64,
    node: NodeId,
}

impl Eq for DijkstraState {}

impl Ord for DijkstraState {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse for min-heap (BinaryHeap is a max-heap). Lower ids pop first on ties.
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for DijkstraState {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
