//! Randomized attack walk over the live attack surface.
//!
//! Starting from a single compromised node, repeatedly picks a uniformly
//! random node from the current attack surface and compromises it, until the
//! surface is exhausted, the next step would exceed the budget, or the target
//! falls.

use malsim_core::{AttackGraph, AttackSurface, AttackerState, CostMap, NodeId};
use rand::prelude::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::costs;
use crate::error::Result;

/// Outcome of one random walk.
#[derive(Debug, Clone, PartialEq)]
pub struct RandomWalk {
    /// Sum of the costs of every node compromised after the start.
    pub total_cost: f64,
    /// Compromised nodes in order, starting with the start node.
    pub visited: Vec<NodeId>,
    pub stop: WalkStop,
}

impl RandomWalk {
    pub fn reached(&self, node: NodeId) -> bool {
        self.visited.contains(&node)
    }
}

/// Why a random walk ended. None of these is a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalkStop {
    /// The target was compromised.
    TargetReached,
    /// The next drawn node would have exceeded the budget.
    BudgetExhausted,
    /// Nothing uncompromised remains on the attack surface.
    SurfaceExhausted,
}

/// Random walk using the graph's own attack surface.
pub fn random_path<R: Rng>(
    graph: &AttackGraph,
    start: NodeId,
    costs: &CostMap,
    target: Option<NodeId>,
    budget: Option<f64>,
    rng: &mut R,
) -> Result<RandomWalk> {
    random_path_with(graph, graph, start, costs, target, budget, rng)
}

/// Random walk against an injected attack surface.
///
/// `graph` is only used for name lookups and the cost precondition; every
/// frontier comes from `surface`.
pub fn random_path_with<S, R>(
    graph: &AttackGraph,
    surface: &S,
    start: NodeId,
    costs: &CostMap,
    target: Option<NodeId>,
    budget: Option<f64>,
    rng: &mut R,
) -> Result<RandomWalk>
where
    S: AttackSurface + ?Sized,
    R: Rng,
{
    if let Some(limit) = budget {
        costs::require_budget(limit)?;
    }
    costs::require_known(graph, &[start])?;
    costs::require_costs(graph, &[start], costs)?;

    let mut attacker = AttackerState::new([start]);
    let mut total_cost = 0.0;
    let mut draws = 0usize;

    if target == Some(start) {
        return Ok(RandomWalk {
            total_cost,
            visited: attacker.reached().to_vec(),
            stop: WalkStop::TargetReached,
        });
    }

    let mut frontier = frontier_of(graph, surface, &attacker)?;
    let mut stop = WalkStop::SurfaceExhausted;

    while frontier.iter().any(|&n| !attacker.is_compromised(n)) {
        let Some(&node) = frontier.choose(rng) else {
            break;
        };
        draws += 1;

        if attacker.is_compromised(node) {
            continue;
        }

        let step = costs::cost_of(graph, costs, node)?;
        if let Some(limit) = budget {
            if total_cost + step > limit {
                stop = WalkStop::BudgetExhausted;
                break;
            }
        }

        attacker.compromise(node);
        total_cost += step;

        if target == Some(node) {
            stop = WalkStop::TargetReached;
            break;
        }

        frontier = frontier_of(graph, surface, &attacker)?;
    }

    tracing::debug!(
        start = %start,
        draws,
        compromised = attacker.len(),
        total_cost,
        ?stop,
        "Random walk finished"
    );

    Ok(RandomWalk {
        total_cost,
        visited: attacker.reached().to_vec(),
        stop,
    })
}

/// Query `surface`, rejecting ids the graph does not hold.
fn frontier_of<S>(
    graph: &AttackGraph,
    surface: &S,
    attacker: &AttackerState,
) -> Result<Vec<NodeId>>
where
    S: AttackSurface + ?Sized,
{
    let frontier = surface.frontier(attacker);
    costs::require_known(graph, &frontier)?;
    Ok(frontier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use malsim_core::AttackGraphBuilder;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// ```text
    /// s -> a -> b -> c
    /// ```
    fn build_line() -> (AttackGraph, CostMap) {
        let mut b = AttackGraphBuilder::new();
        let s = b.or_node("s");
        let a = b.or_node("a");
        let bb = b.or_node("b");
        let c = b.or_node("c");
        b.edge(s, a).edge(a, bb).edge(bb, c);
        let costs = [(a, 1.0), (bb, 2.0), (c, 3.0)].into_iter().collect();
        (b.build().unwrap(), costs)
    }

    /// ```text
    /// s -> {a, b, c, d} -> gate(and)
    /// ```
    fn build_fan() -> (AttackGraph, CostMap) {
        let mut b = AttackGraphBuilder::new();
        let s = b.or_node("s");
        let gate = b.and_node("gate");
        let mut costs = CostMap::new();
        for name in ["a", "b", "c", "d"] {
            let leaf = b.or_node(name);
            b.edge(s, leaf).edge(leaf, gate);
            costs.insert(leaf, 1.0);
        }
        costs.insert(gate, 5.0);
        (b.build().unwrap(), costs)
    }

    /// Hands out a fixed frontier regardless of state.
    struct CannedSurface(Vec<NodeId>);

    impl AttackSurface for CannedSurface {
        fn frontier(&self, _attacker: &AttackerState) -> Vec<NodeId> {
            self.0.clone()
        }
    }

    #[test]
    fn test_singleton_frontier_is_deterministic() {
        let (graph, costs) = build_line();
        let mut rng = StdRng::seed_from_u64(0);

        let walk = random_path(&graph, NodeId(0), &costs, None, None, &mut rng).unwrap();
        assert_eq!(walk.visited, vec![NodeId(0), NodeId(1), NodeId(2), NodeId(3)]);
        assert_eq!(walk.total_cost, 6.0);
        assert_eq!(walk.stop, WalkStop::SurfaceExhausted);
    }

    #[test]
    fn test_stops_at_target() {
        let (graph, costs) = build_line();
        let mut rng = StdRng::seed_from_u64(0);

        let walk = random_path(&graph, NodeId(0), &costs, Some(NodeId(2)), None, &mut rng).unwrap();
        assert_eq!(walk.visited, vec![NodeId(0), NodeId(1), NodeId(2)]);
        assert_eq!(walk.total_cost, 3.0);
        assert_eq!(walk.stop, WalkStop::TargetReached);
        assert!(walk.reached(NodeId(2)));
    }

    #[test]
    fn test_budget_stops_before_overspending() {
        let (graph, costs) = build_line();
        let mut rng = StdRng::seed_from_u64(0);

        // a (1) + b (2) fit in 4; c (3) would not.
        let walk = random_path(&graph, NodeId(0), &costs, Some(NodeId(3)), Some(4.0), &mut rng)
            .unwrap();
        assert_eq!(walk.visited, vec![NodeId(0), NodeId(1), NodeId(2)]);
        assert_eq!(walk.total_cost, 3.0);
        assert_eq!(walk.stop, WalkStop::BudgetExhausted);
        assert!(!walk.reached(NodeId(3)));
    }

    #[test]
    fn test_zero_budget_compromises_nothing() {
        let (graph, costs) = build_line();
        let mut rng = StdRng::seed_from_u64(0);

        let walk = random_path(&graph, NodeId(0), &costs, None, Some(0.0), &mut rng).unwrap();
        assert_eq!(walk.visited, vec![NodeId(0)]);
        assert_eq!(walk.total_cost, 0.0);
        assert_eq!(walk.stop, WalkStop::BudgetExhausted);
    }

    #[test]
    fn test_start_is_target() {
        let (graph, costs) = build_line();
        let mut rng = StdRng::seed_from_u64(0);

        let walk = random_path(&graph, NodeId(0), &costs, Some(NodeId(0)), None, &mut rng).unwrap();
        assert_eq!(walk.visited, vec![NodeId(0)]);
        assert_eq!(walk.stop, WalkStop::TargetReached);
    }

    #[test]
    fn test_and_gate_only_after_all_leaves() {
        let (graph, costs) = build_fan();
        let gate = NodeId(1);

        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let walk = random_path(&graph, NodeId(0), &costs, Some(gate), None, &mut rng).unwrap();

            assert_eq!(walk.visited.len(), 6);
            assert_eq!(walk.visited.last(), Some(&gate));
            assert_eq!(walk.total_cost, 9.0);
        }
    }

    #[test]
    fn test_same_seed_same_walk() {
        let (graph, costs) = build_fan();

        let first = random_path(&graph, NodeId(0), &costs, None, Some(3.0), &mut StdRng::seed_from_u64(11))
            .unwrap();
        let second = random_path(&graph, NodeId(0), &costs, None, Some(3.0), &mut StdRng::seed_from_u64(11))
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(first.total_cost, 3.0);
    }

    #[test]
    fn test_redraws_over_already_visited_entries() {
        // The canned frontier keeps offering the start node; the walk must
        // skip it rather than stop or double count.
        let (graph, costs) = build_line();
        let surface = CannedSurface(vec![NodeId(0), NodeId(1)]);
        let mut rng = StdRng::seed_from_u64(5);

        let walk = random_path_with(&graph, &surface, NodeId(0), &costs, None, None, &mut rng)
            .unwrap();
        assert_eq!(walk.visited, vec![NodeId(0), NodeId(1)]);
        assert_eq!(walk.total_cost, 1.0);
        assert_eq!(walk.stop, WalkStop::SurfaceExhausted);
    }

    #[test]
    fn test_nan_or_negative_budget_rejected() {
        let (graph, costs) = build_line();
        for budget in [f64::NAN, -2.0] {
            let mut rng = StdRng::seed_from_u64(0);
            let err = random_path(&graph, NodeId(0), &costs, None, Some(budget), &mut rng)
                .unwrap_err();
            assert!(matches!(err, crate::error::SimError::InvalidBudget { .. }));
        }
    }

    #[test]
    fn test_surface_offering_foreign_node_is_an_error() {
        let (graph, costs) = build_line();
        let surface = CannedSurface(vec![NodeId(1), NodeId(99)]);
        let mut rng = StdRng::seed_from_u64(0);

        let err = random_path_with(&graph, &surface, NodeId(0), &costs, None, None, &mut rng)
            .unwrap_err();
        assert!(matches!(err, crate::error::SimError::NodeNotFound { .. }));
    }

    #[test]
    fn test_missing_cost_rejected_up_front() {
        let (graph, mut costs) = build_line();
        costs.remove(&NodeId(3));
        let mut rng = StdRng::seed_from_u64(0);

        let err = random_path(&graph, NodeId(0), &costs, None, None, &mut rng).unwrap_err();
        assert!(matches!(err, crate::error::SimError::MissingCost { .. }));
    }
}
