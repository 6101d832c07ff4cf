//! Live attacker state and the attack-surface query.
//!
//! Traversals never compute reachability themselves; they ask an
//! [`AttackSurface`] for the current frontier. [`AttackGraph`] provides the
//! standard AND/OR rule, and tests can substitute canned frontiers.

use std::collections::HashSet;

use crate::graph::AttackGraph;
use crate::types::{NodeId, NodeKind};

/// Nodes an attacker has compromised, in compromise order.
#[derive(Debug, Clone, Default)]
pub struct AttackerState {
    reached: Vec<NodeId>,
    members: HashSet<NodeId>,
}

impl AttackerState {
    /// Start with the given entry points already compromised.
    pub fn new(entry_points: impl IntoIterator<Item = NodeId>) -> Self {
        let mut state = Self::default();
        for node in entry_points {
            state.compromise(node);
        }
        state
    }

    /// Record `node` as compromised. Returns false if it already was.
    pub fn compromise(&mut self, node: NodeId) -> bool {
        if self.members.insert(node) {
            self.reached.push(node);
            true
        } else {
            false
        }
    }

    pub fn is_compromised(&self, node: NodeId) -> bool {
        self.members.contains(&node)
    }

    /// Compromised nodes in the order they fell.
    pub fn reached(&self) -> &[NodeId] {
        &self.reached
    }

    pub fn len(&self) -> usize {
        self.reached.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reached.is_empty()
    }
}

/// Source of the attacker's next reachable steps.
pub trait AttackSurface {
    /// Nodes reachable next given `attacker`'s compromised set, excluding
    /// nodes already compromised, in ascending id order.
    fn frontier(&self, attacker: &AttackerState) -> Vec<NodeId>;
}

impl AttackSurface for AttackGraph {
    fn frontier(&self, attacker: &AttackerState) -> Vec<NodeId> {
        let mut surface: Vec<NodeId> = attacker
            .reached()
            .iter()
            .flat_map(|&node| self.node(node).children.iter().copied())
            .filter(|&child| is_traversable(self, attacker, child))
            .collect();
        surface.sort_unstable();
        surface.dedup();
        surface
    }
}

/// Whether `node` can be compromised next by `attacker`.
pub fn is_traversable(graph: &AttackGraph, attacker: &AttackerState, node: NodeId) -> bool {
    let n = graph.node(node);
    if !n.viable || attacker.is_compromised(node) {
        return false;
    }

    let any_parent = n
        .parents
        .iter()
        .any(|link| attacker.is_compromised(link.node));

    match n.kind {
        NodeKind::Or => any_parent,
        NodeKind::And => {
            any_parent && n.necessary_parents().all(|p| attacker.is_compromised(p))
        }
    }
}
