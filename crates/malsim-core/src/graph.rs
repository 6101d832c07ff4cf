//! Arena-backed attack graph.
//!
//! Parent and child relationships are index lists into a single `Vec<Node>`,
//! so shared ancestors never create ownership cycles. A built graph is
//! immutable and can be read from many threads at once.

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};
use crate::types::{Node, NodeId, NodeKind, ParentLink, Ttc};

/// Read-only AND/OR attack graph.
#[derive(Debug, Clone)]
pub struct AttackGraph {
    nodes: Vec<Node>,
    name_index: HashMap<String, NodeId>,
}

impl AttackGraph {
    /// Build from a JSON-friendly description.
    pub fn from_spec(spec: &GraphSpec) -> Result<Self> {
        let mut builder = AttackGraphBuilder::new();
        let mut ids = HashMap::with_capacity(spec.nodes.len());

        for node in &spec.nodes {
            let id = builder.add_node(&node.name, node.kind);
            builder.set_viable(id, node.viable);
            if let Some(ttc) = &node.ttc {
                builder.set_ttc(id, ttc.clone());
            }
            ids.insert(node.name.as_str(), id);
        }

        for node in &spec.nodes {
            let child = ids[node.name.as_str()];
            for parent in &node.parents {
                let parent_id =
                    ids.get(parent.node.as_str())
                        .copied()
                        .ok_or_else(|| GraphError::UnknownNode {
                            name: parent.node.clone(),
                            referenced_by: node.name.clone(),
                        })?;
                builder.add_edge(parent_id, child, parent.necessary);
            }
        }

        builder.build()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Look up a node by its full name.
    pub fn node_by_name(&self, name: &str) -> Option<NodeId> {
        self.name_index.get(name).copied()
    }

    pub fn name(&self, id: NodeId) -> &str {
        &self.nodes[id.0].name
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.children.len()).sum()
    }

    /// Nodes reachable from `roots` through at least one child edge.
    ///
    /// A root is only included if it is also a descendant of another root.
    pub fn descendants(&self, roots: &[NodeId]) -> Vec<NodeId> {
        let mut seen = vec![false; self.nodes.len()];
        let mut order = Vec::new();
        let mut queue: VecDeque<NodeId> = roots.iter().copied().collect();

        while let Some(node) = queue.pop_front() {
            for &child in &self.nodes[node.0].children {
                if !seen[child.0] {
                    seen[child.0] = true;
                    order.push(child);
                    queue.push_back(child);
                }
            }
        }

        order
    }
}

/// Incremental constructor for [`AttackGraph`].
#[derive(Debug, Default)]
pub struct AttackGraphBuilder {
    nodes: Vec<Node>,
    edges: Vec<(usize, usize, bool)>,
}

impl AttackGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node and return its id. Names are checked in [`build`](Self::build).
    pub fn add_node(&mut self, name: &str, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            id,
            name: name.to_string(),
            kind,
            viable: true,
            ttc: None,
            parents: Vec::new(),
            children: Vec::new(),
        });
        id
    }

    pub fn or_node(&mut self, name: &str) -> NodeId {
        self.add_node(name, NodeKind::Or)
    }

    pub fn and_node(&mut self, name: &str) -> NodeId {
        self.add_node(name, NodeKind::And)
    }

    pub fn set_viable(&mut self, id: NodeId, viable: bool) -> &mut Self {
        if let Some(node) = self.nodes.get_mut(id.0) {
            node.viable = viable;
        }
        self
    }

    pub fn set_ttc(&mut self, id: NodeId, ttc: Ttc) -> &mut Self {
        if let Some(node) = self.nodes.get_mut(id.0) {
            node.ttc = Some(ttc);
        }
        self
    }

    /// Add `parent -> child`. `necessary` only matters for AND children.
    pub fn add_edge(&mut self, parent: NodeId, child: NodeId, necessary: bool) -> &mut Self {
        self.edges.push((parent.0, child.0, necessary));
        self
    }

    /// Shorthand for a necessary edge.
    pub fn edge(&mut self, parent: NodeId, child: NodeId) -> &mut Self {
        self.add_edge(parent, child, true)
    }

    pub fn build(self) -> Result<AttackGraph> {
        let Self { mut nodes, edges } = self;
        let node_count = nodes.len();

        let mut name_index = HashMap::with_capacity(node_count);
        for node in &nodes {
            if name_index.insert(node.name.clone(), node.id).is_some() {
                return Err(GraphError::DuplicateName {
                    name: node.name.clone(),
                });
            }
        }

        for (parent, child, necessary) in edges {
            if parent >= node_count || child >= node_count {
                return Err(GraphError::DanglingEdge {
                    parent,
                    child,
                    node_count,
                });
            }
            if parent == child {
                return Err(GraphError::SelfLoop {
                    name: nodes[parent].name.clone(),
                });
            }
            nodes[parent].children.push(NodeId(child));
            nodes[child].parents.push(ParentLink {
                node: NodeId(parent),
                necessary,
            });
        }

        check_acyclic(&nodes)?;

        tracing::debug!(
            nodes = node_count,
            edges = nodes.iter().map(|n| n.children.len()).sum::<usize>(),
            "Built attack graph"
        );

        Ok(AttackGraph { nodes, name_index })
    }
}

/// Kahn's algorithm; any node left with unresolved parents sits on a cycle.
fn check_acyclic(nodes: &[Node]) -> Result<()> {
    let mut in_degree: Vec<usize> = nodes.iter().map(|n| n.parents.len()).collect();
    let mut queue: VecDeque<usize> = in_degree
        .iter()
        .enumerate()
        .filter(|&(_, &d)| d == 0)
        .map(|(i, _)| i)
        .collect();
    let mut resolved = 0;

    while let Some(i) = queue.pop_front() {
        resolved += 1;
        for child in &nodes[i].children {
            in_degree[child.0] -= 1;
            if in_degree[child.0] == 0 {
                queue.push_back(child.0);
            }
        }
    }

    if resolved == nodes.len() {
        return Ok(());
    }

    let stuck = in_degree
        .iter()
        .position(|&d| d > 0)
        .map(|i| nodes[i].name.clone())
        .unwrap_or_default();
    Err(GraphError::Cycle { name: stuck })
}

// ── JSON description ──────────────────────────────────────────────

/// Serializable attack graph description, as produced by a graph exporter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphSpec {
    pub nodes: Vec<NodeSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSpec {
    pub name: String,
    pub kind: NodeKind,
    #[serde(default = "default_true")]
    pub viable: bool,
    #[serde(default)]
    pub ttc: Option<Ttc>,
    #[serde(default)]
    pub parents: Vec<ParentSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParentSpec {
    pub node: String,
    #[serde(default = "default_true")]
    pub necessary: bool,
}

fn default_true() -> bool {
    true
}
