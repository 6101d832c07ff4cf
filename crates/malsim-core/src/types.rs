//! Core domain types for malsim attack graphs.
//!
//! Nodes live in an arena owned by [`AttackGraph`](crate::graph::AttackGraph)
//! and are addressed by dense [`NodeId`] indices. Everything else in the
//! workspace holds ids, never references into the arena.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};

// ── Identity ──────────────────────────────────────────────────────

/// Dense index of a node in the graph arena (0..N-1).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Per-node compromise cost, keyed by node id.
///
/// Values are non-negative; `f64::INFINITY` marks a step that can never be
/// afforded.
pub type CostMap = HashMap<NodeId, f64>;

// ── Nodes ─────────────────────────────────────────────────────────

/// How a node's parents combine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Reached once any single parent is compromised.
    Or,
    /// Reached once every necessary parent is compromised.
    And,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Or => write!(f, "or"),
            Self::And => write!(f, "and"),
        }
    }
}

/// Incoming edge of a node.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParentLink {
    pub node: NodeId,
    /// Only consulted when the child is an AND node.
    pub necessary: bool,
}

/// An attack step in the arena.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    /// Unique full name, conventionally `Asset:step`.
    pub name: String,
    pub kind: NodeKind,
    /// Viability as computed by the graph producer.
    pub viable: bool,
    /// Symbolic time-to-compromise, if the language defines one.
    pub ttc: Option<Ttc>,
    /// Parents in insertion order.
    pub parents: Vec<ParentLink>,
    /// Children in insertion order.
    pub children: Vec<NodeId>,
}

impl Node {
    pub fn is_and(&self) -> bool {
        self.kind == NodeKind::And
    }

    /// Parents that gate completion of an AND node.
    pub fn necessary_parents(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.parents
            .iter()
            .filter(|link| link.necessary)
            .map(|link| link.node)
    }
}

// ── Time to compromise ────────────────────────────────────────────

/// Named TTC distributions understood by the cost estimator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TtcName {
    EasyAndCertain,
    EasyAndUncertain,
    HardAndCertain,
    HardAndUncertain,
    VeryHardAndCertain,
    VeryHardAndUncertain,
    /// Custom exponential, rate given as the first argument.
    Exponential,
}

/// Symbolic time-to-compromise as it appears in attack graph JSON:
/// `{"name": "HardAndUncertain"}` or `{"name": "Exponential", "arguments": [0.5]}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ttc {
    pub name: TtcName,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<f64>,
}

impl Ttc {
    pub fn named(name: TtcName) -> Self {
        Self {
            name,
            arguments: Vec::new(),
        }
    }

    pub fn exponential(rate: f64) -> Self {
        Self {
            name: TtcName::Exponential,
            arguments: vec![rate],
        }
    }

    /// Resolve the symbolic name into a sampleable distribution.
    pub fn distribution(&self) -> Result<TtcDistribution> {
        let dist = match self.name {
            TtcName::EasyAndCertain => TtcDistribution::Exponential { rate: 1.0 },
            TtcName::EasyAndUncertain => TtcDistribution::ExponentialBernoulli {
                rate: 1.0,
                bernoulli: 0.5,
            },
            TtcName::HardAndCertain => TtcDistribution::Exponential { rate: 0.1 },
            TtcName::HardAndUncertain => TtcDistribution::ExponentialBernoulli {
                rate: 0.1,
                bernoulli: 0.5,
            },
            TtcName::VeryHardAndCertain => TtcDistribution::Exponential { rate: 0.01 },
            TtcName::VeryHardAndUncertain => TtcDistribution::ExponentialBernoulli {
                rate: 0.01,
                bernoulli: 0.5,
            },
            TtcName::Exponential => {
                let rate = self.arguments.first().copied().ok_or_else(|| {
                    GraphError::InvalidTtc {
                        distribution: "Exponential".to_string(),
                        reason: "missing rate argument".to_string(),
                    }
                })?;
                TtcDistribution::Exponential { rate }
            }
        };
        dist.validate()?;
        Ok(dist)
    }
}

/// A sampleable TTC distribution.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TtcDistribution {
    /// Exponential with the given rate (mean `1 / rate`).
    Exponential { rate: f64 },
    /// With probability `bernoulli` a draw is the fixed miss penalty,
    /// otherwise an exponential draw.
    ExponentialBernoulli { rate: f64, bernoulli: f64 },
}

impl TtcDistribution {
    pub fn rate(&self) -> f64 {
        match *self {
            Self::Exponential { rate } | Self::ExponentialBernoulli { rate, .. } => rate,
        }
    }

    /// Analytic mean for a given miss penalty.
    pub fn mean(&self, miss_penalty: f64) -> f64 {
        match *self {
            Self::Exponential { rate } => 1.0 / rate,
            Self::ExponentialBernoulli { rate, bernoulli } => {
                bernoulli * miss_penalty + (1.0 - bernoulli) / rate
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        let rate = self.rate();
        if !(rate.is_finite() && rate > 0.0) {
            return Err(GraphError::InvalidTtc {
                distribution: self.label().to_string(),
                reason: format!("rate must be positive and finite, got {rate}"),
            });
        }
        if let Self::ExponentialBernoulli { bernoulli, .. } = *self {
            if !(0.0..=1.0).contains(&bernoulli) {
                return Err(GraphError::InvalidTtc {
                    distribution: self.label().to_string(),
                    reason: format!("bernoulli must lie in [0, 1], got {bernoulli}"),
                });
            }
        }
        Ok(())
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Exponential { .. } => "exponential",
            Self::ExponentialBernoulli { .. } => "exponential_bernoulli",
        }
    }
}
