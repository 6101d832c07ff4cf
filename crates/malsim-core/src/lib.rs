//! malsim-core: Attack graph model shared by the malsim engine.
//!
//! This crate provides the read-only structures the path-finding engine
//! consumes:
//! - An arena-backed AND/OR attack graph with name lookup
//! - Symbolic time-to-compromise (TTC) descriptions
//! - Live attacker state and the attack-surface query
//! - Graph construction errors

pub mod attacker;
pub mod error;
pub mod graph;
pub mod types;

pub use attacker::{AttackSurface, AttackerState};
pub use error::GraphError;
pub use graph::{AttackGraph, AttackGraphBuilder, GraphSpec, NodeSpec, ParentSpec};
pub use types::{CostMap, Node, NodeId, NodeKind, ParentLink, Ttc, TtcDistribution, TtcName};
