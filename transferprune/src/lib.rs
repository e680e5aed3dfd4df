// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! TransferPrune - Predicate-transfer pruning for query-plan DAGs
//!
//! Query engines that propagate filters along join edges (semi-join or
//! Bloom-filter style predicate transfer) pay a real cost per transfer.
//! This crate decides, for a directed acyclic graph of plan operators and
//! candidate transfer edges, which transfers are informationally redundant
//! and can be skipped at execution time: a transfer whose effect is already
//! subsumed by the receiver's own local predicates, or by predicates
//! carried along another path, is marked `prune`.
//!
//! # Quick Start
//!
//! ```no_run
//! use serde_json::json;
//! use transferprune::{prune_transfers, Graph, Node, Predicate};
//!
//! # fn main() -> Result<(), transferprune::PruneError> {
//! let mut graph = Graph::new();
//! graph.add_node(Node::new(
//!     "A",
//!     ["a_id"],
//!     vec![Predicate::new("a_id", "in", json!([10, 11, 12]))],
//! ));
//! graph.add_node(Node::new("B", ["a_id", "b_id"], vec![]));
//! graph.add_edge("A", "B");
//!
//! prune_transfers(&mut graph)?;
//! for edge in graph.edges() {
//!     println!("{} -> {}: skip = {}", edge.src, edge.dst, edge.should_prune());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - [`graph`] - nodes, directed transfer edges, and their per-run
//!   annotations (provenance sets, tri-state prune flags)
//! - [`order`] - deterministic topological edge sequencing with cycle
//!   detection
//! - [`selectivity`] - the replaceable predicate-selectivity heuristic
//! - [`containment`] - directional join-key and predicate containment
//! - [`engine`] - the two-pass propagation run (`prune_transfers`)
//! - [`report`] - serializable explain-plan snapshot of a run
//!
//! The computation is pure, single-threaded, and idempotent per call: run
//! state is rebuilt at the start of every run, and the engine takes the
//! graph by exclusive borrow for the duration of a run.

pub mod containment;
pub mod engine;
pub mod graph;
pub mod order;
pub mod report;
pub mod selectivity;

pub use engine::{prune_transfers, PruneEngine, PruneError};
pub use graph::{Edge, Graph, Node, PredOrigin, Predicate, PruneDecision};
pub use order::CycleError;
pub use report::PruneReport;
pub use selectivity::{FactorEstimator, SelectivityEstimator};
