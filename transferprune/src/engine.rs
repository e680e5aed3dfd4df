// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Two-pass predicate-transfer propagation
//!
//! Orchestrates a full pruning run over a transfer graph: provenance
//! initialization, a forward sweep over the original edges in topological
//! order, and a second sweep over a freshly reversed edge set. The forward
//! sweep owns every externally visible `prune` decision; the backward
//! sweep runs the identical per-edge logic but its decisions are computed
//! and discarded, serving only to enrich each node's `pred_origins`. That
//! asymmetry is deliberate and regression-tested, not an aliasing
//! accident: reversed edges are throwaway endpoint pairs, never the
//! original `Edge` instances.

use thiserror::Error;

use crate::containment::{join_keys_contained, predicates_contained};
use crate::graph::{Graph, PredOrigin, PruneDecision};
use crate::order::{topological_edge_order, CycleError};
use crate::selectivity::{FactorEstimator, SelectivityEstimator};

/// Fatal pruning-run errors. No retries: the computation is pure and
/// deterministic, so a failed run leaves nothing worth keeping.
#[derive(Error, Debug)]
pub enum PruneError {
    /// The edge set is not a DAG.
    #[error(transparent)]
    Cycle(#[from] CycleError),

    /// An edge references a node id absent from the graph's node mapping.
    /// This is an input-contract violation by the plan compiler.
    #[error("edge {edge} references unknown node '{node_id}'")]
    UnknownNode { edge: usize, node_id: String },
}

/// The pruning engine. Holds the selectivity estimator used by predicate
/// containment; everything else about a run lives on the graph itself.
pub struct PruneEngine {
    estimator: Box<dyn SelectivityEstimator>,
}

impl PruneEngine {
    /// Engine with the default factor-table estimator.
    pub fn new() -> Self {
        Self {
            estimator: Box::new(FactorEstimator::new()),
        }
    }

    /// Engine with a caller-supplied estimator (e.g. one backed by real
    /// table statistics).
    pub fn with_estimator(estimator: Box<dyn SelectivityEstimator>) -> Self {
        Self { estimator }
    }

    /// Run both passes, writing a final `prune` decision onto every
    /// original edge and a provenance set onto every node. Mutates the
    /// graph in place; idempotent for an unchanged graph.
    pub fn run(&self, graph: &mut Graph) -> Result<(), PruneError> {
        self.execute(graph, true)
    }

    /// Forward pass only. Produces the same edge decisions as `run` with
    /// less provenance; exists for diagnostics and as the regression
    /// surface for the forward-owns-decision property.
    pub fn run_forward_only(&self, graph: &mut Graph) -> Result<(), PruneError> {
        self.execute(graph, false)
    }

    fn execute(&self, graph: &mut Graph, backward: bool) -> Result<(), PruneError> {
        // Resolve edge endpoints to node indices up front so that both a
        // dangling reference and a cycle surface before any edge is
        // decided or any provenance touched.
        let mut forward: Vec<(usize, usize)> = Vec::with_capacity(graph.edges().len());
        for (idx, edge) in graph.edges().iter().enumerate() {
            let src = graph
                .index_of(&edge.src)
                .ok_or_else(|| PruneError::UnknownNode {
                    edge: idx,
                    node_id: edge.src.clone(),
                })?;
            let dst = graph
                .index_of(&edge.dst)
                .ok_or_else(|| PruneError::UnknownNode {
                    edge: idx,
                    node_id: edge.dst.clone(),
                })?;
            forward.push((src, dst));
        }

        let node_ids: Vec<&str> = graph.nodes().iter().map(|n| n.id.as_str()).collect();
        let forward_order = topological_edge_order(&node_ids, &forward)?;

        // Reversed endpoints are built fresh: swapped pairs only, carrying
        // nothing over from the original edges.
        let reversed: Vec<(usize, usize)> = forward.iter().map(|&(src, dst)| (dst, src)).collect();
        let backward_order = if backward {
            topological_edge_order(&node_ids, &reversed)?
        } else {
            Vec::new()
        };

        // Provenance is run state, not cumulative across calls.
        for node in graph.nodes_mut() {
            node.pred_origins.clear();
            if !node.local_preds.is_empty() {
                node.pred_origins.insert(PredOrigin::Local);
            }
        }

        log::debug!("forward pass over {} transfer edges", forward_order.len());
        for &edge_idx in &forward_order {
            let (src, dst) = forward[edge_idx];
            let decision = self.evaluate_edge(graph, src, dst);
            let edge = &mut graph.edges_mut()[edge_idx];
            edge.prune = decision;
            log::debug!("transfer {} -> {}: {:?}", edge.src, edge.dst, decision);
        }

        if backward {
            log::debug!("backward pass over {} reversed edges", backward_order.len());
            for &edge_idx in &backward_order {
                let (src, dst) = reversed[edge_idx];
                // Decision discarded: this sweep only enriches provenance.
                let _ = self.evaluate_edge(graph, src, dst);
            }
        }

        Ok(())
    }

    /// Per-edge logic shared by both passes. Returns the decision and
    /// applies the provenance updates to the destination node.
    fn evaluate_edge(&self, graph: &mut Graph, src: usize, dst: usize) -> PruneDecision {
        let (decision, carried_origins) = {
            let src_node = graph.node_at(src);
            let dst_node = graph.node_at(dst);

            if !join_keys_contained(src_node, dst_node) {
                // Structurally incomparable: the transfer must execute.
                (PruneDecision::Keep, None)
            } else if predicates_contained(src_node, dst_node, self.estimator.as_ref()) {
                // Destination already filters at least as hard; redundant.
                (PruneDecision::Prune, None)
            } else {
                // Destination depends on upstream filtering it has not
                // subsumed locally, so it inherits the source's origins.
                (PruneDecision::Keep, Some(src_node.pred_origins.clone()))
            }
        };

        let src_id = graph.node_at(src).id.clone();
        let dst_node = graph.node_at_mut(dst);
        dst_node.pred_origins.insert(PredOrigin::Node(src_id));
        if let Some(origins) = carried_origins {
            dst_node.pred_origins.extend(origins);
        }
        decision
    }
}

impl Default for PruneEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Library entry point: run the default engine over `graph`, leaving a
/// decided `prune` flag on every edge. See [`PruneEngine::run`].
pub fn prune_transfers(graph: &mut Graph) -> Result<(), PruneError> {
    PruneEngine::new().run(graph)
}
