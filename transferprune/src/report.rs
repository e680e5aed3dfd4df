// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Explain-plan snapshot of a pruning run
//!
//! Hosts attach this to their explain output; execution correctness never
//! depends on it.

use serde::Serialize;

use crate::graph::{Graph, PredOrigin};

/// One edge's decision as the execution side sees it.
#[derive(Debug, Clone, Serialize)]
pub struct EdgeReport {
    pub src: String,
    pub dst: String,
    /// False only for a graph that has not been (successfully) run.
    pub decided: bool,
    /// True means skip the transfer. Undecided edges report `false`.
    pub prune: bool,
}

/// One node's provenance set.
#[derive(Debug, Clone, Serialize)]
pub struct NodeReport {
    pub id: String,
    /// `"local"` for the node's own predicate, otherwise the origin node id.
    pub origins: Vec<String>,
}

/// Serializable snapshot of every decision and provenance set in a graph.
#[derive(Debug, Clone, Serialize)]
pub struct PruneReport {
    pub edges: Vec<EdgeReport>,
    pub nodes: Vec<NodeReport>,
}

impl PruneReport {
    pub fn from_graph(graph: &Graph) -> Self {
        let edges = graph
            .edges()
            .iter()
            .map(|edge| EdgeReport {
                src: edge.src.clone(),
                dst: edge.dst.clone(),
                decided: edge.prune.is_decided(),
                prune: edge.should_prune(),
            })
            .collect();

        let nodes = graph
            .nodes()
            .iter()
            .map(|node| NodeReport {
                id: node.id.clone(),
                origins: node
                    .pred_origins
                    .iter()
                    .map(|origin| match origin {
                        PredOrigin::Local => "local".to_string(),
                        PredOrigin::Node(id) => id.clone(),
                    })
                    .collect(),
            })
            .collect();

        Self { edges, nodes }
    }
}
