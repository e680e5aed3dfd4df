// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Predicate-transfer graph model
//!
//! Nodes are query-plan operators; directed edges are candidate predicate
//! transfers between them. The model carries two kinds of per-run
//! annotations: a provenance set on every node (`pred_origins`) and a
//! tri-state prune flag on every edge. Both are rewritten by the
//! propagation engine; everything else is caller-supplied input.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// A local filter triple `(column, operator, value)` already applied at a node.
///
/// Membership (`in`) predicates store their value set as a JSON array; any
/// other operator takes a scalar literal. Operators are matched
/// case-insensitively by the selectivity estimator, and unrecognized
/// operators are accepted silently with a neutral selectivity factor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    pub column: String,
    pub op: String,
    pub value: serde_json::Value,
}

impl Predicate {
    pub fn new(
        column: impl Into<String>,
        op: impl Into<String>,
        value: serde_json::Value,
    ) -> Self {
        Self {
            column: column.into(),
            op: op.into(),
            value,
        }
    }

    /// Number of values this predicate compares against (array length for
    /// membership sets, 1 for scalar literals).
    pub fn value_set_len(&self) -> usize {
        match &self.value {
            serde_json::Value::Array(values) => values.len(),
            _ => 1,
        }
    }
}

/// A provenance token: where a node's filtering effect may originate from.
///
/// `Local` is the reserved sentinel for "this node's own local predicate".
/// Modeling it as a distinct variant keeps it disjoint from every possible
/// node id by construction.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PredOrigin {
    /// The node's own local predicate.
    Local,
    /// A predicate transferred (directly or transitively) from another node.
    Node(String),
}

/// A query-plan operator participating in predicate transfer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identity within the graph.
    pub id: String,
    /// Columns that must all be available upstream for a transfer into this
    /// node to be a candidate for pruning.
    pub join_keys: BTreeSet<String>,
    /// Filters already applied at this node, in application order.
    pub local_preds: Vec<Predicate>,
    /// Provenance of the filtering this node still depends on. Rebuilt at
    /// the start of every engine run, grown monotonically within a run.
    pub pred_origins: BTreeSet<PredOrigin>,
}

impl Node {
    pub fn new(
        id: impl Into<String>,
        join_keys: impl IntoIterator<Item = impl Into<String>>,
        local_preds: Vec<Predicate>,
    ) -> Self {
        Self {
            id: id.into(),
            join_keys: join_keys.into_iter().map(Into::into).collect(),
            local_preds,
            pred_origins: BTreeSet::new(),
        }
    }
}

/// Tri-state prune flag on an edge.
///
/// Every original edge leaves the engine in a decided state; `Unevaluated`
/// is only observable before the first run or after a failed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PruneDecision {
    #[default]
    Unevaluated,
    /// The transfer is informationally redundant and can be skipped.
    Prune,
    /// The transfer carries information not implied elsewhere; execute it.
    Keep,
}

impl PruneDecision {
    pub fn is_decided(self) -> bool {
        !matches!(self, PruneDecision::Unevaluated)
    }
}

/// A directed candidate transfer from `src` to `dst`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub src: String,
    pub dst: String,
    /// Written exactly once per run, by the forward pass.
    pub prune: PruneDecision,
}

impl Edge {
    pub fn new(src: impl Into<String>, dst: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            dst: dst.into(),
            prune: PruneDecision::Unevaluated,
        }
    }

    /// Execution-side view of the decision: `true` means skip the transfer.
    pub fn should_prune(&self) -> bool {
        self.prune == PruneDecision::Prune
    }
}

/// The predicate-transfer graph: an insertion-ordered node collection plus
/// an ordered list of directed edges.
///
/// Insertion order matters: the topological sequencer's tie-break is a
/// deterministic function of the order nodes and edges were added, so the
/// graph preserves it instead of relying on hash iteration order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Graph {
    nodes: Vec<Node>,
    #[serde(skip)]
    index: HashMap<String, usize>,
    edges: Vec<Edge>,
}

// Manual impl so the id index is rebuilt after deserialization.
impl<'de> Deserialize<'de> for Graph {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct RawGraph {
            nodes: Vec<Node>,
            edges: Vec<Edge>,
        }

        let raw = RawGraph::deserialize(deserializer)?;
        let mut graph = Graph::new();
        for node in raw.nodes {
            graph.add_node(node);
        }
        graph.edges = raw.edges;
        Ok(graph)
    }
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node, replacing any existing node with the same id in place
    /// (the original enumeration position is retained).
    pub fn add_node(&mut self, node: Node) {
        match self.index.get(&node.id) {
            Some(&pos) => self.nodes[pos] = node,
            None => {
                self.index.insert(node.id.clone(), self.nodes.len());
                self.nodes.push(node);
            }
        }
    }

    /// Append a directed edge. Referential integrity against the node set is
    /// checked by the propagation engine, not here.
    pub fn add_edge(&mut self, src: impl Into<String>, dst: impl Into<String>) {
        self.edges.push(Edge::new(src, dst));
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&pos| &self.nodes[pos])
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        match self.index.get(id) {
            Some(&pos) => Some(&mut self.nodes[pos]),
            None => None,
        }
    }

    pub(crate) fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub(crate) fn node_at(&self, pos: usize) -> &Node {
        &self.nodes[pos]
    }

    pub(crate) fn node_at_mut(&mut self, pos: usize) -> &mut Node {
        &mut self.nodes[pos]
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    /// Edges in insertion order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub(crate) fn edges_mut(&mut self) -> &mut [Edge] {
        &mut self.edges
    }
}
