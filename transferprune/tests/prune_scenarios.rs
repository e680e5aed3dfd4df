// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! End-to-end pruning scenarios over small transfer graphs.

use serde_json::json;
use transferprune::{
    prune_transfers, Graph, Node, Predicate, PruneDecision, PruneEngine, PruneError,
};

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn decisions(graph: &Graph) -> Vec<(String, String, PruneDecision)> {
    graph
        .edges()
        .iter()
        .map(|e| (e.src.clone(), e.dst.clone(), e.prune))
        .collect()
}

/// A(a_id, a_id IN {10,11,12}) -> B(a_id,b_id) -> C(b_id, b_id = 7)
fn linear_chain() -> Graph {
    let mut graph = Graph::new();
    graph.add_node(Node::new(
        "A",
        ["a_id"],
        vec![Predicate::new("a_id", "in", json!([10, 11, 12]))],
    ));
    graph.add_node(Node::new("B", ["a_id", "b_id"], vec![]));
    graph.add_node(Node::new(
        "C",
        ["b_id"],
        vec![Predicate::new("b_id", "=", json!(7))],
    ));
    graph.add_edge("A", "B");
    graph.add_edge("B", "C");
    graph
}

#[test]
fn linear_chain_prunes_only_the_subsumed_transfer() {
    init_logs();
    let mut graph = linear_chain();
    prune_transfers(&mut graph).unwrap();

    // B needs b_id, which A cannot supply: keep. C's own equality filter is
    // at least as selective as unfiltered B, and B's keys cover C's: prune.
    assert!(!graph.edges()[0].should_prune());
    assert!(graph.edges()[1].should_prune());
}

#[test]
fn diamond_with_diverging_keys_keeps_every_transfer() {
    init_logs();
    let mut graph = Graph::new();
    graph.add_node(Node::new("A", ["a_id"], vec![]));
    graph.add_node(Node::new("B", ["a_id", "b_id"], vec![]));
    graph.add_node(Node::new("C", ["a_id", "c_id"], vec![]));
    graph.add_node(Node::new("D", ["b_id", "c_id"], vec![]));
    graph.add_edge("A", "B");
    graph.add_edge("A", "C");
    graph.add_edge("B", "D");
    graph.add_edge("C", "D");

    prune_transfers(&mut graph).unwrap();

    // Every downstream node needs a key its upstream lacks.
    assert!(graph
        .edges()
        .iter()
        .all(|e| e.prune == PruneDecision::Keep));
}

#[test]
fn mixed_graph_with_growing_keys_keeps_every_transfer() {
    init_logs();
    let mut graph = Graph::new();
    graph.add_node(Node::new("A", ["a_id"], vec![]));
    graph.add_node(Node::new("B", ["a_id", "b_id"], vec![]));
    graph.add_node(Node::new("C", ["b_id", "c_id"], vec![]));
    graph.add_node(Node::new("D", ["c_id", "d_id"], vec![]));
    graph.add_edge("A", "B");
    graph.add_edge("A", "C");
    graph.add_edge("B", "C");
    graph.add_edge("B", "D");
    graph.add_edge("C", "D");

    prune_transfers(&mut graph).unwrap();

    // Pruning only triggers when join keys strictly shrink along an edge,
    // never when they diverge.
    assert!(graph
        .edges()
        .iter()
        .all(|e| e.prune == PruneDecision::Keep));
}

#[test]
fn join_key_gap_always_keeps_regardless_of_predicates() {
    init_logs();
    let mut graph = Graph::new();
    // The destination filters far harder than the source, but it needs a
    // key the source lacks, so predicates are never consulted.
    graph.add_node(Node::new("A", ["a_id"], vec![]));
    graph.add_node(Node::new(
        "B",
        ["a_id", "b_id"],
        vec![
            Predicate::new("b_id", "=", json!(1)),
            Predicate::new("c", "=", json!(2)),
        ],
    ));
    graph.add_edge("A", "B");

    prune_transfers(&mut graph).unwrap();
    assert_eq!(graph.edges()[0].prune, PruneDecision::Keep);
}

#[test]
fn cycle_is_rejected_before_any_edge_is_decided() {
    init_logs();
    let mut graph = Graph::new();
    graph.add_node(Node::new("A", ["x"], vec![]));
    graph.add_node(Node::new("B", ["x"], vec![]));
    graph.add_node(Node::new("C", ["x"], vec![]));
    graph.add_edge("A", "B");
    graph.add_edge("B", "C");
    graph.add_edge("C", "A");

    let err = prune_transfers(&mut graph).unwrap_err();
    assert!(matches!(err, PruneError::Cycle(_)));
    assert!(graph.edges().iter().all(|e| !e.prune.is_decided()));
}

#[test]
fn repeated_runs_yield_identical_decisions() {
    init_logs();
    let mut graph = linear_chain();
    prune_transfers(&mut graph).unwrap();
    let first = decisions(&graph);

    prune_transfers(&mut graph).unwrap();
    assert_eq!(first, decisions(&graph));
}

#[test]
fn backward_pass_never_changes_edge_decisions() {
    init_logs();
    let engine = PruneEngine::new();

    // A mix of keep and prune outcomes plus a shared downstream node, so
    // the backward sweep has real provenance work to do.
    let build = || {
        let mut graph = Graph::new();
        graph.add_node(Node::new(
            "A",
            ["a_id"],
            vec![Predicate::new("a_id", "in", json!([10, 11, 12]))],
        ));
        graph.add_node(Node::new("B", ["a_id", "b_id"], vec![]));
        graph.add_node(Node::new(
            "C",
            ["b_id"],
            vec![Predicate::new("b_id", "=", json!(7))],
        ));
        graph.add_node(Node::new("D", ["b_id"], vec![]));
        graph.add_edge("A", "B");
        graph.add_edge("B", "C");
        graph.add_edge("B", "D");
        graph.add_edge("C", "D");
        graph
    };

    let mut full = build();
    engine.run(&mut full).unwrap();

    let mut forward_only = build();
    engine.run_forward_only(&mut forward_only).unwrap();

    // The forward pass owns every decision; disabling the backward pass
    // may only change provenance, never a prune flag.
    assert_eq!(decisions(&full), decisions(&forward_only));

    let provenance = |graph: &Graph, id: &str| graph.node(id).unwrap().pred_origins.clone();
    assert_ne!(provenance(&full, "B"), provenance(&forward_only, "B"));
}
