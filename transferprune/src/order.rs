// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Topological edge sequencing
//!
//! Linearizes a DAG's edges into the evaluation order the propagation
//! engine processes them in, and rejects cyclic inputs. The order is a
//! deterministic function of the caller-supplied enumeration order of
//! nodes and edges: DFS roots are taken in node order, out-edges in edge
//! order, and the final edge sort is stable.

use thiserror::Error;

/// The input edge set contains a directed cycle and is not a valid
/// predicate-transfer graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cycle detected in transfer graph at node '{node_id}'")]
pub struct CycleError {
    /// A node on the cycle (the one the traversal re-entered).
    pub node_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Finished,
}

/// Order edges so that for every edge `(u, v)`, `u` is never ordered after
/// `v`, tie-breaking by the destination's topological position and, among
/// full ties, by input edge order.
///
/// `endpoints` are `(src, dst)` index pairs into `node_ids`; the returned
/// vector holds indices into `endpoints`.
pub fn topological_edge_order(
    node_ids: &[&str],
    endpoints: &[(usize, usize)],
) -> Result<Vec<usize>, CycleError> {
    let positions = topological_positions(node_ids, endpoints)?;

    let mut order: Vec<usize> = (0..endpoints.len()).collect();
    // Stable sort: edges tied on both positions keep input order.
    order.sort_by_key(|&edge| (positions[endpoints[edge].0], positions[endpoints[edge].1]));
    Ok(order)
}

/// Node indices in a valid topological order (sources first).
pub fn topological_node_order(
    node_ids: &[&str],
    endpoints: &[(usize, usize)],
) -> Result<Vec<usize>, CycleError> {
    let positions = topological_positions(node_ids, endpoints)?;
    let mut order: Vec<usize> = (0..node_ids.len()).collect();
    order.sort_by_key(|&node| positions[node]);
    Ok(order)
}

/// Map every node index to its topological position via an iterative DFS.
///
/// The explicit stack bounds memory by the longest path without risking
/// call-stack exhaustion on deep plans. Three marks per node: a DFS that
/// reaches an `InProgress` node has found a back edge, i.e. a cycle.
fn topological_positions(
    node_ids: &[&str],
    endpoints: &[(usize, usize)],
) -> Result<Vec<usize>, CycleError> {
    let node_count = node_ids.len();
    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    for &(src, dst) in endpoints {
        adjacency[src].push(dst);
    }

    let mut marks = vec![Mark::Unvisited; node_count];
    let mut finish_order = Vec::with_capacity(node_count);
    // Frames are (node, index of the next out-edge to follow).
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for root in 0..node_count {
        if marks[root] != Mark::Unvisited {
            continue;
        }
        marks[root] = Mark::InProgress;
        stack.push((root, 0));

        while let Some(&(node, next)) = stack.last() {
            match adjacency[node].get(next) {
                Some(&child) => {
                    let top = stack.len() - 1;
                    stack[top].1 += 1;
                    match marks[child] {
                        Mark::InProgress => {
                            return Err(CycleError {
                                node_id: node_ids[child].to_string(),
                            });
                        }
                        Mark::Unvisited => {
                            marks[child] = Mark::InProgress;
                            stack.push((child, 0));
                        }
                        Mark::Finished => {}
                    }
                }
                None => {
                    marks[node] = Mark::Finished;
                    finish_order.push(node);
                    stack.pop();
                }
            }
        }
    }

    // Reversed finish order is a topological node order.
    let mut positions = vec![0; node_count];
    for (position, &node) in finish_order.iter().rev().enumerate() {
        positions[node] = position;
    }
    Ok(positions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_edges_in_path_order() {
        let nodes = ["a", "b", "c"];
        // Deliberately listed backwards.
        let endpoints = [(1, 2), (0, 1)];
        let order = topological_edge_order(&nodes, &endpoints).unwrap();
        assert_eq!(order, vec![1, 0]);
    }

    #[test]
    fn test_tie_break_prefers_earlier_destination() {
        // a -> b -> c plus a -> c: both edges out of `a` share a source, so
        // the one whose destination is earlier in topological order (b)
        // comes first regardless of input order.
        let nodes = ["a", "b", "c"];
        let endpoints = [(0, 2), (0, 1), (1, 2)];
        let order = topological_edge_order(&nodes, &endpoints).unwrap();
        assert_eq!(order, vec![1, 0, 2]);
    }

    #[test]
    fn test_fully_tied_edges_keep_input_order() {
        // Parallel edges between the same pair tie on both sort keys.
        let nodes = ["a", "b"];
        let endpoints = [(0, 1), (0, 1)];
        let order = topological_edge_order(&nodes, &endpoints).unwrap();
        assert_eq!(order, vec![0, 1]);
    }

    #[test]
    fn test_diamond_node_order_is_deterministic() {
        let nodes = ["a", "b", "c", "d"];
        let endpoints = [(0, 1), (0, 2), (1, 3), (2, 3)];
        let order = topological_node_order(&nodes, &endpoints).unwrap();
        // b is explored first, so it finishes first and lands after c in the
        // reversed finish order. Stable across runs.
        assert_eq!(order, vec![0, 2, 1, 3]);
    }

    #[test]
    fn should_reject_two_node_cycle() {
        let nodes = ["a", "b"];
        let endpoints = [(0, 1), (1, 0)];
        let err = topological_edge_order(&nodes, &endpoints).unwrap_err();
        assert_eq!(err.node_id, "a");
    }

    #[test]
    fn should_reject_self_loop() {
        let nodes = ["a"];
        let endpoints = [(0, 0)];
        assert!(topological_edge_order(&nodes, &endpoints).is_err());
    }

    #[test]
    fn test_disconnected_nodes_are_ordered() {
        let nodes = ["a", "b", "c"];
        let endpoints = [(2, 0)];
        let order = topological_node_order(&nodes, &endpoints).unwrap();
        assert_eq!(order.len(), 3);
        let pos_c = order.iter().position(|&n| n == 2).unwrap();
        let pos_a = order.iter().position(|&n| n == 0).unwrap();
        assert!(pos_c < pos_a);
    }
}
