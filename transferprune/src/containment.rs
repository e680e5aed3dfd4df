// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Containment checks between adjacent nodes
//!
//! Both relations are directional (src toward dst), never symmetric.

use crate::graph::Node;
use crate::selectivity::SelectivityEstimator;

/// True iff every join key the destination needs is already available at
/// the source. When this fails the two nodes are structurally incomparable
/// and the transfer must be kept, not merely treated as unknown.
pub fn join_keys_contained(src: &Node, dst: &Node) -> bool {
    dst.join_keys.is_subset(&src.join_keys)
}

/// True iff the destination's own local filtering is at least as strong as
/// what the source would transfer, making the transfer informationally
/// redundant.
pub fn predicates_contained(
    src: &Node,
    dst: &Node,
    estimator: &dyn SelectivityEstimator,
) -> bool {
    estimator.estimate(&dst.local_preds) <= estimator.estimate(&src.local_preds)
}
