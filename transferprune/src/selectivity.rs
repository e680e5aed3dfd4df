// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Selectivity estimation for local predicate sets
//!
//! A deliberately simple factor model: each predicate contributes a fixed
//! factor by operator family and the factors multiply. It stands in for a
//! real cardinality estimator; the `SelectivityEstimator` trait is the seam
//! for swapping one in without touching the rest of the engine.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::graph::Predicate;

/// Maps a sequence of local predicates to an expected surviving-row
/// fraction in `[0, 1]` (lower = more selective). An empty sequence must
/// estimate to exactly `1.0`.
pub trait SelectivityEstimator {
    fn estimate(&self, preds: &[Predicate]) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OpFamily {
    Equality,
    Membership,
    Range,
}

static OP_FAMILIES: Lazy<HashMap<&'static str, OpFamily>> = Lazy::new(|| {
    HashMap::from([
        ("=", OpFamily::Equality),
        ("in", OpFamily::Membership),
        ("<", OpFamily::Range),
        (">", OpFamily::Range),
        ("<=", OpFamily::Range),
        (">=", OpFamily::Range),
        ("between", OpFamily::Range),
    ])
});

fn family_of(op: &str) -> Option<OpFamily> {
    OP_FAMILIES.get(op.to_ascii_lowercase().as_str()).copied()
}

/// Default factor-table estimator. Every factor is configuration so hosts
/// can tune the table without replacing the estimator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorEstimator {
    pub equality_factor: f64,
    pub range_factor: f64,
    pub membership_per_value: f64,
    pub membership_floor: f64,
    pub membership_cap: f64,
}

impl Default for FactorEstimator {
    fn default() -> Self {
        Self {
            equality_factor: 0.1,
            range_factor: 0.5,
            membership_per_value: 0.02,
            membership_floor: 0.02,
            membership_cap: 0.2,
        }
    }
}

impl FactorEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    fn factor_for(&self, pred: &Predicate) -> f64 {
        match family_of(&pred.op) {
            Some(OpFamily::Equality) => self.equality_factor,
            Some(OpFamily::Membership) => {
                let set_len = pred.value_set_len() as f64;
                (self.membership_per_value * set_len)
                    .max(self.membership_floor)
                    .min(self.membership_cap)
            }
            Some(OpFamily::Range) => self.range_factor,
            // Unrecognized operators are accepted silently with no
            // filtering effect, not treated as invalid input.
            None => 1.0,
        }
    }
}

impl SelectivityEstimator for FactorEstimator {
    fn estimate(&self, preds: &[Predicate]) -> f64 {
        if preds.is_empty() {
            return 1.0;
        }
        let product: f64 = preds.iter().map(|pred| self.factor_for(pred)).product();
        product.clamp(0.0, 1.0)
    }
}
