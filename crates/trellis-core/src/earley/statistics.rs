// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Earley engine counters.
//!
//! These are introspection and tuning aids, not correctness outputs; they
//! ride along in the result's data bag.

/// Counters collected during one Earley parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EarleyStatistics {
    /// Items added to any state set.
    pub created_items: u64,
    /// Items added by prediction.
    pub predicted_items: u64,
    /// Predicting items advanced immediately over a nullable symbol
    /// (the Aycock–Horspool fix).
    pub predicted_by_completed_nullable: u64,
    /// Completions spanning zero input.
    pub completed_nullables: u64,
    /// Waiting parent items advanced by a completion.
    pub completed_parent_items: u64,
    /// Production reductions considered during derivation building.
    pub production_attempts: u64,
    /// Production reductions that produced a derivation value.
    pub production_successes: u64,
    /// Derivation-cache lookups that found a memoized span.
    pub derivation_cache_hits: u64,
    /// Productions reduced through the single-symbol shortcut.
    pub single_symbol_shortcuts: u64,
}
