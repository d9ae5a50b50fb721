// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Derivation-tree reconstruction.
//!
//! After chart construction, every completed span of the start symbol is
//! turned into values by walking the chart: for each production completed
//! over `(start, end)`, the components are assigned sub-spans guided by
//! recorded completions and scan results, sub-derivations are enumerated
//! recursively, and the production's reduction function is applied over
//! each component-value assignment.
//!
//! Walks are memoized per `(symbol, start, end)` — the derivation cache —
//! and a production with a single symbol component reuses its child's
//! derivations directly (the single-symbol shortcut). A re-entrant walk of
//! the span currently being computed contributes nothing: such a cycle can
//! only arise from a symbol deriving itself across a zero-width span,
//! which would otherwise enumerate infinitely many trees.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::rc::Rc;

use super::grammar::{Component, Grammar};
use super::statistics::EarleyStatistics;

/// Shared chart data the walk reads, borrowed from the finished run.
pub(crate) struct DerivationWalk<'g, T, V> {
    pub(crate) grammar: &'g Grammar<T, V>,
    /// Memoized terminal scans: `(terminal id, offset)` to value/consumed.
    pub(crate) scans: &'g HashMap<(u64, usize), Option<(V, usize)>>,
    /// Completed symbol spans: `(symbol index, start)` to end offsets.
    pub(crate) completions: &'g HashMap<(usize, usize), BTreeSet<usize>>,
    /// Completed production spans `(production, start, end)`.
    pub(crate) production_spans: &'g HashSet<(usize, usize, usize)>,
    pub(crate) stats: &'g mut EarleyStatistics,
    pub(crate) cache: HashMap<(usize, usize, usize), Rc<Vec<V>>>,
    pub(crate) active: HashSet<(usize, usize, usize)>,
}

impl<T, V: Clone> DerivationWalk<'_, T, V> {
    /// All derivation values of `symbol` over `[start, end)`.
    pub(crate) fn symbol_values(&mut self, symbol: usize, start: usize, end: usize) -> Rc<Vec<V>> {
        let key = (symbol, start, end);
        if let Some(cached) = self.cache.get(&key) {
            self.stats.derivation_cache_hits += 1;
            return Rc::clone(cached);
        }
        if !self.active.insert(key) {
            // Re-entrant zero-progress span; see module docs.
            return Rc::new(Vec::new());
        }

        let values = stacker::maybe_grow(32 * 1024, 256 * 1024, || {
            let grammar = self.grammar;
            let mut values = Vec::new();
            for &pid in grammar.productions_of(super::grammar::SymbolId(symbol)) {
                if !self.production_spans.contains(&(pid, start, end)) {
                    continue;
                }
                let production = &grammar.productions()[pid];
                self.stats.production_attempts += 1;

                if let [Component::Symbol(inner)] = production.components.as_slice() {
                    // Single-symbol shortcut: reuse the child's derivations
                    // without a full component walk.
                    self.stats.single_symbol_shortcuts += 1;
                    let children = self.symbol_values(inner.index(), start, end);
                    for child in children.iter() {
                        values.push((production.reduce)(std::slice::from_ref(child)));
                        self.stats.production_successes += 1;
                    }
                    continue;
                }

                let assignments =
                    self.component_values(&production.components, start, end);
                for assignment in assignments {
                    values.push((production.reduce)(&assignment));
                    self.stats.production_successes += 1;
                }
            }
            values
        });

        let _ = self.active.remove(&key);
        let values = Rc::new(values);
        let _ = self.cache.insert(key, Rc::clone(&values));
        values
    }

    /// Every way to assign `components` values across `[position, end)`.
    fn component_values(
        &mut self,
        components: &[Component<T, V>],
        position: usize,
        end: usize,
    ) -> Vec<Vec<V>> {
        let Some((head, rest)) = components.split_first() else {
            return if position == end {
                vec![Vec::new()]
            } else {
                Vec::new()
            };
        };

        let mut assignments = Vec::new();
        match head {
            Component::Symbol(symbol) => {
                let ends: Vec<usize> = self
                    .completions
                    .get(&(symbol.index(), position))
                    .map(|ends| ends.iter().copied().filter(|&e| e <= end).collect())
                    .unwrap_or_default();
                for middle in ends {
                    let heads = self.symbol_values(symbol.index(), position, middle);
                    if heads.is_empty() {
                        continue;
                    }
                    let tails = self.component_values(rest, middle, end);
                    for tail in &tails {
                        for head_value in heads.iter() {
                            let mut assignment = Vec::with_capacity(components.len());
                            assignment.push(head_value.clone());
                            assignment.extend(tail.iter().cloned());
                            assignments.push(assignment);
                        }
                    }
                }
            }
            Component::Terminal(parser) => {
                if let Some(Some((value, consumed))) =
                    self.scans.get(&(parser.id().value(), position))
                {
                    let next = position + consumed;
                    if next <= end {
                        let tails = self.component_values(rest, next, end);
                        for tail in tails {
                            let mut assignment = Vec::with_capacity(components.len());
                            assignment.push(value.clone());
                            assignment.extend(tail);
                            assignments.push(assignment);
                        }
                    }
                }
            }
        }
        assignments
    }
}
