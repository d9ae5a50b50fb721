// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! The Earley engine.
//!
//! A chart parser for context-free grammars, including ambiguous and left-
//! or right-recursive ones. Grammars are defined with [`GrammarBuilder`]
//! (symbols, productions, reduction functions; terminals are ordinary
//! parsers) and run through [`earley`], a [`MultiParser`] producing one
//! alternative per derivation of the start symbol.
//!
//! # Algorithm
//!
//! The engine keeps one state set per input offset and drives each to a
//! fixpoint before moving right:
//!
//! - **Predict**: an item expecting symbol `S` adds items for every
//!   production of `S` at the current offset. If `S` is nullable the
//!   predicting item is advanced immediately as well — the
//!   Aycock–Horspool fix, which keeps ambiguous-nullable derivations
//!   correct.
//! - **Scan**: an item expecting a terminal runs that parser at the
//!   current offset (memoized per terminal and offset); success advances
//!   the item into the set at `offset + consumed`. Terminals may consume
//!   any number of items, so sets are sparse.
//! - **Complete**: a finished item advances every item at its origin that
//!   was waiting on its symbol, and records the span for derivation
//!   building.
//!
//! Derivations are reconstructed lazily afterwards (see the sibling
//! `derivation` module), one ranked alternative per completed span of the
//! start symbol, longest first. Alternatives carry their own consumed
//! counts: with a start symbol that does not require full-input
//! consumption, ambiguous derivations legitimately consume different
//! lengths. Engine counters ride along in the result data bag as
//! [`EarleyStatistics`].

mod chart;
mod derivation;
mod grammar;
mod statistics;

pub use grammar::{sym, term, Component, Grammar, GrammarBuilder, SymbolId};
pub use statistics::EarleyStatistics;

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::rc::Rc;

use ecow::EcoString;
use tracing::{debug, trace};

use crate::parser::{Meta, MultiParser, MultiParserRef, ParserId};
use crate::result::{DataEntry, MultiAlternative, MultiResult, ParseResult, ResultData};
use crate::sequence::Checkpoint;
use crate::state::ParseState;
use crate::syntax::Syntax;

use chart::{Item, StateSet};
use derivation::DerivationWalk;

/// Wraps a grammar as a multi-valued parser.
pub fn earley<T: 'static, V: Clone + 'static>(grammar: Grammar<T, V>) -> MultiParserRef<T, V> {
    let name = grammar.symbol_name(grammar.start()).clone();
    Rc::new(Earley {
        meta: Meta::new(name),
        grammar,
    })
}

/// An Earley parser over one grammar.
pub struct Earley<T, V> {
    meta: Meta,
    grammar: Grammar<T, V>,
}

impl<T, V> Earley<T, V> {
    /// The wrapped grammar.
    #[must_use]
    pub fn grammar(&self) -> &Grammar<T, V> {
        &self.grammar
    }
}

impl<T: 'static, V: Clone + 'static> MultiParser<T, V> for Earley<T, V> {
    fn parse_multi(&self, state: &mut ParseState<'_, T>) -> MultiResult<V> {
        let start_checkpoint = state.checkpoint();
        let mut run = Run {
            grammar: &self.grammar,
            state: &mut *state,
            sets: BTreeMap::new(),
            checkpoints: HashMap::new(),
            scans: HashMap::new(),
            completions: HashMap::new(),
            production_spans: HashSet::new(),
            stats: EarleyStatistics::default(),
        };
        run.build_chart(start_checkpoint);
        let alternatives = run.alternatives();
        let stats = run.stats;
        debug!(
            symbol = %self.grammar.symbol_name(self.grammar.start()),
            derivations = alternatives.len(),
            items = stats.created_items,
            "earley parse finished"
        );

        state.rewind(start_checkpoint);
        let mut data = ResultData::default();
        data.push(DataEntry::EarleyStatistics(stats));
        MultiResult {
            origin: self.meta.id(),
            start: start_checkpoint,
            alternatives,
            data,
        }
    }

    fn id(&self) -> ParserId {
        self.meta.id()
    }

    fn name(&self) -> EcoString {
        self.meta.name()
    }

    fn syntax(&self) -> Syntax {
        Syntax::Reference(self.grammar.symbol_name(self.grammar.start()).clone())
    }
}

/// One in-flight chart construction.
struct Run<'g, 'a, 's, T, V> {
    grammar: &'g Grammar<T, V>,
    state: &'a mut ParseState<'s, T>,
    /// State sets by offset from the invocation position.
    sets: BTreeMap<usize, StateSet>,
    /// Sequence checkpoints for every reached offset.
    checkpoints: HashMap<usize, Checkpoint>,
    /// Memoized terminal scans: `(terminal id, offset)` to value/consumed.
    scans: HashMap<(u64, usize), Option<(V, usize)>>,
    /// Completed symbol spans: `(symbol index, start)` to end offsets.
    completions: HashMap<(usize, usize), BTreeSet<usize>>,
    /// Completed production spans `(production, start, end)`.
    production_spans: HashSet<(usize, usize, usize)>,
    stats: EarleyStatistics,
}

impl<T, V: Clone> Run<'_, '_, '_, T, V> {
    fn build_chart(&mut self, start_checkpoint: Checkpoint) {
        let _ = self.checkpoints.insert(0, start_checkpoint);

        let grammar = self.grammar;
        for &pid in grammar.productions_of(grammar.start()) {
            if self.push_item(
                0,
                Item {
                    production: pid,
                    dot: 0,
                    origin: 0,
                },
            ) {
                self.stats.predicted_items += 1;
            }
        }

        let mut pending: BTreeSet<usize> = BTreeSet::new();
        let _ = pending.insert(0);
        while let Some(offset) = pending.pop_first() {
            loop {
                let Some(item) = self
                    .sets
                    .get_mut(&offset)
                    .and_then(StateSet::next_unprocessed)
                else {
                    break;
                };
                let production = &grammar.productions()[item.production];
                if item.dot == production.components.len() {
                    self.complete(item, offset);
                } else {
                    match &production.components[item.dot] {
                        Component::Symbol(symbol) => self.predict(*symbol, item, offset),
                        Component::Terminal(terminal) => {
                            let terminal = terminal.clone();
                            self.scan(&terminal, item, offset, &mut pending);
                        }
                    }
                }
            }
            trace!(
                offset,
                items = self.sets.get(&offset).map_or(0, StateSet::len),
                "state set fixpoint"
            );
        }
    }

    /// Adds items for every production of `symbol` at `offset`; if the
    /// symbol is nullable, also advances the predicting item in place.
    fn predict(&mut self, symbol: SymbolId, item: Item, offset: usize) {
        let grammar = self.grammar;
        for &pid in grammar.productions_of(symbol) {
            if self.push_item(
                offset,
                Item {
                    production: pid,
                    dot: 0,
                    origin: offset,
                },
            ) {
                self.stats.predicted_items += 1;
            }
        }
        if grammar.is_nullable(symbol)
            && self.push_item(
                offset,
                Item {
                    production: item.production,
                    dot: item.dot + 1,
                    origin: item.origin,
                },
            )
        {
            self.stats.predicted_by_completed_nullable += 1;
        }
    }

    /// Runs (or replays) a terminal at `offset`; success advances the item
    /// into the set at `offset + consumed`.
    fn scan(
        &mut self,
        terminal: &crate::parser::ParserRef<T, V>,
        item: Item,
        offset: usize,
        pending: &mut BTreeSet<usize>,
    ) {
        let key = (terminal.id().value(), offset);
        if !self.scans.contains_key(&key) {
            let checkpoint = self.checkpoints[&offset];
            self.state.rewind(checkpoint);
            let entry = match terminal.parse(self.state) {
                ParseResult::Success(s) => {
                    let end = offset + s.consumed;
                    let after = self.state.checkpoint();
                    let _ = self.checkpoints.entry(end).or_insert(after);
                    Some((s.value, s.consumed))
                }
                ParseResult::Failure(_) => None,
            };
            let _ = self.scans.insert(key, entry);
        }
        if let Some(Some((_, consumed))) = self.scans.get(&key) {
            let end = offset + consumed;
            if self.push_item(
                end,
                Item {
                    production: item.production,
                    dot: item.dot + 1,
                    origin: item.origin,
                },
            ) {
                let _ = pending.insert(end);
            }
        }
    }

    /// Records the completed span and advances waiting parents from the
    /// item's origin set into the current set.
    fn complete(&mut self, item: Item, offset: usize) {
        let grammar = self.grammar;
        let symbol = grammar.productions()[item.production].symbol;
        let _ = self
            .completions
            .entry((symbol.index(), item.origin))
            .or_default()
            .insert(offset);
        let _ = self
            .production_spans
            .insert((item.production, item.origin, offset));
        if item.origin == offset {
            self.stats.completed_nullables += 1;
        }

        let parents: Vec<Item> = match self.sets.get(&item.origin) {
            Some(set) => set.items().to_vec(),
            None => Vec::new(),
        };
        for parent in parents {
            let production = &grammar.productions()[parent.production];
            if let Some(Component::Symbol(s)) = production.components.get(parent.dot) {
                if *s == symbol
                    && self.push_item(
                        offset,
                        Item {
                            production: parent.production,
                            dot: parent.dot + 1,
                            origin: parent.origin,
                        },
                    )
                {
                    self.stats.completed_parent_items += 1;
                }
            }
        }
    }

    fn push_item(&mut self, offset: usize, item: Item) -> bool {
        let added = self.sets.entry(offset).or_default().push(item);
        if added {
            self.stats.created_items += 1;
        }
        added
    }

    /// Enumerates ranked derivation alternatives of the start symbol,
    /// longest span first.
    fn alternatives(&mut self) -> Vec<MultiAlternative<V>> {
        let grammar = self.grammar;
        let start_symbol = grammar.start().index();
        let ends: Vec<usize> = self
            .completions
            .get(&(start_symbol, 0))
            .map(|ends| ends.iter().rev().copied().collect())
            .unwrap_or_default();

        let mut walk = DerivationWalk {
            grammar,
            scans: &self.scans,
            completions: &self.completions,
            production_spans: &self.production_spans,
            stats: &mut self.stats,
            cache: HashMap::new(),
            active: HashSet::new(),
        };
        let mut alternatives = Vec::new();
        for end in ends {
            let continuation = self.checkpoints[&end];
            for value in walk.symbol_values(start_symbol, 0, end).iter() {
                alternatives.push(MultiAlternative::Success {
                    value: value.clone(),
                    consumed: end,
                    continuation,
                });
            }
        }
        alternatives
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinators::{continue_with, list_bounded, map};
    use crate::parser::{ParserRef, TextMultiParserExt};
    use crate::primitives::{match_char, match_item};
    use crate::sequence::CharSequence;

    fn digits() -> ParserRef<char, i64> {
        map(
            list_bounded(match_item("digit", |c: &char| c.is_ascii_digit()), 1, None),
            |ds| {
                ds.iter()
                    .fold(0i64, |acc, d| acc * 10 + i64::from(d.to_digit(10).unwrap()))
            },
        )
    }

    fn op(c: char) -> ParserRef<char, i64> {
        map(match_char(c), |_| 0)
    }

    /// Expr := Expr '+' Expr | Expr '*' Expr | digits
    fn ambiguous_expr() -> MultiParserRef<char, i64> {
        let mut builder = GrammarBuilder::new();
        let expr = builder.symbol("Expr").unwrap();
        let _ = builder.production(expr, vec![sym(expr), term(op('+')), sym(expr)], |vs| {
            vs[0] + vs[2]
        });
        let _ = builder.production(expr, vec![sym(expr), term(op('*')), sym(expr)], |vs| {
            vs[0] * vs[2]
        });
        let _ = builder.production(expr, vec![term(digits())], |vs| vs[0]);
        earley(builder.build(expr).unwrap())
    }

    #[test]
    fn ambiguity_yields_every_derivation() {
        let parser = ambiguous_expr();
        let result = parser.parse_multi_text("4*5+6");
        assert!(result.is_success());
        let mut values: Vec<i64> = result.successes().map(|(v, _)| *v).collect();
        values.sort_unstable();
        assert_eq!(values, vec![4, 20, 26, 44]);
    }

    #[test]
    fn derivations_carry_their_own_consumed_counts() {
        let parser = ambiguous_expr();
        let result = parser.parse_multi_text("4*5+6");
        let mut spans: Vec<(i64, usize)> =
            result.successes().map(|(v, n)| (*v, n)).collect();
        spans.sort_unstable();
        assert_eq!(spans, vec![(4, 1), (20, 3), (26, 5), (44, 5)]);
    }

    #[test]
    fn ranked_longest_first() {
        let parser = ambiguous_expr();
        let result = parser.parse_multi_text("4*5+6");
        let consumed: Vec<usize> = result.successes().map(|(_, n)| n).collect();
        assert_eq!(consumed.first(), Some(&5));
        assert_eq!(consumed.last(), Some(&1));
    }

    #[test]
    fn left_recursion_terminates() {
        // E := empty | E 'a'
        let mut builder = GrammarBuilder::new();
        let e = builder.symbol("E").unwrap();
        let _ = builder.production(e, vec![], |_| 0i64);
        let _ = builder.production(e, vec![sym(e), term(op('a'))], |vs| vs[0] + 1);
        let parser = earley(builder.build(e).unwrap());

        let result = parser.parse_multi_text("aaaa");
        assert!(result.is_success());
        // The full-input derivation is unique: four 'a's counted.
        let full: Vec<i64> = result
            .successes()
            .filter(|&(_, n)| n == 4)
            .map(|(v, _)| *v)
            .collect();
        assert_eq!(full, vec![4]);
    }

    #[test]
    fn right_recursion_terminates() {
        // E := 'a' | 'a' E
        let mut builder = GrammarBuilder::new();
        let e = builder.symbol("E").unwrap();
        let _ = builder.production(e, vec![term(op('a'))], |_| 1i64);
        let _ = builder.production(e, vec![term(op('a')), sym(e)], |vs| vs[1] + 1);
        let parser = earley(builder.build(e).unwrap());

        let result = parser.parse_multi_text("aaaa");
        assert!(result.is_success());
        let full: Vec<i64> = result
            .successes()
            .filter(|&(_, n)| n == 4)
            .map(|(v, _)| *v)
            .collect();
        assert_eq!(full, vec![4]);
    }

    #[test]
    fn right_recursion_rejects_empty_input() {
        let mut builder = GrammarBuilder::new();
        let e = builder.symbol("E").unwrap();
        let _ = builder.production(e, vec![term(op('a'))], |_| 1i64);
        let _ = builder.production(e, vec![term(op('a')), sym(e)], |vs| vs[1] + 1);
        let parser = earley(builder.build(e).unwrap());

        let result = parser.parse_multi_text("");
        assert!(!result.is_success());
        assert!(result.alternatives.is_empty());
    }

    #[test]
    fn unmatched_input_is_an_unexceptional_failure() {
        let parser = ambiguous_expr();
        let result = parser.parse_multi_text("xyz");
        assert!(!result.is_success());
    }

    #[test]
    fn engine_rewinds_to_the_start() {
        let parser = ambiguous_expr();
        let mut input = CharSequence::new("4*5");
        let mut state = ParseState::new(&mut input);
        let _ = parser.parse_multi(&mut state);
        assert_eq!(state.consumed(), 0);
    }

    #[test]
    fn statistics_ride_in_the_data_bag() {
        let parser = ambiguous_expr();
        let result = parser.parse_multi_text("4*5+6");
        let stats = result.data.earley_statistics().expect("statistics");
        assert!(stats.created_items > 0);
        assert!(stats.predicted_items > 0);
        assert!(stats.completed_parent_items > 0);
        assert!(stats.production_successes >= 4);
        // Expr spans are shared between the two full-length derivations.
        assert!(stats.derivation_cache_hits > 0);
    }

    #[test]
    fn single_symbol_shortcut_is_tracked() {
        // S := E ; E := digits — the unit production takes the shortcut.
        let mut builder = GrammarBuilder::new();
        let s = builder.symbol("S").unwrap();
        let e = builder.symbol("E").unwrap();
        let _ = builder.production(s, vec![sym(e)], |vs| vs[0]);
        let _ = builder.production(e, vec![term(digits())], |vs| vs[0]);
        let parser = earley(builder.build(s).unwrap());
        let result = parser.parse_multi_text("7");
        let values: Vec<i64> = result.successes().map(|(v, _)| *v).collect();
        assert_eq!(values, vec![7]);
        let stats = result.data.earley_statistics().expect("statistics");
        assert!(stats.single_symbol_shortcuts > 0);
    }

    #[test]
    fn nullable_statistics_are_tracked() {
        // S := A 'b' ; A := empty — A is predicted before it completes, so
        // the Aycock–Horspool advance fires during prediction.
        let mut builder = GrammarBuilder::new();
        let s = builder.symbol("S").unwrap();
        let a = builder.symbol("A").unwrap();
        let _ = builder.production(s, vec![sym(a), term(op('b'))], |vs| vs[0] + vs[1] + 1);
        let _ = builder.production(a, vec![], |_| 0i64);
        let parser = earley(builder.build(s).unwrap());
        let result = parser.parse_multi_text("b");
        let values: Vec<i64> = result.successes().map(|(v, _)| *v).collect();
        assert_eq!(values, vec![1]);
        let stats = result.data.earley_statistics().expect("statistics");
        assert!(stats.completed_nullables > 0);
        assert!(stats.predicted_by_completed_nullable > 0);
    }

    #[test]
    fn multi_character_terminals_jump_offsets() {
        let parser = ambiguous_expr();
        let result = parser.parse_multi_text("42*5");
        let mut spans: Vec<(i64, usize)> =
            result.successes().map(|(v, n)| (*v, n)).collect();
        spans.sort_unstable();
        assert_eq!(spans, vec![(42, 2), (210, 4)]);
    }

    #[test]
    fn continue_with_chains_each_derivation() {
        // Chain the ambiguous expression with a '!' terminator: only
        // full-length derivations are followed by '!'.
        let parser = continue_with(ambiguous_expr(), |value| {
            crate::combinators::combine((value, match_char('!')), |(v, _)| v)
        });
        let result = parser.parse_multi_text("4*5+6!");
        let mut values: Vec<(i64, usize)> =
            result.successes().map(|(v, n)| (*v, n)).collect();
        values.sort_unstable();
        assert_eq!(values, vec![(26, 6), (44, 6)]);
    }

    #[test]
    fn single_derivation_grammar_over_tokens() {
        // Works over non-character sequences too.
        let mut builder = GrammarBuilder::new();
        let pair = builder.symbol("Pair").unwrap();
        let one = map(crate::primitives::match_value(1u8), |v| i64::from(v));
        let two = map(crate::primitives::match_value(2u8), |v| i64::from(v));
        let _ = builder.production(pair, vec![term(one), term(two)], |vs| vs[0] * 10 + vs[1]);
        let parser = earley(builder.build(pair).unwrap());

        let mut input = crate::sequence::TokenSequence::new(vec![1u8, 2u8], 0u8);
        let mut state = ParseState::new(&mut input);
        let result = parser.parse_multi(&mut state);
        let values: Vec<i64> = result.successes().map(|(v, _)| *v).collect();
        assert_eq!(values, vec![12]);
    }
}
