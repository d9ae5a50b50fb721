// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Repetition combinators.
//!
//! [`list`] (and its bounded/separated variants) is *greedy*: it consumes
//! items until the item parser fails or the maximum is reached, and never
//! backtracks into the collected list to satisfy a following parser. That
//! non-backtracking policy is part of the contract — `list(a)` followed by
//! `ab` fails on `"aaab"` because the list keeps all three `a`s.
//!
//! [`non_greedy_list`] searches instead: starting from the minimum count,
//! it tries its continuation parser after each prefix of items and grows
//! the list one item at a time until the continuation succeeds, failing if
//! it never does within the count bounds.

use std::rc::Rc;

use ecow::EcoString;

use crate::parser::{Meta, Parser, ParserId, ParserRef};
use crate::result::ParseResult;
use crate::state::ParseState;
use crate::syntax::Syntax;

/// Collects zero or more items, greedily.
pub fn list<T: 'static, V: 'static>(item: ParserRef<T, V>) -> ParserRef<T, Vec<V>> {
    list_bounded(item, 0, None)
}

/// Collects at least `min` and at most `max` items, greedily.
pub fn list_bounded<T: 'static, V: 'static>(
    item: ParserRef<T, V>,
    min: usize,
    max: Option<usize>,
) -> ParserRef<T, Vec<V>> {
    Rc::new(List::<T, V, ()> {
        meta: Meta::new("list"),
        item,
        separator: None,
        min,
        max,
    })
}

/// Collects separator-interleaved items, greedily.
///
/// Separator values are discarded. A trailing separator is not consumed:
/// the attempt that parsed it rewinds when no item follows.
pub fn separated_list<T: 'static, V: 'static, S: 'static>(
    item: ParserRef<T, V>,
    separator: ParserRef<T, S>,
    min: usize,
    max: Option<usize>,
) -> ParserRef<T, Vec<V>> {
    Rc::new(List {
        meta: Meta::new("list"),
        item,
        separator: Some(separator),
        min,
        max,
    })
}

struct List<T, V, S> {
    meta: Meta,
    item: ParserRef<T, V>,
    separator: Option<ParserRef<T, S>>,
    min: usize,
    max: Option<usize>,
}

impl<T, V, S> Parser<T, Vec<V>> for List<T, V, S> {
    fn parse(&self, state: &mut ParseState<'_, T>) -> ParseResult<Vec<V>> {
        let start = state.checkpoint();
        let before = state.consumed();
        let mut items = Vec::new();

        loop {
            if self.max.is_some_and(|max| items.len() >= max) {
                break;
            }
            let attempt = state.checkpoint();
            if !items.is_empty() {
                if let Some(separator) = &self.separator {
                    if !matches!(separator.parse(state), ParseResult::Success(_)) {
                        state.rewind(attempt);
                        break;
                    }
                }
            }
            match self.item.parse(state) {
                ParseResult::Success(s) => {
                    items.push(s.value);
                    // An item matching empty input would repeat forever;
                    // stop after its first occurrence.
                    if state.checkpoint() == attempt {
                        break;
                    }
                }
                ParseResult::Failure(_) => {
                    state.rewind(attempt);
                    break;
                }
            }
        }

        if items.len() < self.min {
            state.rewind(start);
            return ParseResult::failure(
                format!("expected at least {} items", self.min),
                self.meta.id(),
            );
        }
        let consumed = state.consumed() - before;
        ParseResult::success(items, consumed, self.meta.id())
    }

    fn id(&self) -> ParserId {
        self.meta.id()
    }

    fn name(&self) -> EcoString {
        self.meta.name()
    }

    fn syntax(&self) -> Syntax {
        Syntax::Repeat {
            inner: Box::new(self.item.syntax()),
            min: self.min,
            max: self.max,
        }
    }
}

/// Collects the fewest items (at least `min`) after which `continuation`
/// succeeds.
///
/// Produces the collected items together with the continuation's value.
/// Fails, rewinding fully, if the continuation never succeeds within
/// `[min, max]` items.
pub fn non_greedy_list<T: 'static, V: 'static, C: 'static>(
    item: ParserRef<T, V>,
    continuation: ParserRef<T, C>,
    min: usize,
    max: Option<usize>,
) -> ParserRef<T, (Vec<V>, C)> {
    Rc::new(NonGreedyList {
        meta: Meta::new("non-greedy-list"),
        item,
        continuation,
        min,
        max,
    })
}

struct NonGreedyList<T, V, C> {
    meta: Meta,
    item: ParserRef<T, V>,
    continuation: ParserRef<T, C>,
    min: usize,
    max: Option<usize>,
}

impl<T, V, C> Parser<T, (Vec<V>, C)> for NonGreedyList<T, V, C> {
    fn parse(&self, state: &mut ParseState<'_, T>) -> ParseResult<(Vec<V>, C)> {
        let start = state.checkpoint();
        let before = state.consumed();
        let mut items = Vec::new();

        for _ in 0..self.min {
            match self.item.parse(state) {
                ParseResult::Success(s) => items.push(s.value),
                ParseResult::Failure(f) => {
                    state.rewind(start);
                    return ParseResult::failure(f.message, self.meta.id());
                }
            }
        }

        loop {
            match self.continuation.parse(state) {
                ParseResult::Success(s) => {
                    let consumed = state.consumed() - before;
                    return ParseResult::success((items, s.value), consumed, self.meta.id());
                }
                ParseResult::Failure(_) => {}
            }
            if self.max.is_some_and(|max| items.len() >= max) {
                state.rewind(start);
                return ParseResult::failure(
                    "continuation never matched within item bounds",
                    self.meta.id(),
                );
            }
            let item_start = state.consumed();
            match self.item.parse(state) {
                ParseResult::Success(s) => {
                    // A zero-width item cannot make further progress.
                    if state.consumed() == item_start {
                        state.rewind(start);
                        return ParseResult::failure(
                            "continuation never matched",
                            self.meta.id(),
                        );
                    }
                    items.push(s.value);
                }
                ParseResult::Failure(_) => {
                    state.rewind(start);
                    return ParseResult::failure("continuation never matched", self.meta.id());
                }
            }
        }
    }

    fn id(&self) -> ParserId {
        self.meta.id()
    }

    fn name(&self) -> EcoString {
        self.meta.name()
    }

    fn syntax(&self) -> Syntax {
        Syntax::Sequence(vec![
            Syntax::Repeat {
                inner: Box::new(self.item.syntax()),
                min: self.min,
                max: self.max,
            },
            self.continuation.syntax(),
        ])
    }
}
