// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Result caching.
//!
//! [`cached`] wraps a parser with a memoization layer. When the
//! [`ParseState`] carries a [`ParseCache`][crate::state::ParseCache], each
//! parse first looks up `(wrapped parser identity, position)`; a hit
//! replays the stored result — advancing the sequence by the stored
//! consumption without re-running the wrapped parser — and a miss parses
//! normally and stores the outcome. Without a cache in the state the
//! wrapper is a passthrough.
//!
//! Replay is sound because parsers are deterministic: parsing twice from
//! the same checkpoint yields identical results.

use std::rc::Rc;

use ecow::EcoString;

use crate::parser::{Meta, Parser, ParserId, ParserRef};
use crate::result::ParseResult;
use crate::state::ParseState;
use crate::syntax::Syntax;

/// Wraps `inner` with result memoization.
pub fn cached<T: 'static, V: Clone + 'static>(inner: ParserRef<T, V>) -> ParserRef<T, V> {
    Rc::new(Cached {
        meta: Meta::new("cached"),
        inner,
    })
}

struct Cached<T, V> {
    meta: Meta,
    inner: ParserRef<T, V>,
}

impl<T, V: Clone + 'static> Parser<T, V> for Cached<T, V> {
    fn parse(&self, state: &mut ParseState<'_, T>) -> ParseResult<V> {
        let Some(cache) = state.cache().cloned() else {
            return self.inner.parse(state);
        };
        let position = state.consumed();
        if let Some(stored) = cache.lookup::<V>(self.inner.id(), position) {
            for _ in 0..stored.consumed() {
                let _ = state.input().take();
            }
            return stored;
        }
        let result = self.inner.parse(state);
        cache.store(self.inner.id(), position, &result);
        result
    }

    fn id(&self) -> ParserId {
        self.meta.id()
    }

    fn name(&self) -> EcoString {
        self.meta.name()
    }

    fn syntax(&self) -> Syntax {
        self.inner.syntax()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use crate::primitives::match_text;
    use crate::sequence::CharSequence;
    use crate::state::{ParseCache, ParseState};

    #[test]
    fn replay_is_idempotent_and_counts_a_hit() {
        let parser = cached(match_text("TEST"));
        let cache = ParseCache::new();
        let mut input = CharSequence::new("TEST");
        let mut state = ParseState::new(&mut input).with_cache(cache.clone());

        let start = state.checkpoint();
        let first = parser.parse(&mut state);
        assert_eq!(first.consumed(), 4);
        assert_eq!(state.consumed(), 4);

        state.rewind(start);
        let second = parser.parse(&mut state);
        assert_eq!(second.consumed(), 4);
        assert_eq!(state.consumed(), 4);
        assert_eq!(first.value().unwrap(), "TEST");
        assert_eq!(second.value().unwrap(), "TEST");

        let stats = cache.statistics();
        assert_eq!(stats.attempts, 2);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
    }

    #[test]
    fn failures_are_cached_too() {
        let parser = cached(match_text("TEST"));
        let cache = ParseCache::new();
        let mut input = CharSequence::new("nope");
        let mut state = ParseState::new(&mut input).with_cache(cache.clone());

        assert!(!parser.parse(&mut state).is_success());
        assert_eq!(state.consumed(), 0);
        assert!(!parser.parse(&mut state).is_success());
        assert_eq!(state.consumed(), 0);

        let stats = cache.statistics();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn distinct_positions_miss_separately() {
        let parser = cached(match_text("aa"));
        let cache = ParseCache::new();
        let mut input = CharSequence::new("aaaa");
        let mut state = ParseState::new(&mut input).with_cache(cache.clone());

        assert!(parser.parse(&mut state).is_success());
        assert!(parser.parse(&mut state).is_success());
        let stats = cache.statistics();
        assert_eq!(stats.attempts, 2);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.hits, 0);
    }

    #[test]
    fn without_a_cache_the_wrapper_is_transparent() {
        let parser = cached(match_text("ab"));
        let mut input = CharSequence::new("ab");
        let mut state = ParseState::new(&mut input);
        let result = parser.parse(&mut state);
        assert!(result.is_success());
        assert_eq!(result.consumed(), 2);
    }
}
