// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! The parser contract.
//!
//! Every node in a parser graph implements [`Parser`]: a pure function from
//! `(sequence, state)` to a [`ParseResult`], plus an identity and a
//! [`Syntax`] fragment for diagnostic rendering. Multi-valued nodes (the
//! Earley engine, `each`) implement [`MultiParser`] instead.
//!
//! Determinism is part of the contract: parsing twice from the same
//! checkpoint must yield identical results. Backtracking combinators rely
//! on this to retry alternatives safely, and the cache relies on it to
//! replay stored results.
//!
//! Graphs are composed once and shared behind [`ParserRef`]
//! (`Rc<dyn Parser>`); composition never copies sub-parsers.

use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use ecow::EcoString;

use crate::result::{MultiResult, ParseResult};
use crate::sequence::{CharSequence, Sequence};
use crate::state::ParseState;
use crate::syntax::Syntax;

/// A unique identity for one parser node.
///
/// Identities distinguish nodes with equal names (cache keys, result
/// origins); they are assigned once at construction and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParserId(u64);

impl ParserId {
    /// Allocates a fresh, process-unique identity.
    #[must_use]
    pub fn fresh() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw identity value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

/// Shared identity and display name carried by every parser node.
#[derive(Debug, Clone)]
pub(crate) struct Meta {
    id: ParserId,
    name: EcoString,
}

impl Meta {
    pub(crate) fn new(name: impl Into<EcoString>) -> Self {
        Self {
            id: ParserId::fresh(),
            name: name.into(),
        }
    }

    pub(crate) fn id(&self) -> ParserId {
        self.id
    }

    pub(crate) fn name(&self) -> EcoString {
        self.name.clone()
    }
}

/// A single-valued parser over items of type `T`, producing values of type
/// `V`.
pub trait Parser<T, V> {
    /// Attempts to parse from the current position.
    ///
    /// On failure the sequence is left at the position it had when `parse`
    /// was called, unless the implementation documents itself as
    /// non-rewinding.
    fn parse(&self, state: &mut ParseState<'_, T>) -> ParseResult<V>;

    /// Boolean-only variant of [`parse`][Parser::parse].
    ///
    /// Consumes identically to a successful parse and rewinds identically
    /// to a failed one. The default delegates to `parse` and discards the
    /// value.
    fn matches(&self, state: &mut ParseState<'_, T>) -> bool {
        self.parse(state).is_success()
    }

    /// This node's unique identity.
    fn id(&self) -> ParserId;

    /// This node's display name.
    fn name(&self) -> EcoString;

    /// This node's grammar fragment for BNF rendering.
    fn syntax(&self) -> Syntax;
}

/// A shared handle to a parser node.
pub type ParserRef<T, V> = Rc<dyn Parser<T, V>>;

/// A multi-valued parser producing all alternatives at once.
pub trait MultiParser<T, V> {
    /// Parses every alternative from the current position.
    ///
    /// The sequence is left rewound to the start position; alternatives
    /// carry continuation checkpoints.
    fn parse_multi(&self, state: &mut ParseState<'_, T>) -> MultiResult<V>;

    /// This node's unique identity.
    fn id(&self) -> ParserId;

    /// This node's display name.
    fn name(&self) -> EcoString;

    /// This node's grammar fragment for BNF rendering.
    fn syntax(&self) -> Syntax;
}

/// A shared handle to a multi-valued parser node.
pub type MultiParserRef<T, V> = Rc<dyn MultiParser<T, V>>;

/// Entry-point conveniences for any parser.
pub trait ParserExt<T, V>: Parser<T, V> {
    /// Parses from a sequence with a fresh [`ParseState`].
    fn parse_sequence(&self, input: &mut dyn Sequence<T>) -> ParseResult<V> {
        let mut state = ParseState::new(input);
        self.parse(&mut state)
    }

    /// Matches against a sequence with a fresh [`ParseState`].
    fn match_sequence(&self, input: &mut dyn Sequence<T>) -> bool {
        let mut state = ParseState::new(input);
        self.matches(&mut state)
    }
}

impl<T, V, P: Parser<T, V> + ?Sized> ParserExt<T, V> for P {}

/// Entry-point conveniences for character parsers.
pub trait TextParserExt<V>: Parser<char, V> {
    /// Parses a string slice from the beginning.
    fn parse_text(&self, source: &str) -> ParseResult<V> {
        let mut input = CharSequence::new(source);
        self.parse_sequence(&mut input)
    }

    /// Matches a string slice from the beginning.
    fn match_text(&self, source: &str) -> bool {
        let mut input = CharSequence::new(source);
        self.match_sequence(&mut input)
    }
}

impl<V, P: Parser<char, V> + ?Sized> TextParserExt<V> for P {}

/// Entry-point conveniences for multi-valued parsers.
pub trait MultiParserExt<T, V>: MultiParser<T, V> {
    /// Parses all alternatives from a sequence with a fresh [`ParseState`].
    fn parse_multi_sequence(&self, input: &mut dyn Sequence<T>) -> MultiResult<V> {
        let mut state = ParseState::new(input);
        self.parse_multi(&mut state)
    }
}

impl<T, V, P: MultiParser<T, V> + ?Sized> MultiParserExt<T, V> for P {}

/// Entry-point conveniences for character multi-parsers.
pub trait TextMultiParserExt<V>: MultiParser<char, V> {
    /// Parses all alternatives of a string slice from the beginning.
    fn parse_multi_text(&self, source: &str) -> MultiResult<V> {
        let mut input = CharSequence::new(source);
        self.parse_multi_sequence(&mut input)
    }
}

impl<V, P: MultiParser<char, V> + ?Sized> TextMultiParserExt<V> for P {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parser_ids_are_unique() {
        let a = ParserId::fresh();
        let b = ParserId::fresh();
        assert_ne!(a, b);
        assert!(b.value() > a.value());
    }

    #[test]
    fn meta_carries_name() {
        let meta = Meta::new("literal");
        assert_eq!(meta.name(), "literal");
    }
}
