// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Sequencing combinators.
//!
//! [`and`] runs two parsers in order and pairs their values. [`combine`]
//! generalizes to 2–9 sub-parsers with a reduction function over all
//! values. Both rewind to the pre-call position and fail with zero
//! consumption when any sub-parser fails; a success consumes exactly the
//! sum of the sub-parsers' consumption.

use std::marker::PhantomData;
use std::rc::Rc;

use ecow::EcoString;

use crate::parser::{Meta, Parser, ParserId, ParserRef};
use crate::result::{Failure, ParseResult};
use crate::state::ParseState;
use crate::syntax::Syntax;

/// Runs `left` then `right`, producing both values as a pair.
pub fn and<T: 'static, A: 'static, B: 'static>(
    left: ParserRef<T, A>,
    right: ParserRef<T, B>,
) -> ParserRef<T, (A, B)> {
    Rc::new(And {
        meta: Meta::new("and"),
        left,
        right,
    })
}

struct And<T, A, B> {
    meta: Meta,
    left: ParserRef<T, A>,
    right: ParserRef<T, B>,
}

impl<T, A, B> Parser<T, (A, B)> for And<T, A, B> {
    fn parse(&self, state: &mut ParseState<'_, T>) -> ParseResult<(A, B)> {
        let start = state.checkpoint();
        let before = state.consumed();

        let a = match self.left.parse(state) {
            ParseResult::Success(s) => s.value,
            ParseResult::Failure(f) => {
                state.rewind(start);
                return ParseResult::failure(f.message, self.meta.id());
            }
        };
        let b = match self.right.parse(state) {
            ParseResult::Success(s) => s.value,
            ParseResult::Failure(f) => {
                state.rewind(start);
                return ParseResult::failure(f.message, self.meta.id());
            }
        };

        let consumed = state.consumed() - before;
        ParseResult::success((a, b), consumed, self.meta.id())
    }

    fn id(&self) -> ParserId {
        self.meta.id()
    }

    fn name(&self) -> EcoString {
        self.meta.name()
    }

    fn syntax(&self) -> Syntax {
        Syntax::Sequence(vec![self.left.syntax(), self.right.syntax()])
    }
}

/// A tuple of parsers that can be run in order.
///
/// Implemented for tuples of [`ParserRef`] from arity 2 through 9; used by
/// [`combine`].
pub trait ParserTuple<T> {
    /// The tuple of values the parsers produce.
    type Values;

    /// Runs every parser in order, stopping at the first failure.
    ///
    /// On failure the sequence is *not* rewound here; the caller owns the
    /// checkpoint.
    fn parse_all(&self, state: &mut ParseState<'_, T>) -> Result<Self::Values, Failure>;

    /// Syntax fragments of the sub-parsers, in order.
    fn syntax_parts(&self) -> Vec<Syntax>;
}

macro_rules! impl_parser_tuple {
    ($($value:ident : $idx:tt),+) => {
        impl<T, $($value),+> ParserTuple<T> for ($(ParserRef<T, $value>,)+) {
            type Values = ($($value,)+);

            fn parse_all(&self, state: &mut ParseState<'_, T>) -> Result<Self::Values, Failure> {
                Ok(($(
                    match self.$idx.parse(state) {
                        ParseResult::Success(s) => s.value,
                        ParseResult::Failure(f) => return Err(f),
                    },
                )+))
            }

            fn syntax_parts(&self) -> Vec<Syntax> {
                vec![$(self.$idx.syntax()),+]
            }
        }
    };
}

impl_parser_tuple!(V0: 0, V1: 1);
impl_parser_tuple!(V0: 0, V1: 1, V2: 2);
impl_parser_tuple!(V0: 0, V1: 1, V2: 2, V3: 3);
impl_parser_tuple!(V0: 0, V1: 1, V2: 2, V3: 3, V4: 4);
impl_parser_tuple!(V0: 0, V1: 1, V2: 2, V3: 3, V4: 4, V5: 5);
impl_parser_tuple!(V0: 0, V1: 1, V2: 2, V3: 3, V4: 4, V5: 5, V6: 6);
impl_parser_tuple!(V0: 0, V1: 1, V2: 2, V3: 3, V4: 4, V5: 5, V6: 6, V7: 7);
impl_parser_tuple!(V0: 0, V1: 1, V2: 2, V3: 3, V4: 4, V5: 5, V6: 6, V7: 7, V8: 8);

/// Runs a tuple of parsers in order and reduces their values.
///
/// If any sub-parser fails, the whole rule rewinds to its start position
/// and fails with zero consumption.
///
/// ```
/// use trellis_core::combinators::combine;
/// use trellis_core::primitives::match_char;
/// use trellis_core::TextParserExt;
///
/// let pair = combine(
///     (match_char('a'), match_char('b'), match_char('c')),
///     |(a, b, c)| format!("{a}{b}{c}"),
/// );
/// assert_eq!(pair.parse_text("abc").unwrap(), "abc");
/// ```
pub fn combine<T, P, V>(
    parsers: P,
    reduce: impl Fn(P::Values) -> V + 'static,
) -> ParserRef<T, V>
where
    T: 'static,
    P: ParserTuple<T> + 'static,
    V: 'static,
{
    Rc::new(Combine {
        meta: Meta::new("rule"),
        parsers,
        reduce: Box::new(reduce),
        _marker: PhantomData,
    })
}

struct Combine<T, P: ParserTuple<T>, V> {
    meta: Meta,
    parsers: P,
    reduce: Box<dyn Fn(P::Values) -> V>,
    _marker: PhantomData<fn(&T)>,
}

impl<T, P: ParserTuple<T>, V> Parser<T, V> for Combine<T, P, V> {
    fn parse(&self, state: &mut ParseState<'_, T>) -> ParseResult<V> {
        let start = state.checkpoint();
        let before = state.consumed();
        match self.parsers.parse_all(state) {
            Ok(values) => {
                let consumed = state.consumed() - before;
                ParseResult::success((self.reduce)(values), consumed, self.meta.id())
            }
            Err(failure) => {
                state.rewind(start);
                ParseResult::failure(failure.message, self.meta.id())
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
        Syntax::Sequence(self.parsers.syntax_parts())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{ParserExt, TextParserExt};
    use crate::primitives::{match_char, match_text};
    use crate::sequence::{CharSequence, Sequence};

    #[test]
    fn and_pairs_values_and_sums_consumed() {
        let parser = and(match_char('a'), match_text("bc"));
        let result = parser.parse_text("abc");
        assert_eq!(result.consumed(), 3);
        let (a, bc) = result.value().unwrap();
        assert_eq!(a, 'a');
        assert_eq!(bc, "bc");
    }

    #[test]
    fn and_rewinds_when_right_fails() {
        let parser = and(match_char('a'), match_char('b'));
        let mut input = CharSequence::new("ax");
        let result = parser.parse_sequence(&mut input);
        assert!(!result.is_success());
        assert_eq!(result.consumed(), 0);
        assert_eq!(input.consumed(), 0);
    }

    #[test]
    fn combine_reduces_all_values() {
        let parser = combine(
            (match_char('1'), match_char('+'), match_char('2')),
            |(a, _, b)| {
                i64::from(a.to_digit(10).unwrap()) + i64::from(b.to_digit(10).unwrap())
            },
        );
        assert_eq!(parser.parse_text("1+2").unwrap(), 3);
    }

    #[test]
    fn combine_rewinds_when_any_part_fails() {
        let parser = combine(
            (match_char('a'), match_char('b'), match_char('c')),
            |(a, b, c)| vec![a, b, c],
        );
        let mut input = CharSequence::new("abX");
        let result = parser.parse_sequence(&mut input);
        assert!(!result.is_success());
        assert_eq!(result.consumed(), 0);
        assert_eq!(input.consumed(), 0);
    }

    #[test]
    fn combine_arity_five() {
        let parser = combine(
            (
                match_char('h'),
                match_char('e'),
                match_char('l'),
                match_char('l'),
                match_char('o'),
            ),
            |(a, b, c, d, e)| [a, b, c, d, e].iter().collect::<String>(),
        );
        let result = parser.parse_text("hello!");
        assert_eq!(result.consumed(), 5);
        assert_eq!(result.unwrap(), "hello");
    }

    #[test]
    fn consumed_equals_sequence_advancement() {
        let parser = and(match_text("ab"), match_text("cd"));
        let mut input = CharSequence::new("abcd");
        let result = parser.parse_sequence(&mut input);
        assert_eq!(result.consumed(), input.consumed());
        assert_eq!(result.consumed(), 4);
    }
}
