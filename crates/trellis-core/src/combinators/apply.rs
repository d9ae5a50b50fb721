// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Left- and right-associative application.
//!
//! These combinators encode associative operator grammars without unbounded
//! grammar recursion.
//!
//! [`left_apply`] parses an initial operand, then repeatedly applies a
//! continuation parser that consumes the accumulated left value (exposed to
//! the continuation as a zero-consumption parser) and produces the next
//! accumulated value. A [`Quantifier`] controls how many applications are
//! permitted or required.
//!
//! [`right_apply`] parses `item (middle item)*` iteratively, folding
//! right-to-left. When a `middle` matches but no further `item` follows,
//! either a caller-supplied synthetic-value function stands in for the
//! missing right operand (keeping the middle consumed), or the last middle
//! attempt alone is rewound and the previously matched prefix is kept.

use std::cell::RefCell;
use std::rc::Rc;

use ecow::EcoString;

use crate::parser::{Meta, Parser, ParserId, ParserRef};
use crate::result::ParseResult;
use crate::state::ParseState;
use crate::syntax::Syntax;

/// How many continuation applications [`left_apply`] performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantifier {
    /// Apply as many times as the continuation matches.
    ZeroOrMore,
    /// Apply at most once.
    ZeroOrOne,
    /// Apply exactly once; zero applications fail the whole rule.
    ExactlyOne,
}

/// A zero-consumption parser reading the innermost pending value from a
/// shared slot. Handed to `left_apply`/`continue_with` builder callbacks.
pub(crate) struct SlotParser<V> {
    meta: Meta,
    slot: Rc<RefCell<Vec<V>>>,
}

impl<V> SlotParser<V> {
    pub(crate) fn new(name: &str, slot: Rc<RefCell<Vec<V>>>) -> Self {
        Self {
            meta: Meta::new(name),
            slot,
        }
    }
}

impl<T, V: Clone> Parser<T, V> for SlotParser<V> {
    fn parse(&self, _state: &mut ParseState<'_, T>) -> ParseResult<V> {
        match self.slot.borrow().last() {
            Some(value) => ParseResult::success(value.clone(), 0, self.meta.id()),
            None => ParseResult::failure("no pending left value", self.meta.id()),
        }
    }

    fn id(&self) -> ParserId {
        self.meta.id()
    }

    fn name(&self) -> EcoString {
        self.meta.name()
    }

    fn syntax(&self) -> Syntax {
        Syntax::Reference(self.meta.name())
    }
}

/// Builds a left-associative application.
///
/// `build` receives a zero-consumption parser producing the current
/// accumulated left value and returns the continuation parser. On each
/// successful continuation the accumulated value is replaced; on failure
/// the attempt is rewound and iteration stops.
///
/// ```
/// use trellis_core::combinators::{combine, left_apply, map, Quantifier};
/// use trellis_core::primitives::{match_char, match_item};
/// use trellis_core::TextParserExt;
///
/// let digit = map(
///     match_item("digit", |c: &char| c.is_ascii_digit()),
///     |c| c.to_string(),
/// );
/// let sum = left_apply(digit.clone(), Quantifier::ZeroOrMore, |left| {
///     combine((left, match_char('+'), digit), |(l, _, r)| format!("({l}+{r})"))
/// });
/// assert_eq!(sum.parse_text("1+2+3").unwrap(), "((1+2)+3)");
/// ```
pub fn left_apply<T: 'static, V: Clone + 'static>(
    initial: ParserRef<T, V>,
    quantifier: Quantifier,
    build: impl FnOnce(ParserRef<T, V>) -> ParserRef<T, V>,
) -> ParserRef<T, V> {
    let slot = Rc::new(RefCell::new(Vec::new()));
    let left: ParserRef<T, V> = Rc::new(SlotParser::new("left", slot.clone()));
    let continuation = build(left);
    Rc::new(LeftApply {
        meta: Meta::new("left-apply"),
        initial,
        continuation,
        slot,
        quantifier,
    })
}

struct LeftApply<T, V> {
    meta: Meta,
    initial: ParserRef<T, V>,
    continuation: ParserRef<T, V>,
    slot: Rc<RefCell<Vec<V>>>,
    quantifier: Quantifier,
}

impl<T, V: Clone> Parser<T, V> for LeftApply<T, V> {
    fn parse(&self, state: &mut ParseState<'_, T>) -> ParseResult<V> {
        let start = state.checkpoint();
        let before = state.consumed();

        let initial = match self.initial.parse(state) {
            ParseResult::Success(s) => s.value,
            ParseResult::Failure(f) => {
                state.rewind(start);
                return ParseResult::failure(f.message, self.meta.id());
            }
        };

        // The slot is a stack so that nested invocations of the same graph
        // (recursive grammars) see their own pending value.
        self.slot.borrow_mut().push(initial);
        let mut applications = 0usize;
        loop {
            if applications >= 1
                && matches!(self.quantifier, Quantifier::ZeroOrOne | Quantifier::ExactlyOne)
            {
                break;
            }
            let attempt = state.checkpoint();
            match self.continuation.parse(state) {
                ParseResult::Success(s) => {
                    let mut slot = self.slot.borrow_mut();
                    let _ = slot.pop();
                    slot.push(s.value);
                    applications += 1;
                    // A zero-width continuation would repeat forever.
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
        let value = self
            .slot
            .borrow_mut()
            .pop()
            .expect("left-apply slot holds the value pushed above");

        if applications == 0 && self.quantifier == Quantifier::ExactlyOne {
            state.rewind(start);
            return ParseResult::failure("expected exactly one application", self.meta.id());
        }
        let consumed = state.consumed() - before;
        ParseResult::success(value, consumed, self.meta.id())
    }

    fn id(&self) -> ParserId {
        self.meta.id()
    }

    fn name(&self) -> EcoString {
        self.meta.name()
    }

    fn syntax(&self) -> Syntax {
        let continuation = Box::new(self.continuation.syntax());
        let applied = match self.quantifier {
            Quantifier::ZeroOrMore => Syntax::Repeat {
                inner: continuation,
                min: 0,
                max: None,
            },
            Quantifier::ZeroOrOne => Syntax::Optional(continuation),
            Quantifier::ExactlyOne => *continuation,
        };
        Syntax::Sequence(vec![self.initial.syntax(), applied])
    }
}

/// Builds a right-associative application of `item (middle item)*`.
///
/// `reduce(left, middle, right)` folds one application; folding proceeds
/// right-to-left. `synthetic`, when supplied, produces a placeholder right
/// operand if a `middle` matches but no `item` follows — the middle stays
/// consumed. Without it, that last middle attempt is rewound and the value
/// parsed so far is returned.
pub fn right_apply<T: 'static, V: Clone + 'static, M: 'static>(
    item: ParserRef<T, V>,
    middle: ParserRef<T, M>,
    reduce: impl Fn(V, M, V) -> V + 'static,
    synthetic: Option<Box<dyn Fn() -> V>>,
) -> ParserRef<T, V> {
    Rc::new(RightApply {
        meta: Meta::new("right-apply"),
        item,
        middle,
        reduce: Box::new(reduce),
        synthetic,
    })
}

struct RightApply<T, V, M> {
    meta: Meta,
    item: ParserRef<T, V>,
    middle: ParserRef<T, M>,
    reduce: Box<dyn Fn(V, M, V) -> V>,
    synthetic: Option<Box<dyn Fn() -> V>>,
}

impl<T, V: Clone, M> Parser<T, V> for RightApply<T, V, M> {
    fn parse(&self, state: &mut ParseState<'_, T>) -> ParseResult<V> {
        let start = state.checkpoint();
        let before = state.consumed();

        let mut current = match self.item.parse(state) {
            ParseResult::Success(s) => s.value,
            ParseResult::Failure(f) => {
                state.rewind(start);
                return ParseResult::failure(f.message, self.meta.id());
            }
        };

        let mut pairs: Vec<(V, M)> = Vec::new();
        loop {
            let attempt = state.checkpoint();
            let iteration_start = state.consumed();
            let middle = match self.middle.parse(state) {
                ParseResult::Success(s) => s.value,
                ParseResult::Failure(_) => {
                    state.rewind(attempt);
                    break;
                }
            };
            match self.item.parse(state) {
                ParseResult::Success(s) => {
                    pairs.push((current, middle));
                    current = s.value;
                    // Zero-width middle and item together cannot progress.
                    if state.consumed() == iteration_start {
                        break;
                    }
                }
                ParseResult::Failure(_) => {
                    if let Some(synthetic) = &self.synthetic {
                        let right = synthetic();
                        current = (self.reduce)(current, middle, right);
                    } else {
                        // Give back only this middle; earlier applications
                        // stay matched.
                        state.rewind(attempt);
                    }
                    break;
                }
            }
        }

        let value = pairs
            .into_iter()
            .rev()
            .fold(current, |right, (left, middle)| {
                (self.reduce)(left, middle, right)
            });
        let consumed = state.consumed() - before;
        ParseResult::success(value, consumed, self.meta.id())
    }

    fn id(&self) -> ParserId {
        self.meta.id()
    }

    fn name(&self) -> EcoString {
        self.meta.name()
    }

    fn syntax(&self) -> Syntax {
        Syntax::Sequence(vec![
            self.item.syntax(),
            Syntax::Repeat {
                inner: Box::new(Syntax::Sequence(vec![
                    self.middle.syntax(),
                    self.item.syntax(),
                ])),
                min: 0,
                max: None,
            },
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinators::sequencing::combine;
    use crate::parser::{ParserExt, TextParserExt};
    use crate::primitives::{match_char, match_item};
    use crate::sequence::{CharSequence, Sequence};

    fn digit_text() -> ParserRef<char, String> {
        crate::combinators::transform::map(
            match_item("digit", |c: &char| c.is_ascii_digit()),
            |c| c.to_string(),
        )
    }

    fn letter() -> ParserRef<char, char> {
        match_item("letter", |c: &char| c.is_ascii_alphabetic())
    }

    #[test]
    fn left_apply_builds_left_associative_chain() {
        let digit = digit_text();
        let parser = left_apply(digit.clone(), Quantifier::ZeroOrMore, |left| {
            combine(
                (
                    left,
                    crate::combinators::alternation::or(match_char('+'), match_char('-')),
                    digit,
                ),
                |(l, op, r)| format!("({l}{op}{r})"),
            )
        });
        assert_eq!(parser.parse_text("1+2-3+4").unwrap(), "(((1+2)-3)+4)");
    }

    #[test]
    fn left_apply_zero_applications_is_just_the_initial() {
        let digit = digit_text();
        let parser = left_apply(digit.clone(), Quantifier::ZeroOrMore, |left| {
            combine((left, match_char('+'), digit), |(l, _, r)| {
                format!("({l}+{r})")
            })
        });
        let result = parser.parse_text("7");
        assert_eq!(result.consumed(), 1);
        assert_eq!(result.unwrap(), "7");
    }

    #[test]
    fn left_apply_exactly_one_requires_an_application() {
        let digit = digit_text();
        let parser = left_apply(digit.clone(), Quantifier::ExactlyOne, |left| {
            combine((left, match_char('+'), digit), |(l, _, r)| {
                format!("({l}+{r})")
            })
        });
        assert_eq!(parser.parse_text("1+2+3").unwrap(), "(1+2)");

        let mut input = CharSequence::new("7");
        let result = parser.parse_sequence(&mut input);
        assert!(!result.is_success());
        assert_eq!(input.consumed(), 0);
    }

    #[test]
    fn left_apply_zero_or_one_stops_after_one() {
        let digit = digit_text();
        let parser = left_apply(digit.clone(), Quantifier::ZeroOrOne, |left| {
            combine((left, match_char('+'), digit), |(l, _, r)| {
                format!("({l}+{r})")
            })
        });
        let result = parser.parse_text("1+2+3");
        assert_eq!(result.consumed(), 3);
        assert_eq!(result.unwrap(), "(1+2)");
    }

    #[test]
    fn left_apply_failed_continuation_rewinds_that_attempt() {
        let digit = digit_text();
        let parser = left_apply(digit.clone(), Quantifier::ZeroOrMore, |left| {
            combine((left, match_char('+'), digit), |(l, _, r)| {
                format!("({l}+{r})")
            })
        });
        // "1+" has a dangling operator; the continuation attempt must give
        // the '+' back.
        let mut input = CharSequence::new("1+");
        let result = parser.parse_sequence(&mut input);
        assert_eq!(result.consumed(), 1);
        assert_eq!(input.consumed(), 1);
        assert_eq!(input.take(), '+');
        assert_eq!(result.unwrap(), "1");
    }

    #[test]
    fn right_apply_without_synthetic_keeps_prefix() {
        // "1a": the middle 'a' matches but no digit follows, and there is
        // no synthetic fallback — the middle is rewound and "1" returned.
        let parser = right_apply(
            digit_text(),
            letter(),
            |l, m, r| format!("({l}{m}{r})"),
            None,
        );
        let mut input = CharSequence::new("1a");
        let result = parser.parse_sequence(&mut input);
        assert!(result.is_success());
        assert_eq!(result.consumed(), 1);
        assert_eq!(input.consumed(), 1);
        assert_eq!(result.unwrap(), "1");
        assert_eq!(input.take(), 'a');
    }

    #[test]
    fn right_apply_with_synthetic_fills_missing_right() {
        let parser = right_apply(
            digit_text(),
            letter(),
            |l, m, r| format!("({l}{m}{r})"),
            Some(Box::new(|| "X".to_string())),
        );
        let result = parser.parse_text("1a");
        assert!(result.is_success());
        assert_eq!(result.consumed(), 2);
        assert_eq!(result.unwrap(), "(1aX)");
    }

    #[test]
    fn right_apply_folds_right_to_left() {
        let parser = right_apply(
            digit_text(),
            match_char('='),
            |l, _, r| format!("({l}={r})"),
            None,
        );
        assert_eq!(parser.parse_text("1=2=3=4").unwrap(), "(1=(2=(3=4)))");
    }

    #[test]
    fn right_apply_partial_rewind_keeps_earlier_steps() {
        // "1a2b3c": pairs (1,a) and (2,b) stay matched; the dangling 'c'
        // is given back.
        let parser = right_apply(
            digit_text(),
            letter(),
            |l, m, r| format!("({l}{m}{r})"),
            None,
        );
        let mut input = CharSequence::new("1a2b3c");
        let result = parser.parse_sequence(&mut input);
        assert_eq!(result.consumed(), 5);
        assert_eq!(result.unwrap(), "(1a(2b3))");
        assert_eq!(input.take(), 'c');
    }

    #[test]
    fn right_apply_missing_first_operand_fails() {
        let parser = right_apply(
            digit_text(),
            letter(),
            |l, m, r| format!("({l}{m}{r})"),
            None,
        );
        let mut input = CharSequence::new("a1");
        let result = parser.parse_sequence(&mut input);
        assert!(!result.is_success());
        assert_eq!(input.consumed(), 0);
    }
}
