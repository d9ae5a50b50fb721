// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Value-directed continuation.
//!
//! These combinators pick or build the *next* parser from an earlier
//! result, enabling context-sensitive grammars where the grammar depends on
//! previously parsed data.
//!
//! [`chain`] hands the first parser's full result (success or failure) to a
//! selector that returns the follow-up parser; [`choose`] inspects the
//! first value without consuming its input. A selector returning `None` is
//! an ordinary parse failure, never a panic; panics raised inside a
//! selector propagate unless absorbed by the
//! [`attempt`][crate::combinators::attempt] boundary.
//!
//! [`continue_with`] chains a multi-valued result: the follow-up parser
//! runs once per alternative, resuming from that alternative's
//! continuation checkpoint.

use std::cell::RefCell;
use std::rc::Rc;

use ecow::EcoString;

use crate::combinators::apply::SlotParser;
use crate::parser::{Meta, MultiParser, MultiParserRef, Parser, ParserId, ParserRef};
use crate::result::{MultiAlternative, MultiResult, ParseResult};
use crate::state::ParseState;
use crate::syntax::Syntax;

/// Runs `inner`, then the parser the selector picks from its result.
///
/// The selector sees failures too, so a grammar can dispatch on "did not
/// match" as well as on the matched value. Returning `None` fails the whole
/// chain with a full rewind.
pub fn chain<T: 'static, V: 'static, W: 'static>(
    inner: ParserRef<T, V>,
    selector: impl Fn(&ParseResult<V>) -> Option<ParserRef<T, W>> + 'static,
) -> ParserRef<T, W> {
    struct Chain<T, V, W> {
        meta: Meta,
        inner: ParserRef<T, V>,
        selector: Box<dyn Fn(&ParseResult<V>) -> Option<ParserRef<T, W>>>,
    }

    impl<T, V, W> Parser<T, W> for Chain<T, V, W> {
        fn parse(&self, state: &mut ParseState<'_, T>) -> ParseResult<W> {
            let start = state.checkpoint();
            let before = state.consumed();
            let first = self.inner.parse(state);
            match (self.selector)(&first) {
                None => {
                    state.rewind(start);
                    ParseResult::failure("selector declined the result", self.meta.id())
                }
                Some(next) => match next.parse(state) {
                    ParseResult::Success(s) => {
                        let consumed = state.consumed() - before;
                        ParseResult::success(s.value, consumed, self.meta.id())
                    }
                    ParseResult::Failure(f) => {
                        state.rewind(start);
                        ParseResult::failure(f.message, self.meta.id())
                    }
                },
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
                self.inner.syntax(),
                Syntax::Opaque("selected".into()),
            ])
        }
    }

    Rc::new(Chain {
        meta: Meta::new("chain"),
        inner,
        selector: Box::new(selector),
    })
}

/// Inspects `inner`'s value without consuming, then parses with the
/// selected parser from the original position.
pub fn choose<T: 'static, V: 'static, W: 'static>(
    inner: ParserRef<T, V>,
    selector: impl Fn(&V) -> Option<ParserRef<T, W>> + 'static,
) -> ParserRef<T, W> {
    struct Choose<T, V, W> {
        meta: Meta,
        inner: ParserRef<T, V>,
        selector: Box<dyn Fn(&V) -> Option<ParserRef<T, W>>>,
    }

    impl<T, V, W> Parser<T, W> for Choose<T, V, W> {
        fn parse(&self, state: &mut ParseState<'_, T>) -> ParseResult<W> {
            let start = state.checkpoint();
            let value = match self.inner.parse(state) {
                ParseResult::Success(s) => s.value,
                ParseResult::Failure(f) => {
                    state.rewind(start);
                    return ParseResult::failure(f.message, self.meta.id());
                }
            };
            // The inspected input is given back; the selected parser owns
            // the real consumption.
            state.rewind(start);
            match (self.selector)(&value) {
                None => ParseResult::failure("selector declined the value", self.meta.id()),
                Some(next) => match next.parse(state) {
                    result @ ParseResult::Success(_) => result,
                    ParseResult::Failure(f) => {
                        state.rewind(start);
                        ParseResult::failure(f.message, self.meta.id())
                    }
                },
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
                Syntax::Lookahead {
                    positive: true,
                    inner: Box::new(self.inner.syntax()),
                },
                Syntax::Opaque("selected".into()),
            ])
        }
    }

    Rc::new(Choose {
        meta: Meta::new("choose"),
        inner,
        selector: Box::new(selector),
    })
}

/// Chains a multi-valued parser with a follow-up parser.
///
/// `build` receives a zero-consumption parser producing the alternative
/// currently being continued, and returns the follow-up parser. The
/// follow-up runs once per success alternative, resumed at that
/// alternative's continuation checkpoint; its outcome (success or failure)
/// becomes the corresponding alternative of the combined result.
pub fn continue_with<T: 'static, V: Clone + 'static, W: 'static>(
    left: MultiParserRef<T, V>,
    build: impl FnOnce(ParserRef<T, V>) -> ParserRef<T, W>,
) -> MultiParserRef<T, W> {
    struct ContinueWith<T, V, W> {
        meta: Meta,
        left: MultiParserRef<T, V>,
        right: ParserRef<T, W>,
        slot: Rc<RefCell<Vec<V>>>,
    }

    impl<T, V: Clone, W> MultiParser<T, W> for ContinueWith<T, V, W> {
        fn parse_multi(&self, state: &mut ParseState<'_, T>) -> MultiResult<W> {
            let start = state.checkpoint();
            let left = self.left.parse_multi(state);
            let mut alternatives = Vec::with_capacity(left.alternatives.len());
            for alternative in left.alternatives {
                match alternative {
                    MultiAlternative::Success {
                        value,
                        consumed,
                        continuation,
                    } => {
                        state.rewind(continuation);
                        self.slot.borrow_mut().push(value);
                        let result = self.right.parse(state);
                        let _ = self.slot.borrow_mut().pop();
                        match result {
                            ParseResult::Success(s) => {
                                alternatives.push(MultiAlternative::Success {
                                    value: s.value,
                                    consumed: consumed + s.consumed,
                                    continuation: state.checkpoint(),
                                });
                            }
                            ParseResult::Failure(f) => {
                                alternatives
                                    .push(MultiAlternative::Failure { message: f.message });
                            }
                        }
                    }
                    MultiAlternative::Failure { message } => {
                        alternatives.push(MultiAlternative::Failure { message });
                    }
                }
            }
            state.rewind(start);
            MultiResult {
                origin: self.meta.id(),
                start,
                alternatives,
                data: left.data,
            }
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

    let slot = Rc::new(RefCell::new(Vec::new()));
    let value_parser: ParserRef<T, V> = Rc::new(SlotParser::new("continued", slot.clone()));
    let right = build(value_parser);
    Rc::new(ContinueWith {
        meta: Meta::new("continue-with"),
        left,
        right,
        slot,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinators::sequencing::combine;
    use crate::combinators::transform::{each, map};
    use crate::parser::{ParserExt, TextMultiParserExt, TextParserExt};
    use crate::primitives::{match_char, match_item, match_text};
    use crate::sequence::{CharSequence, Sequence};

    /// A tag character selects which grammar parses the remainder.
    fn tagged() -> ParserRef<char, EcoString> {
        chain(any_tag(), |result| match result.value_ref()? {
            'l' => Some(map(
                match_item("letter", |c: &char| c.is_ascii_alphabetic()),
                |c| EcoString::from(c.to_string()),
            )),
            'd' => Some(map(
                match_item("digit", |c: &char| c.is_ascii_digit()),
                |c| EcoString::from(c.to_string()),
            )),
            _ => None,
        })
    }

    fn any_tag() -> ParserRef<char, char> {
        crate::primitives::any()
    }

    #[test]
    fn chain_selects_parser_from_value() {
        assert_eq!(tagged().parse_text("dx").is_success(), false);
        assert_eq!(tagged().parse_text("d5").unwrap(), "5");
        assert_eq!(tagged().parse_text("lx").unwrap(), "x");
    }

    #[test]
    fn chain_consumed_covers_both_parts() {
        let result = tagged().parse_text("d5");
        assert_eq!(result.consumed(), 2);
    }

    #[test]
    fn chain_selector_decline_rewinds_fully() {
        let mut input = CharSequence::new("q5");
        let result = tagged().parse_sequence(&mut input);
        assert!(!result.is_success());
        assert_eq!(input.consumed(), 0);
    }

    #[test]
    fn chain_selector_sees_failures() {
        // An inner failure is routed to a fallback parser instead of
        // failing the chain.
        let parser = chain(match_char('x'), |result| {
            if result.is_success() {
                Some(match_text("rest"))
            } else {
                Some(match_text("fallback"))
            }
        });
        assert_eq!(parser.parse_text("fallback").unwrap(), "fallback");
    }

    #[test]
    fn choose_does_not_consume_the_inspected_value() {
        // The selected parser must re-match the inspected character.
        let parser = choose(any_tag(), |c| {
            if c.is_ascii_digit() {
                Some(combine(
                    (
                        match_item("digit", |c: &char| c.is_ascii_digit()),
                        match_char('!'),
                    ),
                    |(d, _)| d,
                ))
            } else {
                None
            }
        });
        let result = parser.parse_text("7!");
        assert_eq!(result.consumed(), 2);
        assert_eq!(result.unwrap(), '7');
    }

    #[test]
    fn continue_with_resumes_each_alternative() {
        // Alternatives "a" and "ab" both continue with "c"; only the longer
        // one lines up with the input "abc"... the shorter continues at 'b'.
        let multi = each(vec![match_text("a"), match_text("ab")]);
        let parser = continue_with(multi, |left| {
            combine((left, match_char('c')), |(l, c)| format!("{l}{c}"))
        });
        let result = parser.parse_multi_text("abc");
        let values: Vec<_> = result.successes().map(|(v, n)| (v.clone(), n)).collect();
        assert_eq!(values, vec![("abc".to_string(), 3)]);
        // The failed continuation of the "a" alternative is retained.
        assert_eq!(result.alternatives.len(), 2);
        assert!(!result.alternatives[0].is_success());
    }
}
