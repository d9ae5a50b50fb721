// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Value transformation and multi-result adapters.
//!
//! [`map`] rewrites a parser's value without touching its consumption.
//! [`named`] renames a parser for BNF rendering. [`optional`] turns failure
//! into a zero-consumption `None`. [`each`] runs several parsers from the
//! same position and collects every outcome into a [`MultiResult`];
//! [`first_of`]/[`longest_of`] pick one alternative of a multi-valued
//! parser and continue as a single-valued parse.

use std::rc::Rc;

use ecow::EcoString;

use crate::parser::{Meta, MultiParser, MultiParserRef, Parser, ParserId, ParserRef};
use crate::result::{MultiAlternative, MultiResult, ParseResult, ResultData};
use crate::state::ParseState;
use crate::syntax::Syntax;

/// Applies `f` to the parsed value.
pub fn map<T: 'static, V: 'static, W: 'static>(
    inner: ParserRef<T, V>,
    f: impl Fn(V) -> W + 'static,
) -> ParserRef<T, W> {
    struct Map<T, V, W> {
        meta: Meta,
        inner: ParserRef<T, V>,
        f: Box<dyn Fn(V) -> W>,
    }

    impl<T, V, W> Parser<T, W> for Map<T, V, W> {
        fn parse(&self, state: &mut ParseState<'_, T>) -> ParseResult<W> {
            self.inner.parse(state).map(&self.f)
        }

        fn matches(&self, state: &mut ParseState<'_, T>) -> bool {
            self.inner.matches(state)
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

    Rc::new(Map {
        meta: Meta::new("map"),
        inner,
        f: Box::new(f),
    })
}

/// Names a parser; the name becomes a rule in BNF rendering.
pub fn named<T: 'static, V: 'static>(
    inner: ParserRef<T, V>,
    name: impl Into<EcoString>,
) -> ParserRef<T, V> {
    struct Named<T, V> {
        meta: Meta,
        inner: ParserRef<T, V>,
    }

    impl<T, V> Parser<T, V> for Named<T, V> {
        fn parse(&self, state: &mut ParseState<'_, T>) -> ParseResult<V> {
            self.inner.parse(state)
        }

        fn matches(&self, state: &mut ParseState<'_, T>) -> bool {
            self.inner.matches(state)
        }

        fn id(&self) -> ParserId {
            self.meta.id()
        }

        fn name(&self) -> EcoString {
            self.meta.name()
        }

        fn syntax(&self) -> Syntax {
            Syntax::named(self.meta.name(), self.inner.syntax())
        }
    }

    Rc::new(Named {
        meta: Meta::new(name),
        inner,
    })
}

/// Succeeds with `Some(value)` or, when `inner` fails, with `None` and zero
/// consumption.
pub fn optional<T: 'static, V: 'static>(inner: ParserRef<T, V>) -> ParserRef<T, Option<V>> {
    struct Optional<T, V> {
        meta: Meta,
        inner: ParserRef<T, V>,
    }

    impl<T, V> Parser<T, Option<V>> for Optional<T, V> {
        fn parse(&self, state: &mut ParseState<'_, T>) -> ParseResult<Option<V>> {
            let start = state.checkpoint();
            match self.inner.parse(state) {
                ParseResult::Success(s) => {
                    ParseResult::success(Some(s.value), s.consumed, self.meta.id())
                }
                ParseResult::Failure(_) => {
                    state.rewind(start);
                    ParseResult::success(None, 0, self.meta.id())
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
            Syntax::Optional(Box::new(self.inner.syntax()))
        }
    }

    Rc::new(Optional {
        meta: Meta::new("optional"),
        inner,
    })
}

/// Runs every parser from the same start position, collecting all outcomes
/// (including failures) as alternatives.
pub fn each<T: 'static, V: 'static>(parsers: Vec<ParserRef<T, V>>) -> MultiParserRef<T, V> {
    struct Each<T, V> {
        meta: Meta,
        parsers: Vec<ParserRef<T, V>>,
    }

    impl<T, V> MultiParser<T, V> for Each<T, V> {
        fn parse_multi(&self, state: &mut ParseState<'_, T>) -> MultiResult<V> {
            let start = state.checkpoint();
            let before = state.consumed();
            let mut alternatives = Vec::with_capacity(self.parsers.len());
            for parser in &self.parsers {
                match parser.parse(state) {
                    ParseResult::Success(s) => {
                        alternatives.push(MultiAlternative::Success {
                            value: s.value,
                            consumed: state.consumed() - before,
                            continuation: state.checkpoint(),
                        });
                    }
                    ParseResult::Failure(f) => {
                        alternatives.push(MultiAlternative::Failure { message: f.message });
                    }
                }
                state.rewind(start);
            }
            MultiResult {
                origin: self.meta.id(),
                start,
                alternatives,
                data: ResultData::default(),
            }
        }

        fn id(&self) -> ParserId {
            self.meta.id()
        }

        fn name(&self) -> EcoString {
            self.meta.name()
        }

        fn syntax(&self) -> Syntax {
            Syntax::Alternation(self.parsers.iter().map(|p| p.syntax()).collect())
        }
    }

    Rc::new(Each {
        meta: Meta::new("each"),
        parsers,
    })
}

/// Produces several alternative values with zero consumption.
pub fn produce_multi<T: 'static, V: 'static>(
    f: impl Fn() -> Vec<V> + 'static,
) -> MultiParserRef<T, V> {
    struct ProduceMulti<V> {
        meta: Meta,
        f: Box<dyn Fn() -> Vec<V>>,
    }

    impl<T, V> MultiParser<T, V> for ProduceMulti<V> {
        fn parse_multi(&self, state: &mut ParseState<'_, T>) -> MultiResult<V> {
            let start = state.checkpoint();
            let alternatives = (self.f)()
                .into_iter()
                .map(|value| MultiAlternative::Success {
                    value,
                    consumed: 0,
                    continuation: start,
                })
                .collect();
            MultiResult {
                origin: self.meta.id(),
                start,
                alternatives,
                data: ResultData::default(),
            }
        }

        fn id(&self) -> ParserId {
            self.meta.id()
        }

        fn name(&self) -> EcoString {
            self.meta.name()
        }

        fn syntax(&self) -> Syntax {
            Syntax::Opaque(self.meta.name())
        }
    }

    Rc::new(ProduceMulti {
        meta: Meta::new("produce-multi"),
        f: Box::new(f),
    })
}

/// How a multi-result adapter picks its alternative.
enum Pick {
    First,
    Longest,
}

/// Adapts a multi-valued parser to a single-valued one by taking its first
/// success alternative (in the producer's ranking order).
pub fn first_of<T: 'static, V: 'static>(multi: MultiParserRef<T, V>) -> ParserRef<T, V> {
    select(multi, Pick::First)
}

/// Adapts a multi-valued parser to a single-valued one by taking the
/// success alternative that consumed the most input.
pub fn longest_of<T: 'static, V: 'static>(multi: MultiParserRef<T, V>) -> ParserRef<T, V> {
    select(multi, Pick::Longest)
}

fn select<T: 'static, V: 'static>(multi: MultiParserRef<T, V>, pick: Pick) -> ParserRef<T, V> {
    struct Select<T, V> {
        meta: Meta,
        multi: MultiParserRef<T, V>,
        pick: Pick,
    }

    impl<T, V> Parser<T, V> for Select<T, V> {
        fn parse(&self, state: &mut ParseState<'_, T>) -> ParseResult<V> {
            let result = self.multi.parse_multi(state);
            let chosen = match self.pick {
                Pick::First => result
                    .alternatives
                    .into_iter()
                    .find(MultiAlternative::is_success),
                Pick::Longest => result
                    .alternatives
                    .into_iter()
                    .filter(MultiAlternative::is_success)
                    .max_by_key(|alt| alt.consumed().unwrap_or(0)),
            };
            match chosen {
                Some(MultiAlternative::Success {
                    value,
                    consumed,
                    continuation,
                }) => {
                    state.rewind(continuation);
                    ParseResult::success(value, consumed, self.meta.id())
                }
                _ => ParseResult::failure("no alternative matched", self.meta.id()),
            }
        }

        fn id(&self) -> ParserId {
            self.meta.id()
        }

        fn name(&self) -> EcoString {
            self.meta.name()
        }

        fn syntax(&self) -> Syntax {
            self.multi.syntax()
        }
    }

    Rc::new(Select {
        meta: Meta::new("select"),
        multi,
        pick,
    })
}
