// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Leaf parsers.
//!
//! These are the terminals the combinator core composes over: single-item
//! matchers, literal runs, the end-of-input assertion, and the
//! zero-consumption value producers. Each follows the standard contract —
//! failure rewinds to the pre-call position and consumes nothing.

use std::fmt::Debug;
use std::rc::Rc;

use ecow::EcoString;

use crate::parser::{Meta, Parser, ParserId, ParserRef};
use crate::result::ParseResult;
use crate::state::ParseState;
use crate::syntax::Syntax;

/// Matches any single item.
pub fn any<T: Clone + 'static>() -> ParserRef<T, T> {
    struct Any {
        meta: Meta,
    }

    impl<T: Clone> Parser<T, T> for Any {
        fn parse(&self, state: &mut ParseState<'_, T>) -> ParseResult<T> {
            if state.input().is_at_end() {
                return ParseResult::failure("unexpected end of input", self.meta.id());
            }
            let item = state.input().take();
            ParseResult::success(item, 1, self.meta.id())
        }

        fn id(&self) -> ParserId {
            self.meta.id()
        }

        fn name(&self) -> EcoString {
            self.meta.name()
        }

        fn syntax(&self) -> Syntax {
            Syntax::Atom(".".into())
        }
    }

    Rc::new(Any {
        meta: Meta::new("any"),
    })
}

/// Matches only at the end of input, consuming nothing.
pub fn end<T: 'static>() -> ParserRef<T, ()> {
    struct End {
        meta: Meta,
    }

    impl<T> Parser<T, ()> for End {
        fn parse(&self, state: &mut ParseState<'_, T>) -> ParseResult<()> {
            if state.input().is_at_end() {
                ParseResult::success((), 0, self.meta.id())
            } else {
                ParseResult::failure("expected end of input", self.meta.id())
            }
        }

        fn id(&self) -> ParserId {
            self.meta.id()
        }

        fn name(&self) -> EcoString {
            self.meta.name()
        }

        fn syntax(&self) -> Syntax {
            Syntax::Atom("<end>".into())
        }
    }

    Rc::new(End {
        meta: Meta::new("end"),
    })
}

/// Matches a single item satisfying `predicate`.
///
/// The label names the item class in failure messages and BNF output
/// (e.g. `"digit"`).
pub fn match_item<T: Clone + 'static>(
    label: impl Into<EcoString>,
    predicate: impl Fn(&T) -> bool + 'static,
) -> ParserRef<T, T> {
    struct MatchItem<T> {
        meta: Meta,
        predicate: Box<dyn Fn(&T) -> bool>,
    }

    impl<T: Clone> Parser<T, T> for MatchItem<T> {
        fn parse(&self, state: &mut ParseState<'_, T>) -> ParseResult<T> {
            if state.input().is_at_end() {
                return ParseResult::failure(
                    format!("expected {}, found end of input", self.meta.name()),
                    self.meta.id(),
                );
            }
            let item = state.input().peek();
            if (self.predicate)(&item) {
                let _ = state.input().take();
                ParseResult::success(item, 1, self.meta.id())
            } else {
                ParseResult::failure(
                    format!("expected {}", self.meta.name()),
                    self.meta.id(),
                )
            }
        }

        fn id(&self) -> ParserId {
            self.meta.id()
        }

        fn name(&self) -> EcoString {
            self.meta.name()
        }

        fn syntax(&self) -> Syntax {
            Syntax::Atom(self.meta.name())
        }
    }

    Rc::new(MatchItem {
        meta: Meta::new(label),
        predicate: Box::new(predicate),
    })
}

/// Matches one specific item by equality.
pub fn match_value<T: Clone + PartialEq + Debug + 'static>(value: T) -> ParserRef<T, T> {
    let label = EcoString::from(format!("'{value:?}'"));
    let expected = value;
    match_item(label, move |item: &T| *item == expected)
}

/// Matches one specific character.
pub fn match_char(expected: char) -> ParserRef<char, char> {
    match_item(format!("'{expected}'"), move |c: &char| *c == expected)
}

/// Matches an exact run of items.
///
/// Fails (rewinding fully) unless every item matches in order; succeeds
/// with the matched run and a consumed count equal to its length.
pub fn match_literal<T: Clone + PartialEq + Debug + 'static>(
    items: Vec<T>,
) -> ParserRef<T, Vec<T>> {
    struct MatchLiteral<T> {
        meta: Meta,
        items: Vec<T>,
    }

    impl<T: Clone + PartialEq> Parser<T, Vec<T>> for MatchLiteral<T> {
        fn parse(&self, state: &mut ParseState<'_, T>) -> ParseResult<Vec<T>> {
            let start = state.checkpoint();
            for expected in &self.items {
                if state.input().is_at_end() || state.input().take() != *expected {
                    state.rewind(start);
                    return ParseResult::failure(
                        format!("expected {}", self.meta.name()),
                        self.meta.id(),
                    );
                }
            }
            ParseResult::success(self.items.clone(), self.items.len(), self.meta.id())
        }

        fn id(&self) -> ParserId {
            self.meta.id()
        }

        fn name(&self) -> EcoString {
            self.meta.name()
        }

        fn syntax(&self) -> Syntax {
            Syntax::Atom(self.meta.name())
        }
    }

    let label = EcoString::from(format!("{items:?}"));
    Rc::new(MatchLiteral {
        meta: Meta::new(label),
        items,
    })
}

/// Matches an exact run of characters, producing the matched text.
pub fn match_text(text: &str) -> ParserRef<char, EcoString> {
    struct MatchText {
        meta: Meta,
        text: EcoString,
    }

    impl Parser<char, EcoString> for MatchText {
        fn parse(&self, state: &mut ParseState<'_, char>) -> ParseResult<EcoString> {
            let start = state.checkpoint();
            for expected in self.text.chars() {
                if state.input().is_at_end() || state.input().take() != expected {
                    state.rewind(start);
                    return ParseResult::failure(
                        format!("expected {}", self.meta.name()),
                        self.meta.id(),
                    );
                }
            }
            ParseResult::success(self.text.clone(), self.text.chars().count(), self.meta.id())
        }

        fn id(&self) -> ParserId {
            self.meta.id()
        }

        fn name(&self) -> EcoString {
            self.meta.name()
        }

        fn syntax(&self) -> Syntax {
            Syntax::Atom(self.meta.name())
        }
    }

    Rc::new(MatchText {
        meta: Meta::new(format!("\"{text}\"")),
        text: text.into(),
    })
}

/// Succeeds with a computed value, consuming nothing.
pub fn produce<T: 'static, V: 'static>(f: impl Fn() -> V + 'static) -> ParserRef<T, V> {
    struct Produce<V> {
        meta: Meta,
        f: Box<dyn Fn() -> V>,
    }

    impl<T, V> Parser<T, V> for Produce<V> {
        fn parse(&self, _state: &mut ParseState<'_, T>) -> ParseResult<V> {
            ParseResult::success((self.f)(), 0, self.meta.id())
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

    Rc::new(Produce {
        meta: Meta::new("produce"),
        f: Box::new(f),
    })
}

/// Always fails with the given message, consuming nothing.
pub fn fail_with<T: 'static, V: 'static>(message: impl Into<EcoString>) -> ParserRef<T, V> {
    struct Fail {
        meta: Meta,
        message: EcoString,
    }

    impl<T, V> Parser<T, V> for Fail {
        fn parse(&self, _state: &mut ParseState<'_, T>) -> ParseResult<V> {
            ParseResult::failure(self.message.clone(), self.meta.id())
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

    Rc::new(Fail {
        meta: Meta::new("fail"),
        message: message.into(),
    })
}
