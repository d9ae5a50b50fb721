// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Lookahead assertions.
//!
//! Both forms run their inner parser and then rewind to the original
//! position regardless of the outcome, so a lookahead always reports zero
//! consumption. Positive lookahead succeeds when the inner parser would
//! match; negative lookahead succeeds when it would not.

use std::rc::Rc;

use ecow::EcoString;

use crate::parser::{Meta, Parser, ParserId, ParserRef};
use crate::result::ParseResult;
use crate::state::ParseState;
use crate::syntax::Syntax;

/// Succeeds, without consuming, when `inner` would match here.
pub fn positive_lookahead<T: 'static, V: 'static>(inner: ParserRef<T, V>) -> ParserRef<T, ()> {
    Rc::new(Lookahead {
        meta: Meta::new("lookahead"),
        inner,
        positive: true,
    })
}

/// Succeeds, without consuming, when `inner` would *not* match here.
pub fn negative_lookahead<T: 'static, V: 'static>(inner: ParserRef<T, V>) -> ParserRef<T, ()> {
    Rc::new(Lookahead {
        meta: Meta::new("negative-lookahead"),
        inner,
        positive: false,
    })
}

struct Lookahead<T, V> {
    meta: Meta,
    inner: ParserRef<T, V>,
    positive: bool,
}

impl<T, V> Parser<T, ()> for Lookahead<T, V> {
    fn parse(&self, state: &mut ParseState<'_, T>) -> ParseResult<()> {
        let start = state.checkpoint();
        let matched = self.inner.matches(state);
        state.rewind(start);
        if matched == self.positive {
            ParseResult::success((), 0, self.meta.id())
        } else if self.positive {
            ParseResult::failure("lookahead did not match", self.meta.id())
        } else {
            ParseResult::failure("negative lookahead matched", self.meta.id())
        }
    }

    fn id(&self) -> ParserId {
        self.meta.id()
    }

    fn name(&self) -> EcoString {
        self.meta.name()
    }

    fn syntax(&self) -> Syntax {
        Syntax::Lookahead {
            positive: self.positive,
            inner: Box::new(self.inner.syntax()),
        }
    }
}
