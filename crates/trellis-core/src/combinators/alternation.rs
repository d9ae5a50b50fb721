// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Ordered alternation.
//!
//! [`first`] tries alternatives in order from the same start position and
//! returns the first success; each failed branch is rewound before the next
//! is tried. [`or`] is the two-alternative form. If no alternative matches,
//! the whole parser fails with zero consumption.

use std::rc::Rc;

use ecow::EcoString;

use crate::parser::{Meta, Parser, ParserId, ParserRef};
use crate::result::ParseResult;
use crate::state::ParseState;
use crate::syntax::Syntax;

/// Tries `left`, then `right` from the same position.
pub fn or<T: 'static, V: 'static>(
    left: ParserRef<T, V>,
    right: ParserRef<T, V>,
) -> ParserRef<T, V> {
    first(vec![left, right])
}

/// Tries each alternative in order, returning the first success.
pub fn first<T: 'static, V: 'static>(alternatives: Vec<ParserRef<T, V>>) -> ParserRef<T, V> {
    Rc::new(First {
        meta: Meta::new("first"),
        alternatives,
    })
}

struct First<T, V> {
    meta: Meta,
    alternatives: Vec<ParserRef<T, V>>,
}

impl<T, V> Parser<T, V> for First<T, V> {
    fn parse(&self, state: &mut ParseState<'_, T>) -> ParseResult<V> {
        let start = state.checkpoint();
        for alternative in &self.alternatives {
            match alternative.parse(state) {
                result @ ParseResult::Success(_) => return result,
                ParseResult::Failure(_) => state.rewind(start),
            }
        }
        ParseResult::failure("no alternative matched", self.meta.id())
    }

    fn matches(&self, state: &mut ParseState<'_, T>) -> bool {
        let start = state.checkpoint();
        for alternative in &self.alternatives {
            if alternative.matches(state) {
                return true;
            }
            state.rewind(start);
        }
        false
    }

    fn id(&self) -> ParserId {
        self.meta.id()
    }

    fn name(&self) -> EcoString {
        self.meta.name()
    }

    fn syntax(&self) -> Syntax {
        Syntax::Alternation(self.alternatives.iter().map(|a| a.syntax()).collect())
    }
}
