// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Mutable indirection for recursive grammars.
//!
//! Eager composition cannot reference a parser that has not been built yet,
//! so self-referential grammars are tied through a [`Replaceable`] cell:
//! create the cell with a placeholder, use its handle while composing, then
//! [`set`][Replaceable::set] the real parser before parsing.
//!
//! The cell's identity is stable across replacement. Replacement after
//! first use is supported but single-mutator by design: the cell is
//! `Rc`-based and not shareable across threads.
//!
//! A cycle through a `Replaceable` keeps its `Rc` graph alive for the
//! process lifetime; grammars are built once, so this is the intended
//! trade-off.

use std::cell::RefCell;
use std::rc::Rc;

use ecow::EcoString;

use crate::parser::{Meta, Parser, ParserId, ParserRef};
use crate::result::ParseResult;
use crate::state::ParseState;
use crate::syntax::Syntax;

/// Creates an indirection cell wrapping `initial`.
pub fn replaceable<T: 'static, V: 'static>(initial: ParserRef<T, V>) -> Rc<Replaceable<T, V>> {
    Rc::new(Replaceable {
        meta: Meta::new("replaceable"),
        inner: RefCell::new(initial),
    })
}

/// An identity-preserving, mutable parser cell.
pub struct Replaceable<T, V> {
    meta: Meta,
    inner: RefCell<ParserRef<T, V>>,
}

impl<T, V> Replaceable<T, V> {
    /// Replaces the wrapped parser, returning the previous one.
    pub fn set(&self, parser: ParserRef<T, V>) -> ParserRef<T, V> {
        self.inner.replace(parser)
    }

    /// The currently wrapped parser.
    #[must_use]
    pub fn get(&self) -> ParserRef<T, V> {
        self.inner.borrow().clone()
    }
}

impl<T, V> Parser<T, V> for Replaceable<T, V> {
    fn parse(&self, state: &mut ParseState<'_, T>) -> ParseResult<V> {
        // Clone the handle first so a recursive grammar can re-enter this
        // cell while the call is in flight.
        let inner = self.inner.borrow().clone();
        inner.parse(state)
    }

    fn matches(&self, state: &mut ParseState<'_, T>) -> bool {
        let inner = self.inner.borrow().clone();
        inner.matches(state)
    }

    fn id(&self) -> ParserId {
        self.meta.id()
    }

    fn name(&self) -> EcoString {
        self.meta.name()
    }

    fn syntax(&self) -> Syntax {
        // Refer to the target by name only; recursing into a cyclic graph
        // here would never terminate.
        Syntax::Reference(self.inner.borrow().name())
    }
}
