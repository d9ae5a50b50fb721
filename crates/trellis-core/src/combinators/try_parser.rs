// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! The panic-absorbing boundary.
//!
//! User callbacks (reduction functions, chain selectors, sequential bodies)
//! may panic; by default such a panic propagates out of the parse, because
//! it signals a genuine bug rather than a mismatch. [`attempt`] is the one
//! sanctioned boundary where a panic is deliberately absorbed into the
//! result model: the panic message lands in the result's data bag, the
//! sequence rewinds fully, and the parse continues as an ordinary failure.
//!
//! Pratt control flow (`FailRule`, `FailAll`, completion) is *not* an
//! unwinding construct in this crate — those signals travel as values
//! through `Result` — so this boundary cannot swallow them even by
//! accident.

use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use ecow::EcoString;

use crate::parser::{Meta, Parser, ParserId, ParserRef};
use crate::result::{DataEntry, ParseResult};
use crate::state::ParseState;
use crate::syntax::Syntax;

/// Wraps `inner`, converting a panic from it (or its callbacks) into a
/// zero-consumption failure carrying the panic message.
pub fn attempt<T: 'static, V: 'static>(inner: ParserRef<T, V>) -> ParserRef<T, V> {
    Rc::new(Attempt {
        meta: Meta::new("try"),
        inner,
    })
}

struct Attempt<T, V> {
    meta: Meta,
    inner: ParserRef<T, V>,
}

impl<T, V> Parser<T, V> for Attempt<T, V> {
    fn parse(&self, state: &mut ParseState<'_, T>) -> ParseResult<V> {
        let start = state.checkpoint();
        match panic::catch_unwind(AssertUnwindSafe(|| self.inner.parse(state))) {
            Ok(result) => result,
            Err(payload) => {
                state.rewind(start);
                let message: EcoString = if let Some(s) = payload.downcast_ref::<&str>() {
                    (*s).into()
                } else if let Some(s) = payload.downcast_ref::<String>() {
                    s.as_str().into()
                } else {
                    "panic in wrapped parser".into()
                };
                ParseResult::failure("wrapped parser panicked", self.meta.id())
                    .with_data(DataEntry::CaughtPanic(message))
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
        self.inner.syntax()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinators::transform::map;
    use crate::parser::{ParserExt, TextParserExt};
    use crate::primitives::{match_char, match_text};
    use crate::sequence::{CharSequence, Sequence};

    fn quiet<R>(f: impl FnOnce() -> R) -> R {
        // Suppress the default panic hook output for expected panics.
        let hook = panic::take_hook();
        panic::set_hook(Box::new(|_| {}));
        let result = f();
        panic::set_hook(hook);
        result
    }

    #[test]
    fn panics_become_failures_with_message() {
        let panicking = map(match_char('a'), |_| -> char { panic!("reduce exploded") });
        let parser = attempt(panicking);
        let mut input = CharSequence::new("abc");
        let result = quiet(|| parser.parse_sequence(&mut input));
        assert!(!result.is_success());
        assert_eq!(result.consumed(), 0);
        assert_eq!(input.consumed(), 0);
        assert_eq!(result.data().caught_panic().unwrap(), "reduce exploded");
    }

    #[test]
    fn ordinary_failures_pass_through_unchanged() {
        let parser = attempt(match_text("xyz"));
        let result = parser.parse_text("abc");
        assert!(!result.is_success());
        assert!(result.data().caught_panic().is_none());
    }

    #[test]
    fn success_passes_through_unchanged() {
        let parser = attempt(match_text("abc"));
        let result = parser.parse_text("abc");
        assert_eq!(result.consumed(), 3);
        assert_eq!(result.unwrap(), "abc");
    }

    #[test]
    fn engine_control_flow_is_not_a_panic() {
        // FailAll aborts a Pratt parse as an ordinary failure; the panic
        // boundary has nothing to absorb and attaches no panic payload.
        let inner = crate::pratt::pratt::<char, String, _>(|b| {
            b.add(match_char('x'), |r| {
                r.prefix(|_ctx, _| Err(crate::pratt::PrattSignal::FailAll))
            });
        })
        .unwrap();
        let parser = attempt(inner);
        let result = parser.parse_text("x");
        assert!(!result.is_success());
        assert!(result.data().caught_panic().is_none());
    }

    #[test]
    fn panic_mid_sequence_rewinds_fully() {
        // The panic fires after 'a' and 'b' were consumed; the boundary
        // must restore the pre-call position.
        let inner = crate::combinators::sequencing::combine(
            (
                match_char('a'),
                match_char('b'),
                map(match_char('c'), |_| -> char { panic!("late panic") }),
            ),
            |(a, _, _)| a,
        );
        let parser = attempt(inner);
        let mut input = CharSequence::new("abc");
        let result = quiet(|| parser.parse_sequence(&mut input));
        assert!(!result.is_success());
        assert_eq!(input.consumed(), 0);
    }
}
