// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Imperative composition.
//!
//! [`sequential`] is the escape hatch for grammars that are easier to write
//! as straight-line code than as a combinator tree. The body callback
//! receives a [`Stepper`] exposing fail-fast parsing (compatible with `?`),
//! optional parsing, boolean matching, and raw sequence access. Any failed
//! mandatory step aborts the whole parser with a full rewind to its start
//! checkpoint.

use std::rc::Rc;

use ecow::EcoString;

use crate::parser::{Meta, Parser, ParserId, ParserRef};
use crate::result::ParseResult;
use crate::state::ParseState;
use crate::syntax::Syntax;

/// The error type a failed mandatory step produces.
///
/// Opaque by design; convert with `?` inside a [`sequential`] body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepFailure {
    message: EcoString,
}

impl StepFailure {
    /// Creates a step failure with an explicit message.
    #[must_use]
    pub fn new(message: impl Into<EcoString>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The failure message.
    #[must_use]
    pub fn message(&self) -> &EcoString {
        &self.message
    }
}

/// The stepper handed to a [`sequential`] body.
pub struct Stepper<'a, 's, T> {
    state: &'a mut ParseState<'s, T>,
}

impl<T> Stepper<'_, '_, T> {
    /// Runs a parser, failing the whole sequential on failure.
    pub fn parse<V>(&mut self, parser: &dyn Parser<T, V>) -> Result<V, StepFailure> {
        match parser.parse(self.state) {
            ParseResult::Success(s) => Ok(s.value),
            ParseResult::Failure(f) => Err(StepFailure { message: f.message }),
        }
    }

    /// Runs a parser, failing the whole sequential with `message` on
    /// failure.
    pub fn expect<V>(
        &mut self,
        parser: &dyn Parser<T, V>,
        message: &str,
    ) -> Result<V, StepFailure> {
        match parser.parse(self.state) {
            ParseResult::Success(s) => Ok(s.value),
            ParseResult::Failure(_) => Err(StepFailure::new(message)),
        }
    }

    /// Runs a parser, returning `None` instead of aborting on failure.
    pub fn try_parse<V>(&mut self, parser: &dyn Parser<T, V>) -> Option<V> {
        match parser.parse(self.state) {
            ParseResult::Success(s) => Some(s.value),
            ParseResult::Failure(_) => None,
        }
    }

    /// Boolean match, consuming on success.
    pub fn matches<V>(&mut self, parser: &dyn Parser<T, V>) -> bool {
        parser.matches(self.state)
    }

    /// Peeks at the current input item.
    pub fn peek(&mut self) -> T {
        self.state.input().peek()
    }

    /// Consumes and returns the current input item.
    pub fn take(&mut self) -> T {
        self.state.input().take()
    }

    /// True at the end of input.
    pub fn is_at_end(&mut self) -> bool {
        self.state.input().is_at_end()
    }

    /// The number of items consumed so far.
    #[must_use]
    pub fn consumed(&self) -> usize {
        self.state.consumed()
    }

    /// Fails the whole sequential from the body.
    pub fn fail<V>(&self, message: impl Into<EcoString>) -> Result<V, StepFailure> {
        Err(StepFailure::new(message))
    }
}

/// Builds a parser from an imperative body.
///
/// ```
/// use trellis_core::combinators::sequential;
/// use trellis_core::primitives::{match_char, match_item};
/// use trellis_core::TextParserExt;
///
/// // A quoted letter: '"' letter '"'
/// let quoted = sequential(|s| {
///     s.parse(&*match_char('"'))?;
///     let inner = s.parse(&*match_item("letter", |c: &char| c.is_ascii_alphabetic()))?;
///     s.expect(&*match_char('"'), "unterminated quote")?;
///     Ok(inner)
/// });
/// assert_eq!(quoted.parse_text("\"x\"").unwrap(), 'x');
/// assert!(!quoted.parse_text("\"x").is_success());
/// ```
pub fn sequential<T: 'static, V: 'static>(
    body: impl Fn(&mut Stepper<'_, '_, T>) -> Result<V, StepFailure> + 'static,
) -> ParserRef<T, V> {
    struct Sequential<T, V> {
        meta: Meta,
        #[allow(clippy::type_complexity)]
        body: Box<dyn Fn(&mut Stepper<'_, '_, T>) -> Result<V, StepFailure>>,
    }

    impl<T, V> Parser<T, V> for Sequential<T, V> {
        fn parse(&self, state: &mut ParseState<'_, T>) -> ParseResult<V> {
            let start = state.checkpoint();
            let before = state.consumed();
            let mut stepper = Stepper {
                state: &mut *state,
            };
            match (self.body)(&mut stepper) {
                Ok(value) => {
                    let consumed = state.consumed() - before;
                    ParseResult::success(value, consumed, self.meta.id())
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
            Syntax::Opaque(self.meta.name())
        }
    }

    Rc::new(Sequential {
        meta: Meta::new("sequential"),
        body: Box::new(body),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{ParserExt, TextParserExt};
    use crate::primitives::{match_char, match_item, match_text};
    use crate::sequence::{CharSequence, Sequence};

    #[test]
    fn steps_compose_with_question_mark() {
        let parser = sequential(|s| {
            let a = s.parse(&*match_char('a'))?;
            let b = s.parse(&*match_char('b'))?;
            Ok(format!("{a}{b}"))
        });
        assert_eq!(parser.parse_text("ab").unwrap(), "ab");
    }

    #[test]
    fn failed_mandatory_step_rewinds_everything() {
        let parser = sequential(|s| {
            s.parse(&*match_text("abc"))?;
            s.parse(&*match_char('!'))?;
            Ok(())
        });
        let mut input = CharSequence::new("abc?");
        let result = parser.parse_sequence(&mut input);
        assert!(!result.is_success());
        assert_eq!(result.consumed(), 0);
        assert_eq!(input.consumed(), 0);
    }

    #[test]
    fn try_parse_is_optional() {
        let parser = sequential(|s| {
            let sign = s.try_parse(&*match_char('-')).is_some();
            let digit = s.parse(&*match_item("digit", |c: &char| c.is_ascii_digit()))?;
            let mut value = i64::from(digit.to_digit(10).unwrap());
            if sign {
                value = -value;
            }
            Ok(value)
        });
        assert_eq!(parser.parse_text("-5").unwrap(), -5);
        assert_eq!(parser.parse_text("5").unwrap(), 5);
    }

    #[test]
    fn raw_sequence_access() {
        let parser = sequential(|s| {
            let mut count = 0usize;
            while !s.is_at_end() && s.peek() == 'z' {
                let _ = s.take();
                count += 1;
            }
            if count == 0 {
                return s.fail("expected at least one z");
            }
            Ok(count)
        });
        assert_eq!(parser.parse_text("zzz").unwrap(), 3);
        assert!(!parser.parse_text("a").is_success());
    }

    #[test]
    fn expect_overrides_the_message() {
        let parser = sequential(|s| {
            s.parse(&*match_char('('))?;
            let inner = s.parse(&*match_char('x'))?;
            s.expect(&*match_char(')'), "missing closing parenthesis")?;
            Ok(inner)
        });
        match parser.parse_text("(x") {
            ParseResult::Failure(f) => assert_eq!(f.message, "missing closing parenthesis"),
            ParseResult::Success(_) => panic!("expected failure"),
        }
    }
}
