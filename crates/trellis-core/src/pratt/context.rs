// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! The context handed to Pratt binding functions.
//!
//! Control flow inside the engine travels as [`PrattSignal`] values through
//! `Result` — never by unwinding — so the panic-absorbing `Try` boundary
//! cannot swallow it: rejecting a rule and aborting a parse are parse
//! *outcomes*, not errors.

use ecow::EcoString;

use crate::parser::Parser;
use crate::result::ParseResult;
use crate::state::ParseState;

use super::Pratt;

/// Control signals produced by binding functions and the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrattSignal {
    /// The rule's token matcher did not match at this position; the engine
    /// silently tries the next rule.
    NoMatch,
    /// The rule matched its token but rejects it here; the engine rewinds
    /// and falls through to the next registered rule for this position.
    FailRule,
    /// Abort the entire Pratt parse.
    FailAll,
    /// Engine-detected misuse (parse after complete, non-consuming
    /// recursion, nesting limit); fails the whole parse.
    Error(EcoString),
}

/// Tracks in-flight recursive parses for non-termination detection.
#[derive(Default)]
pub(super) struct RecursionGuard {
    pub(super) active: Vec<(usize, u32)>,
    pub(super) depth: usize,
}

/// The engine context available to prefix and infix binding functions.
pub struct PrattContext<'a, 's, T, V> {
    pub(super) engine: &'a Pratt<T, V>,
    pub(super) state: &'a mut ParseState<'s, T>,
    pub(super) guard: &'a mut RecursionGuard,
    pub(super) completed: bool,
    pub(super) right_power: u32,
}

impl<T: 'static, V: Clone + 'static> PrattContext<'_, '_, T, V> {
    /// Recursively parses a sub-expression accepting operators whose left
    /// binding power exceeds `min_power`.
    ///
    /// Calling this after [`complete`][Self::complete], or recursively
    /// without having consumed input, is a parse failure — the engine
    /// detects both rather than looping forever.
    pub fn parse(&mut self, min_power: u32) -> Result<V, PrattSignal> {
        if self.completed {
            return Err(PrattSignal::Error("parse called after complete".into()));
        }
        let position = self.state.consumed();
        if self.guard.active.contains(&(position, min_power)) {
            return Err(PrattSignal::Error(
                "recursive parse without consuming input".into(),
            ));
        }
        self.guard.active.push((position, min_power));
        let result = self
            .engine
            .parse_expression(&mut *self.state, min_power, &mut *self.guard);
        let _ = self.guard.active.pop();
        match result {
            // No prefix rule matched the sub-expression: this rule cannot
            // proceed, but other rules may.
            Err(PrattSignal::NoMatch) => Err(PrattSignal::FailRule),
            other => other,
        }
    }

    /// Parses the right-hand operand at this rule's right binding power.
    ///
    /// Equal left/right powers continue left-associatively; a lower right
    /// power re-admits the same operator, i.e. right associativity.
    pub fn parse_operand(&mut self) -> Result<V, PrattSignal> {
        let right_power = self.right_power;
        self.parse(right_power)
    }

    /// Non-failing variant of [`parse`][Self::parse]: `Ok(None)` when no
    /// sub-expression is present. `FailAll` and engine errors still
    /// propagate.
    pub fn try_parse(&mut self, min_power: u32) -> Result<Option<V>, PrattSignal> {
        match self.parse(min_power) {
            Ok(value) => Ok(Some(value)),
            Err(PrattSignal::NoMatch | PrattSignal::FailRule) => Ok(None),
            Err(other) => Err(other),
        }
    }

    /// Requires `parser` to match here (e.g. a closing bracket); failure
    /// rejects the current rule.
    pub fn expect<W>(&mut self, parser: &dyn Parser<T, W>) -> Result<W, PrattSignal> {
        match parser.parse(self.state) {
            ParseResult::Success(s) => Ok(s.value),
            ParseResult::Failure(_) => Err(PrattSignal::FailRule),
        }
    }

    /// Marks the expression as finished: after the current rule returns,
    /// the engine attempts no further infix rules.
    pub fn complete(&mut self) {
        self.completed = true;
    }

    /// This rule's right binding power.
    #[must_use]
    pub fn right_power(&self) -> u32 {
        self.right_power
    }

    /// Items consumed so far in the overall parse.
    #[must_use]
    pub fn consumed(&self) -> usize {
        self.state.consumed()
    }
}
