// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Panic-mode recovery.
//!
//! [`synchronize`] wraps a parser with the classic recover-at-a-boundary
//! strategy: when the inner parser fails, the failure is recorded, input is
//! discarded up to the next item matching the synchronization predicate,
//! and the inner parser is retried. Every recovered-from failure becomes a
//! [`RecoveryError`] in the result's data bag.
//!
//! This combinator is **non-rewinding**: a failing parse leaves the
//! sequence wherever recovery stopped, and the failure's consumed count
//! reports that distance. If a retry eventually succeeds after earlier
//! errors, the overall result is still a failure, but the report carries
//! the final successful sub-result for diagnostics.

use std::rc::Rc;

use ecow::EcoString;

use crate::parser::{Meta, Parser, ParserId, ParserRef};
use crate::result::{
    DataEntry, ParseResult, RecoveredValue, RecoveryError, RecoveryReport,
};
use crate::state::ParseState;
use crate::syntax::Syntax;

/// Wraps `inner` with panic-mode recovery at items matching `predicate`.
pub fn synchronize<T: 'static, V: 'static>(
    inner: ParserRef<T, V>,
    predicate: impl Fn(&T) -> bool + 'static,
) -> ParserRef<T, V> {
    Rc::new(Synchronize {
        meta: Meta::new("synchronize"),
        inner,
        predicate: Box::new(predicate),
    })
}

struct Synchronize<T, V> {
    meta: Meta,
    inner: ParserRef<T, V>,
    predicate: Box<dyn Fn(&T) -> bool>,
}

impl<T, V: 'static> Parser<T, V> for Synchronize<T, V> {
    fn parse(&self, state: &mut ParseState<'_, T>) -> ParseResult<V> {
        let before = state.consumed();
        let mut errors: Vec<RecoveryError> = Vec::new();

        loop {
            let attempt_at = state.consumed();
            match self.inner.parse(state) {
                ParseResult::Success(success) => {
                    if errors.is_empty() {
                        return ParseResult::Success(success);
                    }
                    // Errors were recovered from: the overall result is a
                    // failure carrying the final sub-result for diagnostics.
                    let report = RecoveryReport {
                        errors,
                        recovered: Some(RecoveredValue::new(success.value, success.consumed)),
                    };
                    let consumed = state.consumed() - before;
                    return ParseResult::failure_consuming(
                        "recovered from earlier errors",
                        consumed,
                        self.meta.id(),
                    )
                    .with_data(DataEntry::Recovery(report));
                }
                ParseResult::Failure(failure) => {
                    // The inner parser rewound to `attempt_at`; discard at
                    // least one item so every retry makes progress, then
                    // skip to the next synchronization point.
                    let mut discarded = 0usize;
                    if !state.input().is_at_end() {
                        let _ = state.input().take();
                        discarded += 1;
                    }
                    loop {
                        if state.input().is_at_end() {
                            break;
                        }
                        let next = state.input().peek();
                        if (self.predicate)(&next) {
                            break;
                        }
                        let _ = state.input().take();
                        discarded += 1;
                    }
                    errors.push(RecoveryError {
                        message: failure.message,
                        position: attempt_at,
                        discarded,
                    });
                    if state.input().is_at_end() {
                        let report = RecoveryReport {
                            errors,
                            recovered: None,
                        };
                        let consumed = state.consumed() - before;
                        return ParseResult::failure_consuming(
                            "synchronization point never reached",
                            consumed,
                            self.meta.id(),
                        )
                        .with_data(DataEntry::Recovery(report));
                    }
                }
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
