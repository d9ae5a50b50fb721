// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! The Pratt engine.
//!
//! A precedence-climbing expression parser over the same sequence/parser
//! machinery as everything else: token matchers are ordinary parsers, not
//! a separate lexer. Rules bind prefix (null-denotation) and infix
//! (left-denotation) handlers with per-rule binding powers; higher powers
//! bind tighter, and associativity falls out of the left/right power pair
//! (see [`BindingPower`]).
//!
//! # Algorithm
//!
//! 1. At the current position, try each rule's prefix handler in
//!    registration order; the first whose matcher succeeds (and whose
//!    handler does not [`FailRule`][PrattSignal::FailRule]) produces the
//!    initial left value.
//! 2. While some rule's infix handler qualifies — its left binding power
//!    exceeds the minimum passed to this parse level — run it with the
//!    current left value to produce the next left value. Handlers parse
//!    their right operands by recursing through
//!    [`PrattContext::parse_operand`] /
//!    [`parse`][PrattContext::parse].
//! 3. Stop when no infix rule qualifies or a handler called
//!    [`complete`][PrattContext::complete].
//!
//! Handlers reject individual tokens with `FailRule` (falling through to
//! the next rule registered for the same position) or abort everything
//! with [`FailAll`][PrattSignal::FailAll]. Both travel as values; see the
//! `context` module. The engine detects zero-consumption recursion and
//! parse-after-complete instead of looping forever.

mod builder;
mod context;

pub use builder::{BindingPower, PrattBuilder, RuleBuilder};
pub use context::{PrattContext, PrattSignal};

use std::rc::Rc;

use ecow::EcoString;
use tracing::trace;

use builder::PrattRule;
use context::RecursionGuard;

use crate::error::GrammarError;
use crate::parser::{Meta, Parser, ParserId, ParserRef};
use crate::result::ParseResult;
use crate::state::ParseState;
use crate::syntax::Syntax;

/// Nesting ceiling for recursive sub-expression parses.
///
/// `stacker::maybe_grow` below extends the stack on the heap as a second
/// line of defence; the ceiling bounds pathological grammars outright.
const MAX_DEPTH: usize = 256;

/// Builds a Pratt parser from a rule table.
///
/// # Errors
///
/// Returns a [`GrammarError`] when the table is empty or a rule binds no
/// handler — configuration problems, reported at construction time.
pub fn pratt<T, V, F>(configure: F) -> Result<ParserRef<T, V>, GrammarError>
where
    T: 'static,
    V: Clone + 'static,
    F: FnOnce(&mut PrattBuilder<T, V>),
{
    let mut builder = PrattBuilder::new();
    configure(&mut builder);
    let rules = builder.finish()?;
    Ok(Rc::new(Pratt {
        meta: Meta::new("pratt"),
        rules,
    }))
}

/// A precedence-climbing expression parser.
pub struct Pratt<T, V> {
    meta: Meta,
    rules: Vec<PrattRule<T, V>>,
}

impl<T: 'static, V: Clone + 'static> Pratt<T, V> {
    pub(super) fn parse_expression(
        &self,
        state: &mut ParseState<'_, T>,
        min_power: u32,
        guard: &mut RecursionGuard,
    ) -> Result<V, PrattSignal> {
        guard.depth += 1;
        if guard.depth > MAX_DEPTH {
            guard.depth -= 1;
            return Err(PrattSignal::Error("expression nesting too deep".into()));
        }
        let result = stacker::maybe_grow(32 * 1024, 256 * 1024, || {
            self.parse_expression_inner(state, min_power, guard)
        });
        guard.depth -= 1;
        result
    }

    fn parse_expression_inner(
        &self,
        state: &mut ParseState<'_, T>,
        min_power: u32,
        guard: &mut RecursionGuard,
    ) -> Result<V, PrattSignal> {
        // Null-denotation phase: first matching prefix rule wins.
        let mut left: Option<V> = None;
        let mut completed = false;
        for rule in &self.rules {
            let Some((right_power, nud)) = &rule.prefix else {
                continue;
            };
            let checkpoint = state.checkpoint();
            let mut ctx = PrattContext {
                engine: self,
                state: &mut *state,
                guard: &mut *guard,
                completed: false,
                right_power: *right_power,
            };
            match nud(&mut ctx) {
                Ok(value) => {
                    completed = ctx.completed;
                    trace!(rule = %rule.name, "prefix rule matched");
                    left = Some(value);
                    break;
                }
                Err(PrattSignal::NoMatch | PrattSignal::FailRule) => {
                    state.rewind(checkpoint);
                }
                Err(other) => {
                    state.rewind(checkpoint);
                    return Err(other);
                }
            }
        }
        let Some(mut left) = left else {
            return Err(PrattSignal::NoMatch);
        };

        // Left-denotation loop: keep binding while an infix rule's left
        // power exceeds this level's minimum.
        while !completed {
            let mut advanced = false;
            for rule in &self.rules {
                let Some((power, led)) = &rule.infix else {
                    continue;
                };
                if power.left() <= min_power {
                    continue;
                }
                let checkpoint = state.checkpoint();
                let mut ctx = PrattContext {
                    engine: self,
                    state: &mut *state,
                    guard: &mut *guard,
                    completed: false,
                    right_power: power.right(),
                };
                match led(&mut ctx, left.clone()) {
                    Ok(value) => {
                        if ctx.completed {
                            completed = true;
                        }
                        trace!(rule = %rule.name, "infix rule matched");
                        left = value;
                        advanced = true;
                        break;
                    }
                    Err(PrattSignal::NoMatch | PrattSignal::FailRule) => {
                        state.rewind(checkpoint);
                    }
                    Err(other) => {
                        state.rewind(checkpoint);
                        return Err(other);
                    }
                }
            }
            if !advanced {
                break;
            }
        }
        Ok(left)
    }
}

impl<T: 'static, V: Clone + 'static> Parser<T, V> for Pratt<T, V> {
    fn parse(&self, state: &mut ParseState<'_, T>) -> ParseResult<V> {
        let start = state.checkpoint();
        let before = state.consumed();
        let mut guard = RecursionGuard::default();
        match self.parse_expression(state, 0, &mut guard) {
            Ok(value) => {
                let consumed = state.consumed() - before;
                ParseResult::success(value, consumed, self.meta.id())
            }
            Err(signal) => {
                state.rewind(start);
                let message: EcoString = match signal {
                    PrattSignal::NoMatch | PrattSignal::FailRule => {
                        "no prefix rule matched".into()
                    }
                    PrattSignal::FailAll => "parse aborted".into(),
                    PrattSignal::Error(message) => message,
                };
                ParseResult::failure(message, self.meta.id())
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
        Syntax::Alternation(self.rules.iter().map(|r| r.syntax.clone()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{ParserExt, TextParserExt};
    use crate::primitives::{match_char, match_item};
    use crate::sequence::{CharSequence, Sequence};

    fn digit() -> ParserRef<char, char> {
        match_item("digit", |c: &char| c.is_ascii_digit())
    }

    /// '+', '-' left-associative; '*' tighter; '=' right-associative.
    fn arithmetic() -> ParserRef<char, String> {
        pratt::<char, String, _>(|b| {
            b.add(digit(), |r| r.prefix(|_ctx, token| Ok(token.to_string())));
            for op in ['+', '-'] {
                b.add(match_char(op), |r| {
                    r.infix(BindingPower::left_assoc(30), move |ctx, left, _| {
                        let right = ctx.parse_operand()?;
                        Ok(format!("({left}{op}{right})"))
                    })
                });
            }
            b.add(match_char('*'), |r| {
                r.infix(BindingPower::left_assoc(40), |ctx, left, _| {
                    let right = ctx.parse_operand()?;
                    Ok(format!("({left}*{right})"))
                })
            });
            b.add(match_char('='), |r| {
                r.infix(BindingPower::right_assoc(10), |ctx, left, _| {
                    let right = ctx.parse_operand()?;
                    Ok(format!("({left}={right})"))
                })
            });
        })
        .unwrap()
    }

    #[test]
    fn left_associative_chain() {
        assert_eq!(arithmetic().parse_text("1+2-3+4").unwrap(), "(((1+2)-3)+4)");
    }

    #[test]
    fn right_associative_chain() {
        assert_eq!(arithmetic().parse_text("1=2=3=4").unwrap(), "(1=(2=(3=4)))");
    }

    #[test]
    fn multiplication_binds_tighter() {
        assert_eq!(arithmetic().parse_text("1+2*3").unwrap(), "(1+(2*3))");
        assert_eq!(arithmetic().parse_text("1*2+3").unwrap(), "((1*2)+3)");
    }

    #[test]
    fn no_prefix_match_fails_with_zero_consumed() {
        let parser = arithmetic();
        let mut input = CharSequence::new("+1");
        let result = parser.parse_sequence(&mut input);
        assert!(!result.is_success());
        assert_eq!(result.consumed(), 0);
        assert_eq!(input.consumed(), 0);
    }

    #[test]
    fn trailing_operator_is_left_unconsumed() {
        let parser = arithmetic();
        let mut input = CharSequence::new("1+2+");
        let result = parser.parse_sequence(&mut input);
        assert!(result.is_success());
        assert_eq!(result.consumed(), 3);
        assert_eq!(input.take(), '+');
    }

    #[test]
    fn multiple_rules_fall_through_on_fail_rule() {
        // The first rule rejects even digits; the second accepts anything.
        let parser = pratt::<char, String, _>(|b| {
            b.add(digit(), |r| {
                r.prefix(|_ctx, token| {
                    if token.to_digit(10).unwrap() % 2 == 0 {
                        Err(PrattSignal::FailRule)
                    } else {
                        Ok(format!("odd:{token}"))
                    }
                })
            });
            b.add(digit(), |r| r.prefix(|_ctx, token| Ok(format!("any:{token}"))));
        })
        .unwrap();
        assert_eq!(parser.parse_text("3").unwrap(), "odd:3");
        assert_eq!(parser.parse_text("4").unwrap(), "any:4");
    }

    #[test]
    fn fail_all_aborts_despite_other_rules() {
        let parser = pratt::<char, String, _>(|b| {
            b.add(digit(), |r| r.prefix(|_ctx, _| Err(PrattSignal::FailAll)));
            b.add(digit(), |r| r.prefix(|_ctx, token| Ok(token.to_string())));
        })
        .unwrap();
        let mut input = CharSequence::new("7");
        let result = parser.parse_sequence(&mut input);
        assert!(!result.is_success());
        assert_eq!(input.consumed(), 0);
    }

    #[test]
    fn circumfix_with_expect() {
        let parser = pratt::<char, String, _>(|b| {
            b.add(digit(), |r| r.prefix(|_ctx, token| Ok(token.to_string())));
            b.add(match_char('+'), |r| {
                r.infix(BindingPower::left_assoc(30), |ctx, left, _| {
                    let right = ctx.parse_operand()?;
                    Ok(format!("({left}+{right})"))
                })
            });
            b.add(match_char('('), |r| {
                r.prefix(|ctx, _| {
                    let inner = ctx.parse(0)?;
                    let _ = ctx.expect(&*match_char(')'))?;
                    Ok(format!("[{inner}]"))
                })
            });
        })
        .unwrap();
        assert_eq!(parser.parse_text("(1+2)*").unwrap(), "[(1+2)]");
        // Missing close: the '(' rule fails, and no other prefix rule
        // matches '(' — the whole parse fails with a full rewind.
        let mut input = CharSequence::new("(1+2");
        let result = parser.parse_sequence(&mut input);
        assert!(!result.is_success());
        assert_eq!(input.consumed(), 0);
    }

    #[test]
    fn prefix_operator_via_binding_power() {
        let parser = pratt::<char, String, _>(|b| {
            b.add(digit(), |r| r.prefix(|_ctx, token| Ok(token.to_string())));
            b.add(match_char('-'), |r| {
                r.prefix_binding(50, |ctx, _| {
                    let operand = ctx.parse_operand()?;
                    Ok(format!("(neg {operand})"))
                })
            });
            b.add(match_char('+'), |r| {
                r.infix(BindingPower::left_assoc(30), |ctx, left, _| {
                    let right = ctx.parse_operand()?;
                    Ok(format!("({left}+{right})"))
                })
            });
        })
        .unwrap();
        // Negation binds tighter than '+'.
        assert_eq!(parser.parse_text("-1+2").unwrap(), "((neg 1)+2)");
    }

    #[test]
    fn complete_stops_the_infix_loop() {
        let parser = pratt::<char, String, _>(|b| {
            b.add(digit(), |r| r.prefix(|_ctx, token| Ok(token.to_string())));
            b.add(match_char('+'), |r| {
                r.infix(BindingPower::left_assoc(30), |ctx, left, _| {
                    let right = ctx.parse_operand()?;
                    Ok(format!("({left}+{right})"))
                })
            });
            b.add(match_char(';'), |r| {
                r.infix(BindingPower::left_assoc(5), |ctx, left, _| {
                    ctx.complete();
                    Ok(left)
                })
            });
        })
        .unwrap();
        let mut input = CharSequence::new("1+2;3+4");
        let result = parser.parse_sequence(&mut input);
        assert!(result.is_success());
        // Consumption stops after the ';'; the rest is untouched.
        assert_eq!(result.consumed(), 4);
        assert_eq!(result.unwrap(), "(1+2)");
        assert_eq!(input.take(), '3');
    }

    #[test]
    fn parse_after_complete_fails() {
        let parser = pratt::<char, String, _>(|b| {
            b.add(digit(), |r| r.prefix(|_ctx, token| Ok(token.to_string())));
            b.add(match_char('!'), |r| {
                r.infix(BindingPower::left_assoc(30), |ctx, left, _| {
                    ctx.complete();
                    // Obligations after complete() still run, but a further
                    // parse attempt is a failure.
                    let more = ctx.parse(0)?;
                    Ok(format!("{left}{more}"))
                })
            });
        })
        .unwrap();
        let mut input = CharSequence::new("1!2");
        let result = parser.parse_sequence(&mut input);
        assert!(!result.is_success());
        assert_eq!(input.consumed(), 0);
    }

    #[test]
    fn zero_consumption_recursion_is_detected() {
        // The prefix matcher consumes nothing and the handler immediately
        // recurses at the same position and power: the engine must fail,
        // not hang.
        let unit: ParserRef<char, ()> = crate::primitives::produce(|| ());
        let parser = pratt::<char, String, _>(|b| {
            b.add(unit, |r| {
                r.prefix(|ctx, ()| {
                    let inner = ctx.parse(0)?;
                    Ok(inner)
                })
            });
        })
        .unwrap();
        let result = parser.parse_text("1");
        assert!(!result.is_success());
    }

    #[test]
    fn empty_rule_table_is_a_construction_error() {
        let result = pratt::<char, String, _>(|_b| {});
        assert_eq!(result.err().unwrap(), GrammarError::EmptyOperatorTable);
    }
}
