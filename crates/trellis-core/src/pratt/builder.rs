// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Pratt rule configuration.
//!
//! Rules are registered against a token matcher (any ordinary parser) and
//! bind a prefix handler, an infix handler, or both, each with binding
//! powers controlling precedence and associativity. Higher values bind
//! tighter; see [`BindingPower`].
//!
//! Several rules may share a token matcher: they are tried in registration
//! order, and a handler returning
//! [`FailRule`][super::PrattSignal::FailRule] falls through to the next.

use ecow::EcoString;

use crate::error::GrammarError;
use crate::parser::ParserRef;
use crate::result::ParseResult;
use crate::syntax::Syntax;

use super::context::{PrattContext, PrattSignal};

/// Left and right binding powers for one operator rule.
///
/// - Left-associative: `left == right - 1` (e.g. `+`, `-`)
/// - Right-associative: `left == right + 1` (e.g. `**`, assignment)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindingPower {
    left: u32,
    right: u32,
}

impl BindingPower {
    /// Creates an explicit binding-power pair.
    #[must_use]
    pub const fn new(left: u32, right: u32) -> Self {
        Self { left, right }
    }

    /// Creates a left-associative binding power.
    #[must_use]
    pub const fn left_assoc(precedence: u32) -> Self {
        Self {
            left: precedence,
            right: precedence + 1,
        }
    }

    /// Creates a right-associative binding power.
    #[must_use]
    pub const fn right_assoc(precedence: u32) -> Self {
        Self {
            left: precedence + 1,
            right: precedence,
        }
    }

    /// The left binding power.
    #[must_use]
    pub const fn left(self) -> u32 {
        self.left
    }

    /// The right binding power.
    #[must_use]
    pub const fn right(self) -> u32 {
        self.right
    }
}

pub(super) type NudFn<T, V> =
    Box<dyn Fn(&mut PrattContext<'_, '_, T, V>) -> Result<V, PrattSignal>>;
pub(super) type LedFn<T, V> =
    Box<dyn Fn(&mut PrattContext<'_, '_, T, V>, V) -> Result<V, PrattSignal>>;

pub(super) struct PrattRule<T, V> {
    pub(super) name: EcoString,
    pub(super) syntax: Syntax,
    /// Prefix handler with its right binding power.
    pub(super) prefix: Option<(u32, NudFn<T, V>)>,
    /// Infix handler with its binding powers.
    pub(super) infix: Option<(BindingPower, LedFn<T, V>)>,
}

/// Collects rules for [`pratt`][super::pratt].
pub struct PrattBuilder<T, V> {
    pub(super) rules: Vec<PrattRule<T, V>>,
}

impl<T: 'static, V: 'static> PrattBuilder<T, V> {
    pub(super) fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Registers a rule for tokens matched by `matcher`.
    ///
    /// The configuration callback binds the handlers:
    ///
    /// ```ignore
    /// builder.add(match_char('+'), |rule| {
    ///     rule.infix(BindingPower::left_assoc(30), |ctx, left, _token| {
    ///         let right = ctx.parse_operand()?;
    ///         Ok(add(left, right))
    ///     })
    /// });
    /// ```
    pub fn add<U: 'static>(
        &mut self,
        matcher: ParserRef<T, U>,
        configure: impl FnOnce(RuleBuilder<T, V, U>) -> RuleBuilder<T, V, U>,
    ) -> &mut Self {
        let rule = configure(RuleBuilder {
            matcher,
            prefix: None,
            infix: None,
        });
        self.rules.push(rule.into_rule());
        self
    }

    /// Validates the rule set.
    pub(super) fn finish(self) -> Result<Vec<PrattRule<T, V>>, GrammarError> {
        if self.rules.is_empty() {
            return Err(GrammarError::EmptyOperatorTable);
        }
        for rule in &self.rules {
            if rule.prefix.is_none() && rule.infix.is_none() {
                return Err(GrammarError::UnboundRule {
                    name: rule.name.clone(),
                });
            }
        }
        Ok(self.rules)
    }
}

/// Type of a user prefix handler, before the matcher is attached.
type PrefixFn<T, V, U> =
    Box<dyn Fn(&mut PrattContext<'_, '_, T, V>, U) -> Result<V, PrattSignal>>;
/// Type of a user infix handler, before the matcher is attached.
type InfixFn<T, V, U> =
    Box<dyn Fn(&mut PrattContext<'_, '_, T, V>, V, U) -> Result<V, PrattSignal>>;

/// Configures one rule inside [`PrattBuilder::add`].
pub struct RuleBuilder<T, V, U> {
    matcher: ParserRef<T, U>,
    prefix: Option<(u32, PrefixFn<T, V, U>)>,
    infix: Option<(BindingPower, InfixFn<T, V, U>)>,
}

impl<T: 'static, V: 'static, U: 'static> RuleBuilder<T, V, U> {
    /// Binds a prefix (null-denotation) handler for atoms; the right
    /// binding power is zero.
    #[must_use]
    pub fn prefix(
        self,
        f: impl Fn(&mut PrattContext<'_, '_, T, V>, U) -> Result<V, PrattSignal> + 'static,
    ) -> Self {
        self.prefix_binding(0, f)
    }

    /// Binds a prefix handler with an explicit right binding power, used
    /// by [`parse_operand`][PrattContext::parse_operand] for prefix
    /// operators.
    #[must_use]
    pub fn prefix_binding(
        mut self,
        right_power: u32,
        f: impl Fn(&mut PrattContext<'_, '_, T, V>, U) -> Result<V, PrattSignal> + 'static,
    ) -> Self {
        self.prefix = Some((right_power, Box::new(f)));
        self
    }

    /// Binds an infix/postfix (left-denotation) handler.
    #[must_use]
    pub fn infix(
        mut self,
        power: BindingPower,
        f: impl Fn(&mut PrattContext<'_, '_, T, V>, V, U) -> Result<V, PrattSignal> + 'static,
    ) -> Self {
        self.infix = Some((power, Box::new(f)));
        self
    }

    /// Attaches the matcher to the bound handlers.
    fn into_rule(self) -> PrattRule<T, V> {
        let name = self.matcher.name();
        let syntax = self.matcher.syntax();

        let prefix = self.prefix.map(|(right_power, f)| {
            let matcher = self.matcher.clone();
            let nud: NudFn<T, V> = Box::new(move |ctx: &mut PrattContext<'_, '_, T, V>| {
                let token = match matcher.parse(ctx.state) {
                    ParseResult::Success(s) => s.value,
                    ParseResult::Failure(_) => return Err(PrattSignal::NoMatch),
                };
                f(ctx, token)
            });
            (right_power, nud)
        });

        let infix = self.infix.map(|(power, f)| {
            let matcher = self.matcher.clone();
            let led: LedFn<T, V> =
                Box::new(move |ctx: &mut PrattContext<'_, '_, T, V>, left: V| {
                    let token = match matcher.parse(ctx.state) {
                        ParseResult::Success(s) => s.value,
                        ParseResult::Failure(_) => return Err(PrattSignal::NoMatch),
                    };
                    f(ctx, left, token)
                });
            (power, led)
        });

        PrattRule {
            name,
            syntax,
            prefix,
            infix,
        }
    }
}
