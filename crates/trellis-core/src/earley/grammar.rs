// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Context-free grammar definitions for the Earley engine.
//!
//! A grammar is a set of named nonterminal symbols, each with an ordered
//! list of productions. A production's components are either references to
//! other symbols or terminal parsers (any ordinary [`Parser`] value), plus
//! a reduction function applied over the component values bottom-up during
//! derivation building.
//!
//! Grammars are validated once at [`GrammarBuilder::build`]: duplicate
//! symbol names and symbols without productions are construction-time
//! [`GrammarError`]s, never parse-time failures. Nullability (a symbol's
//! ability to match zero input) is computed here so the engine can apply
//! the Aycock–Horspool fix during prediction.

use std::collections::HashMap;

use ecow::EcoString;

use crate::error::GrammarError;
use crate::parser::ParserRef;
use crate::syntax;

/// A handle to a nonterminal within one grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolId(pub(crate) usize);

impl SymbolId {
    pub(crate) const fn index(self) -> usize {
        self.0
    }
}

/// One component of a production.
pub enum Component<T, V> {
    /// A reference to a nonterminal of the same grammar.
    Symbol(SymbolId),
    /// A terminal parser, scanned directly against the input.
    Terminal(ParserRef<T, V>),
}

/// Shorthand for [`Component::Symbol`].
#[must_use]
pub fn sym<T, V>(symbol: SymbolId) -> Component<T, V> {
    Component::Symbol(symbol)
}

/// Shorthand for [`Component::Terminal`].
#[must_use]
pub fn term<T, V>(parser: ParserRef<T, V>) -> Component<T, V> {
    Component::Terminal(parser)
}

pub(crate) struct Production<T, V> {
    pub(crate) symbol: SymbolId,
    pub(crate) components: Vec<Component<T, V>>,
    pub(crate) reduce: Box<dyn Fn(&[V]) -> V>,
}

/// Incrementally defines a grammar.
pub struct GrammarBuilder<T, V> {
    names: Vec<EcoString>,
    by_name: HashMap<EcoString, SymbolId>,
    productions: Vec<Production<T, V>>,
}

impl<T, V> Default for GrammarBuilder<T, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, V> GrammarBuilder<T, V> {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            names: Vec::new(),
            by_name: HashMap::new(),
            productions: Vec::new(),
        }
    }

    /// Declares a nonterminal.
    ///
    /// # Errors
    ///
    /// Returns [`GrammarError::DuplicateSymbol`] when the name is already
    /// taken in this grammar.
    pub fn symbol(&mut self, name: impl Into<EcoString>) -> Result<SymbolId, GrammarError> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(GrammarError::DuplicateSymbol { name });
        }
        let id = SymbolId(self.names.len());
        self.names.push(name.clone());
        let _ = self.by_name.insert(name, id);
        Ok(id)
    }

    /// Adds a production for `symbol`.
    ///
    /// An empty component list is the empty production, making the symbol
    /// nullable. `reduce` receives the component values in order (an empty
    /// slice for the empty production).
    pub fn production(
        &mut self,
        symbol: SymbolId,
        components: Vec<Component<T, V>>,
        reduce: impl Fn(&[V]) -> V + 'static,
    ) -> &mut Self {
        self.productions.push(Production {
            symbol,
            components,
            reduce: Box::new(reduce),
        });
        self
    }

    /// Finishes the grammar with `start` as the start symbol.
    ///
    /// # Errors
    ///
    /// Returns [`GrammarError::EmptyGrammar`] for a grammar without
    /// symbols, or [`GrammarError::EmptySymbol`] when any declared symbol
    /// has no productions.
    pub fn build(self, start: SymbolId) -> Result<Grammar<T, V>, GrammarError> {
        if self.names.is_empty() {
            return Err(GrammarError::EmptyGrammar);
        }
        let mut productions_of: Vec<Vec<usize>> = vec![Vec::new(); self.names.len()];
        for (index, production) in self.productions.iter().enumerate() {
            productions_of[production.symbol.index()].push(index);
        }
        if let Some(empty) = productions_of.iter().position(Vec::is_empty) {
            return Err(GrammarError::EmptySymbol {
                name: self.names[empty].clone(),
            });
        }

        let nullable = compute_nullability(&self.names, &self.productions);
        Ok(Grammar {
            names: self.names,
            productions: self.productions,
            productions_of,
            nullable,
            start,
        })
    }
}

/// Fixpoint nullability: a production is nullable when all its components
/// are nullable symbols (terminals never are); a symbol is nullable when
/// any of its productions is.
fn compute_nullability<T, V>(names: &[EcoString], productions: &[Production<T, V>]) -> Vec<bool> {
    let mut nullable = vec![false; names.len()];
    loop {
        let mut changed = false;
        for production in productions {
            if nullable[production.symbol.index()] {
                continue;
            }
            let all_nullable = production.components.iter().all(|c| match c {
                Component::Symbol(s) => nullable[s.index()],
                Component::Terminal(_) => false,
            });
            if all_nullable {
                nullable[production.symbol.index()] = true;
                changed = true;
            }
        }
        if !changed {
            return nullable;
        }
    }
}

/// A validated grammar, ready for the Earley engine.
pub struct Grammar<T, V> {
    names: Vec<EcoString>,
    productions: Vec<Production<T, V>>,
    productions_of: Vec<Vec<usize>>,
    nullable: Vec<bool>,
    start: SymbolId,
}

impl<T, V> Grammar<T, V> {
    /// The start symbol.
    #[must_use]
    pub fn start(&self) -> SymbolId {
        self.start
    }

    /// The name of a symbol.
    #[must_use]
    pub fn symbol_name(&self, symbol: SymbolId) -> &EcoString {
        &self.names[symbol.index()]
    }

    /// True when the symbol can match zero input.
    #[must_use]
    pub fn is_nullable(&self, symbol: SymbolId) -> bool {
        self.nullable[symbol.index()]
    }

    pub(crate) fn productions(&self) -> &[Production<T, V>] {
        &self.productions
    }

    pub(crate) fn productions_of(&self, symbol: SymbolId) -> &[usize] {
        &self.productions_of[symbol.index()]
    }

    pub(crate) fn symbol_count(&self) -> usize {
        self.names.len()
    }

    /// Renders the grammar as BNF-like rule lines, one per symbol.
    #[must_use]
    pub fn to_bnf(&self) -> String {
        let mut lines = Vec::with_capacity(self.names.len());
        for (index, name) in self.names.iter().enumerate() {
            let alternatives: Vec<String> = self.productions_of[index]
                .iter()
                .map(|&pid| {
                    let production = &self.productions[pid];
                    if production.components.is_empty() {
                        "()".to_string()
                    } else {
                        production
                            .components
                            .iter()
                            .map(|component| match component {
                                Component::Symbol(s) => self.names[s.index()].to_string(),
                                Component::Terminal(p) => syntax::fragment(&p.syntax()),
                            })
                            .collect::<Vec<_>>()
                            .join(" ")
                    }
                })
                .collect();
            lines.push(format!("{name} := {}", alternatives.join(" | ")));
        }
        lines.join("\n")
    }
}
