// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Construction-time configuration errors.
//!
//! Grammars and Pratt rule tables are validated once, when they are built;
//! a misconfiguration is reported here as a [`GrammarError`] and never
//! surfaces at parse time. Expected parse failures are ordinary
//! [`ParseResult::Failure`][crate::ParseResult::Failure] values, not errors.

use ecow::EcoString;
use miette::Diagnostic;
use thiserror::Error;

/// An error in the definition of a grammar or Pratt rule table.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum GrammarError {
    /// Two nonterminals were given the same name.
    #[error("duplicate symbol name '{name}'")]
    #[diagnostic(help("every nonterminal in a grammar must have a unique name"))]
    DuplicateSymbol {
        /// The offending name.
        name: EcoString,
    },

    /// A symbol was declared but given no productions.
    #[error("symbol '{name}' has no productions")]
    #[diagnostic(help("add at least one production, or an empty production for a nullable symbol"))]
    EmptySymbol {
        /// The symbol's name.
        name: EcoString,
    },

    /// A grammar was built without any symbols.
    #[error("grammar defines no symbols")]
    EmptyGrammar,

    /// A Pratt rule was registered without a prefix or infix handler.
    #[error("rule '{name}' binds neither a prefix nor an infix handler")]
    #[diagnostic(help("call `prefix`, `prefix_binding`, or `infix` on the rule"))]
    UnboundRule {
        /// The rule's name (taken from its token matcher).
        name: EcoString,
    },

    /// A Pratt parser was built without any rules.
    #[error("operator table defines no rules")]
    EmptyOperatorTable,
}
