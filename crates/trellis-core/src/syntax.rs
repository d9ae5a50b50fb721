// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Grammar rendering.
//!
//! Every parser node reports a [`Syntax`] fragment describing its shape.
//! [`render`] walks a fragment tree and produces BNF-like rule lines, one
//! per named node:
//!
//! ```text
//! A := B | C
//! B := 'b'
//! C := 'c'
//! ```
//!
//! Repetition renders as `X*`, `X+`, `X?`, or `X{min, max}`; lookahead as
//! `(?= X)` and `(?! X)`. The exact text is a diagnostic convention for
//! tooling and tests, not a wire format.
//!
//! `Syntax` is a closed sum type: adding a node shape extends the enum and
//! the compiler enforces that the renderer handles it.

use ecow::EcoString;

/// The shape of a parser node, for diagnostic rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Syntax {
    /// A terminal leaf, already quoted by its constructor (`'a'`, `"TEST"`).
    Atom(EcoString),
    /// A reference to a named parser defined elsewhere (used by mutable
    /// indirection cells, whose target may be part of a cycle).
    Reference(EcoString),
    /// Sub-parsers applied one after another.
    Sequence(Vec<Syntax>),
    /// Ordered alternatives.
    Alternation(Vec<Syntax>),
    /// A repeated sub-parser with an inclusive count range.
    Repeat {
        /// The repeated fragment.
        inner: Box<Syntax>,
        /// Minimum repetitions.
        min: usize,
        /// Maximum repetitions; `None` means unbounded.
        max: Option<usize>,
    },
    /// A sub-parser that may be absent.
    Optional(Box<Syntax>),
    /// A zero-consumption assertion.
    Lookahead {
        /// True for positive lookahead, false for negative.
        positive: bool,
        /// The asserted fragment.
        inner: Box<Syntax>,
    },
    /// A definition site: the node is rendered as its own rule line and
    /// referenced by name everywhere it appears.
    Named {
        /// The rule name.
        name: EcoString,
        /// The rule body.
        inner: Box<Syntax>,
    },
    /// A node whose behavior is a user callback or engine, with no static
    /// shape.
    Opaque(EcoString),
}

impl Syntax {
    /// Wraps a fragment as a definition site.
    #[must_use]
    pub fn named(name: impl Into<EcoString>, inner: Syntax) -> Self {
        Self::Named {
            name: name.into(),
            inner: Box::new(inner),
        }
    }

    /// True when the rendered fragment is a single token that never needs
    /// grouping parentheses.
    fn is_atomic(&self) -> bool {
        matches!(
            self,
            Self::Atom(_) | Self::Reference(_) | Self::Named { .. } | Self::Opaque(_)
        )
    }
}

/// Renders a syntax tree as BNF-like rule lines.
///
/// The first line is the rule for `root` (named `_` when the root is
/// anonymous); every named descendant gets its own line, in first-visit
/// order.
#[must_use]
pub fn render(root: &Syntax) -> String {
    let mut lines = Vec::new();
    let mut seen = Vec::new();

    let (root_name, root_body) = match root {
        Syntax::Named { name, inner } => {
            seen.push(name.clone());
            (name.clone(), inner.as_ref())
        }
        other => (EcoString::from("_"), other),
    };
    lines.push(format!("{root_name} := {}", fragment(root_body)));
    collect_definitions(root_body, &mut lines, &mut seen);

    lines.join("\n")
}

/// Appends a rule line for every named node not yet rendered.
fn collect_definitions(syntax: &Syntax, lines: &mut Vec<String>, seen: &mut Vec<EcoString>) {
    match syntax {
        Syntax::Named { name, inner } => {
            if seen.contains(name) {
                return;
            }
            seen.push(name.clone());
            lines.push(format!("{name} := {}", fragment(inner)));
            collect_definitions(inner, lines, seen);
        }
        Syntax::Sequence(children) | Syntax::Alternation(children) => {
            for child in children {
                collect_definitions(child, lines, seen);
            }
        }
        Syntax::Repeat { inner, .. }
        | Syntax::Optional(inner)
        | Syntax::Lookahead { inner, .. } => {
            collect_definitions(inner, lines, seen);
        }
        Syntax::Atom(_) | Syntax::Reference(_) | Syntax::Opaque(_) => {}
    }
}

/// Renders one fragment in-line, referencing named nodes by name.
pub(crate) fn fragment(syntax: &Syntax) -> String {
    match syntax {
        Syntax::Atom(text) => text.to_string(),
        Syntax::Reference(name) => name.to_string(),
        Syntax::Named { name, .. } => name.to_string(),
        Syntax::Opaque(label) => format!("<{label}>"),
        Syntax::Sequence(children) => children
            .iter()
            .map(grouped)
            .collect::<Vec<_>>()
            .join(" "),
        Syntax::Alternation(children) => children
            .iter()
            .map(fragment)
            .collect::<Vec<_>>()
            .join(" | "),
        Syntax::Repeat { inner, min, max } => {
            let base = grouped(inner);
            match (min, max) {
                (0, None) => format!("{base}*"),
                (1, None) => format!("{base}+"),
                (min, None) => format!("{base}{{{min},}}"),
                (min, Some(max)) => format!("{base}{{{min}, {max}}}"),
            }
        }
        Syntax::Optional(inner) => format!("{}?", grouped(inner)),
        Syntax::Lookahead { positive, inner } => {
            let mark = if *positive { "=" } else { "!" };
            format!("(?{mark} {})", fragment(inner))
        }
    }
}

/// Renders a fragment, parenthesizing compound shapes.
fn grouped(syntax: &Syntax) -> String {
    if syntax.is_atomic() {
        fragment(syntax)
    } else {
        format!("({})", fragment(syntax))
    }
}
