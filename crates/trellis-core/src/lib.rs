// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Trellis parsing toolkit core.
//!
//! This crate contains the toolkit's three layers:
//! - The combinator core: the [`Parser`] contract over rewindable
//!   [`Sequence`]s, leaf parsers, and control-flow combinators
//!   (sequencing, alternation, repetition, lookahead, associative
//!   application, continuation, caching, recovery)
//! - The [`earley`] engine for ambiguous and left/right-recursive
//!   context-free grammars, producing every derivation
//! - The [`pratt`] engine for operator-precedence expression grammars
//!   with user-defined binding powers
//!
//! Parsers work over any item type, not just characters; token matchers
//! for the engines are ordinary parsers rather than a separate lexer
//! layer. Execution is single-threaded and synchronous: graphs without
//! mutable cells are freely shared, while caches and
//! [`Replaceable`][combinators::Replaceable] cells are `Rc`-based and stay
//! on one thread.
//!
//! ```
//! use trellis_core::combinators::{combine, list_bounded, map};
//! use trellis_core::primitives::{match_char, match_item};
//! use trellis_core::TextParserExt;
//!
//! let digits = map(
//!     list_bounded(match_item("digit", |c: &char| c.is_ascii_digit()), 1, None),
//!     |ds| ds.iter().collect::<String>(),
//! );
//! let pair = combine((digits.clone(), match_char(','), digits), |(a, _, b)| (a, b));
//!
//! let result = pair.parse_text("12,34");
//! assert!(result.is_success());
//! assert_eq!(result.consumed(), 5);
//! ```

pub mod combinators;
pub mod earley;
pub mod error;
pub mod parser;
pub mod pratt;
pub mod primitives;
pub mod result;
pub mod sequence;
pub mod state;
pub mod syntax;

pub use error::GrammarError;
pub use parser::{
    MultiParser, MultiParserExt, MultiParserRef, Parser, ParserExt, ParserId, ParserRef,
    TextMultiParserExt, TextParserExt,
};
pub use result::{
    DataEntry, Failure, MultiAlternative, MultiResult, ParseResult, RecoveredValue,
    RecoveryError, RecoveryReport, ResultData, Success,
};
pub use sequence::{CharSequence, Checkpoint, IterSequence, Sequence, TokenSequence};
pub use state::{CacheStatistics, ParseCache, ParseState};
pub use syntax::Syntax;

/// Re-export of commonly used types.
pub mod prelude {
    pub use crate::parser::{
        MultiParser, MultiParserExt, Parser, ParserExt, ParserRef, TextMultiParserExt,
        TextParserExt,
    };
    pub use crate::result::{MultiResult, ParseResult};
    pub use crate::sequence::{CharSequence, Sequence, TokenSequence};
    pub use crate::state::ParseState;
}
