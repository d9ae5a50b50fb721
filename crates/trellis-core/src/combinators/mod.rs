// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Control-flow combinators.
//!
//! Parsers compose through a small algebra: sequencing ([`and`],
//! [`combine`]), ordered alternation ([`or`], [`first`]), repetition
//! ([`list`], [`non_greedy_list`]), lookahead, associative application
//! ([`left_apply`], [`right_apply`]), value-directed continuation
//! ([`chain()`], [`choose`], [`continue_with`]), memoization ([`cached`]),
//! scoped data injection ([`data_context`]), transformation ([`map`],
//! [`named`], [`optional`]), mutable indirection ([`replaceable()`]),
//! imperative composition ([`sequential()`]), panic-mode recovery
//! ([`synchronize()`]), and the panic-absorbing [`attempt`] boundary.
//!
//! Shared contract: a failing combinator rewinds the sequence to the
//! position it started from and reports zero consumption, unless its
//! module documents otherwise (only [`synchronize()`] does). A successful
//! sequencing combinator consumes exactly the sum of its parts.

pub mod alternation;
pub mod apply;
pub mod cache;
pub mod chain;
pub mod data;
pub mod lookahead;
pub mod repetition;
pub mod replaceable;
pub mod sequencing;
pub mod sequential;
pub mod synchronize;
pub mod transform;
pub mod try_parser;


pub use alternation::{first, or};
pub use apply::{left_apply, right_apply, Quantifier};
pub use cache::cached;
pub use chain::{chain, choose, continue_with};
pub use data::{data_context, data_value, get_data};
pub use lookahead::{negative_lookahead, positive_lookahead};
pub use repetition::{list, list_bounded, non_greedy_list, separated_list};
pub use replaceable::{replaceable, Replaceable};
pub use sequencing::{and, combine, ParserTuple};
pub use sequential::{sequential, StepFailure, Stepper};
pub use synchronize::synchronize;
pub use transform::{each, first_of, longest_of, map, named, optional, produce_multi};
pub use try_parser::attempt;
