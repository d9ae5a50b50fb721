// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Parse outcomes.
//!
//! A [`ParseResult`] is the tagged outcome of a single-valued parse: either
//! a [`Success`] carrying the produced value, the number of input items
//! consumed, and the identity of the parser that produced it, or a
//! [`Failure`] carrying a message. Failures report zero consumption unless
//! the parser is documented as non-rewinding (panic-mode recovery).
//!
//! A [`MultiResult`] is the outcome of a multi-valued parse (the Earley
//! engine, [`each`][crate::combinators::each]): an ordered list of
//! alternatives, each with its own consumed count and a continuation
//! checkpoint that positions the sequence just past that alternative.
//!
//! Both carry a [`ResultData`] side channel: a closed bag of contextual
//! payloads (engine statistics, recovery error lists, captured panics) that
//! callers can inspect without affecting parse semantics.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use ecow::EcoString;

use crate::earley::EarleyStatistics;
use crate::parser::ParserId;
use crate::sequence::Checkpoint;
use crate::state::CacheStatistics;

/// A successful parse outcome.
#[derive(Debug, Clone)]
pub struct Success<V> {
    /// The produced value.
    pub value: V,
    /// Number of input items consumed.
    pub consumed: usize,
    /// Identity of the parser that produced this result.
    pub origin: ParserId,
    /// Contextual side-channel payloads.
    pub data: ResultData,
}

/// A failed parse outcome.
///
/// `consumed` is zero for every backtracking parser; only parsers documented
/// as non-rewinding (e.g. panic-mode recovery) report partial consumption.
#[derive(Debug, Clone)]
pub struct Failure {
    /// Human-readable reason for the failure.
    pub message: EcoString,
    /// Number of input items left consumed by this failure.
    pub consumed: usize,
    /// Identity of the parser that reported the failure.
    pub origin: ParserId,
    /// Contextual side-channel payloads.
    pub data: ResultData,
}

/// The tagged outcome of a single-valued parse.
#[derive(Debug, Clone)]
pub enum ParseResult<V> {
    /// The parser matched.
    Success(Success<V>),
    /// The parser did not match.
    Failure(Failure),
}

impl<V> ParseResult<V> {
    /// Creates a success result.
    #[must_use]
    pub fn success(value: V, consumed: usize, origin: ParserId) -> Self {
        Self::Success(Success {
            value,
            consumed,
            origin,
            data: ResultData::default(),
        })
    }

    /// Creates a zero-consumption failure result.
    #[must_use]
    pub fn failure(message: impl Into<EcoString>, origin: ParserId) -> Self {
        Self::Failure(Failure {
            message: message.into(),
            consumed: 0,
            origin,
            data: ResultData::default(),
        })
    }

    /// Creates a failure that left input consumed (non-rewinding parsers
    /// only).
    #[must_use]
    pub fn failure_consuming(
        message: impl Into<EcoString>,
        consumed: usize,
        origin: ParserId,
    ) -> Self {
        Self::Failure(Failure {
            message: message.into(),
            consumed,
            origin,
            data: ResultData::default(),
        })
    }

    /// Returns true for a success outcome.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The number of input items this result consumed.
    #[must_use]
    pub fn consumed(&self) -> usize {
        match self {
            Self::Success(s) => s.consumed,
            Self::Failure(f) => f.consumed,
        }
    }

    /// The identity of the parser that produced this result.
    #[must_use]
    pub fn origin(&self) -> ParserId {
        match self {
            Self::Success(s) => s.origin,
            Self::Failure(f) => f.origin,
        }
    }

    /// The produced value, consuming the result.
    #[must_use]
    pub fn value(self) -> Option<V> {
        match self {
            Self::Success(s) => Some(s.value),
            Self::Failure(_) => None,
        }
    }

    /// A reference to the produced value, if any.
    #[must_use]
    pub fn value_ref(&self) -> Option<&V> {
        match self {
            Self::Success(s) => Some(&s.value),
            Self::Failure(_) => None,
        }
    }

    /// The side-channel data bag.
    #[must_use]
    pub fn data(&self) -> &ResultData {
        match self {
            Self::Success(s) => &s.data,
            Self::Failure(f) => &f.data,
        }
    }

    /// Mutable access to the side-channel data bag.
    pub fn data_mut(&mut self) -> &mut ResultData {
        match self {
            Self::Success(s) => &mut s.data,
            Self::Failure(f) => &mut f.data,
        }
    }

    /// Attaches a data entry, builder-style.
    #[must_use]
    pub fn with_data(mut self, entry: DataEntry) -> Self {
        self.data_mut().push(entry);
        self
    }

    /// Maps the success value, leaving failures (and all bookkeeping)
    /// untouched.
    pub fn map<W>(self, f: impl FnOnce(V) -> W) -> ParseResult<W> {
        match self {
            Self::Success(s) => ParseResult::Success(Success {
                value: f(s.value),
                consumed: s.consumed,
                origin: s.origin,
                data: s.data,
            }),
            Self::Failure(f) => ParseResult::Failure(f),
        }
    }

    /// Unwraps the success value.
    ///
    /// # Panics
    ///
    /// Panics with the failure message if the result is a failure. Intended
    /// for tests and examples.
    #[must_use]
    #[track_caller]
    pub fn unwrap(self) -> V {
        match self {
            Self::Success(s) => s.value,
            Self::Failure(f) => panic!("called `unwrap` on a parse failure: {}", f.message),
        }
    }
}

/// One alternative inside a [`MultiResult`].
#[derive(Debug, Clone)]
pub enum MultiAlternative<V> {
    /// An alternative that matched.
    Success {
        /// The produced value.
        value: V,
        /// Items consumed from the multi-parse start position.
        consumed: usize,
        /// Checkpoint positioned just past this alternative's input.
        continuation: Checkpoint,
    },
    /// An alternative that did not match.
    Failure {
        /// Human-readable reason for the failure.
        message: EcoString,
    },
}

impl<V> MultiAlternative<V> {
    /// Returns true for a success alternative.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The alternative's value, if it matched.
    #[must_use]
    pub fn value(&self) -> Option<&V> {
        match self {
            Self::Success { value, .. } => Some(value),
            Self::Failure { .. } => None,
        }
    }

    /// The alternative's consumed count, if it matched.
    #[must_use]
    pub fn consumed(&self) -> Option<usize> {
        match self {
            Self::Success { consumed, .. } => Some(*consumed),
            Self::Failure { .. } => None,
        }
    }
}

/// The outcome of a multi-valued parse.
///
/// The producing parser leaves the sequence rewound to the start position;
/// each success alternative carries a continuation checkpoint callers can
/// rewind to in order to resume parsing after that alternative.
#[derive(Debug, Clone)]
pub struct MultiResult<V> {
    /// Identity of the parser that produced this result.
    pub origin: ParserId,
    /// Checkpoint at the position the multi-parse started from.
    pub start: Checkpoint,
    /// Ordered alternatives (ranked by the producing parser).
    pub alternatives: Vec<MultiAlternative<V>>,
    /// Contextual side-channel payloads.
    pub data: ResultData,
}

impl<V> MultiResult<V> {
    /// Returns true if at least one alternative matched.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.alternatives.iter().any(MultiAlternative::is_success)
    }

    /// Iterates over the success alternatives as `(value, consumed)` pairs.
    pub fn successes(&self) -> impl Iterator<Item = (&V, usize)> {
        self.alternatives.iter().filter_map(|alt| match alt {
            MultiAlternative::Success {
                value, consumed, ..
            } => Some((value, *consumed)),
            MultiAlternative::Failure { .. } => None,
        })
    }

    /// The success alternative that consumed the most input.
    #[must_use]
    pub fn longest(&self) -> Option<&MultiAlternative<V>> {
        self.alternatives
            .iter()
            .filter(|alt| alt.is_success())
            .max_by_key(|alt| alt.consumed().unwrap_or(0))
    }
}

/// A closed, ordered bag of side-channel payloads attached to a result.
#[derive(Debug, Clone, Default)]
pub struct ResultData {
    entries: Vec<DataEntry>,
}

/// The payload kinds a result can carry.
#[derive(Debug, Clone)]
pub enum DataEntry {
    /// Earley engine counters for the parse that produced the result.
    EarleyStatistics(EarleyStatistics),
    /// Cache counters snapshot taken when the result was produced.
    CacheStatistics(CacheStatistics),
    /// Panic-mode recovery report.
    Recovery(RecoveryReport),
    /// Message of a panic captured by the `Try` boundary.
    CaughtPanic(EcoString),
}

impl ResultData {
    /// Appends an entry.
    pub fn push(&mut self, entry: DataEntry) {
        self.entries.push(entry);
    }

    /// Returns true if the bag is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over all entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &DataEntry> {
        self.entries.iter()
    }

    /// The most recent Earley statistics entry, if any.
    #[must_use]
    pub fn earley_statistics(&self) -> Option<&EarleyStatistics> {
        self.entries.iter().rev().find_map(|e| match e {
            DataEntry::EarleyStatistics(stats) => Some(stats),
            _ => None,
        })
    }

    /// The most recent cache statistics entry, if any.
    #[must_use]
    pub fn cache_statistics(&self) -> Option<&CacheStatistics> {
        self.entries.iter().rev().find_map(|e| match e {
            DataEntry::CacheStatistics(stats) => Some(stats),
            _ => None,
        })
    }

    /// The most recent panic-mode recovery report, if any.
    #[must_use]
    pub fn recovery(&self) -> Option<&RecoveryReport> {
        self.entries.iter().rev().find_map(|e| match e {
            DataEntry::Recovery(report) => Some(report),
            _ => None,
        })
    }

    /// The most recent captured panic message, if any.
    #[must_use]
    pub fn caught_panic(&self) -> Option<&EcoString> {
        self.entries.iter().rev().find_map(|e| match e {
            DataEntry::CaughtPanic(message) => Some(message),
            _ => None,
        })
    }
}

/// One recovered-from error recorded by panic-mode recovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryError {
    /// The failure message from the attempt that triggered recovery.
    pub message: EcoString,
    /// Absolute consumed-count at which the failed attempt started.
    pub position: usize,
    /// Items discarded before the next retry.
    pub discarded: usize,
}

/// The full report attached by panic-mode recovery.
#[derive(Clone)]
pub struct RecoveryReport {
    /// All recovered-from errors, in encounter order.
    pub errors: Vec<RecoveryError>,
    /// The final successful sub-result, when a retry eventually matched.
    pub recovered: Option<RecoveredValue>,
}

impl fmt::Debug for RecoveryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecoveryReport")
            .field("errors", &self.errors)
            .field("recovered", &self.recovered.as_ref().map(|r| r.consumed))
            .finish()
    }
}

/// A type-erased successful sub-result recorded for diagnostics.
#[derive(Clone)]
pub struct RecoveredValue {
    value: Rc<dyn Any>,
    /// Items the final successful attempt consumed.
    pub consumed: usize,
}

impl RecoveredValue {
    pub(crate) fn new<V: 'static>(value: V, consumed: usize) -> Self {
        Self {
            value: Rc::new(value),
            consumed,
        }
    }

    /// Downcasts the recovered value to its concrete type.
    #[must_use]
    pub fn downcast<V: 'static>(&self) -> Option<&V> {
        self.value.downcast_ref()
    }
}
