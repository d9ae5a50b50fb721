// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Per-invocation parse state.
//!
//! A [`ParseState`] is threaded through every parser node for the duration
//! of one top-level parse call. It borrows the input [`Sequence`], carries a
//! scoped name→value data context (pushed and popped by the `DataContext`
//! combinator), and optionally holds a [`ParseCache`] keyed by
//! `(parser identity, position)`.
//!
//! Cache handles are reference-counted and deliberately not `Send`:
//! concurrent parses must each supply their own cache (one mutator per
//! cache, per the toolkit's single-threaded execution model).

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use ecow::EcoString;

use crate::parser::ParserId;
use crate::result::ParseResult;
use crate::sequence::{Checkpoint, Sequence};

/// State threaded through all parser nodes during one parse invocation.
pub struct ParseState<'s, T> {
    input: &'s mut dyn Sequence<T>,
    frames: Vec<HashMap<EcoString, Rc<dyn Any>>>,
    cache: Option<ParseCache>,
}

impl<'s, T> ParseState<'s, T> {
    /// Creates a state over the given input with no cache.
    pub fn new(input: &'s mut dyn Sequence<T>) -> Self {
        Self {
            input,
            frames: vec![HashMap::new()],
            cache: None,
        }
    }

    /// Attaches a result cache, builder-style.
    #[must_use]
    pub fn with_cache(mut self, cache: ParseCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// The input sequence.
    pub fn input(&mut self) -> &mut (dyn Sequence<T> + 's) {
        &mut *self.input
    }

    /// The number of input items consumed so far.
    #[must_use]
    pub fn consumed(&self) -> usize {
        self.input.consumed()
    }

    /// Captures the current input position.
    #[must_use]
    pub fn checkpoint(&self) -> Checkpoint {
        self.input.checkpoint()
    }

    /// Restores a previously captured input position.
    pub fn rewind(&mut self, checkpoint: Checkpoint) {
        self.input.rewind(checkpoint);
    }

    /// The attached cache, if any.
    #[must_use]
    pub fn cache(&self) -> Option<&ParseCache> {
        self.cache.as_ref()
    }

    /// Pushes a new data-context frame holding the given values.
    pub fn push_data_frame(
        &mut self,
        values: impl IntoIterator<Item = (EcoString, Rc<dyn Any>)>,
    ) {
        self.frames.push(values.into_iter().collect());
    }

    /// Pops the innermost data-context frame.
    ///
    /// The base frame is never popped.
    pub fn pop_data_frame(&mut self) {
        if self.frames.len() > 1 {
            let _ = self.frames.pop();
        }
    }

    /// Looks up a named data value, innermost frame first.
    #[must_use]
    pub fn data_value(&self, name: &str) -> Option<Rc<dyn Any>> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(name).cloned())
    }

    /// Stores a named value in the innermost frame.
    pub fn set_data_value(&mut self, name: impl Into<EcoString>, value: Rc<dyn Any>) {
        if let Some(frame) = self.frames.last_mut() {
            let _ = frame.insert(name.into(), value);
        }
    }
}

/// Counters describing how a [`ParseCache`] has been used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStatistics {
    /// Total lookups.
    pub attempts: u64,
    /// Lookups that found a stored result.
    pub hits: u64,
    /// Lookups that found nothing.
    pub misses: u64,
}

/// A memoization cache for parse results, keyed by parser identity and
/// input position.
///
/// Handles are cheap clones of one shared store. The handle is `!Send` by
/// construction; supply one cache per in-flight parse.
#[derive(Clone, Default)]
pub struct ParseCache {
    inner: Rc<RefCell<CacheInner>>,
}

#[derive(Default)]
struct CacheInner {
    entries: HashMap<(ParserId, usize), Rc<dyn Any>>,
    statistics: CacheStatistics,
}

impl ParseCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot of the cache counters.
    #[must_use]
    pub fn statistics(&self) -> CacheStatistics {
        self.inner.borrow().statistics
    }

    /// Looks up a stored result, counting the attempt and its outcome.
    pub(crate) fn lookup<V: Clone + 'static>(
        &self,
        parser: ParserId,
        position: usize,
    ) -> Option<ParseResult<V>> {
        let mut inner = self.inner.borrow_mut();
        inner.statistics.attempts += 1;
        let stored = inner.entries.get(&(parser, position)).cloned();
        // A hit with a mismatched type would mean two parsers share an id,
        // which ParserId::fresh makes impossible.
        let result = stored.and_then(|entry| entry.downcast_ref::<ParseResult<V>>().cloned());
        if result.is_some() {
            inner.statistics.hits += 1;
        } else {
            inner.statistics.misses += 1;
        }
        result
    }

    /// Stores a result for later replay.
    pub(crate) fn store<V: Clone + 'static>(
        &self,
        parser: ParserId,
        position: usize,
        result: &ParseResult<V>,
    ) {
        let mut inner = self.inner.borrow_mut();
        let _ = inner
            .entries
            .insert((parser, position), Rc::new(result.clone()));
    }
}
