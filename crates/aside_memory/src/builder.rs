// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Builder for configuring in-memory stores.
//!
//! This module provides a builder API for `InMemoryStore` that abstracts the
//! underlying moka configuration, providing a stable API surface without
//! exposing moka's types.

use tick::Clock;

use crate::store::InMemoryStore;

/// Builder for configuring an `InMemoryStore`.
///
/// # Examples
///
/// ```
/// use aside_memory::InMemoryStore;
/// use tick::Clock;
///
/// let store = InMemoryStore::builder(Clock::new_frozen())
///     .max_capacity(1000)
///     .initial_capacity(100)
///     .name("account-cache")
///     .build();
/// ```
#[derive(Debug)]
pub struct InMemoryStoreBuilder {
    pub(crate) clock: Clock,
    pub(crate) max_capacity: Option<u64>,
    pub(crate) initial_capacity: Option<usize>,
    pub(crate) name: Option<String>,
}

impl InMemoryStoreBuilder {
    /// Creates a new builder with default settings.
    ///
    /// The default configuration creates an unbounded store with moka's
    /// `TinyLFU` eviction policy. TTL deadlines are always evaluated against
    /// the given clock.
    #[must_use]
    pub fn new(clock: Clock) -> Self {
        Self {
            clock,
            max_capacity: None,
            initial_capacity: None,
            name: None,
        }
    }

    /// Sets the maximum capacity of the store.
    ///
    /// Once the capacity is reached, entries are evicted to make room for
    /// new entries. If not set, the store is unbounded (limited only by
    /// available memory).
    #[must_use]
    pub fn max_capacity(mut self, capacity: u64) -> Self {
        self.max_capacity = Some(capacity);
        self
    }

    /// Sets the initial capacity (pre-allocation hint) for the store.
    ///
    /// This can improve performance by avoiding reallocations during initial
    /// population. The store may still grow beyond this size.
    #[must_use]
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = Some(capacity);
        self
    }

    /// Sets a name for the store.
    ///
    /// The name may appear in logs or debugging output from the underlying
    /// cache implementation.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Builds the configured `InMemoryStore`.
    #[must_use]
    pub fn build(self) -> InMemoryStore {
        InMemoryStore::from_builder(self)
    }
}
