// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! In-memory store implementation using moka.
//!
//! This module provides an in-memory cache store backed by the moka crate,
//! which offers high-performance concurrent caching with eviction policies.

use std::time::{Duration, SystemTime};

use aside_store::{CacheStore, Error};
use moka::future::Cache;
use tick::Clock;

use crate::builder::InMemoryStoreBuilder;

/// A value held by the store together with its expiry deadline.
///
/// `expires_at` is `None` only when the deadline computation overflowed,
/// which amounts to "never expires".
#[derive(Clone, Debug)]
pub(crate) struct StoredValue {
    pub(crate) value: String,
    pub(crate) expires_at: Option<SystemTime>,
}

impl StoredValue {
    fn is_live(&self, now: SystemTime) -> bool {
        self.expires_at.is_none_or(|deadline| now <= deadline)
    }
}

/// An in-memory cache store backed by moka.
///
/// TTLs are turned into absolute deadlines using the injected clock when an
/// entry is written, and checked against the same clock when it is read.
/// Entries past their deadline are dropped lazily on read; moka's
/// capacity-based eviction bounds memory in between.
///
/// # Examples
///
/// ```
/// use aside_memory::InMemoryStore;
/// use aside_store::CacheStore;
/// use std::time::Duration;
/// use tick::Clock;
/// # futures::executor::block_on(async {
///
/// let store = InMemoryStore::new(Clock::new_frozen());
///
/// store.put("key", "value", Duration::from_secs(30)).await?;
/// assert_eq!(store.get("key").await?.as_deref(), Some("value"));
/// # Ok::<(), aside_store::Error>(())
/// # });
/// ```
#[derive(Clone)]
pub struct InMemoryStore {
    inner: Cache<String, StoredValue>,
    clock: Clock,
}

impl std::fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryStore").finish_non_exhaustive()
    }
}

impl InMemoryStore {
    /// Creates a new unbounded in-memory store.
    ///
    /// # Examples
    ///
    /// ```
    /// use aside_memory::InMemoryStore;
    /// use tick::Clock;
    ///
    /// let store = InMemoryStore::new(Clock::new_frozen());
    /// ```
    #[must_use]
    pub fn new(clock: Clock) -> Self {
        Self::builder(clock).build()
    }

    /// Creates a new in-memory store with a maximum capacity.
    ///
    /// Once the capacity is reached, entries are evicted using moka's
    /// `TinyLFU` policy (combination of LRU eviction and LFU admission).
    ///
    /// # Examples
    ///
    /// ```
    /// use aside_memory::InMemoryStore;
    /// use tick::Clock;
    ///
    /// let store = InMemoryStore::with_capacity(Clock::new_frozen(), 1000);
    /// ```
    #[must_use]
    pub fn with_capacity(clock: Clock, max_capacity: u64) -> Self {
        Self::builder(clock).max_capacity(max_capacity).build()
    }

    /// Creates a new builder for configuring an in-memory store.
    ///
    /// # Examples
    ///
    /// ```
    /// use aside_memory::InMemoryStore;
    /// use tick::Clock;
    ///
    /// let store = InMemoryStore::builder(Clock::new_frozen())
    ///     .max_capacity(1000)
    ///     .name("directory-cache")
    ///     .build();
    /// ```
    #[must_use]
    pub fn builder(clock: Clock) -> InMemoryStoreBuilder {
        InMemoryStoreBuilder::new(clock)
    }

    /// Constructs an `InMemoryStore` from a builder.
    pub(crate) fn from_builder(builder: InMemoryStoreBuilder) -> Self {
        let mut moka_builder = Cache::builder();

        if let Some(capacity) = builder.max_capacity {
            moka_builder = moka_builder.max_capacity(capacity);
        }

        if let Some(capacity) = builder.initial_capacity {
            moka_builder = moka_builder.initial_capacity(capacity);
        }

        if let Some(name) = builder.name.as_deref() {
            moka_builder = moka_builder.name(name);
        }

        Self {
            inner: moka_builder.build(),
            clock: builder.clock,
        }
    }
}

impl CacheStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, Error> {
        match self.inner.get(key).await {
            Some(stored) if stored.is_live(self.clock.system_time()) => Ok(Some(stored.value)),
            Some(_) => {
                // Past its deadline: drop it so capacity isn't held by dead entries.
                self.inner.invalidate(key).await;
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), Error> {
        let stored = StoredValue {
            value: value.to_owned(),
            expires_at: self.clock.system_time().checked_add(ttl),
        };
        self.inner.insert(key.to_owned(), stored).await;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), Error> {
        self.inner.invalidate(key).await;
        Ok(())
    }

    async fn mget(&self, keys: &[String]) -> Result<Vec<Option<String>>, Error> {
        let mut values = Vec::with_capacity(keys.len());
        for key in keys {
            values.push(self.get(key).await?);
        }
        Ok(values)
    }

    async fn mput(&self, ttl: Duration, entries: &[(String, String)]) -> Result<(), Error> {
        for (key, value) in entries {
            self.put(key, value, ttl).await?;
        }
        Ok(())
    }
}
