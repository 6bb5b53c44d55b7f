// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Recording store implementation for testing.
//!
//! This module provides [`RecordingStore`], an in-memory store that records
//! all operations and supports failure injection for testing degradation
//! paths.

use std::{collections::HashMap, sync::Arc, time::Duration};

use parking_lot::Mutex;

use crate::{CacheStore, Error};

/// Recorded store operation with full context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    /// A get operation was performed with the given key.
    Get(String),
    /// A put operation was performed.
    Put {
        /// The key that was written.
        key: String,
        /// The serialized value that was written.
        value: String,
        /// The time-to-live the caller requested.
        ttl: Duration,
    },
    /// A remove operation was performed with the given key.
    Remove(String),
    /// A multi-get operation was performed with the given keys.
    MultiGet(Vec<String>),
    /// A multi-put operation was performed.
    MultiPut {
        /// The time-to-live the caller requested.
        ttl: Duration,
        /// The key/value pairs that were written.
        entries: Vec<(String, String)>,
    },
}

type FailPredicate = Box<dyn Fn(&StoreOp) -> bool + Send + Sync>;

/// A configurable in-memory store for testing.
///
/// This store keeps values in a plain map and can be configured to fail
/// operations on demand, making it useful for testing fail-open behavior.
/// All operations are recorded for later verification. TTLs are recorded but
/// not enforced; use `aside_memory` when deadline behavior matters.
///
/// # Examples
///
/// ```
/// use aside_store::testing::{RecordingStore, StoreOp};
/// use aside_store::CacheStore;
/// use std::time::Duration;
///
/// # futures::executor::block_on(async {
/// let store = RecordingStore::new();
///
/// store.put("k", "v", Duration::from_secs(60)).await?;
/// assert_eq!(store.get("k").await?, Some("v".to_owned()));
///
/// assert_eq!(
///     store.operations(),
///     vec![
///         StoreOp::Put {
///             key: "k".to_owned(),
///             value: "v".to_owned(),
///             ttl: Duration::from_secs(60),
///         },
///         StoreOp::Get("k".to_owned()),
///     ]
/// );
/// # Ok::<(), aside_store::Error>(())
/// # });
/// ```
///
/// # Failure Injection
///
/// ```
/// use aside_store::testing::{RecordingStore, StoreOp};
/// use aside_store::CacheStore;
///
/// # futures::executor::block_on(async {
/// let store = RecordingStore::new();
///
/// // Fail all put operations while reads keep working.
/// store.fail_when(|op| matches!(op, StoreOp::Put { .. }));
/// assert!(store.get("k").await.is_ok());
/// # });
/// ```
pub struct RecordingStore {
    data: Arc<Mutex<HashMap<String, String>>>,
    operations: Arc<Mutex<Vec<StoreOp>>>,
    fail_when: Arc<Mutex<Option<FailPredicate>>>,
}

impl std::fmt::Debug for RecordingStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingStore")
            .field("data", &self.data)
            .field("operations", &self.operations)
            .field("fail_when", &self.fail_when.lock().is_some())
            .finish()
    }
}

impl Clone for RecordingStore {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
            operations: Arc::clone(&self.operations),
            fail_when: Arc::clone(&self.fail_when),
        }
    }
}

impl Default for RecordingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingStore {
    /// Creates a new empty recording store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: Arc::new(Mutex::new(HashMap::new())),
            operations: Arc::new(Mutex::new(Vec::new())),
            fail_when: Arc::new(Mutex::new(None)),
        }
    }

    /// Creates a recording store with pre-populated data.
    #[must_use]
    pub fn with_data(data: HashMap<String, String>) -> Self {
        Self {
            data: Arc::new(Mutex::new(data)),
            operations: Arc::new(Mutex::new(Vec::new())),
            fail_when: Arc::new(Mutex::new(None)),
        }
    }

    /// Inserts a value directly, without recording an operation.
    ///
    /// Useful for arranging store state before the code under test runs.
    pub fn seed(&self, key: impl Into<String>, value: impl Into<String>) {
        self.data.lock().insert(key.into(), value.into());
    }

    /// Returns the number of entries in the store.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.data.lock().len()
    }

    /// Returns true if the store contains the given key.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.lock().contains_key(key)
    }

    /// Returns the current raw value for a key, if any.
    #[must_use]
    pub fn value_of(&self, key: &str) -> Option<String> {
        self.data.lock().get(key).cloned()
    }

    /// Sets a predicate that determines when operations should fail.
    ///
    /// The predicate receives the operation and returns `true` if it should
    /// fail. Failing operations are still recorded.
    ///
    /// # Examples
    ///
    /// ```
    /// use aside_store::testing::{RecordingStore, StoreOp};
    ///
    /// let store = RecordingStore::new();
    ///
    /// // Fail everything
    /// store.fail_when(|_| true);
    ///
    /// // Fail only gets for a specific key
    /// store.fail_when(|op| matches!(op, StoreOp::Get(k) if k == "bad_key"));
    /// ```
    pub fn fail_when<F>(&self, predicate: F)
    where
        F: Fn(&StoreOp) -> bool + Send + Sync + 'static,
    {
        *self.fail_when.lock() = Some(Box::new(predicate));
    }

    /// Clears the failure predicate, allowing all operations to succeed.
    pub fn clear_failures(&self) {
        *self.fail_when.lock() = None;
    }

    /// Returns a clone of all recorded operations.
    #[must_use]
    pub fn operations(&self) -> Vec<StoreOp> {
        self.operations.lock().clone()
    }

    /// Clears all recorded operations.
    pub fn clear_operations(&self) {
        self.operations.lock().clear();
    }

    fn record(&self, op: StoreOp) {
        self.operations.lock().push(op);
    }

    fn should_fail(&self, op: &StoreOp) -> bool {
        self.fail_when.lock().as_ref().is_some_and(|predicate| predicate(op))
    }
}

impl CacheStore for RecordingStore {
    async fn get(&self, key: &str) -> Result<Option<String>, Error> {
        let op = StoreOp::Get(key.to_owned());
        if self.should_fail(&op) {
            self.record(op);
            return Err(Error::from_message("recording store: get failed"));
        }
        self.record(op);
        Ok(self.data.lock().get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), Error> {
        let op = StoreOp::Put {
            key: key.to_owned(),
            value: value.to_owned(),
            ttl,
        };
        if self.should_fail(&op) {
            self.record(op);
            return Err(Error::from_message("recording store: put failed"));
        }
        self.record(op);
        self.data.lock().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), Error> {
        let op = StoreOp::Remove(key.to_owned());
        if self.should_fail(&op) {
            self.record(op);
            return Err(Error::from_message("recording store: remove failed"));
        }
        self.record(op);
        self.data.lock().remove(key);
        Ok(())
    }

    async fn mget(&self, keys: &[String]) -> Result<Vec<Option<String>>, Error> {
        let op = StoreOp::MultiGet(keys.to_vec());
        if self.should_fail(&op) {
            self.record(op);
            return Err(Error::from_message("recording store: mget failed"));
        }
        self.record(op);
        let data = self.data.lock();
        Ok(keys.iter().map(|key| data.get(key).cloned()).collect())
    }

    async fn mput(&self, ttl: Duration, entries: &[(String, String)]) -> Result<(), Error> {
        let op = StoreOp::MultiPut {
            ttl,
            entries: entries.to_vec(),
        };
        if self.should_fail(&op) {
            self.record(op);
            return Err(Error::from_message("recording store: mput failed"));
        }
        self.record(op);
        let mut data = self.data.lock();
        for (key, value) in entries {
            data.insert(key.clone(), value.clone());
        }
        Ok(())
    }
}
