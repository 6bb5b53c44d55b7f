// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The core trait for physical cache stores.
//!
//! [`CacheStore`] defines the interface the cache-aside engine reads and
//! writes through. Implement the storage operations; policy (key derivation,
//! TTL resolution, penetration guarding, fail-open) lives in the `aside`
//! crate and never inspects store internals.

use std::time::Duration;

use crate::Error;

/// Trait for physical cache store implementations.
///
/// Keys and values are plain strings; the engine's codec turns domain values
/// into storable strings before they reach this trait. Implementations must
/// be independently thread-safe. Operations may block on network I/O and are
/// expected to carry their own timeout policy; the engine imposes none.
pub trait CacheStore: Send + Sync {
    /// Reads a value, returning `None` when the key is absent or expired.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, Error>> + Send;

    /// Writes a value with the given time-to-live.
    fn put(&self, key: &str, value: &str, ttl: Duration) -> impl Future<Output = Result<(), Error>> + Send;

    /// Evicts a key. Evicting an absent key is not an error.
    fn remove(&self, key: &str) -> impl Future<Output = Result<(), Error>> + Send;

    /// Reads many keys in one call.
    ///
    /// The result is positionally aligned with `keys`: element `i` is the
    /// value for `keys[i]` or `None` on a miss.
    fn mget(&self, keys: &[String]) -> impl Future<Output = Result<Vec<Option<String>>, Error>> + Send;

    /// Writes many entries in one call, all with the same time-to-live.
    fn mput(&self, ttl: Duration, entries: &[(String, String)]) -> impl Future<Output = Result<(), Error>> + Send;
}
