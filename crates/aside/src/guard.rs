// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The penetration guard: empty-result sentinels.
//!
//! A key whose computation legitimately yields nothing would otherwise be
//! recomputed on every call (cache penetration). The guard stores a sentinel
//! under a derived marker key meaning "this key was last computed to
//! nothing"; the dispatcher then serves an empty result without invoking the
//! computation until the sentinel expires.

use std::time::Duration;

use aside_store::{CacheStore, Error};

/// Suffix appended to a real key to form its empty-marker sentinel key.
pub const EMPTY_KEY_SUFFIX: &str = ":EMPTY_KEY";

/// The value stored under a sentinel key.
pub const EMPTY_VALUE: &str = "EMPTY_OBJ";

/// Returns the sentinel key marking `key` as "computed to nothing".
///
/// The derivation is deterministic so readers and writers agree without
/// coordination.
#[must_use]
pub fn sentinel_key(key: &str) -> String {
    format!("{key}{EMPTY_KEY_SUFFIX}")
}

/// Returns `true` when `key` was last computed to nothing.
///
/// # Errors
///
/// Propagates the store's error; the dispatcher treats it like any other
/// store failure.
pub async fn is_marked_empty<S: CacheStore>(store: &S, key: &str) -> Result<bool, Error> {
    Ok(store.get(&sentinel_key(key)).await?.is_some())
}

/// Marks `key` as "computed to nothing" for `ttl`.
///
/// Writes only the sentinel key, never the real key.
///
/// # Errors
///
/// Propagates the store's error.
pub async fn mark_empty<S: CacheStore>(store: &S, key: &str, ttl: Duration) -> Result<(), Error> {
    store.put(&sentinel_key(key), EMPTY_VALUE, ttl).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use aside_store::testing::RecordingStore;

    fn block_on<F: Future>(f: F) -> F::Output {
        futures::executor::block_on(f)
    }

    #[test]
    fn sentinel_key_is_deterministic() {
        assert_eq!(sentinel_key("ACCOUNT:5"), "ACCOUNT:5:EMPTY_KEY");
        assert_eq!(sentinel_key("ACCOUNT:5"), sentinel_key("ACCOUNT:5"));
    }

    #[test]
    fn mark_empty_writes_only_the_sentinel() {
        block_on(async {
            let store = RecordingStore::new();

            mark_empty(&store, "ACCOUNT:5", Duration::from_secs(300))
                .await
                .expect("mark failed");

            assert!(!store.contains_key("ACCOUNT:5"));
            assert_eq!(store.value_of("ACCOUNT:5:EMPTY_KEY").as_deref(), Some(EMPTY_VALUE));
        });
    }

    #[test]
    fn marked_key_reads_as_empty() {
        block_on(async {
            let store = RecordingStore::new();

            assert!(!is_marked_empty(&store, "ACCOUNT:5").await.expect("check failed"));

            mark_empty(&store, "ACCOUNT:5", Duration::from_secs(300))
                .await
                .expect("mark failed");

            assert!(is_marked_empty(&store, "ACCOUNT:5").await.expect("check failed"));
        });
    }
}
