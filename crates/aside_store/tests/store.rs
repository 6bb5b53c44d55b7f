// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Integration tests for the `CacheStore` trait contract.

use aside_store::{CacheStore, Error};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Minimal implementation covering only the required surface.
struct MinimalStore {
    data: Mutex<HashMap<String, String>>,
}

impl MinimalStore {
    fn new() -> Self {
        Self {
            data: Mutex::new(HashMap::new()),
        }
    }
}

impl CacheStore for MinimalStore {
    async fn get(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self.data.lock().expect("lock poisoned").get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str, _ttl: Duration) -> Result<(), Error> {
        self.data
            .lock()
            .expect("lock poisoned")
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), Error> {
        self.data.lock().expect("lock poisoned").remove(key);
        Ok(())
    }

    async fn mget(&self, keys: &[String]) -> Result<Vec<Option<String>>, Error> {
        let data = self.data.lock().expect("lock poisoned");
        Ok(keys.iter().map(|key| data.get(key).cloned()).collect())
    }

    async fn mput(&self, _ttl: Duration, entries: &[(String, String)]) -> Result<(), Error> {
        let mut data = self.data.lock().expect("lock poisoned");
        for (key, value) in entries {
            data.insert(key.clone(), value.clone());
        }
        Ok(())
    }
}

const TTL: Duration = Duration::from_secs(60);

#[tokio::test]
async fn get_miss_returns_none() {
    let store = MinimalStore::new();
    let result = store.get("missing").await.expect("get failed");
    assert!(result.is_none());
}

#[tokio::test]
async fn put_then_get_round_trips() {
    let store = MinimalStore::new();

    store.put("k", "v", TTL).await.expect("put failed");
    let result = store.get("k").await.expect("get failed");

    assert_eq!(result, Some("v".to_owned()));
}

#[tokio::test]
async fn remove_is_idempotent() {
    let store = MinimalStore::new();

    store.put("k", "v", TTL).await.expect("put failed");
    store.remove("k").await.expect("remove failed");
    store.remove("k").await.expect("second remove failed");

    assert!(store.get("k").await.expect("get failed").is_none());
}

#[tokio::test]
async fn mget_aligns_results_with_keys() {
    let store = MinimalStore::new();
    store.put("a", "1", TTL).await.expect("put failed");
    store.put("c", "3", TTL).await.expect("put failed");

    let keys = vec!["a".to_owned(), "b".to_owned(), "c".to_owned()];
    let values = store.mget(&keys).await.expect("mget failed");

    assert_eq!(values, vec![Some("1".to_owned()), None, Some("3".to_owned())]);
}

#[tokio::test]
async fn mput_then_mget_round_trips() {
    let store = MinimalStore::new();

    let entries = vec![("a".to_owned(), "1".to_owned()), ("b".to_owned(), "2".to_owned())];
    store.mput(TTL, &entries).await.expect("mput failed");

    let keys = vec!["a".to_owned(), "b".to_owned()];
    let values = store.mget(&keys).await.expect("mget failed");
    assert_eq!(values, vec![Some("1".to_owned()), Some("2".to_owned())]);
}
