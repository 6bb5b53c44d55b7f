// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Integration tests for batched multi-key GET dispatch.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use aside::{BatchComputation, Bindings, CacheAside, CacheDirective, KeyFragment, ResultShape};
use aside_store::testing::{RecordingStore, StoreOp};

fn block_on<F: Future>(f: F) -> F::Output {
    futures::executor::block_on(f)
}

fn args(ids: &[u64]) -> Bindings {
    let mut map = Bindings::new();
    map.insert("ids".to_owned(), serde_json::json!(ids));
    map
}

fn users_directive() -> CacheDirective {
    CacheDirective::get("USER")
        .shaped(ResultShape::Sequence)
        .fragment(KeyFragment::new("ids").connector(":").multi())
}

/// A batch computation that resolves `user-{id}` names, recording how it was
/// invoked. `absent` ids resolve to `None`.
struct UserBatch {
    ids: Vec<u64>,
    absent: Vec<u64>,
    subset_calls: Mutex<Vec<Vec<usize>>>,
    full_calls: AtomicUsize,
}

impl UserBatch {
    fn new(ids: &[u64]) -> Self {
        Self {
            ids: ids.to_vec(),
            absent: Vec::new(),
            subset_calls: Mutex::new(Vec::new()),
            full_calls: AtomicUsize::new(0),
        }
    }

    fn with_absent(ids: &[u64], absent: &[u64]) -> Self {
        Self {
            absent: absent.to_vec(),
            ..Self::new(ids)
        }
    }

    fn resolve(&self, id: u64) -> Option<String> {
        if self.absent.contains(&id) {
            None
        } else {
            Some(format!("user-{id}"))
        }
    }
}

impl BatchComputation for UserBatch {
    type Item = String;
    type Error = std::io::Error;

    async fn invoke(&self) -> Result<Vec<Option<String>>, std::io::Error> {
        self.full_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.ids.iter().map(|id| self.resolve(*id)).collect())
    }

    async fn invoke_subset(&self, positions: &[usize]) -> Result<Vec<Option<String>>, std::io::Error> {
        self.subset_calls.lock().expect("lock poisoned").push(positions.to_vec());
        Ok(positions.iter().map(|position| self.resolve(self.ids[*position])).collect())
    }
}

#[test]
fn batch_invokes_only_for_missed_positions_and_merges_in_order() {
    block_on(async {
        let store = RecordingStore::new();
        store.seed("USER:1", "\"user-1\"");
        store.seed("USER:3", "\"user-3\"");
        let engine = CacheAside::builder(store.clone()).build();

        let computation = UserBatch::new(&[1, 2, 3]);
        let merged = engine
            .execute_batch(&users_directive(), &args(&[1, 2, 3]), &computation)
            .await
            .expect("execute failed");

        assert_eq!(
            merged,
            vec![
                Some("user-1".to_owned()),
                Some("user-2".to_owned()),
                Some("user-3".to_owned())
            ]
        );
        assert_eq!(*computation.subset_calls.lock().expect("lock poisoned"), vec![vec![1]]);
        assert_eq!(computation.full_calls.load(Ordering::SeqCst), 0);

        // The recomputed miss was written back in one multi-put.
        assert_eq!(store.value_of("USER:2").as_deref(), Some("\"user-2\""));
        assert!(store.operations().iter().any(|op| matches!(
            op,
            StoreOp::MultiPut { ttl, entries }
                if *ttl == Duration::from_secs(1800) && entries == &[("USER:2".to_owned(), "\"user-2\"".to_owned())]
        )));
    });
}

#[test]
fn batch_with_all_hits_never_invokes() {
    block_on(async {
        let store = RecordingStore::new();
        store.seed("USER:1", "\"user-1\"");
        store.seed("USER:2", "\"user-2\"");
        let engine = CacheAside::builder(store).build();

        let computation = UserBatch::new(&[1, 2]);
        let merged = engine
            .execute_batch(&users_directive(), &args(&[1, 2]), &computation)
            .await
            .expect("execute failed");

        assert_eq!(merged, vec![Some("user-1".to_owned()), Some("user-2".to_owned())]);
        assert!(computation.subset_calls.lock().expect("lock poisoned").is_empty());
        assert_eq!(computation.full_calls.load(Ordering::SeqCst), 0);
    });
}

#[test]
fn batch_null_positions_stay_uncached_and_recompute() {
    block_on(async {
        let store = RecordingStore::new();
        let engine = CacheAside::builder(store.clone()).build();

        let computation = UserBatch::with_absent(&[1, 2], &[2]);

        let merged = engine
            .execute_batch(&users_directive(), &args(&[1, 2]), &computation)
            .await
            .expect("execute failed");
        assert_eq!(merged, vec![Some("user-1".to_owned()), None]);
        assert!(store.contains_key("USER:1"));
        assert!(!store.contains_key("USER:2"));
        assert!(!store.contains_key("USER:2:EMPTY_KEY"), "the batch path writes no sentinels");

        // The null position misses again on the next call.
        let _ = engine
            .execute_batch(&users_directive(), &args(&[1, 2]), &computation)
            .await
            .expect("execute failed");
        assert_eq!(*computation.subset_calls.lock().expect("lock poisoned"), vec![vec![0, 1], vec![1]]);
    });
}

#[test]
fn batch_with_all_nulls_issues_no_multi_put() {
    block_on(async {
        let store = RecordingStore::new();
        let engine = CacheAside::builder(store.clone()).build();

        let computation = UserBatch::with_absent(&[1, 2], &[1, 2]);
        let merged = engine
            .execute_batch(&users_directive(), &args(&[1, 2]), &computation)
            .await
            .expect("execute failed");

        assert_eq!(merged, vec![None, None]);
        assert!(!store.operations().iter().any(|op| matches!(op, StoreOp::MultiPut { .. })));
    });
}

#[test]
fn batch_computation_error_passes_through() {
    block_on(async {
        struct Failing;

        impl BatchComputation for Failing {
            type Item = String;
            type Error = std::io::Error;

            async fn invoke(&self) -> Result<Vec<Option<String>>, std::io::Error> {
                Err(std::io::Error::other("backend down"))
            }

            async fn invoke_subset(&self, _positions: &[usize]) -> Result<Vec<Option<String>>, std::io::Error> {
                Err(std::io::Error::other("backend down"))
            }
        }

        let engine = CacheAside::builder(RecordingStore::new()).build();
        let error = engine
            .execute_batch(&users_directive(), &args(&[1]), &Failing)
            .await
            .expect_err("should fail");
        assert_eq!(error.to_string(), "backend down");
    });
}

#[test]
fn batch_store_failure_degrades_to_a_full_invocation() {
    block_on(async {
        let store = RecordingStore::new();
        store.fail_when(|op| matches!(op, StoreOp::MultiGet(_)));
        let engine = CacheAside::builder(store).build();

        let computation = UserBatch::new(&[1, 2]);
        let merged = engine
            .execute_batch(&users_directive(), &args(&[1, 2]), &computation)
            .await
            .expect("execute failed");

        assert_eq!(merged, vec![Some("user-1".to_owned()), Some("user-2".to_owned())]);
        assert_eq!(computation.full_calls.load(Ordering::SeqCst), 1);
        assert!(computation.subset_calls.lock().expect("lock poisoned").is_empty());
    });
}

#[test]
fn batch_requires_a_sequence_shaped_get() {
    block_on(async {
        let store = RecordingStore::new();
        let engine = CacheAside::builder(store.clone()).build();

        // Value-shaped directive: not batchable, degrades to a full invocation.
        let directive = CacheDirective::get("USER").fragment(KeyFragment::new("ids").connector(":").multi());

        let computation = UserBatch::new(&[1, 2]);
        let merged = engine
            .execute_batch(&directive, &args(&[1, 2]), &computation)
            .await
            .expect("execute failed");

        assert_eq!(merged, vec![Some("user-1".to_owned()), Some("user-2".to_owned())]);
        assert_eq!(computation.full_calls.load(Ordering::SeqCst), 1);
        assert!(store.operations().is_empty());
    });
}

#[test]
fn batch_without_a_multi_fragment_degrades() {
    block_on(async {
        let store = RecordingStore::new();
        let engine = CacheAside::builder(store.clone()).build();

        let directive = CacheDirective::get("USER")
            .shaped(ResultShape::Sequence)
            .fragment(KeyFragment::new("ids").connector(":"));
        let mut map = Bindings::new();
        map.insert("ids".to_owned(), serde_json::json!("all"));

        let computation = UserBatch::new(&[1]);
        let merged = engine.execute_batch(&directive, &map, &computation).await.expect("execute failed");

        assert_eq!(merged, vec![Some("user-1".to_owned())]);
        assert_eq!(computation.full_calls.load(Ordering::SeqCst), 1);
    });
}

#[test]
fn batch_mput_failure_still_returns_the_merged_result() {
    block_on(async {
        let store = RecordingStore::new();
        store.fail_when(|op| matches!(op, StoreOp::MultiPut { .. }));
        let engine = CacheAside::builder(store.clone()).build();

        let computation = UserBatch::new(&[1]);
        let merged = engine
            .execute_batch(&users_directive(), &args(&[1]), &computation)
            .await
            .expect("execute failed");

        assert_eq!(merged, vec![Some("user-1".to_owned())]);
        assert_eq!(computation.full_calls.load(Ordering::SeqCst), 0, "a failed write-back must not re-invoke");
        assert!(!store.contains_key("USER:1"));
    });
}
