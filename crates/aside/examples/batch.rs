// Copyright (c) Microsoft Corporation.

//! Batched Multi-Key GET Example
//!
//! Resolves many keys in one dispatch: cached positions are served from the
//! store, the computation runs only for the missed positions, and results
//! merge back into the original order.

use aside::{BatchComputation, Bindings, CacheAside, CacheDirective, KeyFragment, ResultShape};
use aside_memory::InMemoryStore;
use tick::Clock;

/// Resolves user names by id, tracking which positions it was asked for.
struct UserLookup {
    ids: Vec<u64>,
}

impl BatchComputation for UserLookup {
    type Item = String;
    type Error = std::io::Error;

    async fn invoke(&self) -> Result<Vec<Option<String>>, std::io::Error> {
        println!("full lookup for {:?}", self.ids);
        Ok(self.ids.iter().map(|id| Some(format!("user-{id}"))).collect())
    }

    async fn invoke_subset(&self, positions: &[usize]) -> Result<Vec<Option<String>>, std::io::Error> {
        let subset: Vec<u64> = positions.iter().map(|position| self.ids[*position]).collect();
        println!("subset lookup for {subset:?}");
        Ok(subset.iter().map(|id| Some(format!("user-{id}"))).collect())
    }
}

#[tokio::main]
async fn main() {
    let clock = Clock::new_tokio();
    let engine = CacheAside::builder(InMemoryStore::new(clock)).build();

    let directive = CacheDirective::get("USER")
        .shaped(ResultShape::Sequence)
        .fragment(KeyFragment::new("ids").connector(":").multi());

    let ids = vec![1_u64, 2, 3];
    let mut args = Bindings::new();
    args.insert("ids".to_owned(), serde_json::json!(ids));

    let lookup = UserLookup { ids };

    // First dispatch: everything misses, one subset lookup for all positions.
    let users = engine
        .execute_batch(&directive, &args, &lookup)
        .await
        .expect("lookup failed");
    println!("first dispatch:  {users:?}");

    // Second dispatch: every position hits; no lookup at all.
    let users = engine
        .execute_batch(&directive, &args, &lookup)
        .await
        .expect("lookup failed");
    println!("second dispatch: {users:?}");
}
