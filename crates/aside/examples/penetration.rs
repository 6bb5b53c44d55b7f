// Copyright (c) Microsoft Corporation.

//! Penetration Guard Example
//!
//! A key whose computation yields nothing would be recomputed on every call.
//! With empty-result caching enabled (the default), the engine stores a
//! sentinel instead and serves "nothing" from the cache until it expires.

use aside::{Bindings, CacheAside, CacheDirective, KeyFragment};
use aside_memory::InMemoryStore;
use tick::Clock;

#[tokio::main]
async fn main() {
    let clock = Clock::new_tokio();
    let engine = CacheAside::builder(InMemoryStore::new(clock)).build();

    // Empty results are remembered for 30 seconds.
    let directive = CacheDirective::get("ACCOUNT")
        .fragment(KeyFragment::new("id").connector(":"))
        .empty_expires_in(30);

    let mut args = Bindings::new();
    args.insert("id".to_owned(), serde_json::json!(404));

    let computation = || async {
        println!("looking up account 404 in the backend...");
        Ok::<Option<String>, std::io::Error>(None)
    };

    // First call hits the backend and records the empty marker.
    let value = engine
        .execute(&directive, &args, &computation)
        .await
        .expect("computation failed");
    println!("first call:  {value:?}");

    // Subsequent calls are answered by the sentinel; the backend stays quiet.
    let value = engine
        .execute(&directive, &args, &computation)
        .await
        .expect("computation failed");
    println!("second call: {value:?}");
}
