// Copyright (c) Microsoft Corporation.

//! Simple Cache-Aside Example
//!
//! Demonstrates the basic GET flow: first call computes and stores, second
//! call is served from the store.

use aside::{Bindings, CacheAside, CacheDirective, KeyFragment};
use aside_memory::InMemoryStore;
use tick::Clock;

#[tokio::main]
async fn main() {
    let clock = Clock::new_tokio();
    let engine = CacheAside::builder(InMemoryStore::new(clock)).build();

    // One directive per call site: GET under "ACCOUNT:{id}" with a 60 second TTL.
    let directive = CacheDirective::get("ACCOUNT")
        .fragment(KeyFragment::new("id").connector(":"))
        .expires_in(60);

    let mut args = Bindings::new();
    args.insert("id".to_owned(), serde_json::json!(5));

    // First call misses and invokes the (expensive) computation.
    let computation = || async {
        println!("computing account 5...");
        Ok::<_, std::io::Error>(Some("Alice".to_owned()))
    };
    let value: Option<String> = engine
        .execute(&directive, &args, &computation)
        .await
        .expect("computation failed");
    println!("first call:  {value:?}");

    // Second call is a hit; the computation does not run again.
    let value: Option<String> = engine
        .execute(&directive, &args, &computation)
        .await
        .expect("computation failed");
    println!("second call: {value:?}");
}
