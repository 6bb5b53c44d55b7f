// Copyright (c) Microsoft Corporation.

//! Observability Example
//!
//! With the `logs` feature, every dispatch emits a structured tracing event:
//! hits, misses, stores, sentinel writes, and fallbacks. Run with:
//!
//! ```text
//! cargo run --example observed --features logs
//! ```

use aside::{Bindings, CacheAside, CacheDirective, CallTelemetry, KeyFragment};
use aside_memory::InMemoryStore;
use tick::Clock;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).init();

    let clock = Clock::new_tokio();
    let engine = CacheAside::builder(InMemoryStore::new(clock.clone()))
        .telemetry(CallTelemetry::new(clock))
        .build();

    let directive = CacheDirective::get("ACCOUNT").fragment(KeyFragment::new("id").connector(":"));
    let mut args = Bindings::new();
    args.insert("id".to_owned(), serde_json::json!(5));

    let computation = || async { Ok::<_, std::io::Error>(Some("Alice".to_owned())) };

    // Emits a miss + store event, then a hit event.
    let _: Option<String> = engine
        .execute(&directive, &args, &computation)
        .await
        .expect("computation failed");
    let _: Option<String> = engine
        .execute(&directive, &args, &computation)
        .await
        .expect("computation failed");
}
