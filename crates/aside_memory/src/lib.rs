// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! In-memory cache store for cache-aside orchestration.
//!
//! This crate provides [`InMemoryStore`], a moka-backed implementation of
//! [`aside_store::CacheStore`]:
//! - Concurrent access with high performance
//! - Per-entry TTL deadlines evaluated against an injected [`tick::Clock`]
//! - Automatic capacity-based eviction
//!
//! Expired entries are dropped lazily on read; a frozen or controlled clock
//! makes TTL behavior fully deterministic in tests.
//!
//! # Examples
//!
//! ```
//! use aside_memory::InMemoryStore;
//! use aside_store::CacheStore;
//! use std::time::Duration;
//! use tick::Clock;
//! # futures::executor::block_on(async {
//!
//! let store = InMemoryStore::new(Clock::new_frozen());
//!
//! store.put("user:1", "\"Alice\"", Duration::from_secs(60)).await?;
//! let value = store.get("user:1").await?;
//! assert_eq!(value.as_deref(), Some("\"Alice\""));
//! # Ok::<(), aside_store::Error>(())
//! # });
//! ```

mod builder;
mod store;

#[doc(inline)]
pub use builder::InMemoryStoreBuilder;
#[doc(inline)]
pub use store::InMemoryStore;
