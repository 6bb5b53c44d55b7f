// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Store-side abstractions for cache-aside orchestration.
//!
//! This crate defines the [`CacheStore`] trait that physical key-value stores
//! must satisfy, along with the opaque [`Error`] type for fallible store
//! operations.
//!
//! # Overview
//!
//! The store abstraction separates physical storage concerns from cache-aside
//! policy. Implement [`CacheStore`] for your backend (an embedded map, a
//! remote cache service, a client library wrapper), then let the `aside`
//! engine drive it. Keys and values are plain strings; the engine's codec is
//! responsible for turning domain values into storable strings and back.
//!
//! # Implementing a Store
//!
//! Implement all five required methods of [`CacheStore`]:
//!
//! ```
//! use aside_store::{CacheStore, Error};
//! use std::collections::HashMap;
//! use std::sync::RwLock;
//! use std::time::Duration;
//!
//! struct SimpleStore(RwLock<HashMap<String, String>>);
//!
//! impl CacheStore for SimpleStore {
//!     async fn get(&self, key: &str) -> Result<Option<String>, Error> {
//!         Ok(self.0.read().unwrap().get(key).cloned())
//!     }
//!
//!     async fn put(&self, key: &str, value: &str, _ttl: Duration) -> Result<(), Error> {
//!         self.0.write().unwrap().insert(key.to_owned(), value.to_owned());
//!         Ok(())
//!     }
//!
//!     async fn remove(&self, key: &str) -> Result<(), Error> {
//!         self.0.write().unwrap().remove(key);
//!         Ok(())
//!     }
//!
//!     async fn mget(&self, keys: &[String]) -> Result<Vec<Option<String>>, Error> {
//!         let data = self.0.read().unwrap();
//!         Ok(keys.iter().map(|key| data.get(key).cloned()).collect())
//!     }
//!
//!     async fn mput(&self, _ttl: Duration, entries: &[(String, String)]) -> Result<(), Error> {
//!         let mut data = self.0.write().unwrap();
//!         for (key, value) in entries {
//!             data.insert(key.clone(), value.clone());
//!         }
//!         Ok(())
//!     }
//! }
//! ```
//!
//! # Testing
//!
//! Enable the `test-util` feature for [`testing::RecordingStore`], an
//! in-memory store that records every operation and supports failure
//! injection for exercising degradation paths.

mod error;
mod store;
#[cfg(any(feature = "test-util", test))]
pub mod testing;

#[doc(inline)]
pub use error::{Error, Result};
#[doc(inline)]
pub use store::CacheStore;
