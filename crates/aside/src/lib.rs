// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! A cache-aside orchestration engine.
//!
//! Given a [`CacheDirective`] describing *what to cache and how*, the engine
//! decides per intercepted computation whether to serve a cached result,
//! compute-and-store a fresh one, invalidate entries, or batch-resolve many
//! keys at once:
//!
//! - key derivation from structured directives ([`KeyFragment`]s with
//!   connectors and at most one multi-valued expansion),
//! - cache-aside GET / PUT / REMOVE semantics,
//! - empty-result sentinels to prevent cache penetration,
//! - per-call TTL overrides over process-wide defaults,
//! - a fail-open policy: failures inside the caching pipeline degrade to
//!   invoking the underlying computation directly.
//!
//! The computation, the key-fragment evaluator, the serialization codec, and
//! the physical store are injected capabilities ([`Computation`],
//! [`Evaluator`], [`Codec`], [`CacheStore`]); interception and directive
//! construction belong to the caller's layer.
//!
//! # Examples
//!
//! ## Cache-aside GET
//!
//! ```
//! use aside::{Bindings, CacheAside, CacheDirective, KeyFragment};
//! use aside_memory::InMemoryStore;
//! use tick::Clock;
//! # futures::executor::block_on(async {
//!
//! let engine = CacheAside::builder(InMemoryStore::new(Clock::new_frozen())).build();
//!
//! let directive = CacheDirective::get("ACCOUNT")
//!     .fragment(KeyFragment::new("id").connector(":"))
//!     .expires_in(60);
//!
//! let mut args = Bindings::new();
//! args.insert("id".to_owned(), serde_json::json!(5));
//!
//! // First call misses, computes, and stores under "ACCOUNT:5".
//! let computation = || async { Ok::<_, std::io::Error>(Some("Alice".to_owned())) };
//! let value: Option<String> = engine.execute(&directive, &args, &computation).await?;
//! assert_eq!(value.as_deref(), Some("Alice"));
//!
//! // Second call is served from the store; the computation never runs.
//! let unreachable = || async { Ok::<_, std::io::Error>(Some("recomputed".to_owned())) };
//! let value: Option<String> = engine.execute(&directive, &args, &unreachable).await?;
//! assert_eq!(value.as_deref(), Some("Alice"));
//! # Ok::<(), std::io::Error>(())
//! # });
//! ```
//!
//! ## Fail-open
//!
//! Caching failures never reach the caller: a broken directive, a failed key
//! derivation, or a store outage all degrade to a direct invocation.
//!
//! ```
//! use aside::{Bindings, CacheAside, CacheDirective};
//! use aside_memory::InMemoryStore;
//! use tick::Clock;
//! # futures::executor::block_on(async {
//!
//! let engine = CacheAside::builder(InMemoryStore::new(Clock::new_frozen())).build();
//!
//! // Empty key: invalid, but the caller still gets the computed value.
//! let directive = CacheDirective::get("");
//! let computation = || async { Ok::<_, std::io::Error>(Some(7_u32)) };
//! let value = engine.execute(&directive, &Bindings::new(), &computation).await?;
//! assert_eq!(value, Some(7));
//! # Ok::<(), std::io::Error>(())
//! # });
//! ```

pub mod builder;
mod codec;
mod compute;
mod directive;
mod dispatch;
mod error;
mod evaluate;
mod fallback;
pub mod guard;
mod key;
mod telemetry;
pub mod ttl;

#[doc(inline)]
pub use builder::CacheAsideBuilder;
#[doc(inline)]
pub use codec::{Codec, CodecError, JsonCodec};
#[doc(inline)]
pub use compute::{BatchComputation, Computation};
#[doc(inline)]
pub use directive::{CacheDirective, DirectiveError, KeyFragment, Operation, ResultShape};
#[doc(inline)]
pub use dispatch::CacheAside;
#[doc(inline)]
pub use error::DispatchError;
#[doc(inline)]
pub use evaluate::{Bindings, EvalError, Evaluator, FragmentValue, PathEvaluator};
#[doc(inline)]
pub use key::ResolvedKeys;
#[doc(inline)]
pub use telemetry::CallTelemetry;
#[doc(inline)]
pub use ttl::TtlConfig;

pub use aside_store::{CacheStore, Error as StoreError};

#[cfg(feature = "memory")]
#[doc(inline)]
pub use aside_memory::{InMemoryStore, InMemoryStoreBuilder};

#[cfg(any(feature = "test-util", test))]
#[doc(inline)]
pub use aside_store::testing::{RecordingStore, StoreOp};
