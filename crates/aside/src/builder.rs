// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Builder for constructing cache-aside engines.
//!
//! This module provides the builder pattern infrastructure for configuring
//! the store, codec, evaluator, TTL defaults, and telemetry before
//! constructing a [`CacheAside`].

use crate::codec::{Codec, JsonCodec};
use crate::dispatch::CacheAside;
use crate::evaluate::PathEvaluator;
use crate::telemetry::CallTelemetry;
use crate::ttl::TtlConfig;

/// Builder for a [`CacheAside`] engine.
///
/// Created by calling [`CacheAside::builder`]. The codec defaults to
/// [`JsonCodec`] and the evaluator to [`PathEvaluator`]; both can be swapped
/// for custom capabilities.
///
/// # Examples
///
/// ```
/// use aside::{CacheAside, TtlConfig};
/// use aside_memory::InMemoryStore;
/// use tick::Clock;
///
/// let engine = CacheAside::builder(InMemoryStore::new(Clock::new_frozen()))
///     .ttls(TtlConfig::new(600, 60))
///     .build();
/// assert_eq!(engine.ttls().expire_seconds, 600);
/// ```
pub struct CacheAsideBuilder<S, C = JsonCodec, E = PathEvaluator> {
    store: S,
    codec: C,
    evaluator: E,
    ttls: TtlConfig,
    telemetry: Option<CallTelemetry>,
}

impl<S, C, E> std::fmt::Debug for CacheAsideBuilder<S, C, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheAsideBuilder")
            .field("ttls", &self.ttls)
            .finish_non_exhaustive()
    }
}

impl<S> CacheAsideBuilder<S> {
    pub(crate) fn new(store: S) -> Self {
        Self {
            store,
            codec: JsonCodec,
            evaluator: PathEvaluator,
            ttls: TtlConfig::default(),
            telemetry: None,
        }
    }
}

impl<S, C, E> CacheAsideBuilder<S, C, E> {
    /// Swaps in a custom serialization codec.
    #[must_use]
    pub fn codec<C2: Codec>(self, codec: C2) -> CacheAsideBuilder<S, C2, E> {
        CacheAsideBuilder {
            store: self.store,
            codec,
            evaluator: self.evaluator,
            ttls: self.ttls,
            telemetry: self.telemetry,
        }
    }

    /// Swaps in a custom key-fragment evaluator.
    ///
    /// The evaluator's argument type is fixed at the call sites of
    /// [`CacheAside::execute`], not here.
    #[must_use]
    pub fn evaluator<E2>(self, evaluator: E2) -> CacheAsideBuilder<S, C, E2> {
        CacheAsideBuilder {
            store: self.store,
            codec: self.codec,
            evaluator,
            ttls: self.ttls,
            telemetry: self.telemetry,
        }
    }

    /// Sets the process-wide TTL defaults.
    #[must_use]
    pub fn ttls(mut self, ttls: TtlConfig) -> Self {
        self.ttls = ttls;
        self
    }

    /// Sets the default normal-value TTL, in seconds.
    #[must_use]
    pub fn expire_seconds(mut self, seconds: u64) -> Self {
        self.ttls.expire_seconds = seconds;
        self
    }

    /// Sets the default empty-marker TTL, in seconds.
    #[must_use]
    pub fn empty_expire_seconds(mut self, seconds: u64) -> Self {
        self.ttls.empty_expire_seconds = seconds;
        self
    }

    /// Attaches a telemetry collector.
    #[must_use]
    pub fn telemetry(mut self, telemetry: CallTelemetry) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Builds the configured engine.
    #[must_use]
    pub fn build(self) -> CacheAside<S, C, E> {
        CacheAside {
            store: self.store,
            codec: self.codec,
            evaluator: self.evaluator,
            ttls: self.ttls,
            telemetry: self.telemetry,
        }
    }
}
