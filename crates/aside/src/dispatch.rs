// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The cache-aside dispatcher.
//!
//! [`CacheAside`] is the central state machine: given a directive, bound
//! arguments, and a handle on the underlying computation, it orchestrates the
//! key builder, the penetration guard, the TTL resolver, the codec, and the
//! store, and returns a value of the caller's expected type.
//!
//! The dispatcher holds no mutable state and is safe for concurrent use. It
//! performs no single-flight deduplication: two concurrent misses for the
//! same key both compute, and their writes race last-write-wins, which only
//! duplicates work and never corrupts values.

use std::time::Instant;

use serde::Serialize;
use serde::de::DeserializeOwned;

use aside_store::CacheStore;

use crate::builder::CacheAsideBuilder;
use crate::codec::{Codec, JsonCodec};
use crate::compute::{BatchComputation, Computation};
use crate::directive::{CacheDirective, DirectiveError, Operation, ResultShape};
use crate::error::DispatchError;
use crate::evaluate::{Evaluator, PathEvaluator};
use crate::guard;
use crate::key::{ResolvedKeys, build_keys};
use crate::telemetry::{CallActivity, CallOperation, CallTelemetry, TelemetryExt};
use crate::ttl::TtlConfig;

/// The cache-aside orchestration engine.
///
/// Construct via [`CacheAside::builder`]. The engine owns the store, the
/// codec, the evaluator, the process-wide TTL defaults, and optional
/// telemetry; directives and computations arrive per call.
///
/// Every public operation is a fail-open boundary: any failure inside the
/// caching pipeline degrades to invoking the underlying computation directly,
/// so callers only ever see the computation's result or the computation's own
/// error.
///
/// # Examples
///
/// ```
/// use aside::{Bindings, CacheAside, CacheDirective, KeyFragment};
/// use aside_memory::InMemoryStore;
/// use tick::Clock;
/// # futures::executor::block_on(async {
///
/// let engine = CacheAside::builder(InMemoryStore::new(Clock::new_frozen())).build();
///
/// let directive = CacheDirective::get("ACCOUNT").fragment(KeyFragment::new("id").connector(":"));
/// let mut args = Bindings::new();
/// args.insert("id".to_owned(), serde_json::json!(5));
///
/// let computation = || async { Ok::<_, std::io::Error>(Some("Alice".to_owned())) };
/// let value: Option<String> = engine.execute(&directive, &args, &computation).await?;
/// assert_eq!(value.as_deref(), Some("Alice"));
/// # Ok::<(), std::io::Error>(())
/// # });
/// ```
pub struct CacheAside<S, C = JsonCodec, E = PathEvaluator> {
    pub(crate) store: S,
    pub(crate) codec: C,
    pub(crate) evaluator: E,
    pub(crate) ttls: TtlConfig,
    pub(crate) telemetry: Option<CallTelemetry>,
}

impl<S, C, E> std::fmt::Debug for CacheAside<S, C, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheAside").field("ttls", &self.ttls).finish_non_exhaustive()
    }
}

impl<S: CacheStore> CacheAside<S> {
    /// Creates a new engine builder over the given store.
    #[must_use]
    pub fn builder(store: S) -> CacheAsideBuilder<S> {
        CacheAsideBuilder::new(store)
    }
}

impl<S, C, E> CacheAside<S, C, E> {
    /// Returns a reference to the underlying store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Consumes the engine and returns the underlying store.
    #[must_use]
    pub fn into_store(self) -> S {
        self.store
    }

    /// Returns the process-wide TTL defaults.
    #[must_use]
    pub fn ttls(&self) -> &TtlConfig {
        &self.ttls
    }
}

impl<S, C, Ev> CacheAside<S, C, Ev>
where
    S: CacheStore,
    C: Codec,
{
    /// Dispatches a single-key call site.
    ///
    /// The directive's operation selects the behavior:
    ///
    /// - **GET**: serve a store hit without invoking the computation;
    ///   otherwise consult the penetration guard, invoke, and write back.
    /// - **PUT**: optionally evict first, always invoke, write the result.
    /// - **REMOVE**: evict every derived key, then invoke.
    ///
    /// # Errors
    ///
    /// Only the computation's own error is ever returned; caching failures
    /// degrade to a direct invocation.
    pub async fn execute<A, T, F>(&self, directive: &CacheDirective, args: &A, computation: &F) -> Result<Option<T>, F::Error>
    where
        Ev: Evaluator<A>,
        A: Sync,
        T: Serialize + DeserializeOwned + Send,
        F: Computation<Output = T>,
    {
        let operation = CallOperation::from(directive.operation);
        let started = self.telemetry.started();
        match self.dispatch(operation, directive, args, computation, started).await {
            Ok(result) => result,
            Err(error) => self.fail_open(operation, &error, computation).await,
        }
    }

    /// Dispatches a batched multi-key GET.
    ///
    /// Resolves one key per element of the multi-valued argument, multi-gets
    /// them, invokes the computation only for the missed positions, writes
    /// the newly computed values back in one multi-put, and merges everything
    /// back into original order.
    ///
    /// Positions whose recomputation yields `None` stay uncached in this
    /// path (no empty-marker sentinel is written) and are recomputed on
    /// subsequent calls.
    ///
    /// # Errors
    ///
    /// Only the computation's own error is ever returned; caching failures
    /// degrade to a direct invocation over the full argument list.
    pub async fn execute_batch<A, T, F>(&self, directive: &CacheDirective, args: &A, computation: &F) -> Result<Vec<Option<T>>, F::Error>
    where
        Ev: Evaluator<A>,
        A: Sync,
        T: Serialize + DeserializeOwned + Send,
        F: BatchComputation<Item = T>,
    {
        let started = self.telemetry.started();
        match self.dispatch_batch(directive, args, computation, started).await {
            Ok(result) => result,
            Err(error) => self.fail_open_batch(&error, computation).await,
        }
    }

    async fn dispatch<A, T, F>(
        &self,
        operation: CallOperation,
        directive: &CacheDirective,
        args: &A,
        computation: &F,
        started: Option<Instant>,
    ) -> Result<Result<Option<T>, F::Error>, DispatchError>
    where
        Ev: Evaluator<A>,
        A: Sync,
        T: Serialize + DeserializeOwned + Send,
        F: Computation<Output = T>,
    {
        directive.validate()?;
        let keys = build_keys(directive, &self.evaluator, args)?;
        match directive.operation {
            Operation::Get => {
                let key = Self::single_key(&keys)?;
                self.do_get(operation, directive, key, computation, started).await
            }
            Operation::Put => {
                let key = Self::single_key(&keys)?;
                self.do_put(operation, directive, key, computation, started).await
            }
            Operation::Remove => self.do_remove(operation, &keys, computation, started).await,
        }
    }

    fn single_key(keys: &ResolvedKeys) -> Result<&str, DispatchError> {
        match keys {
            ResolvedKeys::Single(key) => Ok(key),
            ResolvedKeys::Multi(_) => Err(DirectiveError::MultiValuedSinglePath.into()),
        }
    }

    async fn do_get<T, F>(
        &self,
        operation: CallOperation,
        directive: &CacheDirective,
        key: &str,
        computation: &F,
        started: Option<Instant>,
    ) -> Result<Result<Option<T>, F::Error>, DispatchError>
    where
        T: Serialize + DeserializeOwned + Send,
        F: Computation<Output = T>,
    {
        if let Some(raw) = self.store.get(key).await? {
            let value = self.codec.decode::<T>(&raw)?;
            self.telemetry.record(operation, CallActivity::Hit, self.telemetry.elapsed(started));
            return Ok(Ok(Some(value)));
        }

        if directive.cache_empty_result && guard::is_marked_empty(&self.store, key).await? {
            self.telemetry
                .record(operation, CallActivity::EmptyHit, self.telemetry.elapsed(started));
            return Ok(Ok(None));
        }

        let computed = match computation.invoke().await {
            Ok(value) => value,
            Err(error) => return Ok(Err(error)),
        };

        let activity = self.write_back(operation, directive, key, computed.as_ref()).await;
        self.telemetry.record(operation, activity, self.telemetry.elapsed(started));
        Ok(Ok(computed))
    }

    async fn do_put<T, F>(
        &self,
        operation: CallOperation,
        directive: &CacheDirective,
        key: &str,
        computation: &F,
        started: Option<Instant>,
    ) -> Result<Result<Option<T>, F::Error>, DispatchError>
    where
        T: Serialize + Send,
        F: Computation<Output = T>,
    {
        if directive.remove_before_write {
            self.store.remove(key).await?;
        }

        let computed = match computation.invoke().await {
            Ok(value) => value,
            Err(error) => return Ok(Err(error)),
        };

        let activity = self.write_back(operation, directive, key, computed.as_ref()).await;
        self.telemetry.record(operation, activity, self.telemetry.elapsed(started));
        Ok(Ok(computed))
    }

    async fn do_remove<T, F>(
        &self,
        operation: CallOperation,
        keys: &ResolvedKeys,
        computation: &F,
        started: Option<Instant>,
    ) -> Result<Result<Option<T>, F::Error>, DispatchError>
    where
        F: Computation<Output = T>,
    {
        for key in keys.iter() {
            self.store.remove(key).await?;
        }
        self.telemetry
            .record(operation, CallActivity::Invalidated, self.telemetry.elapsed(started));
        Ok(computation.invoke().await)
    }

    async fn dispatch_batch<A, T, F>(
        &self,
        directive: &CacheDirective,
        args: &A,
        computation: &F,
        started: Option<Instant>,
    ) -> Result<Result<Vec<Option<T>>, F::Error>, DispatchError>
    where
        Ev: Evaluator<A>,
        A: Sync,
        T: Serialize + DeserializeOwned + Send,
        F: BatchComputation<Item = T>,
    {
        let operation = CallOperation::BatchGet;
        directive.validate()?;
        if directive.operation != Operation::Get || directive.result_shape != ResultShape::Sequence {
            return Err(DirectiveError::NotBatchable.into());
        }
        let keys = match build_keys(directive, &self.evaluator, args)? {
            ResolvedKeys::Multi(keys) => keys,
            ResolvedKeys::Single(_) => return Err(DirectiveError::NotBatchable.into()),
        };

        let cached = self.store.mget(&keys).await?;
        let mut merged: Vec<Option<T>> = Vec::with_capacity(keys.len());
        let mut miss_positions = Vec::new();
        for (position, slot) in cached.into_iter().enumerate() {
            match slot {
                Some(raw) => merged.push(Some(self.codec.decode::<T>(&raw)?)),
                None => {
                    merged.push(None);
                    miss_positions.push(position);
                }
            }
        }

        if miss_positions.is_empty() {
            self.telemetry.record(operation, CallActivity::Hit, self.telemetry.elapsed(started));
            return Ok(Ok(merged));
        }

        let computed = match computation.invoke_subset(&miss_positions).await {
            Ok(values) => values,
            Err(error) => return Ok(Err(error)),
        };

        // `computed` is positionally aligned with `miss_positions`; a short
        // result simply leaves the remaining positions unresolved.
        let mut writes = Vec::new();
        for (position, value) in miss_positions.iter().copied().zip(computed) {
            let Some(value) = value else {
                continue;
            };
            match self.codec.encode(&value) {
                Ok(raw) => writes.push((keys[position].clone(), raw)),
                Err(error) => self.note_write_failure(operation, &DispatchError::from(error)),
            }
            merged[position] = Some(value);
        }

        if !writes.is_empty()
            && let Err(error) = self.store.mput(self.ttls.expire_for(directive), &writes).await
        {
            self.note_write_failure(operation, &DispatchError::from(error));
        }

        self.telemetry.record(operation, CallActivity::Stored, self.telemetry.elapsed(started));
        Ok(Ok(merged))
    }

    /// Writes a computed result back to the store, degrading locally.
    ///
    /// Once the computation has produced a result, a failing encode or store
    /// write must not discard it: the failure is recorded and the caller
    /// still receives the value, just uncached.
    async fn write_back<T: Serialize>(
        &self,
        operation: CallOperation,
        directive: &CacheDirective,
        key: &str,
        computed: Option<&T>,
    ) -> CallActivity {
        match computed {
            Some(value) => {
                match self.codec.encode(value) {
                    Ok(raw) => {
                        if let Err(error) = self.store.put(key, &raw, self.ttls.expire_for(directive)).await {
                            self.note_write_failure(operation, &DispatchError::from(error));
                        }
                    }
                    Err(error) => self.note_write_failure(operation, &DispatchError::from(error)),
                }
                CallActivity::Stored
            }
            None if directive.cache_empty_result => {
                if let Err(error) = guard::mark_empty(&self.store, key, self.ttls.empty_expire_for(directive)).await {
                    self.note_write_failure(operation, &DispatchError::from(error));
                }
                CallActivity::StoredEmpty
            }
            None => CallActivity::Miss,
        }
    }
}
