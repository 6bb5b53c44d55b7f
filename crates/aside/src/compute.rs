// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The computation capabilities: handles on the intercepted call's real
//! logic.
//!
//! The interception layer (a proxy, a decorator, an explicit wrapper) hands
//! the engine something it can invoke when the cache cannot answer. A null
//! result is represented as `None`; the computation's own error type passes
//! through the engine untouched.

/// A handle on the underlying computation of a single-value call site.
///
/// Implemented for any `Fn() -> Future<Output = Result<Option<T>, E>>`
/// closure, so call sites can pass `|| async { .. }` directly.
pub trait Computation: Send + Sync {
    /// The value the computation produces; `None` models a null result.
    type Output;
    /// The computation's own error type, passed through to the caller.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Runs the underlying computation.
    fn invoke(&self) -> impl Future<Output = Result<Option<Self::Output>, Self::Error>> + Send;
}

impl<F, Fut, T, E> Computation for F
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<T>, E>> + Send,
    E: std::error::Error + Send + Sync + 'static,
{
    type Output = T;
    type Error = E;

    fn invoke(&self) -> impl Future<Output = Result<Option<T>, E>> + Send {
        self()
    }
}

/// A handle on the underlying computation of a sequence-shaped call site.
///
/// The engine invokes the full argument list when it cannot consult the
/// cache, and a reduced list (identified by positions into the original
/// multi-valued argument) when only some keys missed.
pub trait BatchComputation: Send + Sync {
    /// The element type of the computed sequence; `None` models a null
    /// element.
    type Item;
    /// The computation's own error type, passed through to the caller.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Runs the computation over the full argument sequence.
    fn invoke(&self) -> impl Future<Output = Result<Vec<Option<Self::Item>>, Self::Error>> + Send;

    /// Runs the computation over a subset of the argument sequence.
    ///
    /// `positions` indexes into the original multi-valued argument; the
    /// result must be positionally aligned with it.
    fn invoke_subset(&self, positions: &[usize]) -> impl Future<Output = Result<Vec<Option<Self::Item>>, Self::Error>> + Send;
}
