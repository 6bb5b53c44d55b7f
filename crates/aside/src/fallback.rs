// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The fail-open boundary.
//!
//! Any error raised inside the cache-aside decision path is caught here and
//! converted into "invoke the underlying computation directly": a caching
//! defect must never become a caller-visible outage. Callers only ever see
//! the computation's result or the computation's own error.
//!
//! Degradations are not silent: each one is logged (with the `logs` feature)
//! and recorded as a fallback event in telemetry.

use crate::compute::{BatchComputation, Computation};
use crate::dispatch::CacheAside;
use crate::error::DispatchError;
use crate::telemetry::{CallActivity, CallOperation, TelemetryExt};

impl<S, C, Ev> CacheAside<S, C, Ev> {
    /// Degrades a failed single-key dispatch to a direct invocation.
    pub(crate) async fn fail_open<T, F>(&self, operation: CallOperation, error: &DispatchError, computation: &F) -> Result<Option<T>, F::Error>
    where
        F: Computation<Output = T>,
    {
        self.note_degraded(operation, error);
        computation.invoke().await
    }

    /// Degrades a failed batch dispatch to a direct invocation over the full
    /// argument list.
    pub(crate) async fn fail_open_batch<T, F>(&self, error: &DispatchError, computation: &F) -> Result<Vec<Option<T>>, F::Error>
    where
        F: BatchComputation<Item = T>,
    {
        self.note_degraded(CallOperation::BatchGet, error);
        computation.invoke().await
    }

    pub(crate) fn note_degraded(&self, operation: CallOperation, error: &DispatchError) {
        #[cfg(feature = "logs")]
        tracing::warn!(
            aside.error_kind = error.kind(),
            error = %error,
            "cache dispatch degraded to direct invocation"
        );
        #[cfg(not(feature = "logs"))]
        let _ = error;
        self.telemetry.record(operation, CallActivity::Fallback, None);
    }

    pub(crate) fn note_write_failure(&self, operation: CallOperation, error: &DispatchError) {
        #[cfg(feature = "logs")]
        tracing::warn!(
            aside.error_kind = error.kind(),
            error = %error,
            "cache write failed after computation; returning the result uncached"
        );
        #[cfg(not(feature = "logs"))]
        let _ = error;
        self.telemetry.record(operation, CallActivity::Error, None);
    }
}
