// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Telemetry for cache-aside dispatches.
//!
//! With the `logs` feature, every dispatch emits a structured tracing event;
//! with the `metrics` feature, dispatches feed an OpenTelemetry event counter
//! and duration histogram. With neither, recording is a no-op and the engine
//! carries no observability cost.

use std::time::{Duration, Instant};

use tick::Clock;

#[cfg(feature = "metrics")]
const OPERATION_ATTRIBUTE: &str = "aside.operation";
#[cfg(feature = "metrics")]
const ACTIVITY_ATTRIBUTE: &str = "aside.activity";

#[derive(Clone, Copy, Debug)]
pub(crate) enum CallOperation {
    Get,
    Put,
    Remove,
    BatchGet,
}

impl CallOperation {
    #[cfg_attr(
        not(any(feature = "logs", feature = "metrics")),
        expect(dead_code, reason = "names are only reported through logs and metrics")
    )]
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Get => "aside.get",
            Self::Put => "aside.put",
            Self::Remove => "aside.remove",
            Self::BatchGet => "aside.batch_get",
        }
    }
}

impl From<crate::directive::Operation> for CallOperation {
    fn from(operation: crate::directive::Operation) -> Self {
        match operation {
            crate::directive::Operation::Get => Self::Get,
            crate::directive::Operation::Put => Self::Put,
            crate::directive::Operation::Remove => Self::Remove,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) enum CallActivity {
    /// Served from the store without invoking the computation.
    Hit,
    /// Computed, but nothing was written back.
    Miss,
    /// The empty-marker sentinel suppressed recomputation.
    EmptyHit,
    /// Computed and written under the real key.
    Stored,
    /// Computed to nothing; the empty-marker sentinel was written.
    StoredEmpty,
    /// Keys were evicted.
    Invalidated,
    /// The pipeline degraded to direct invocation.
    Fallback,
    /// A store or codec failure was absorbed after the computation ran.
    Error,
}

impl CallActivity {
    #[cfg_attr(
        not(any(feature = "logs", feature = "metrics")),
        expect(dead_code, reason = "names are only reported through logs and metrics")
    )]
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Hit => "aside.hit",
            Self::Miss => "aside.miss",
            Self::EmptyHit => "aside.empty_hit",
            Self::Stored => "aside.stored",
            Self::StoredEmpty => "aside.stored_empty",
            Self::Invalidated => "aside.invalidated",
            Self::Fallback => "aside.fallback",
            Self::Error => "aside.error",
        }
    }
}

/// Telemetry collector for cache-aside dispatches.
///
/// Construct one and pass it to the engine builder via
/// [`telemetry()`](crate::builder::CacheAsideBuilder::telemetry). The clock
/// is used to time dispatches.
#[derive(Clone, Debug)]
pub struct CallTelemetry {
    clock: Clock,
    #[cfg(feature = "metrics")]
    event_counter: Option<opentelemetry::metrics::Counter<u64>>,
    #[cfg(feature = "metrics")]
    operation_duration: Option<opentelemetry::metrics::Histogram<f64>>,
}

impl CallTelemetry {
    /// Creates a telemetry collector without metric instruments.
    ///
    /// With the `logs` feature this still emits tracing events; without it,
    /// recording is a no-op.
    #[must_use]
    pub fn new(clock: Clock) -> Self {
        Self {
            clock,
            #[cfg(feature = "metrics")]
            event_counter: None,
            #[cfg(feature = "metrics")]
            operation_duration: None,
        }
    }

    /// Creates a telemetry collector with OpenTelemetry instruments.
    #[cfg(feature = "metrics")]
    #[must_use]
    pub fn with_meter(clock: Clock, meter: &opentelemetry::metrics::Meter) -> Self {
        Self {
            clock,
            event_counter: Some(
                meter
                    .u64_counter("aside.event.count")
                    .with_description("Cache-aside dispatch events")
                    .with_unit("{event}")
                    .build(),
            ),
            operation_duration: Some(
                meter
                    .f64_histogram("aside.operation.duration")
                    .with_description("Cache-aside dispatch duration")
                    .with_unit("s")
                    .build(),
            ),
        }
    }

    pub(crate) fn instant(&self) -> Instant {
        self.clock.instant()
    }

    pub(crate) fn record(&self, operation: CallOperation, activity: CallActivity, duration: Option<Duration>) {
        #[cfg(feature = "metrics")]
        {
            let attrs = [
                opentelemetry::KeyValue::new(OPERATION_ATTRIBUTE, operation.as_str()),
                opentelemetry::KeyValue::new(ACTIVITY_ATTRIBUTE, activity.as_str()),
            ];
            if let Some(counter) = &self.event_counter {
                counter.add(1, &attrs);
            }
            if let (Some(duration), Some(histogram)) = (duration, &self.operation_duration) {
                histogram.record(duration.as_secs_f64(), &attrs);
            }
        }

        #[cfg(feature = "logs")]
        Self::emit(operation, activity, duration);

        #[cfg(not(any(feature = "logs", feature = "metrics")))]
        let _ = (operation, activity, duration);
    }

    #[cfg(feature = "logs")]
    fn emit(operation: CallOperation, activity: CallActivity, duration: Option<Duration>) {
        let op = operation.as_str();
        let act = activity.as_str();
        let duration_ns = duration.map(|d| d.as_nanos());

        // Tracing level must be constant, so a macro selects the level.
        macro_rules! emit_event {
            ($level:ident) => {
                tracing::$level!(
                    aside.operation = op,
                    aside.activity = act,
                    aside.duration_ns = ?duration_ns,
                    "aside.event"
                )
            };
        }

        match activity {
            CallActivity::Hit | CallActivity::Miss => emit_event!(debug),
            CallActivity::EmptyHit | CallActivity::Stored | CallActivity::StoredEmpty | CallActivity::Invalidated => {
                emit_event!(info);
            }
            CallActivity::Fallback => emit_event!(warn),
            CallActivity::Error => emit_event!(error),
        }
    }
}

/// No-op recording over an optional telemetry collector.
pub(crate) trait TelemetryExt {
    fn record(&self, operation: CallOperation, activity: CallActivity, duration: Option<Duration>);
    fn started(&self) -> Option<Instant>;
    fn elapsed(&self, started: Option<Instant>) -> Option<Duration>;
}

impl TelemetryExt for Option<CallTelemetry> {
    fn record(&self, operation: CallOperation, activity: CallActivity, duration: Option<Duration>) {
        if let Some(telemetry) = self {
            telemetry.record(operation, activity, duration);
        }
    }

    fn started(&self) -> Option<Instant> {
        self.as_ref().map(CallTelemetry::instant)
    }

    fn elapsed(&self, started: Option<Instant>) -> Option<Duration> {
        match (self.as_ref(), started) {
            (Some(telemetry), Some(started)) => Some(telemetry.instant().saturating_duration_since(started)),
            _ => None,
        }
    }
}
