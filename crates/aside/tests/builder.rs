// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Integration tests for engine construction and capability swapping.

use aside::{
    Bindings, CacheAside, CacheDirective, CallTelemetry, Codec, CodecError, EvalError, Evaluator, FragmentValue, JsonCodec,
    KeyFragment, TtlConfig,
};
use aside_store::testing::RecordingStore;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tick::Clock;

fn block_on<F: Future>(f: F) -> F::Output {
    futures::executor::block_on(f)
}

#[test]
fn builder_defaults_match_process_conventions() {
    let engine = CacheAside::builder(RecordingStore::new()).build();

    assert_eq!(engine.ttls().expire_seconds, 1800);
    assert_eq!(engine.ttls().empty_expire_seconds, 300);
}

#[test]
fn builder_overrides_ttl_defaults() {
    let engine = CacheAside::builder(RecordingStore::new())
        .expire_seconds(600)
        .empty_expire_seconds(60)
        .build();

    assert_eq!(*engine.ttls(), TtlConfig::new(600, 60));
}

#[test]
fn builder_accepts_a_full_ttl_config() {
    let engine = CacheAside::builder(RecordingStore::new()).ttls(TtlConfig::new(10, 5)).build();

    assert_eq!(engine.ttls().expire_seconds, 10);
    assert_eq!(engine.ttls().empty_expire_seconds, 5);
}

#[test]
fn builder_accepts_telemetry() {
    let engine = CacheAside::builder(RecordingStore::new())
        .telemetry(CallTelemetry::new(Clock::new_frozen()))
        .build();

    // Telemetry must not change dispatch behavior.
    block_on(async {
        let directive = CacheDirective::get("K");
        let computation = || async { Ok::<_, std::io::Error>(Some(1_u32)) };
        let value = engine.execute(&directive, &Bindings::new(), &computation).await.expect("execute failed");
        assert_eq!(value, Some(1));
    });
}

/// A codec that wraps JSON payloads in a version prefix.
struct VersionedCodec;

impl Codec for VersionedCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, CodecError> {
        Ok(format!("v1:{}", JsonCodec.encode(value)?))
    }

    fn decode<T: DeserializeOwned>(&self, raw: &str) -> Result<T, CodecError> {
        let payload = raw.strip_prefix("v1:").ok_or_else(|| CodecError::new("missing version prefix"))?;
        JsonCodec.decode(payload)
    }
}

#[test]
fn custom_codec_controls_the_stored_form() {
    block_on(async {
        let store = RecordingStore::new();
        let engine = CacheAside::builder(store.clone()).codec(VersionedCodec).build();

        let directive = CacheDirective::get("ACCOUNT").fragment(KeyFragment::new("id").connector(":"));
        let mut args = Bindings::new();
        args.insert("id".to_owned(), serde_json::json!(5));

        let computation = || async { Ok::<_, std::io::Error>(Some("Alice".to_owned())) };
        let _: Option<String> = engine.execute(&directive, &args, &computation).await.expect("execute failed");

        assert_eq!(store.value_of("ACCOUNT:5").as_deref(), Some("v1:\"Alice\""));

        // And the hit path decodes it back.
        let unreachable = || async { Ok::<_, std::io::Error>(Some("recomputed".to_owned())) };
        let value: Option<String> = engine.execute(&directive, &args, &unreachable).await.expect("execute failed");
        assert_eq!(value.as_deref(), Some("Alice"));
    });
}

/// An evaluator over plain string pairs, to show the argument type is the
/// evaluator's choice.
struct PairEvaluator;

impl Evaluator<Vec<(String, String)>> for PairEvaluator {
    fn evaluate(&self, fragment: &KeyFragment, args: &Vec<(String, String)>) -> Result<FragmentValue, EvalError> {
        args.iter()
            .find(|(name, _)| *name == fragment.argument)
            .map(|(_, value)| FragmentValue::Scalar(value.clone()))
            .ok_or_else(|| EvalError::UnboundArgument(fragment.argument.clone()))
    }
}

#[test]
fn custom_evaluator_controls_the_argument_type() {
    block_on(async {
        let store = RecordingStore::new();
        let engine = CacheAside::builder(store.clone()).evaluator(PairEvaluator).build();

        let directive = CacheDirective::get("ACCOUNT").fragment(KeyFragment::new("id").connector(":"));
        let args = vec![("id".to_owned(), "5".to_owned())];

        let computation = || async { Ok::<_, std::io::Error>(Some("Alice".to_owned())) };
        let _: Option<String> = engine.execute(&directive, &args, &computation).await.expect("execute failed");

        assert!(store.contains_key("ACCOUNT:5"));
    });
}
