//! Lifecycle tests exercising initialisation and teardown without a
//! reachable collector.

use axiom_tracing::{
    AxiomTelemetry, Telemetry, TracerSetup, TracingConfig, TracingError, TracingMode,
    init_tracing,
};
use opentelemetry::{Context, KeyValue};
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::trace::SdkTracerProvider;

/// Span pipeline with no processors: spans are created and dropped locally.
struct LocalTracerSetup;

impl TracerSetup for LocalTracerSetup {
    fn setup(
        &self,
        _config: &TracingConfig,
        resource: Resource,
    ) -> Result<SdkTracerProvider, TracingError> {
        Ok(SdkTracerProvider::builder().with_resource(resource).build())
    }
}

/// Span pipeline that always fails to come up.
struct FailingTracerSetup;

impl TracerSetup for FailingTracerSetup {
    fn setup(
        &self,
        _config: &TracingConfig,
        _resource: Resource,
    ) -> Result<SdkTracerProvider, TracingError> {
        Err(TracingError::tracer_init(std::io::Error::other(
            "collector unreachable",
        )))
    }
}

fn test_config() -> TracingConfig {
    TracingConfig {
        service_name: "lifecycle-test".to_string(),
        ..TracingConfig::default()
    }
}

#[test]
fn test_disabled_mode_initialises_without_io() {
    let mut telemetry = init_tracing(test_config(), "req-1", "arn:test", TracingMode::Disabled)
        .expect("disabled-mode init must not fail");

    assert!(telemetry.logger_provider().is_none());

    let cx = telemetry.start_span(&Context::new(), "span");
    telemetry.add_span_event(&cx, "event", vec![]);
    telemetry.end_span(&cx);

    assert!(telemetry.shutdown().is_ok());
    assert!(telemetry.shutdown().is_ok());
}

#[test]
fn test_tracer_setup_failure_leaves_logger_live() {
    let result = AxiomTelemetry::init_with(
        test_config(),
        "req-1",
        "arn:test",
        &FailingTracerSetup,
        false,
    );

    // The logger came up (the failure would otherwise be LoggerInit); the
    // tracer step is the one reported.
    match result {
        Err(TracingError::TracerInit(_)) => {}
        Err(other) => panic!("expected TracerInit, got {other:?}"),
        Ok(_) => panic!("expected TracerInit, got Ok"),
    }
}

#[test]
fn test_full_lifecycle_with_local_pipeline() {
    let mut telemetry = AxiomTelemetry::init_with(
        test_config(),
        "req-1",
        "arn:aws:lambda:eu-west-1:123:function:authorizer",
        &LocalTracerSetup,
        false,
    )
    .expect("initialisation with a local pipeline must succeed");

    assert!(telemetry.logger_provider().is_some());

    let parent = Context::new();
    let cx = telemetry.start_span(&parent, "invoke");
    telemetry.add_span_event(&cx, "token validated", vec![KeyValue::new("user.id", "42")]);

    let other = telemetry.start_span(&parent, "sibling");
    telemetry.link_spans(&cx, &other);
    telemetry.end_span(&other);
    telemetry.end_span(&cx);

    telemetry.flush();

    assert!(telemetry.shutdown().is_ok());
    // Second shutdown finds nothing left to tear down.
    assert!(telemetry.shutdown().is_ok());
    assert!(telemetry.logger_provider().is_none());
}
