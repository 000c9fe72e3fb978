//! OTLP export pipeline construction.
//!
//! Builds the span and log providers that back the [`Telemetry`]
//! implementation: OTLP-over-HTTP exporters carrying the Axiom auth and
//! dataset headers, batching processors, and the global propagator setup.
//!
//! [`Telemetry`]: crate::Telemetry

use crate::config::TracingConfig;
use crate::error::TracingError;
use opentelemetry::KeyValue;
use opentelemetry::propagation::TextMapCompositePropagator;
use opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge;
use opentelemetry_otlp::{WithExportConfig, WithHttpConfig};
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::logs::{BatchLogProcessor, SdkLoggerProvider};
use opentelemetry_sdk::propagation::{BaggagePropagator, TraceContextPropagator};
use opentelemetry_sdk::trace::{BatchSpanProcessor, SdkTracerProvider};
use opentelemetry_semantic_conventions::resource::{SERVICE_NAME, SERVICE_VERSION};
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const EXPORT_TIMEOUT: Duration = Duration::from_secs(10);

/// Builds the resource attached to every exported span and log record.
///
/// Carries the service identity from configuration plus the invocation
/// identifiers, so every record can be correlated back to the Lambda
/// invocation that produced it.
pub fn build_resource(config: &TracingConfig, request_id: &str, function_arn: &str) -> Resource {
    Resource::builder()
        .with_attributes([
            KeyValue::new(SERVICE_NAME, config.service_name.clone()),
            KeyValue::new(SERVICE_VERSION, config.service_version.clone()),
            KeyValue::new("environment", config.environment.clone()),
            KeyValue::new("faas.invocation_id", request_id.to_string()),
            KeyValue::new("cloud.resource_id", function_arn.to_string()),
        ])
        .build()
}

/// Constructs the span export pipeline.
///
/// There is exactly one production implementation, [`OtlpTracerSetup`]. The
/// seam exists so tests can substitute a provider that exports nowhere, or
/// one that fails, without standing up a collector.
pub trait TracerSetup {
    /// Builds a tracer provider for the given configuration and resource,
    /// performing any global registration the pipeline needs.
    ///
    /// # Errors
    ///
    /// Returns [`TracingError::TracerInit`] if the pipeline cannot be built.
    fn setup(
        &self,
        config: &TracingConfig,
        resource: Resource,
    ) -> Result<SdkTracerProvider, TracingError>;
}

/// Production span pipeline: OTLP-over-HTTP export to Axiom.
///
/// Configures the exporter with the endpoint and static headers from
/// [`TracingConfig`], wraps it in a batching span processor, registers the
/// provider as the global default, and installs a composite trace-context +
/// baggage propagator.
#[derive(Debug, Default)]
pub struct OtlpTracerSetup;

impl TracerSetup for OtlpTracerSetup {
    fn setup(
        &self,
        config: &TracingConfig,
        resource: Resource,
    ) -> Result<SdkTracerProvider, TracingError> {
        let exporter = opentelemetry_otlp::SpanExporter::builder()
            .with_http()
            .with_endpoint(signal_endpoint(&config.otlp_endpoint, "/v1/traces"))
            .with_timeout(EXPORT_TIMEOUT)
            .with_protocol(opentelemetry_otlp::Protocol::HttpBinary)
            .with_headers(config.export_headers())
            .build()
            .map_err(TracingError::tracer_init)?;

        let span_processor = BatchSpanProcessor::builder(exporter).build();

        let provider = SdkTracerProvider::builder()
            .with_span_processor(span_processor)
            .with_resource(resource)
            .build();

        opentelemetry::global::set_tracer_provider(provider.clone());
        opentelemetry::global::set_text_map_propagator(TextMapCompositePropagator::new(vec![
            Box::new(TraceContextPropagator::new()),
            Box::new(BaggagePropagator::new()),
        ]));

        Ok(provider)
    }
}

/// Builds the log provider exporting over the same OTLP endpoint as spans.
pub(crate) fn build_logger_provider(
    config: &TracingConfig,
    resource: Resource,
) -> Result<SdkLoggerProvider, TracingError> {
    let exporter = opentelemetry_otlp::LogExporter::builder()
        .with_http()
        .with_endpoint(signal_endpoint(&config.otlp_endpoint, "/v1/logs"))
        .with_timeout(EXPORT_TIMEOUT)
        .with_protocol(opentelemetry_otlp::Protocol::HttpBinary)
        .with_headers(config.export_headers())
        .build()
        .map_err(TracingError::logger_init)?;

    let log_processor = BatchLogProcessor::builder(exporter).build();

    Ok(SdkLoggerProvider::builder()
        .with_log_processor(log_processor)
        .with_resource(resource)
        .build())
}

/// Installs the process-wide `tracing` subscriber: env filter, fmt layer,
/// and the bridge that forwards log records to the OTLP pipeline.
pub(crate) fn init_subscriber(logger_provider: &SdkLoggerProvider) -> Result<(), TracingError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer().with_target(true).without_time();
    let log_layer = OpenTelemetryTracingBridge::new(logger_provider);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(log_layer)
        .try_init()
        .map_err(TracingError::logger_init)
}

fn signal_endpoint(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_endpoint_joins_path() {
        assert_eq!(
            signal_endpoint("https://api.axiom.co", "/v1/traces"),
            "https://api.axiom.co/v1/traces"
        );
        assert_eq!(
            signal_endpoint("https://api.axiom.co/", "/v1/logs"),
            "https://api.axiom.co/v1/logs"
        );
    }

    #[test]
    fn test_resource_attributes() {
        let config = TracingConfig {
            service_name: "authorizer".to_string(),
            service_version: "1.2.3".to_string(),
            environment: "production".to_string(),
            ..TracingConfig::default()
        };

        let resource = build_resource(&config, "req-1", "arn:aws:lambda:eu-west-1:123:function:f");

        let expect = |key: &str, value: &str| {
            assert!(
                resource
                    .iter()
                    .any(|(k, v)| k.as_str() == key && v.as_str() == value),
                "missing attribute {key}={value}"
            );
        };

        expect("service.name", "authorizer");
        expect("service.version", "1.2.3");
        expect("environment", "production");
        expect("faas.invocation_id", "req-1");
        expect("cloud.resource_id", "arn:aws:lambda:eu-west-1:123:function:f");
    }
}
