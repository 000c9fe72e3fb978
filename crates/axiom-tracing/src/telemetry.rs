//! Telemetry lifecycle and span helpers.
//!
//! [`Telemetry`] is the capability surface callers program against; it has
//! exactly two implementations. [`AxiomTelemetry`] owns the real providers
//! and tears them down in reverse initialisation order. [`NoopTelemetry`]
//! satisfies the same surface without touching the network so dependent code
//! can run under test.

use crate::config::TracingConfig;
use crate::error::{ShutdownError, TracingError};
use crate::pipeline::{
    OtlpTracerSetup, TracerSetup, build_logger_provider, build_resource, init_subscriber,
};
use opentelemetry::global::BoxedTracer;
use opentelemetry::trace::{TraceContextExt, Tracer};
use opentelemetry::{Context, KeyValue};
use opentelemetry_sdk::logs::SdkLoggerProvider;

/// Whether initialisation builds the real export pipeline.
///
/// `Disabled` replaces the hidden context-borne test-mode flag some tracing
/// setups use: the no-op path is chosen explicitly at the call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TracingMode {
    /// Build the OTLP pipeline and install the subscriber.
    Enabled,
    /// Perform no I/O; every operation is a no-op that succeeds.
    Disabled,
}

/// The tracing capability surface.
///
/// Span operations are valid once initialisation has succeeded; this is a
/// caller-discipline contract, not an enforced precondition. The event and
/// link helpers additionally emit an informational log line and never fail
/// the caller's operation.
pub trait Telemetry: Send + Sync {
    /// Returns the logger provider backing the structured-log pipeline, if
    /// one was built.
    fn logger_provider(&self) -> Option<&SdkLoggerProvider>;

    /// Starts a span as a child of `parent` and returns the context
    /// carrying it.
    fn start_span(&self, parent: &Context, name: &str) -> Context;

    /// Ends the span carried by `cx`.
    fn end_span(&self, cx: &Context);

    /// Attaches an event to the span carried by `cx`.
    fn add_span_event(&self, cx: &Context, name: &str, attrs: Vec<KeyValue>);

    /// Links the span carried by `cx` to the span carried by `linked`.
    fn link_spans(&self, cx: &Context, linked: &Context);

    /// Flushes buffered spans and shuts the pipeline down, logger last.
    ///
    /// Teardown is best-effort and single-shot in spirit: providers are
    /// consumed on the first call, so a second call finds nothing to tear
    /// down and returns `Ok(())`.
    ///
    /// # Errors
    ///
    /// Returns [`ShutdownError::Logger`] if the logger provider fails to
    /// close; span flush and tracer shutdown failures are logged and
    /// swallowed.
    fn shutdown(&mut self) -> Result<(), ShutdownError>;
}

/// Initialises telemetry for one Lambda invocation lifecycle.
///
/// With [`TracingMode::Enabled`] this builds the logger first, installs the
/// process-wide subscriber, then the span pipeline; see [`AxiomTelemetry::init`]
/// for the failure contract. With [`TracingMode::Disabled`] it returns a
/// [`NoopTelemetry`] without performing any I/O.
///
/// # Errors
///
/// Returns [`TracingError::LoggerInit`] or [`TracingError::TracerInit`] for
/// the respective failed setup step.
pub fn init_tracing(
    config: TracingConfig,
    request_id: &str,
    function_arn: &str,
    mode: TracingMode,
) -> Result<Box<dyn Telemetry>, TracingError> {
    match mode {
        TracingMode::Disabled => {
            tracing::debug!("tracing disabled, using no-op telemetry");
            Ok(Box::new(NoopTelemetry::new()))
        }
        TracingMode::Enabled => Ok(Box::new(AxiomTelemetry::init(
            config,
            request_id,
            function_arn,
        )?)),
    }
}

/// Production telemetry backed by the Axiom OTLP pipeline.
pub struct AxiomTelemetry {
    tracer: BoxedTracer,
    tracer_provider: Option<opentelemetry_sdk::trace::SdkTracerProvider>,
    logger_provider: Option<SdkLoggerProvider>,
}

impl AxiomTelemetry {
    /// Initialises the full pipeline: logger, subscriber, then tracer.
    ///
    /// # Errors
    ///
    /// Returns [`TracingError::LoggerInit`] if the log pipeline or the
    /// subscriber cannot be installed; nothing else is attempted in that
    /// case. Returns [`TracingError::TracerInit`] if the span pipeline
    /// fails; the failure is logged through the already-live logger, which
    /// stays running so the line is exported before the process exits.
    pub fn init(
        config: TracingConfig,
        request_id: &str,
        function_arn: &str,
    ) -> Result<Self, TracingError> {
        Self::init_with(config, request_id, function_arn, &OtlpTracerSetup, true)
    }

    /// Initialises with a caller-supplied span pipeline, optionally skipping
    /// the process-wide subscriber installation (it can only happen once per
    /// process, which matters under test).
    ///
    /// # Errors
    ///
    /// Same contract as [`AxiomTelemetry::init`].
    pub fn init_with(
        config: TracingConfig,
        request_id: &str,
        function_arn: &str,
        setup: &dyn TracerSetup,
        install_subscriber: bool,
    ) -> Result<Self, TracingError> {
        let resource = build_resource(&config, request_id, function_arn);

        let logger_provider = build_logger_provider(&config, resource.clone())?;
        if install_subscriber {
            init_subscriber(&logger_provider)?;
        }
        tracing::debug!(request_id, function_arn, "logger initialised");

        let tracer_provider = match setup.setup(&config, resource) {
            Ok(provider) => provider,
            Err(e) => {
                tracing::error!(error = %e, "failed to initialise OpenTelemetry");
                return Err(e);
            }
        };
        tracing::debug!("OpenTelemetry tracer initialised");

        Ok(Self {
            tracer: opentelemetry::global::tracer(config.service_name),
            tracer_provider: Some(tracer_provider),
            logger_provider: Some(logger_provider),
        })
    }

    /// Flushes both providers without shutting anything down.
    ///
    /// Useful before the execution environment freezes between invocations;
    /// flush failures are logged and swallowed.
    pub fn flush(&self) {
        if let Some(provider) = &self.tracer_provider
            && let Err(e) = provider.force_flush()
        {
            tracing::warn!(error = %e, "failed to flush tracer provider");
        }

        if let Some(provider) = &self.logger_provider
            && let Err(e) = provider.force_flush()
        {
            tracing::warn!(error = %e, "failed to flush logger provider");
        }
    }
}

impl Telemetry for AxiomTelemetry {
    fn logger_provider(&self) -> Option<&SdkLoggerProvider> {
        self.logger_provider.as_ref()
    }

    fn start_span(&self, parent: &Context, name: &str) -> Context {
        let span = self.tracer.start_with_context(name.to_string(), parent);
        parent.with_span(span)
    }

    fn end_span(&self, cx: &Context) {
        cx.span().end();
    }

    fn add_span_event(&self, cx: &Context, name: &str, attrs: Vec<KeyValue>) {
        tracing::info!(event = name, attributes = ?attrs, "span event added");
        cx.span().add_event(name.to_string(), attrs);
    }

    fn link_spans(&self, cx: &Context, linked: &Context) {
        let linked_context = linked.span().span_context().clone();
        cx.span().add_link(linked_context, Vec::new());
        tracing::info!("spans linked");
    }

    fn shutdown(&mut self) -> Result<(), ShutdownError> {
        if let Some(provider) = self.tracer_provider.take() {
            match provider.force_flush() {
                Ok(()) => tracing::debug!("spans flushed"),
                Err(e) => tracing::warn!(error = %e, "failed to flush spans"),
            }
            if let Err(e) = provider.shutdown() {
                tracing::warn!(error = %e, "failed to shut down tracer provider");
            }
        }

        // The logging sink closes last, whatever happened to the spans.
        if let Some(provider) = self.logger_provider.take() {
            let _ = provider.force_flush();
            provider.shutdown().map_err(ShutdownError::Logger)?;
        }

        Ok(())
    }
}

impl Drop for AxiomTelemetry {
    fn drop(&mut self) {
        if let Some(provider) = self.tracer_provider.take() {
            let _ = provider.force_flush();
            if let Err(e) = provider.shutdown() {
                eprintln!("Error shutting down tracer provider: {e}");
            }
        }

        if let Some(provider) = self.logger_provider.take() {
            let _ = provider.force_flush();
            if let Err(e) = provider.shutdown() {
                eprintln!("Error shutting down logger provider: {e}");
            }
        }
    }
}

/// Telemetry substitute that performs no I/O and always succeeds.
#[derive(Debug, Default)]
pub struct NoopTelemetry;

impl NoopTelemetry {
    /// Creates a no-op telemetry handle.
    pub fn new() -> Self {
        Self
    }
}

impl Telemetry for NoopTelemetry {
    fn logger_provider(&self) -> Option<&SdkLoggerProvider> {
        None
    }

    fn start_span(&self, parent: &Context, _name: &str) -> Context {
        parent.clone()
    }

    fn end_span(&self, _cx: &Context) {}

    fn add_span_event(&self, _cx: &Context, name: &str, attrs: Vec<KeyValue>) {
        tracing::debug!(event = name, attributes = ?attrs, "span event ignored");
    }

    fn link_spans(&self, _cx: &Context, _linked: &Context) {}

    fn shutdown(&mut self) -> Result<(), ShutdownError> {
        tracing::debug!("no-op telemetry shutdown");
        Ok(())
    }
}

/// Runs `f` inside a span, recording any error on the span before ending it.
///
/// The error is also logged with the span name; it is returned unchanged.
pub async fn traced_fn<T, E, F, Fut>(
    telemetry: &dyn Telemetry,
    parent: &Context,
    name: &str,
    f: F,
) -> Result<T, E>
where
    F: FnOnce(Context) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::error::Error,
{
    let cx = telemetry.start_span(parent, name);
    let result = f(cx.clone()).await;

    if let Err(e) = &result {
        cx.span().record_error(e);
        tracing::error!(function = name, error = %e, "error in traced function");
    }

    telemetry.end_span(&cx);
    result
}

/// Sets attributes on the span carried by `cx`.
pub fn set_span_attributes(cx: &Context, attrs: Vec<KeyValue>) {
    let span = cx.span();
    for attr in attrs {
        span.set_attribute(attr);
    }
}
