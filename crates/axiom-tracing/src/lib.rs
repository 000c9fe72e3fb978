//! Tracing and logging bootstrap for AWS Lambda functions exporting to Axiom.
//!
//! This crate wires a Lambda function up to an OTLP-over-HTTP export pipeline
//! and a structured logger in a single call, and hands back a handle that owns
//! the teardown. Spans are exported to Axiom's OTLP endpoint with the dataset
//! and bearer-token headers Axiom expects; log records travel over the same
//! pipeline via the `tracing` bridge.
//!
//! # Lifecycle
//!
//! [`init_tracing`] performs two fallible setup steps in order:
//!
//! 1. **Logger** - builds an OTLP log exporter and installs a
//!    `tracing-subscriber` registry (fmt layer, env filter, OpenTelemetry
//!    bridge) as the process default. Failure here aborts initialisation
//!    with [`TracingError::LoggerInit`]; nothing else is attempted.
//! 2. **Tracer** - builds an OTLP span exporter behind a batching span
//!    processor and registers the provider and a composite trace-context +
//!    baggage propagator globally. Failure is logged through the
//!    already-live logger and surfaced as [`TracingError::TracerInit`];
//!    the logger is intentionally left running so the error line itself is
//!    exported before the process exits.
//!
//! Shutdown unwinds in reverse order: spans are force-flushed and the tracer
//! provider shut down (failures logged, never propagated), then the logger
//! provider is closed.
//!
//! # Example
//!
//! ```no_run
//! use axiom_tracing::{TracingConfig, TracingMode, init_tracing};
//! use opentelemetry::Context;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = TracingConfig::from_env()?;
//! let mut telemetry = init_tracing(config, "request-id", "function-arn", TracingMode::Enabled)?;
//!
//! let cx = telemetry.start_span(&Context::current(), "handle-request");
//! telemetry.add_span_event(&cx, "request received", vec![]);
//! telemetry.end_span(&cx);
//!
//! telemetry.shutdown()?;
//! # Ok(())
//! # }
//! ```
//!
//! # Testing without credentials
//!
//! Passing [`TracingMode::Disabled`] routes initialisation to a no-op
//! implementation that performs no network I/O and whose shutdown always
//! succeeds, so code depending on the [`Telemetry`] surface can run in tests
//! without an Axiom account or a reachable collector.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod pipeline;
mod telemetry;

pub use config::TracingConfig;
pub use error::{ShutdownError, TracingError};
pub use pipeline::{OtlpTracerSetup, TracerSetup, build_resource};
pub use telemetry::{
    AxiomTelemetry, NoopTelemetry, Telemetry, TracingMode, init_tracing, set_span_attributes,
    traced_fn,
};
