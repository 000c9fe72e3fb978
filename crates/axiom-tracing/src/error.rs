//! Error types for tracing initialisation and teardown.

use opentelemetry_sdk::error::OTelSdkError;
use thiserror::Error;

/// Errors that can occur while initialising the tracing pipeline.
///
/// Both variants are fatal to the initialisation call. `LoggerInit` means no
/// telemetry resource was created; `TracerInit` means the logger is already
/// live and is deliberately left running (the hosting environment exits
/// immediately after a failed cold start, and the error log line should
/// still be exported).
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum TracingError {
    /// The structured logging sink could not be constructed or installed.
    #[error("failed to initialise logger")]
    LoggerInit(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The OpenTelemetry span export pipeline could not be constructed.
    #[error("failed to initialise OpenTelemetry tracer")]
    TracerInit(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl TracingError {
    pub(crate) fn logger_init<E: std::error::Error + Send + Sync + 'static>(error: E) -> Self {
        Self::LoggerInit(Box::new(error))
    }

    /// Wraps an error from a [`TracerSetup`](crate::TracerSetup) implementation.
    pub fn tracer_init<E: std::error::Error + Send + Sync + 'static>(error: E) -> Self {
        Self::TracerInit(Box::new(error))
    }
}

/// Errors that can occur during teardown.
///
/// Teardown is best-effort: span flush and tracer-provider shutdown failures
/// are logged and swallowed so the logging sink is always closed afterwards.
/// Only a failure to close the logger itself is surfaced.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ShutdownError {
    /// The logger provider failed to shut down cleanly.
    #[error("failed to shut down logger provider")]
    Logger(#[source] OTelSdkError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_error_display() {
        let err = TracingError::logger_init(std::io::Error::other("boom"));
        assert_eq!(format!("{err}"), "failed to initialise logger");
        assert!(err.source().is_some());

        let err = TracingError::tracer_init(std::io::Error::other("boom"));
        assert_eq!(format!("{err}"), "failed to initialise OpenTelemetry tracer");
    }
}
