//! Configuration for the Axiom export pipeline.
//!
//! Configuration is read once at process start from `AXIOM_*` environment
//! variables layered over compiled-in defaults using figment. Values are
//! treated as immutable for the process lifetime.
//!
//! | Variable | Field | Default |
//! |----------|-------|---------|
//! | `AXIOM_SERVICE_NAME` | `service_name` | `default-ax-service` |
//! | `AXIOM_TOKEN` | `token` | empty |
//! | `AXIOM_TRACES_DATASET` | `traces_dataset` | empty |
//! | `AXIOM_OTLP_ENDPOINT` | `otlp_endpoint` | `https://api.axiom.co` |
//! | `AXIOM_SERVICE_VERSION` | `service_version` | `0.0.0` |
//! | `AXIOM_ENVIRONMENT` | `environment` | `default-ax-environment` |

use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const ENV_PREFIX: &str = "AXIOM_";

/// Settings for the Axiom OTLP export pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TracingConfig {
    /// Logical service name, recorded as the `service.name` resource attribute.
    pub service_name: String,
    /// Axiom API token, sent as the bearer credential on every export request.
    pub token: String,
    /// Axiom dataset that receives the spans, sent as the `X-AXIOM-DATASET` header.
    pub traces_dataset: String,
    /// Base URL of the OTLP collector.
    pub otlp_endpoint: String,
    /// Service version, recorded as the `service.version` resource attribute.
    pub service_version: String,
    /// Deployment environment, recorded as the `environment` resource attribute.
    pub environment: String,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            service_name: "default-ax-service".to_string(),
            token: String::new(),
            traces_dataset: String::new(),
            otlp_endpoint: "https://api.axiom.co".to_string(),
            service_version: "0.0.0".to_string(),
            environment: "default-ax-environment".to_string(),
        }
    }
}

impl TracingConfig {
    /// Loads configuration from `AXIOM_*` environment variables, falling back
    /// to the documented defaults for anything unset.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be deserialised into its field.
    #[allow(clippy::result_large_err)]
    pub fn from_env() -> Result<Self, figment::Error> {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()
    }

    /// Static headers attached to every OTLP export request.
    pub fn export_headers(&self) -> HashMap<String, String> {
        HashMap::from([
            ("Authorization".to_string(), format!("Bearer {}", self.token)),
            ("X-AXIOM-DATASET".to_string(), self.traces_dataset.clone()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_defaults_without_env() {
        temp_env::with_vars_unset(
            [
                "AXIOM_SERVICE_NAME",
                "AXIOM_TOKEN",
                "AXIOM_TRACES_DATASET",
                "AXIOM_OTLP_ENDPOINT",
                "AXIOM_SERVICE_VERSION",
                "AXIOM_ENVIRONMENT",
            ],
            || {
                let config = TracingConfig::from_env().unwrap();
                assert_eq!(config.service_name, "default-ax-service");
                assert_eq!(config.token, "");
                assert_eq!(config.traces_dataset, "");
                assert_eq!(config.otlp_endpoint, "https://api.axiom.co");
                assert_eq!(config.service_version, "0.0.0");
                assert_eq!(config.environment, "default-ax-environment");
            },
        );
    }

    #[test]
    #[serial]
    fn test_env_overrides_defaults() {
        temp_env::with_vars(
            [
                ("AXIOM_SERVICE_NAME", Some("authorizer")),
                ("AXIOM_TOKEN", Some("xaat-secret")),
                ("AXIOM_TRACES_DATASET", Some("lambda-traces")),
                ("AXIOM_OTLP_ENDPOINT", Some("https://collector.example.com")),
                ("AXIOM_SERVICE_VERSION", Some("1.2.3")),
                ("AXIOM_ENVIRONMENT", Some("production")),
            ],
            || {
                let config = TracingConfig::from_env().unwrap();
                assert_eq!(config.service_name, "authorizer");
                assert_eq!(config.token, "xaat-secret");
                assert_eq!(config.traces_dataset, "lambda-traces");
                assert_eq!(config.otlp_endpoint, "https://collector.example.com");
                assert_eq!(config.service_version, "1.2.3");
                assert_eq!(config.environment, "production");
            },
        );
    }

    #[test]
    fn test_export_headers() {
        let config = TracingConfig {
            token: "xaat-secret".to_string(),
            traces_dataset: "lambda-traces".to_string(),
            ..TracingConfig::default()
        };

        let headers = config.export_headers();
        assert_eq!(headers["Authorization"], "Bearer xaat-secret");
        assert_eq!(headers["X-AXIOM-DATASET"], "lambda-traces");
    }
}
