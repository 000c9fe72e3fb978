//! Error types for token validation.

use thiserror::Error;

/// Errors that can occur while validating a bearer token.
///
/// None of these are retried: the userinfo call is a single round-trip and
/// every failure propagates to the gateway as an access denial.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum AuthError {
    /// The identity provider rejected the token (HTTP 401).
    #[error("{description}")]
    Unauthorized {
        /// The `error_description` from the provider's error body.
        description: String,
    },

    /// The identity provider returned an unexpected non-2xx status.
    #[error("failed to validate token: upstream returned status {status}")]
    Upstream {
        /// HTTP status code returned by the provider.
        status: u16,
    },

    /// The userinfo payload did not carry a parseable user ID.
    #[error("profile URL {profile:?} does not contain a numeric user ID")]
    MalformedProfile {
        /// The profile URL that failed to parse.
        profile: String,
    },

    /// The request or body decoding failed at the transport level.
    #[error("userinfo request failed")]
    Http(#[from] reqwest::Error),
}
