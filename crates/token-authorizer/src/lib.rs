//! API Gateway Lambda authorizer for Roblox OAuth bearer tokens.
//!
//! Exchanges the bearer token from the incoming request for a verified user
//! identity via the OAuth userinfo endpoint, then assembles an authorization
//! decision for the gateway. Two decision shapes are supported:
//!
//! - [`authorize`] answers a REST API `TOKEN` authorizer event with a full
//!   IAM-style policy document.
//! - [`authorize_simple`] answers an HTTP API v2 authorizer with the
//!   simplified `isAuthorized` form; a missing or empty `Authorization`
//!   header is denied without any outbound call.
//!
//! Validation is a single HTTP round-trip per invocation: no retries, no
//! caching of identities.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod policy;
mod userinfo;

pub use error::AuthError;
pub use policy::{allow_policy, deny_policy, simple_response};
pub use userinfo::{UserInfo, UserInfoClient};

use aws_lambda_events::apigw::{
    ApiGatewayCustomAuthorizerRequest, ApiGatewayCustomAuthorizerResponse,
    ApiGatewayV2CustomAuthorizerSimpleResponse,
};

/// Handles a REST API `TOKEN` authorizer event.
///
/// Strips the `Bearer ` prefix, validates the token, and allows
/// `execute-api:Invoke` on the requested method ARN for the resolved user.
///
/// # Errors
///
/// Propagates [`AuthError`] from validation; the gateway treats a handler
/// error as a denial. An event with no usable token fails as
/// [`AuthError::Unauthorized`] without an outbound call.
pub async fn authorize(
    client: &UserInfoClient,
    event: ApiGatewayCustomAuthorizerRequest,
) -> Result<ApiGatewayCustomAuthorizerResponse, AuthError> {
    let raw = event.authorization_token.unwrap_or_default();
    let token = strip_bearer(&raw);
    if token.is_empty() {
        return Err(AuthError::Unauthorized {
            description: "missing authorization token".to_string(),
        });
    }

    let user_id = client.validate(token).await?;
    tracing::info!(user_id, "token validated");

    let method_arn = event.method_arn.unwrap_or_default();
    Ok(allow_policy(&user_id, &method_arn))
}

/// Handles an HTTP API v2 authorizer's `Authorization` header value.
///
/// A missing or empty header is denied immediately, with no outbound call.
///
/// # Errors
///
/// Propagates [`AuthError`] when a token was present but validation failed.
pub async fn authorize_simple(
    client: &UserInfoClient,
    authorization: Option<&str>,
) -> Result<ApiGatewayV2CustomAuthorizerSimpleResponse, AuthError> {
    let token = authorization.map(strip_bearer).unwrap_or_default();
    if token.is_empty() {
        tracing::info!("no authorization header, denying without validation");
        return Ok(simple_response(None));
    }

    let user_id = client.validate(token).await?;
    tracing::info!(user_id, "token validated");

    Ok(simple_response(Some(&user_id)))
}

fn strip_bearer(raw: &str) -> &str {
    raw.strip_prefix("Bearer ").unwrap_or(raw).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_bearer() {
        assert_eq!(strip_bearer("Bearer abc123"), "abc123");
        assert_eq!(strip_bearer("abc123"), "abc123");
        assert_eq!(strip_bearer("Bearer "), "");
        assert_eq!(strip_bearer(""), "");
    }
}
