//! Bearer-token validation against the OAuth userinfo endpoint.

use crate::error::AuthError;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_ENDPOINT: &str = "https://apis.roblox.com/oauth/v1/userinfo";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Profile payload returned by the userinfo endpoint on success.
#[derive(Debug, Clone, Deserialize)]
pub struct UserInfo {
    /// Subject identifier.
    #[serde(default)]
    pub sub: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Nickname.
    #[serde(default)]
    pub nickname: String,
    /// Login name.
    #[serde(default, rename = "preferred_username")]
    pub username: String,
    /// Profile URL; its second-to-last path segment is the numeric user ID.
    #[serde(default)]
    pub profile: String,
    /// Avatar URL.
    #[serde(default)]
    pub picture: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    #[allow(dead_code)]
    error: String,
    #[serde(default)]
    error_description: String,
}

/// Client for the OAuth userinfo endpoint.
///
/// Each [`validate`](Self::validate) call is a single independent round-trip:
/// no retries, no caching. Repeated calls with the same token yield the same
/// identity as long as the token stays valid upstream.
#[derive(Debug, Clone)]
pub struct UserInfoClient {
    client: Client,
    endpoint: String,
}

impl UserInfoClient {
    /// Creates a client for the Roblox userinfo endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new() -> Result<Self, AuthError> {
        Self::with_endpoint(DEFAULT_ENDPOINT)
    }

    /// Creates a client for a custom userinfo endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_endpoint(endpoint: impl Into<String>) -> Result<Self, AuthError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(AuthError::Http)?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Exchanges a bearer token for the numeric user ID it belongs to.
    ///
    /// The token must already have its `Bearer ` prefix stripped. The ID is
    /// extracted from the `profile` URL's second-to-last path segment and
    /// returned in canonical decimal form.
    ///
    /// # Errors
    ///
    /// * [`AuthError::Unauthorized`] - the provider rejected the token; the
    ///   message is the provider's `error_description`.
    /// * [`AuthError::Upstream`] - any other non-2xx status.
    /// * [`AuthError::MalformedProfile`] - the profile URL carries no
    ///   numeric ID where one is expected.
    /// * [`AuthError::Http`] - transport or body-decoding failure.
    pub async fn validate(&self, token: &str) -> Result<String, AuthError> {
        let response = self
            .client
            .get(&self.endpoint)
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            let body: ErrorBody = response.json().await?;
            return Err(AuthError::Unauthorized {
                description: body.error_description,
            });
        }

        if !status.is_success() {
            return Err(AuthError::Upstream {
                status: status.as_u16(),
            });
        }

        let info: UserInfo = response.json().await?;
        user_id_from_profile(&info.profile).ok_or(AuthError::MalformedProfile {
            profile: info.profile,
        })
    }
}

/// Extracts the user ID embedded in a profile URL such as
/// `https://www.roblox.com/users/42/profile`.
fn user_id_from_profile(profile: &str) -> Option<String> {
    let parts: Vec<&str> = profile.split('/').collect();
    if parts.len() < 2 {
        return None;
    }

    let user_id: i64 = parts[parts.len() - 2].parse().ok()?;
    Some(user_id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_from_profile() {
        assert_eq!(
            user_id_from_profile("https://www.roblox.com/users/42/profile"),
            Some("42".to_string())
        );
        assert_eq!(
            user_id_from_profile("https://example.com/users/123456789/profile"),
            Some("123456789".to_string())
        );
    }

    #[test]
    fn test_user_id_requires_numeric_segment() {
        assert_eq!(user_id_from_profile("https://example.com/users/abc/profile"), None);
        // Without a trailing segment the second-to-last component is not the ID.
        assert_eq!(user_id_from_profile("https://example.com/users/42"), None);
        assert_eq!(user_id_from_profile(""), None);
        assert_eq!(user_id_from_profile("no-slashes-here"), None);
    }

    #[test]
    fn test_user_id_is_canonicalised() {
        // Leading zeroes survive integer parsing but not formatting.
        assert_eq!(
            user_id_from_profile("https://example.com/users/042/profile"),
            Some("42".to_string())
        );
    }
}
