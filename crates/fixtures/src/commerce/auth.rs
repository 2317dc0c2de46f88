//! Commerce backend authentication.
//!
//! Both credential tiers use the OAuth client-credentials grant against
//! `{endpoint}/oauth/token`. The standard tier is a sales-channel client
//! (public, no secret); the elevated tier is an integration client and must
//! send its secret.

use core::fmt;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use url::Url;

use super::CommerceError;

/// Default token lifetime when the backend omits `expires_in`.
const DEFAULT_EXPIRES_IN: i64 = 4 * 60 * 60;

/// Which set of credentials a token was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialTier {
    /// Sales-channel credentials used for customer-facing order assembly.
    Standard,
    /// Integration credentials, required for gift card activation.
    Elevated,
}

impl CredentialTier {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Elevated => "elevated",
        }
    }
}

impl fmt::Display for CredentialTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Access token obtained from the token endpoint.
#[derive(Debug, Clone)]
pub struct AccessToken {
    /// Bearer token for API requests.
    pub token: SecretString,
    /// Unix timestamp when the token expires.
    pub expires_at: i64,
    /// Scope the token was granted for.
    pub scope: Option<String>,
}

impl AccessToken {
    /// Check if the token has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        // Consider expired if less than 60 seconds remaining
        self.expires_within(60)
    }

    /// Check if the token will expire within the given number of seconds.
    #[must_use]
    pub fn expires_within(&self, seconds: i64) -> bool {
        let now = chrono::Utc::now().timestamp();
        now >= self.expires_at.saturating_sub(seconds)
    }
}

/// Request body for the client-credentials grant.
#[derive(Serialize)]
struct TokenRequest<'a> {
    grant_type: &'static str,
    client_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_secret: Option<&'a str>,
    scope: &'a str,
}

/// Response from the token endpoint.
#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    scope: Option<String>,
}

/// Error response from the token endpoint.
#[derive(Deserialize)]
struct TokenErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// Build the OAuth scope for a market.
///
/// A bare market id becomes `market:<id>`; a value that already carries a
/// scope prefix (`market:id:abc`, `market:code:eu`) is used as is.
#[must_use]
pub fn market_scope(market: &str) -> String {
    if market.contains(':') {
        market.to_owned()
    } else {
        format!("market:{market}")
    }
}

/// Obtain a standard-tier token from a sales-channel client.
///
/// # Errors
///
/// Returns `CommerceError::AuthenticationFailed` if the backend rejects the
/// client, or `CommerceError::Http` if the request cannot be sent.
#[instrument(skip(http), fields(endpoint = %endpoint))]
pub async fn sales_channel_token(
    http: &reqwest::Client,
    endpoint: &Url,
    client_id: &str,
    scope: &str,
) -> Result<AccessToken, CommerceError> {
    request_token(
        http,
        endpoint,
        &TokenRequest {
            grant_type: "client_credentials",
            client_id,
            client_secret: None,
            scope,
        },
    )
    .await
}

/// Obtain an elevated-tier token from an integration client.
///
/// # Errors
///
/// Returns `CommerceError::AuthenticationFailed` if the backend rejects the
/// credentials, or `CommerceError::Http` if the request cannot be sent.
#[instrument(skip(http, client_secret), fields(endpoint = %endpoint))]
pub async fn integration_token(
    http: &reqwest::Client,
    endpoint: &Url,
    client_id: &str,
    client_secret: &SecretString,
    scope: &str,
) -> Result<AccessToken, CommerceError> {
    request_token(
        http,
        endpoint,
        &TokenRequest {
            grant_type: "client_credentials",
            client_id,
            client_secret: Some(client_secret.expose_secret()),
            scope,
        },
    )
    .await
}

/// Absolute expiry for a token issued at `now`, clamped on absurd lifetimes.
fn expiry(now: i64, expires_in: Option<i64>) -> i64 {
    now.saturating_add(expires_in.unwrap_or(DEFAULT_EXPIRES_IN))
}

async fn request_token(
    http: &reqwest::Client,
    endpoint: &Url,
    request: &TokenRequest<'_>,
) -> Result<AccessToken, CommerceError> {
    let url = token_url(endpoint)?;
    let now = chrono::Utc::now().timestamp();

    let response = http.post(url).json(request).send().await?;
    let status = response.status();

    if status.is_success() {
        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| CommerceError::Parse(format!("Failed to parse token response: {e}")))?;

        tracing::debug!(scope = ?body.scope, "Access token issued");

        return Ok(AccessToken {
            token: SecretString::from(body.access_token),
            expires_at: expiry(now, body.expires_in),
            scope: body.scope,
        });
    }

    let text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());

    let message = serde_json::from_str::<TokenErrorResponse>(&text)
        .ok()
        .and_then(|e| e.error_description.or(e.error))
        .unwrap_or(text);

    Err(CommerceError::AuthenticationFailed(format!(
        "HTTP {status}: {message}"
    )))
}

fn token_url(endpoint: &Url) -> Result<Url, CommerceError> {
    endpoint
        .join("/oauth/token")
        .map_err(|e| CommerceError::Parse(format!("Invalid token endpoint: {e}")))
}
