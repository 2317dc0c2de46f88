//! Fixture configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `COMMERCE_ORGANIZATION` - Organization slug on the commerce backend
//! - `COMMERCE_MARKET_ID` - Market the tokens are scoped to (`market:<id>`)
//! - `COMMERCE_SALES_CHANNEL_CLIENT_ID` - Sales-channel client (standard tier)
//! - `COMMERCE_INTEGRATION_CLIENT_ID` - Integration client (elevated tier)
//! - `COMMERCE_INTEGRATION_CLIENT_SECRET` - Integration client secret (HIGH PRIVILEGE)
//!
//! ## Optional
//! - `COMMERCE_ENDPOINT` - API endpoint (default: `https://{organization}.commercelayer.io`)
//! - `CHECKOUT_BASE_URL` - Checkout app under test (default: `http://localhost:3000`)
//! - `COMMERCE_REQUEST_TIMEOUT_SECS` - Per-request timeout (default: 30)
//! - `FIXTURE_BUILD_TIMEOUT_SECS` - Whole-build timeout (default: 120)
//! - `FIXTURE_LINE_ITEM_ERRORS` - `ignore`, `collect` or `fail-fast` (default: collect)
//! - `FIXTURE_CLEANUP_ON_FAILURE` - Delete half-built orders on failure (default: false)
//!
//! Values are read from the process environment after loading `.env.local`
//! and then `.env`, so neither file overrides a variable that is already set.

use std::collections::HashMap;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

use checkout_fixtures_core::{CleanupPolicy, ItemErrorPolicy};

use crate::commerce::auth::market_scope;

const DEFAULT_CHECKOUT_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_BUILD_TIMEOUT_SECS: u64 = 120;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "your_",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "put-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Fixture configuration.
#[derive(Debug, Clone)]
pub struct FixtureConfig {
    /// Commerce backend credentials and endpoint
    pub commerce: CommerceConfig,
    /// Base URL of the checkout app the fixture navigates to
    pub checkout_base_url: Url,
    /// Upper bound on one fixture build
    pub build_timeout: Duration,
    /// How failed line item creates are handled
    pub line_item_errors: ItemErrorPolicy,
    /// What happens to a half-built order on a fatal error
    pub cleanup: CleanupPolicy,
}

/// Commerce backend configuration.
#[derive(Clone)]
pub struct CommerceConfig {
    /// Organization slug
    pub organization: String,
    /// API endpoint, e.g. `https://demo.commercelayer.io`
    pub endpoint: Url,
    /// OAuth scope for both tiers, e.g. `market:1234`
    pub scope: String,
    /// Sales-channel client ID (standard tier, public)
    pub sales_channel_client_id: String,
    /// Integration client ID (elevated tier)
    pub integration_client_id: String,
    /// Integration client secret (elevated tier)
    pub integration_client_secret: SecretString,
    /// Per-request timeout for every API call
    pub request_timeout: Duration,
}

impl std::fmt::Debug for CommerceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommerceConfig")
            .field("organization", &self.organization)
            .field("endpoint", &self.endpoint.as_str())
            .field("scope", &self.scope)
            .field("sales_channel_client_id", &self.sales_channel_client_id)
            .field("integration_client_id", &self.integration_client_id)
            .field("integration_client_secret", &"[REDACTED]")
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl FixtureConfig {
    /// Load configuration from environment variables.
    ///
    /// Loads `.env.local` and `.env` first if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the integration secret looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Missing files are fine; CI sets the variables directly
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an explicit variable map.
    ///
    /// # Errors
    ///
    /// Same as [`FixtureConfig::from_env`].
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let commerce = CommerceConfig::from_env(&env)?;
        let checkout_base_url = env.url("CHECKOUT_BASE_URL", DEFAULT_CHECKOUT_BASE_URL)?;
        let build_timeout = env.secs("FIXTURE_BUILD_TIMEOUT_SECS", DEFAULT_BUILD_TIMEOUT_SECS)?;

        let line_item_errors = match env.optional("FIXTURE_LINE_ITEM_ERRORS") {
            Some(value) => value
                .parse::<ItemErrorPolicy>()
                .map_err(|e| ConfigError::InvalidEnvVar("FIXTURE_LINE_ITEM_ERRORS".into(), e))?,
            None => ItemErrorPolicy::default(),
        };

        let cleanup = if env.flag("FIXTURE_CLEANUP_ON_FAILURE")? {
            CleanupPolicy::DeleteOrder
        } else {
            CleanupPolicy::Leave
        };

        Ok(Self {
            commerce,
            checkout_base_url,
            build_timeout,
            line_item_errors,
            cleanup,
        })
    }
}

impl CommerceConfig {
    fn from_env(env: &Env<'_>) -> Result<Self, ConfigError> {
        let organization = env.required("COMMERCE_ORGANIZATION")?;
        let default_endpoint = format!("https://{organization}.commercelayer.io");
        let endpoint = env.url("COMMERCE_ENDPOINT", &default_endpoint)?;
        let scope = market_scope(&env.required("COMMERCE_MARKET_ID")?);
        let sales_channel_client_id = env.required("COMMERCE_SALES_CHANNEL_CLIENT_ID")?;
        let integration_client_id = env.required("COMMERCE_INTEGRATION_CLIENT_ID")?;
        let integration_client_secret = env.validated_secret("COMMERCE_INTEGRATION_CLIENT_SECRET")?;
        let request_timeout =
            env.secs("COMMERCE_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?;

        Ok(Self {
            organization,
            endpoint,
            scope,
            sales_channel_client_id,
            integration_client_id,
            integration_client_secret,
            request_timeout,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable source; empty values count as unset.
struct Env<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Env<'_> {
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty())
    }

    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    fn url(&self, key: &str, default: &str) -> Result<Url, ConfigError> {
        let value = self.optional(key).unwrap_or_else(|| default.to_string());
        Url::parse(&value).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }

    fn secs(&self, key: &str, default: u64) -> Result<Duration, ConfigError> {
        let secs = match self.optional(key) {
            Some(value) => value
                .parse::<u64>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?,
            None => default,
        };
        if secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                key.to_string(),
                "must be at least 1 second".to_string(),
            ));
        }
        Ok(Duration::from_secs(secs))
    }

    fn flag(&self, key: &str) -> Result<bool, ConfigError> {
        match self.optional(key).map(|v| v.to_ascii_lowercase()).as_deref() {
            None | Some("0" | "false" | "no" | "off") => Ok(false),
            Some("1" | "true" | "yes" | "on") => Ok(true),
            Some(other) => Err(ConfigError::InvalidEnvVar(
                key.to_string(),
                format!("expected a boolean, got `{other}`"),
            )),
        }
    }

    fn validated_secret(&self, key: &str) -> Result<SecretString, ConfigError> {
        let secret = SecretString::from(self.required(key)?);
        validate_secret_strength(secret.expose_secret(), key)?;
        Ok(secret)
    }
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Reject placeholder secrets; warn on low-entropy ones.
///
/// Low entropy alone is not fatal; sandbox organizations may use short
/// secrets.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        tracing::warn!(
            var = var_name,
            entropy,
            "Secret has low entropy; check it is the issued client secret"
        );
    }

    Ok(())
}
