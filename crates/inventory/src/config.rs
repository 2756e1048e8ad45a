//! Inventory configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Hosted store (both or neither)
//! - `SUPABASE_URL` - Project URL, e.g. `https://abc.supabase.co`
//! - `SUPABASE_ANON_KEY` - Project API key
//!
//! When either is missing the in-memory mock store is used instead. This is
//! not an error.
//!
//! ## Optional
//! - `INVENTORY_HTTP_TIMEOUT_SECS` - Hosted store request timeout (default: 10)
//! - `INVENTORY_STRICT_RACKS` - Require the rack to exist before adding or
//!   moving a product (default: false)
//! - `INVENTORY_MOCK_SEED` - Start the mock with demo racks and products (default: true)
//! - `INVENTORY_MOCK_LATENCY_MS` - Simulated mock round trip (default: 0)

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "your_",
    "changeme",
    "replace",
    "placeholder",
    "xxx",
    "todo",
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
}

/// Inventory service configuration.
#[derive(Debug, Clone)]
pub struct InventoryConfig {
    /// Hosted store, if both of its variables were set
    pub remote: Option<RemoteStoreConfig>,
    /// Check that a product's rack exists before writing it
    pub strict_racks: bool,
    /// Mock store behaviour (ignored when `remote` is set)
    pub mock: MockConfig,
}

/// Hosted PostgREST store configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct RemoteStoreConfig {
    /// Project URL (the REST path is appended by the client)
    pub url: Url,
    /// Project API key, sent as both `apikey` and bearer token
    pub api_key: SecretString,
    /// Per-request timeout
    pub timeout: Duration,
}

impl std::fmt::Debug for RemoteStoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteStoreConfig")
            .field("url", &self.url.as_str())
            .field("api_key", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// In-memory mock configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockConfig {
    /// Load the demo racks and products at startup
    pub seed: bool,
    /// Delay applied to every mock call
    pub latency: Duration,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            seed: true,
            latency: Duration::ZERO,
        }
    }
}

impl InventoryConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup` instead of the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but malformed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(lookup);

        Ok(Self {
            remote: RemoteStoreConfig::from_env(&env)?,
            strict_racks: env.parse_or("INVENTORY_STRICT_RACKS", false)?,
            mock: MockConfig {
                seed: env.parse_or("INVENTORY_MOCK_SEED", true)?,
                latency: Duration::from_millis(env.parse_or("INVENTORY_MOCK_LATENCY_MS", 0)?),
            },
        })
    }

    /// Returns the hosted store configuration, if one was supplied.
    ///
    /// Returns `None` when the mock store should be used.
    #[must_use]
    pub const fn remote(&self) -> Option<&RemoteStoreConfig> {
        self.remote.as_ref()
    }
}

impl RemoteStoreConfig {
    fn from_env<F: Fn(&str) -> Option<String>>(env: &Env<F>) -> Result<Option<Self>, ConfigError> {
        let url = env.optional("SUPABASE_URL");
        let key = env.optional("SUPABASE_ANON_KEY");

        let (url, key) = match (url, key) {
            (Some(url), Some(key)) => (url, key),
            (None, None) => return Ok(None),
            (Some(_), None) | (None, Some(_)) => {
                tracing::warn!(
                    "Only one of SUPABASE_URL and SUPABASE_ANON_KEY is set; falling back to the mock store"
                );
                return Ok(None);
            }
        };

        let url = Url::parse(&url)
            .map_err(|e| ConfigError::InvalidEnvVar("SUPABASE_URL".to_string(), e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEnvVar(
                "SUPABASE_URL".to_string(),
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }

        let api_key = SecretString::from(key);
        if let Some(pattern) = placeholder_pattern(api_key.expose_secret()) {
            tracing::warn!("SUPABASE_ANON_KEY looks like a placeholder (contains '{pattern}')");
        }

        let timeout = Duration::from_secs(
            env.parse_or("INVENTORY_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?,
        );

        Ok(Some(Self {
            url,
            api_key,
            timeout,
        }))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    /// Get an optional variable; blank values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Parse a variable, falling back to `default` when unset.
    fn parse_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(key).map_or(Ok(default), |raw| {
            raw.parse::<T>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }
}

/// Return the first placeholder pattern found in `secret`, if any.
fn placeholder_pattern(secret: &str) -> Option<&'static str> {
    let lower = secret.to_lowercase();
    PLACEHOLDER_PATTERNS
        .iter()
        .copied()
        .find(|pattern| lower.contains(pattern))
}

/// Read a required variable from the process environment.
///
/// # Errors
///
/// Returns `ConfigError::MissingEnvVar` if `key` is unset or blank.
pub fn required_secret(key: &str) -> Result<SecretString, ConfigError> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(SecretString::from)
        .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}
