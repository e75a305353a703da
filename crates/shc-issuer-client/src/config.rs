//! Key set client configuration.
//!
//! Defaults suit interactive use. Override through environment variables
//! or by constructing [`IssuerClientConfig`] directly in tests.

/// Default request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default lifetime of a cached key set.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Default number of retries after a failed key set request.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default first retry delay; later retries double it.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 200;

/// Configuration for [`IssuerKeyClient`](crate::IssuerKeyClient).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuerClientConfig {
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// How long a fetched key set is reused, in seconds. Zero disables caching.
    pub cache_ttl_secs: u64,
    /// `User-Agent` header sent with key set requests.
    pub user_agent: String,
    /// Retries after a transport failure or transient status. Zero disables retry.
    pub max_retries: u32,
    /// Delay before the first retry, in milliseconds.
    pub retry_delay_ms: u64,
}

impl Default for IssuerClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            user_agent: default_user_agent(),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
        }
    }
}

impl IssuerClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `SHC_HTTP_TIMEOUT_SECS` (default: 10)
    /// - `SHC_JWKS_CACHE_TTL_SECS` (default: 300)
    /// - `SHC_USER_AGENT` (default: `shc/<version>`)
    /// - `SHC_HTTP_MAX_RETRIES` (default: 3)
    /// - `SHC_HTTP_RETRY_DELAY_MS` (default: 200)
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            timeout_secs: env_number("SHC_HTTP_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
            cache_ttl_secs: env_number("SHC_JWKS_CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS)?,
            user_agent: std::env::var("SHC_USER_AGENT").unwrap_or_else(|_| default_user_agent()),
            max_retries: env_number("SHC_HTTP_MAX_RETRIES", DEFAULT_MAX_RETRIES)?,
            retry_delay_ms: env_number("SHC_HTTP_RETRY_DELAY_MS", DEFAULT_RETRY_DELAY_MS)?,
        })
    }
}

fn default_user_agent() -> String {
    format!("shc/{}", env!("CARGO_PKG_VERSION"))
}

fn env_number<T: std::str::FromStr>(var: &str, default: T) -> Result<T, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber(var.to_string(), raw)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A numeric variable is not a non-negative integer.
    #[error("invalid value for {0}: \"{1}\" is not a non-negative whole number")]
    InvalidNumber(String, String),
}
