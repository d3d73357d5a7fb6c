//! Client configuration options.

use std::time::Duration;

use crate::{Error, Result};

/// Default OAuth token endpoint.
pub const DEFAULT_TOKEN_URL: &str = "https://api.directory.example/oauth/token";

/// Default base URL for resource endpoints.
pub const DEFAULT_API_URL: &str = "https://api.directory.example/v1";

/// Default number of items requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Configuration for the directory client.
///
/// # Example
///
/// ```
/// use directory_client::{ClientConfig, RetryPolicy};
/// use std::time::Duration;
///
/// let config = ClientConfig::default()
///     .with_timeout(Duration::from_secs(60))
///     .with_page_size(50)
///     .with_retry(RetryPolicy::default().with_max_tries(5));
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL that resource paths are appended to
    pub api_base_url: String,
    /// Absolute URL of the OAuth token endpoint
    pub token_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// User-Agent header value
    pub user_agent: String,
    /// Retry configuration
    pub retry: RetryPolicy,
    /// Default page size for collection endpoints
    pub page_size: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            timeout: Duration::from_secs(30),
            user_agent: format!("directory-client/{} (Rust)", env!("CARGO_PKG_VERSION")),
            retry: RetryPolicy::default(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ClientConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a configuration from `DIRECTORY_*` environment variables,
    /// falling back to defaults for anything unset.
    ///
    /// Recognized variables: `DIRECTORY_API_URL`, `DIRECTORY_TOKEN_URL`,
    /// `DIRECTORY_TIMEOUT_SECS` and `DIRECTORY_PAGE_SIZE`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(url) = lookup("DIRECTORY_API_URL") {
            config.api_base_url = url;
        }
        if let Some(url) = lookup("DIRECTORY_TOKEN_URL") {
            config.token_url = url;
        }
        if let Some(secs) = lookup("DIRECTORY_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().map_err(|_| {
                Error::Config(format!("DIRECTORY_TIMEOUT_SECS is not a number: {secs}"))
            })?;
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(size) = lookup("DIRECTORY_PAGE_SIZE") {
            let size: u32 = size.parse().map_err(|_| {
                Error::Config(format!("DIRECTORY_PAGE_SIZE is not a number: {size}"))
            })?;
            config.page_size = size;
        }

        Ok(config)
    }

    /// Set the base URL for resource endpoints.
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Set the OAuth token endpoint.
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the User-Agent header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the retry configuration.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set the default page size for collection endpoints.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }
}

/// Configuration for automatic retries.
///
/// Retries use a flat delay: the server's `Retry-After` on a 429, or
/// `default_backoff` otherwise. There is no exponential growth and no
/// jitter.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// HTTP status codes to retry on
    pub retry_statuses: Vec<u16>,
    /// Delay used when the server does not dictate one
    pub default_backoff: Duration,
    /// Total number of sends allowed; `None` retries forever
    pub max_tries: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retry_statuses: vec![429, 500, 502, 503, 504],
            default_backoff: Duration::from_secs(10),
            max_tries: None,
        }
    }
}

impl RetryPolicy {
    /// Create a policy that never retries.
    pub fn no_retry() -> Self {
        Self {
            max_tries: Some(1),
            ..Default::default()
        }
    }

    /// Cap the total number of sends.
    pub fn with_max_tries(mut self, max: u32) -> Self {
        self.max_tries = Some(max);
        self
    }

    /// Set the delay used when the server does not send `Retry-After`.
    pub fn with_default_backoff(mut self, backoff: Duration) -> Self {
        self.default_backoff = backoff;
        self
    }

    /// Replace the set of retryable status codes.
    pub fn with_retry_statuses(mut self, statuses: impl Into<Vec<u16>>) -> Self {
        self.retry_statuses = statuses.into();
        self
    }

    /// Check if a status code should be retried.
    pub fn should_retry_status(&self, status: u16) -> bool {
        self.retry_statuses.contains(&status)
    }

    /// Whether another send is allowed after `attempts` sends.
    pub fn allows_another(&self, attempts: u32) -> bool {
        self.max_tries.map_or(true, |max| attempts < max)
    }

    /// Delay before the next send.
    ///
    /// A numeric `Retry-After` only counts on a 429.
    pub fn delay_for(&self, status: u16, retry_after: Option<&str>) -> Duration {
        if status == 429 {
            if let Some(secs) = retry_after.and_then(|v| v.trim().parse::<u64>().ok()) {
                return Duration::from_secs(secs);
            }
        }
        self.default_backoff
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
        assert!(config.user_agent.starts_with("directory-client/"));
    }

    #[test]
    fn test_default_retry_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.retry_statuses, vec![429, 500, 502, 503, 504]);
        assert_eq!(policy.default_backoff, Duration::from_secs(10));
        assert_eq!(policy.max_tries, None);
        assert!(policy.allows_another(1_000));
    }

    #[test]
    fn test_should_retry_status() {
        let policy = RetryPolicy::default();
        assert!(policy.should_retry_status(429));
        assert!(policy.should_retry_status(503));
        assert!(!policy.should_retry_status(404));
        assert!(!policy.should_retry_status(401));
    }

    #[test]
    fn test_max_tries() {
        let policy = RetryPolicy::default().with_max_tries(2);
        assert!(policy.allows_another(1));
        assert!(!policy.allows_another(2));
        assert!(!RetryPolicy::no_retry().allows_another(1));
    }

    #[test]
    fn test_delay_for_retry_after() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(429, Some("7")), Duration::from_secs(7));
        assert_eq!(policy.delay_for(429, None), Duration::from_secs(10));
        assert_eq!(
            policy.delay_for(429, Some("Wed, 21 Oct 2015 07:28:00 GMT")),
            Duration::from_secs(10)
        );
        // Only a 429 may dictate the delay
        assert_eq!(policy.delay_for(503, Some("7")), Duration::from_secs(10));
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("DIRECTORY_API_URL", "http://localhost:9000/v1"),
            ("DIRECTORY_PAGE_SIZE", "25"),
            ("DIRECTORY_TIMEOUT_SECS", "5"),
        ]
        .into_iter()
        .collect();

        let config = ClientConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.api_base_url, "http://localhost:9000/v1");
        assert_eq!(config.token_url, DEFAULT_TOKEN_URL);
        assert_eq!(config.page_size, 25);
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_from_lookup_rejects_bad_numbers() {
        let err = ClientConfig::from_lookup(|k| {
            (k == "DIRECTORY_PAGE_SIZE").then(|| "lots".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
