//! Watcher configuration
//!
//! Defines the backend connection and the polling tunables. All intervals
//! and ceilings are configurable so the same watcher works against a local
//! backend and a slow remote one.

use std::time::Duration;

use anyhow::Context;
use flexi_client::BackendClient;
use flexi_core::poll::PollPolicy;

/// Watcher configuration
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    /// Backend base URL (e.g., "http://localhost:8080")
    pub backend_url: String,

    /// Bearer token issued by the auth middleware
    pub token: Option<String>,

    /// How often to poll the execution logs
    pub poll_interval: Duration,

    /// Consecutive failed polls before giving up; `None` never gives up
    pub max_consecutive_errors: Option<u32>,

    /// Maximum time to wait for a terminal record; `None` waits forever
    pub timeout: Option<Duration>,
}

impl WatcherConfig {
    pub const DEFAULT_BACKEND_URL: &'static str = "http://localhost:8080";

    /// Creates a new configuration with defaults
    pub fn new(backend_url: impl Into<String>) -> Self {
        let policy = PollPolicy::default();
        Self {
            backend_url: backend_url.into(),
            token: None,
            poll_interval: policy.interval,
            max_consecutive_errors: policy.max_consecutive_errors,
            timeout: policy.timeout,
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables (all optional):
    /// - FLEXI_BACKEND_URL (default: http://localhost:8080)
    /// - FLEXI_TOKEN
    /// - FLEXI_POLL_INTERVAL_MS (default: 1500)
    /// - FLEXI_MAX_POLL_ERRORS (default: 10, 0 retries forever)
    /// - FLEXI_POLL_TIMEOUT (seconds, default: 300, 0 waits forever)
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let backend_url =
            lookup("FLEXI_BACKEND_URL").unwrap_or_else(|| Self::DEFAULT_BACKEND_URL.to_string());
        let mut config = Self::new(backend_url);

        config.token = lookup("FLEXI_TOKEN").filter(|token| !token.is_empty());

        if let Some(raw) = lookup("FLEXI_POLL_INTERVAL_MS") {
            let ms = raw
                .parse::<u64>()
                .with_context(|| format!("FLEXI_POLL_INTERVAL_MS is not a number: {}", raw))?;
            config.poll_interval = Duration::from_millis(ms);
        }

        if let Some(raw) = lookup("FLEXI_MAX_POLL_ERRORS") {
            let max = raw
                .parse::<u32>()
                .with_context(|| format!("FLEXI_MAX_POLL_ERRORS is not a number: {}", raw))?;
            config.max_consecutive_errors = (max > 0).then_some(max);
        }

        if let Some(raw) = lookup("FLEXI_POLL_TIMEOUT") {
            let secs = raw
                .parse::<u64>()
                .with_context(|| format!("FLEXI_POLL_TIMEOUT is not a number: {}", raw))?;
            config.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }

        Ok(config)
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.token = (!token.is_empty()).then_some(token);
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.backend_url.is_empty() {
            anyhow::bail!("backend_url cannot be empty");
        }

        if !self.backend_url.starts_with("http://") && !self.backend_url.starts_with("https://") {
            anyhow::bail!("backend_url must start with http:// or https://");
        }

        if self.poll_interval.is_zero() {
            anyhow::bail!("poll_interval must be greater than 0");
        }

        if let Some(timeout) = self.timeout {
            if timeout < self.poll_interval {
                anyhow::bail!("timeout must not be shorter than poll_interval");
            }
        }

        Ok(())
    }

    /// The polling policy described by this configuration
    pub fn policy(&self) -> PollPolicy {
        PollPolicy::default()
            .with_interval(self.poll_interval)
            .with_max_consecutive_errors(self.max_consecutive_errors)
            .with_timeout(self.timeout)
    }

    /// Builds a backend client for this configuration
    pub fn client(&self) -> BackendClient {
        let client = BackendClient::new(self.backend_url.clone());
        match &self.token {
            Some(token) => client.with_token(token.clone()),
            None => client,
        }
    }
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BACKEND_URL)
    }
}
