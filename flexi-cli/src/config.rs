//! Configuration module
//!
//! Resolves the backend connection from the environment and command-line
//! overrides.

use anyhow::{Context, Result};
use flexi_core::UserId;
use flexi_watcher::WatcherConfig;
use tracing::debug;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend connection and polling settings
    pub watcher: WatcherConfig,

    /// User the CLI acts as, if known
    pub user_id: Option<UserId>,
}

impl Config {
    /// Reads `FLEXI_*` variables, then applies flags on top
    pub fn load(
        backend_url: Option<String>,
        token: Option<String>,
        user_id: Option<UserId>,
    ) -> Result<Self> {
        let mut watcher = WatcherConfig::from_env().context("Invalid FLEXI_* environment")?;

        if let Some(url) = backend_url {
            watcher.backend_url = url;
        }
        if let Some(token) = token {
            watcher = watcher.with_token(token);
        }

        watcher.validate()?;
        debug!(
            "Using backend {} (token: {})",
            watcher.backend_url,
            if watcher.token.is_some() { "set" } else { "none" }
        );

        Ok(Self { watcher, user_id })
    }

    /// The acting user, or an error telling how to set one
    pub fn require_user(&self) -> Result<UserId> {
        self.user_id
            .context("No user id given; pass --user-id or set FLEXI_USER_ID")
    }
}
