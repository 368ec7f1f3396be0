use std::env;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::reddit::client::{RedditCredentials, DEFAULT_API_URL, DEFAULT_AUTH_URL};

/// User-agent sent when REDDIT_USER_AGENT is not set.
pub const DEFAULT_USER_AGENT: &str = "emotion-analyzer/0.1";

/// Central configuration loaded from environment variables.
///
/// Secrets come from env vars only. The .env file is loaded at startup via
/// dotenvy, so a local .env works the same as exported variables.
pub struct Config {
    pub reddit_client_id: String,
    pub reddit_client_secret: String,
    pub reddit_user_agent: String,
    /// OAuth token endpoint (override for proxies or test servers)
    pub reddit_auth_url: String,
    /// Base URL for listing requests
    pub reddit_api_url: String,
    /// How long cached analyses stay valid; None keeps them for the process lifetime
    pub cache_ttl: Option<Duration>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Credentials may be empty here; `require_reddit` checks them right
    /// before a client is built, so `--help` and the like work without them.
    pub fn load() -> Result<Self> {
        let cache_ttl = match env::var("EMOTION_CACHE_TTL_SECS") {
            Ok(raw) if !raw.trim().is_empty() => {
                let secs: u64 = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("EMOTION_CACHE_TTL_SECS must be a whole number of seconds, got {raw:?}"))?;
                // 0 means "never expire", same as unset
                (secs > 0).then(|| Duration::from_secs(secs))
            }
            _ => None,
        };

        Ok(Self {
            reddit_client_id: env::var("REDDIT_CLIENT_ID").unwrap_or_default(),
            reddit_client_secret: env::var("REDDIT_CLIENT_SECRET").unwrap_or_default(),
            reddit_user_agent: env::var("REDDIT_USER_AGENT")
                .ok()
                .filter(|ua| !ua.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            reddit_auth_url: env::var("REDDIT_AUTH_URL")
                .unwrap_or_else(|_| DEFAULT_AUTH_URL.to_string()),
            reddit_api_url: env::var("REDDIT_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            cache_ttl,
        })
    }

    /// Check that the Reddit app credentials are configured.
    /// Call this before building a Reddit client.
    pub fn require_reddit(&self) -> Result<()> {
        if self.reddit_client_id.is_empty() || self.reddit_client_secret.is_empty() {
            anyhow::bail!(
                "REDDIT_CLIENT_ID and REDDIT_CLIENT_SECRET must be set. Add them to your .env file.\n\
                 Create a \"script\" app at https://www.reddit.com/prefs/apps to get them."
            );
        }
        Ok(())
    }

    /// The credential triple the Reddit client is built from.
    pub fn reddit_credentials(&self) -> RedditCredentials {
        RedditCredentials {
            client_id: self.reddit_client_id.clone(),
            client_secret: self.reddit_client_secret.clone(),
            user_agent: self.reddit_user_agent.clone(),
        }
    }
}

/// Subreddit pre-filled in the UI and used when the CLI gets none.
pub const DEFAULT_CHANNEL: &str = "AskReddit";

/// Keyword pre-filled in the UI.
pub const DEFAULT_KEYWORD: &str = "how";

/// Post count pre-filled in the UI.
pub const DEFAULT_LIMIT: usize = 10;

/// Smallest post count the web UI accepts.
pub const MIN_UI_LIMIT: usize = 5;

/// Largest post count the web UI accepts.
pub const MAX_UI_LIMIT: usize = 100;
