// Reddit OAuth client — application-only auth over HTTP.
//
// Reading public listings needs no user login. The client-credentials grant
// trades the app's client id and secret for a short-lived bearer token, which
// is cached here and refreshed a minute before Reddit says it expires.
//
// API docs: https://github.com/reddit-archive/reddit/wiki/OAuth2

use std::time::Duration;

use reqwest::{redirect, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::rate_limiter::RateLimiter;
use super::traits::SourceError;

/// Token endpoint for the client-credentials grant.
pub const DEFAULT_AUTH_URL: &str = "https://www.reddit.com/api/v1/access_token";

/// Base URL for authenticated API reads.
pub const DEFAULT_API_URL: &str = "https://oauth.reddit.com";

/// Refresh the token this long before Reddit's stated expiry.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Token lifetime used when the response doesn't state one.
const DEFAULT_TOKEN_LIFETIME_SECS: u64 = 3600;

/// Longest token lifetime we trust; Reddit issues 24h tokens.
pub const MAX_TOKEN_LIFETIME_SECS: u64 = 24 * 3600;

/// Wait assumed when a 429 carries no usable rate-limit header.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Longest wait a 429 can impose on us.
pub const MAX_RETRY_AFTER_SECS: u64 = 3600;

/// App credentials for the client-credentials grant.
#[derive(Debug, Clone)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
}

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

/// Authenticated Reddit API client.
pub struct RedditClient {
    client: reqwest::Client,
    credentials: RedditCredentials,
    auth_url: String,
    api_url: String,
    token: Mutex<Option<CachedToken>>,
    rate_limiter: RateLimiter,
}

impl RedditClient {
    /// Create a client against the public Reddit endpoints.
    pub fn new(credentials: RedditCredentials) -> Result<Self, SourceError> {
        Self::with_endpoints(credentials, DEFAULT_AUTH_URL, DEFAULT_API_URL)
    }

    /// Create a client against custom endpoints (proxies, test servers).
    pub fn with_endpoints(
        credentials: RedditCredentials,
        auth_url: &str,
        api_url: &str,
    ) -> Result<Self, SourceError> {
        // Redirects are not followed: Reddit answers an unknown subreddit
        // with a 302 to the search page, which we report as not found.
        let client = reqwest::Client::builder()
            .user_agent(credentials.user_agent.clone())
            .timeout(Duration::from_secs(30))
            .redirect(redirect::Policy::none())
            .build()
            .map_err(|e| SourceError::Network(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            credentials,
            auth_url: auth_url.to_string(),
            api_url: api_url.trim_end_matches('/').to_string(),
            token: Mutex::new(None),
            rate_limiter: RateLimiter::default(),
        })
    }

    /// Return a valid bearer token, requesting a new one if needed.
    async fn access_token(&self) -> Result<String, SourceError> {
        let mut cached = self.token.lock().await;
        if let Some(ref token) = *cached {
            if Instant::now() < token.expires_at {
                return Ok(token.access_token.clone());
            }
            debug!("Reddit access token expired, refreshing");
        }

        self.rate_limiter.acquire().await;

        let response = self
            .client
            .post(&self.auth_url)
            .basic_auth(
                &self.credentials.client_id,
                Some(&self.credentials.client_secret),
            )
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| SourceError::Network(format!("Token request failed: {e}")))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(SourceError::Auth {
                reason: format!("token endpoint returned {status}; check REDDIT_CLIENT_ID and REDDIT_CLIENT_SECRET"),
            });
        }
        if !status.is_success() {
            return Err(self.failure(status, &response).await);
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| SourceError::InvalidResponse {
                details: format!("Failed to parse token response: {e}"),
            })?;

        let (access_token, expires_in) = body.into_token()?;
        let lifetime = Duration::from_secs(expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);
        info!(expires_in, "Obtained Reddit access token");

        *cached = Some(CachedToken {
            access_token: access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });

        Ok(access_token)
    }

    /// Authenticated GET against the API base URL, deserializing JSON.
    ///
    /// `path` starts with a slash (e.g. "/r/rust/hot").
    pub async fn api_get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, SourceError> {
        let token = self.access_token().await?;
        self.rate_limiter.acquire().await;

        let url = format!("{}{}", self.api_url, path);
        debug!(path = path, "Reddit API GET");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&token)
            .query(params)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SourceError::Network(format!("Request to {path} timed out"))
                } else {
                    SourceError::Network(format!("Request to {path} failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            if status == StatusCode::UNAUTHORIZED {
                // Drop the token so the next call fetches a fresh one
                *self.token.lock().await = None;
            }
            warn!(path = path, status = status.as_u16(), "Reddit API request failed");
            return Err(self.failure(status, &response).await);
        }

        response
            .json::<T>()
            .await
            .map_err(|e| SourceError::InvalidResponse {
                details: format!("Failed to deserialize {path} response: {e}"),
            })
    }

    /// Turn a non-success response into an error, pausing the pacer on a 429.
    async fn failure(&self, status: StatusCode, response: &reqwest::Response) -> SourceError {
        let error = status_error(status, response);
        if let SourceError::RateLimited { retry_after } = error {
            self.rate_limiter
                .back_off(Duration::from_secs(retry_after))
                .await;
        }
        error
    }
}

/// Map a non-success status to a typed error. Channel-specific statuses
/// (403, 404, redirects) are refined by the caller, which knows the channel.
fn status_error(status: StatusCode, response: &reqwest::Response) -> SourceError {
    match status.as_u16() {
        401 => SourceError::Auth {
            reason: format!("Reddit returned {status}"),
        },
        429 => SourceError::RateLimited {
            retry_after: retry_after_secs(response),
        },
        code => SourceError::Http { status: code },
    }
}

/// Seconds to wait according to Reddit's rate-limit headers.
fn retry_after_secs(response: &reqwest::Response) -> u64 {
    ["retry-after", "x-ratelimit-reset"]
        .iter()
        .filter_map(|name| response.headers().get(*name))
        .filter_map(|value| value.to_str().ok())
        .find_map(parse_retry_after)
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
}

/// Parse a rate-limit header value as whole seconds, capped at
/// `MAX_RETRY_AFTER_SECS`. Negative, NaN and non-numeric values are ignored.
pub fn parse_retry_after(value: &str) -> Option<u64> {
    let secs: f64 = value.trim().parse().ok()?;
    if secs.is_nan() || secs < 0.0 {
        return None;
    }
    Some(secs.ceil().min(MAX_RETRY_AFTER_SECS as f64) as u64)
}

// -- Serde types for the token endpoint --

/// Reddit answers some credential problems with 200 and an `error` field.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    pub expires_in: Option<u64>,
    pub error: Option<String>,
}

impl TokenResponse {
    /// Extract `(access_token, expires_in_secs)` or explain why there is none.
    pub fn into_token(self) -> Result<(String, u64), SourceError> {
        if let Some(error) = self.error {
            return Err(SourceError::Auth { reason: error });
        }
        match self.access_token {
            Some(token) if !token.is_empty() => {
                let expires_in = self
                    .expires_in
                    .unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS)
                    .min(MAX_TOKEN_LIFETIME_SECS);
                Ok((token, expires_in))
            }
            _ => Err(SourceError::Auth {
                reason: "token response contained no access_token".to_string(),
            }),
        }
    }
}

// -- Serde types for listings --

/// A Reddit "Listing" envelope.
#[derive(Debug, Deserialize)]
pub struct Listing {
    pub data: ListingData,
}

#[derive(Debug, Deserialize)]
pub struct ListingData {
    pub children: Vec<ListingChild>,
    pub after: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListingChild {
    pub data: LinkData,
}

/// The fields of a link ("t3") the analyzer uses.
#[derive(Debug, Deserialize)]
pub struct LinkData {
    pub title: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub permalink: String,
}

impl LinkData {
    /// The post's link target, falling back to its comments page.
    pub fn link(&self) -> String {
        if !self.url.is_empty() {
            self.url.clone()
        } else {
            format!("https://www.reddit.com{}", self.permalink)
        }
    }
}
