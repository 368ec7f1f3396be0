// Post source trait — where the pipeline gets its posts from.
//
// The ranking ("hot" order) belongs to the source. The pipeline only promises
// to keep whatever order it is handed.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::Post;

/// Why a post source could not deliver.
///
/// Every variant means "the source is unavailable" to the pipeline; the
/// distinctions are there so the message shown to the user is actionable.
#[derive(Error, Debug, Clone)]
pub enum SourceError {
    #[error("Authentication failed: {reason}")]
    Auth { reason: String },

    #[error("Subreddit not found: r/{channel}")]
    ChannelNotFound { channel: String },

    #[error("Access to r/{channel} is forbidden (private, quarantined, or banned)")]
    Forbidden { channel: String },

    #[error("Rate limit exceeded. Retry after {retry_after} seconds")]
    RateLimited { retry_after: u64 },

    #[error("Reddit returned HTTP {status}")]
    Http { status: u16 },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid API response: {details}")]
    InvalidResponse { details: String },
}

/// Supplies posts for a named channel, most-engaged first.
#[async_trait]
pub trait PostSource: Send + Sync {
    /// Fetch at most `limit` posts from `channel` in the source's hot order.
    async fn fetch_top_posts(&self, channel: &str, limit: usize) -> Result<Vec<Post>, SourceError>;
}
