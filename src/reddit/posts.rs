// Hot-listing retrieval — paginated subreddit posts via the OAuth API.
//
// The listing endpoint returns at most 100 children per page, so larger
// requests walk the `after` cursor until enough posts are collected or the
// subreddit runs out.

use std::sync::OnceLock;

use async_trait::async_trait;
use regex_lite::Regex;
use tracing::{debug, info};

use super::client::{Listing, RedditClient};
use super::traits::{PostSource, SourceError};
use crate::models::Post;

/// Reddit's per-page maximum for listing endpoints.
pub const MAX_PAGE_SIZE: usize = 100;

/// Normalize a user-supplied subreddit name.
///
/// Accepts "rust", "r/rust" and "/r/rust". Subreddit names are 1–21
/// characters of letters, digits and underscores; anything else cannot exist,
/// so it is rejected before any request is made.
pub fn normalize_channel(channel: &str) -> Result<String, SourceError> {
    static NAME: OnceLock<Regex> = OnceLock::new();
    let name = NAME.get_or_init(|| Regex::new(r"^[A-Za-z0-9_]{1,21}$").expect("valid regex"));

    let trimmed = channel.trim().trim_start_matches('/');
    let bare = trimmed
        .strip_prefix("r/")
        .or_else(|| trimmed.strip_prefix("R/"))
        .unwrap_or(trimmed);

    if name.is_match(bare) {
        Ok(bare.to_string())
    } else {
        Err(SourceError::ChannelNotFound {
            channel: channel.to_string(),
        })
    }
}

/// Fetch up to `limit` posts from a subreddit's hot listing, in listing order.
pub async fn fetch_hot_posts(
    client: &RedditClient,
    channel: &str,
    limit: usize,
) -> Result<Vec<Post>, SourceError> {
    let subreddit = normalize_channel(channel)?;
    let path = format!("/r/{subreddit}/hot");

    let mut posts = Vec::with_capacity(limit.min(MAX_PAGE_SIZE));
    let mut after: Option<String> = None;

    while posts.len() < limit {
        let page_size = (limit - posts.len()).min(MAX_PAGE_SIZE).to_string();
        let mut params: Vec<(&str, &str)> = vec![("limit", page_size.as_str()), ("raw_json", "1")];
        if let Some(ref cursor) = after {
            params.push(("after", cursor.as_str()));
        }

        let listing: Listing = client
            .api_get(&path, &params)
            .await
            .map_err(|e| refine_listing_error(e, &subreddit))?;

        let page_len = listing.data.children.len();
        for child in listing.data.children {
            if posts.len() >= limit {
                break;
            }
            let link = child.data.link();
            posts.push(Post {
                title: child.data.title,
                score: child.data.score,
                url: link,
            });
        }

        debug!(
            page_posts = page_len,
            total_collected = posts.len(),
            "Fetched page of r/{}",
            subreddit
        );

        after = listing.data.after;
        if after.is_none() || page_len == 0 {
            break;
        }
    }

    info!(
        count = posts.len(),
        subreddit = subreddit.as_str(),
        "Collected hot posts"
    );

    Ok(posts)
}

/// Listing-level statuses that say something about the subreddit itself.
fn refine_listing_error(error: SourceError, subreddit: &str) -> SourceError {
    match error {
        SourceError::Http { status: 404 } | SourceError::Http { status: 300..=399 } => {
            SourceError::ChannelNotFound {
                channel: subreddit.to_string(),
            }
        }
        SourceError::Http { status: 403 } => SourceError::Forbidden {
            channel: subreddit.to_string(),
        },
        other => other,
    }
}

#[async_trait]
impl PostSource for RedditClient {
    async fn fetch_top_posts(&self, channel: &str, limit: usize) -> Result<Vec<Post>, SourceError> {
        fetch_hot_posts(self, channel, limit).await
    }
}
