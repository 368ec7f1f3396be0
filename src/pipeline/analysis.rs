// Keyword-filtered sentiment analysis over a post source.
//
// Pull up to `limit` posts, drop every post whose title doesn't contain the
// keyword (case-insensitive substring, not word match), classify the rest,
// and hand back rows in the order the source produced them.
//
// A source failure fails the whole call so callers can tell "nothing matched"
// from "couldn't ask". A title that can't be classified is skipped and
// counted; it never takes the batch down with it.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::{Analysis, AnalyzedPost, Post};
use crate::reddit::traits::{PostSource, SourceError};
use crate::sentiment::classifier::SentimentClassifier;

/// Whole-request failures.
#[derive(Error, Debug, Clone)]
pub enum AnalysisError {
    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },

    #[error("Post source unavailable: {0}")]
    SourceUnavailable(#[from] SourceError),
}

/// True when `title` contains `keyword`, ignoring case. The empty keyword
/// matches every title.
pub fn matches_keyword(title: &str, keyword: &str) -> bool {
    title.to_lowercase().contains(&keyword.to_lowercase())
}

/// Fetch-filter-classify pipeline over an injected source and classifier.
#[derive(Clone)]
pub struct AnalysisPipeline {
    source: Arc<dyn PostSource>,
    classifier: SentimentClassifier,
}

impl AnalysisPipeline {
    pub fn new(source: Arc<dyn PostSource>, classifier: SentimentClassifier) -> Self {
        Self { source, classifier }
    }

    /// Run one analysis.
    ///
    /// `channel` must be non-empty and `limit` positive; any keyword is
    /// accepted. Returns an empty `Analysis` when nothing matches.
    pub async fn analyze(
        &self,
        channel: &str,
        keyword: &str,
        limit: usize,
    ) -> Result<Analysis, AnalysisError> {
        if channel.trim().is_empty() {
            return Err(AnalysisError::InvalidRequest {
                reason: "channel must not be empty".to_string(),
            });
        }
        if limit == 0 {
            return Err(AnalysisError::InvalidRequest {
                reason: "limit must be a positive integer".to_string(),
            });
        }

        let mut posts = self.source.fetch_top_posts(channel, limit).await?;
        if posts.len() > limit {
            debug!(
                returned = posts.len(),
                limit, "Source over-delivered, truncating"
            );
            posts.truncate(limit);
        }

        let analysis = self.filter_and_classify(posts, keyword);

        info!(
            channel = channel,
            keyword = keyword,
            fetched = analysis.fetched,
            matched = analysis.posts.len(),
            skipped = analysis.skipped,
            scorer = self.classifier.scorer_name(),
            "Analysis complete"
        );

        Ok(analysis)
    }

    /// Keyword filter then classification, preserving input order.
    pub fn filter_and_classify(&self, posts: Vec<Post>, keyword: &str) -> Analysis {
        let fetched = posts.len();
        let mut rows = Vec::new();
        let mut skipped = 0;

        for post in posts {
            if !matches_keyword(&post.title, keyword) {
                continue;
            }

            match self.classifier.classify(&post.title) {
                Ok(emotion) => rows.push(AnalyzedPost {
                    title: post.title,
                    score: post.score,
                    emotion,
                    url: post.url,
                }),
                Err(e) => {
                    warn!(error = %e, url = %post.url, "Failed to classify title, skipping");
                    skipped += 1;
                }
            }
        }

        Analysis {
            posts: rows,
            fetched,
            skipped,
            analyzed_at: Utc::now(),
        }
    }
}
