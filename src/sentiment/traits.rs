// Sentiment scorer trait — the swap-ready abstraction.
//
// The default implementation is the VADER lexicon. Anything that can turn a
// piece of text into a compound polarity score in [-1, 1] can stand in for it
// without touching the classifier.

use anyhow::Result;

/// Trait for scoring the sentiment polarity of a text.
///
/// Scoring is pure CPU work for lexicon-based analyzers, so unlike the post
/// source this is a plain synchronous trait.
pub trait SentimentScorer: Send + Sync {
    /// Compound score for `text`, from -1.0 (most negative) to 1.0 (most positive).
    fn compound(&self, text: &str) -> Result<f64>;

    /// Short name used in logs.
    fn name(&self) -> &str;
}
