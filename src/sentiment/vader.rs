// VADER lexicon scorer.
//
// VADER (Valence Aware Dictionary and sEntiment Reasoner) is tuned for short
// social-media text, which makes it a good fit for post titles. The lexicon
// tables are built lazily inside vader_sentiment on first use and shared
// after that, so constructing an analyzer per call costs nothing.

use anyhow::Result;
use tracing::trace;
use vader_sentiment::SentimentIntensityAnalyzer;

use super::traits::SentimentScorer;

/// Local VADER scorer. No model files, no network.
#[derive(Debug, Default, Clone, Copy)]
pub struct VaderScorer;

impl VaderScorer {
    pub fn new() -> Self {
        Self
    }
}

impl SentimentScorer for VaderScorer {
    fn compound(&self, text: &str) -> Result<f64> {
        // Nothing to score; VADER's own answer for blank input is 0.0 too.
        if text.trim().is_empty() {
            return Ok(0.0);
        }

        let analyzer = SentimentIntensityAnalyzer::new();
        let scores = analyzer.polarity_scores(text);
        let compound = scores
            .get("compound")
            .copied()
            .ok_or_else(|| anyhow::anyhow!("VADER returned no compound score"))?;

        trace!(compound, text_len = text.len(), "Scored text");
        Ok(compound)
    }

    fn name(&self) -> &str {
        "vader"
    }
}
