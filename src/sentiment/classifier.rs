// Emotion classifier — compound score to label.
//
// The thresholds live on Emotion::from_compound; this wrapper adds the scorer
// call and turns scorer trouble into a per-item error the pipeline can skip.

use std::sync::Arc;

use thiserror::Error;

use super::traits::SentimentScorer;
use crate::models::Emotion;

/// A single title could not be classified.
#[derive(Error, Debug)]
pub enum ClassificationError {
    #[error("{scorer} scorer failed: {source}")]
    Scorer {
        scorer: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("{scorer} scorer returned a non-finite compound score ({value})")]
    NonFinite { scorer: String, value: f64 },
}

/// Maps text to an Emotion using an injected scorer.
#[derive(Clone)]
pub struct SentimentClassifier {
    scorer: Arc<dyn SentimentScorer>,
}

impl SentimentClassifier {
    pub fn new(scorer: Arc<dyn SentimentScorer>) -> Self {
        Self { scorer }
    }

    /// Classify a piece of text.
    pub fn classify(&self, text: &str) -> Result<Emotion, ClassificationError> {
        let compound =
            self.scorer
                .compound(text)
                .map_err(|source| ClassificationError::Scorer {
                    scorer: self.scorer.name().to_string(),
                    source,
                })?;

        // NaN would otherwise fall through both comparisons and read as neutral
        if !compound.is_finite() {
            return Err(ClassificationError::NonFinite {
                scorer: self.scorer.name().to_string(),
                value: compound,
            });
        }

        Ok(Emotion::from_compound(compound))
    }

    pub fn scorer_name(&self) -> &str {
        self.scorer.name()
    }
}
