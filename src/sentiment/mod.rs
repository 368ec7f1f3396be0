// Sentiment scoring — trait-based abstraction over the lexicon scorer.
//
// SentimentScorer turns text into a compound score. SentimentClassifier
// applies the fixed emotion thresholds on top of whichever scorer it is given.

pub mod classifier;
pub mod traits;
pub mod vader;
