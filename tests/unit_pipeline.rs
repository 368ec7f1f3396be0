// Pipeline tests — keyword filtering, ordering, size bounds, failure policy,
// and the result cache, all against in-memory stub sources.
//
// No network access: the stubs stand in for Reddit, and a word-list scorer
// stands in for VADER where exact scores matter.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use emotion_analyzer::models::{Emotion, Post};
use emotion_analyzer::pipeline::analysis::{AnalysisError, AnalysisPipeline};
use emotion_analyzer::pipeline::cache::AnalysisCache;
use emotion_analyzer::reddit::traits::{PostSource, SourceError};
use emotion_analyzer::sentiment::classifier::SentimentClassifier;
use emotion_analyzer::sentiment::traits::SentimentScorer;
use emotion_analyzer::sentiment::vader::VaderScorer;

// ============================================================
// Stubs
// ============================================================

/// Returns a fixed list of posts, truncated to the requested limit.
struct StaticSource {
    posts: Vec<Post>,
    calls: AtomicUsize,
}

impl StaticSource {
    fn new(posts: Vec<Post>) -> Self {
        Self {
            posts,
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PostSource for StaticSource {
    async fn fetch_top_posts(&self, _channel: &str, limit: usize) -> Result<Vec<Post>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.posts.iter().take(limit).cloned().collect())
    }
}

/// Ignores the limit entirely.
struct OverDeliveringSource(Vec<Post>);

#[async_trait]
impl PostSource for OverDeliveringSource {
    async fn fetch_top_posts(&self, _channel: &str, _limit: usize) -> Result<Vec<Post>, SourceError> {
        Ok(self.0.clone())
    }
}

/// Always fails, like a dropped connection.
struct FailingSource {
    calls: AtomicUsize,
}

#[async_trait]
impl PostSource for FailingSource {
    async fn fetch_top_posts(&self, _channel: &str, _limit: usize) -> Result<Vec<Post>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(SourceError::Network("connection refused".to_string()))
    }
}

/// Scores by word lists; fails on any title containing "glitch".
struct WordScorer;

impl SentimentScorer for WordScorer {
    fn compound(&self, text: &str) -> anyhow::Result<f64> {
        let lower = text.to_lowercase();
        if lower.contains("glitch") {
            anyhow::bail!("cannot score {text:?}");
        }
        if lower.contains("love") || lower.contains("great") {
            Ok(0.8)
        } else if lower.contains("hate") || lower.contains("awful") {
            Ok(-0.7)
        } else {
            Ok(0.0)
        }
    }

    fn name(&self) -> &str {
        "words"
    }
}

fn post(title: &str, score: i64, url: &str) -> Post {
    Post {
        title: title.to_string(),
        score,
        url: url.to_string(),
    }
}

fn pipeline_over(source: Arc<dyn PostSource>) -> AnalysisPipeline {
    AnalysisPipeline::new(source, SentimentClassifier::new(Arc::new(WordScorer)))
}

fn titles(posts: &[emotion_analyzer::models::AnalyzedPost]) -> Vec<&str> {
    posts.iter().map(|p| p.title.as_str()).collect()
}

// ============================================================
// Filter correctness
// ============================================================

#[tokio::test]
async fn keyword_filter_is_exact_substring_not_word_match() {
    let source = Arc::new(StaticSource::new(vec![
        post("How to cook rice", 10, "a"),
        post("WHO is that?", 5, "b"),
        post("Nothing here", 1, "c"),
    ]));
    let analysis = pipeline_over(source).analyze("AskReddit", "how", 10).await.unwrap();

    assert_eq!(titles(&analysis.posts), vec!["How to cook rice"]);
    assert_eq!(analysis.fetched, 3);
}

#[tokio::test]
async fn keyword_matches_inside_words_and_ignores_case() {
    let source = Arc::new(StaticSource::new(vec![
        post("Showcase: my weekend project", 3, "a"),
        post("SHOW HN style thread", 2, "b"),
        post("Unrelated", 1, "c"),
    ]));
    let analysis = pipeline_over(source).analyze("rust", "HoW", 10).await.unwrap();

    assert_eq!(
        titles(&analysis.posts),
        vec!["Showcase: my weekend project", "SHOW HN style thread"]
    );
}

#[tokio::test]
async fn empty_keyword_keeps_every_post() {
    let posts: Vec<Post> = (0..10)
        .map(|i| post(&format!("Post number {i}"), i, &format!("u{i}")))
        .collect();
    let source = Arc::new(StaticSource::new(posts));
    let analysis = pipeline_over(source).analyze("rust", "", 10).await.unwrap();

    assert_eq!(analysis.posts.len(), 10);
}

#[tokio::test]
async fn no_matches_is_an_empty_success() {
    let source = Arc::new(StaticSource::new(vec![post("Cats", 1, "a"), post("Dogs", 2, "b")]));
    let analysis = pipeline_over(source).analyze("pets", "parrot", 10).await.unwrap();

    assert!(analysis.is_empty());
    assert_eq!(analysis.fetched, 2);
    assert_eq!(analysis.skipped, 0);
}

// ============================================================
// Order and size
// ============================================================

#[tokio::test]
async fn output_keeps_source_order() {
    let source = Arc::new(StaticSource::new(vec![
        post("z how", 1, "1"),
        post("skip", 100, "2"),
        post("a how", 50, "3"),
        post("m how", -4, "4"),
    ]));
    let analysis = pipeline_over(source).analyze("x", "how", 10).await.unwrap();

    // Neither alphabetical nor by score
    assert_eq!(titles(&analysis.posts), vec!["z how", "a how", "m how"]);
}

#[tokio::test]
async fn output_never_exceeds_limit_even_if_source_over_delivers() {
    let posts: Vec<Post> = (0..25).map(|i| post("how", i, "u")).collect();
    let pipeline = pipeline_over(Arc::new(OverDeliveringSource(posts)));

    for limit in [1, 5, 10, 24] {
        let analysis = pipeline.analyze("x", "how", limit).await.unwrap();
        assert!(analysis.posts.len() <= limit);
        assert!(analysis.posts.len() <= analysis.fetched);
        assert_eq!(analysis.fetched, limit);
    }
}

#[tokio::test]
async fn fields_are_carried_over_unchanged() {
    let source = Arc::new(StaticSource::new(vec![post(
        "How do I love this?",
        -12,
        "https://example.com/x?a=1&b=2",
    )]));
    let analysis = pipeline_over(source).analyze("x", "how", 5).await.unwrap();

    let row = &analysis.posts[0];
    assert_eq!(row.title, "How do I love this?");
    assert_eq!(row.score, -12);
    assert_eq!(row.url, "https://example.com/x?a=1&b=2");
    assert_eq!(row.emotion, Emotion::Positive);
}

// ============================================================
// End to end with the real VADER scorer
// ============================================================

#[tokio::test]
async fn vader_end_to_end_labels() {
    let source = Arc::new(StaticSource::new(vec![
        post("I love this place", 42, "a"),
        post("I hate waiting", -3, "b"),
    ]));
    let pipeline = AnalysisPipeline::new(
        source,
        SentimentClassifier::new(Arc::new(VaderScorer::new())),
    );
    let analysis = pipeline.analyze("AskReddit", "", 10).await.unwrap();

    assert_eq!(analysis.posts.len(), 2);
    assert_eq!(analysis.posts[0].title, "I love this place");
    assert_eq!(analysis.posts[0].score, 42);
    assert_eq!(analysis.posts[0].emotion, Emotion::Positive);
    assert_eq!(analysis.posts[0].url, "a");
    assert_eq!(analysis.posts[1].title, "I hate waiting");
    assert_eq!(analysis.posts[1].score, -3);
    assert_eq!(analysis.posts[1].emotion, Emotion::Negative);
    assert_eq!(analysis.posts[1].url, "b");
}

// ============================================================
// Failure semantics
// ============================================================

#[tokio::test]
async fn source_failure_is_source_unavailable_not_empty() {
    let source = Arc::new(FailingSource {
        calls: AtomicUsize::new(0),
    });
    let err = pipeline_over(source).analyze("AskReddit", "how", 10).await.unwrap_err();

    assert!(matches!(
        err,
        AnalysisError::SourceUnavailable(SourceError::Network(_))
    ));
    assert!(err.to_string().contains("connection refused"));
}

#[tokio::test]
async fn classification_failure_skips_only_that_post() {
    let source = Arc::new(StaticSource::new(vec![
        post("how great", 1, "a"),
        post("how glitch", 2, "b"),
        post("how awful", 3, "c"),
    ]));
    let analysis = pipeline_over(source).analyze("x", "how", 10).await.unwrap();

    assert_eq!(titles(&analysis.posts), vec!["how great", "how awful"]);
    assert_eq!(analysis.skipped, 1);
    assert_eq!(analysis.posts[0].emotion, Emotion::Positive);
    assert_eq!(analysis.posts[1].emotion, Emotion::Negative);
}

#[tokio::test]
async fn non_matching_titles_are_never_classified() {
    // "glitch" would fail classification, but it doesn't match the keyword
    let source = Arc::new(StaticSource::new(vec![
        post("glitch everywhere", 1, "a"),
        post("how neutral", 2, "b"),
    ]));
    let analysis = pipeline_over(source).analyze("x", "how", 10).await.unwrap();

    assert_eq!(analysis.skipped, 0);
    assert_eq!(analysis.posts.len(), 1);
}

#[tokio::test]
async fn invalid_requests_never_reach_the_source() {
    let source = Arc::new(StaticSource::new(vec![post("how", 1, "a")]));
    let pipeline = pipeline_over(source.clone());

    let err = pipeline.analyze("", "how", 10).await.unwrap_err();
    assert!(matches!(err, AnalysisError::InvalidRequest { .. }));
    let err = pipeline.analyze("rust", "how", 0).await.unwrap_err();
    assert!(matches!(err, AnalysisError::InvalidRequest { .. }));

    assert_eq!(source.calls(), 0);
}

#[tokio::test]
async fn pipeline_accepts_limits_outside_the_ui_range() {
    let posts: Vec<Post> = (0..300).map(|i| post("how", i, "u")).collect();
    let pipeline = pipeline_over(Arc::new(StaticSource::new(posts)));

    assert_eq!(pipeline.analyze("x", "how", 1).await.unwrap().posts.len(), 1);
    assert_eq!(pipeline.analyze("x", "how", 250).await.unwrap().posts.len(), 250);
}

// ============================================================
// Cache
// ============================================================

#[tokio::test]
async fn identical_requests_hit_the_source_once() {
    let source = Arc::new(StaticSource::new(vec![post("how great", 1, "a")]));
    let pipeline = pipeline_over(source.clone());
    let cache = AnalysisCache::new();

    let first = cache.analyze(&pipeline, "AskReddit", "how", 10).await.unwrap();
    let second = cache.analyze(&pipeline, "AskReddit", "how", 10).await.unwrap();

    assert!(!first.cached);
    assert!(second.cached);
    assert_eq!(first.analysis.posts, second.analysis.posts);
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn each_parameter_is_part_of_the_key() {
    let source = Arc::new(StaticSource::new(vec![post("how great", 1, "a")]));
    let pipeline = pipeline_over(source.clone());
    let cache = AnalysisCache::new();

    cache.analyze(&pipeline, "AskReddit", "how", 10).await.unwrap();
    cache.analyze(&pipeline, "askreddit", "how", 10).await.unwrap();
    cache.analyze(&pipeline, "AskReddit", "How", 10).await.unwrap();
    cache.analyze(&pipeline, "AskReddit", "how", 11).await.unwrap();

    assert_eq!(source.calls(), 4);
    assert_eq!(cache.len().await, 4);
}

#[tokio::test]
async fn concurrent_identical_requests_share_one_fetch() {
    let source = Arc::new(StaticSource::new(vec![post("how great", 1, "a")]));
    let pipeline = pipeline_over(source.clone());
    let cache = AnalysisCache::new();

    let (a, b, c) = tokio::join!(
        cache.analyze(&pipeline, "rust", "how", 10),
        cache.analyze(&pipeline, "rust", "how", 10),
        cache.analyze(&pipeline, "rust", "how", 10),
    );

    let cached_flags = [a.unwrap().cached, b.unwrap().cached, c.unwrap().cached];
    assert_eq!(cached_flags.iter().filter(|c| !**c).count(), 1);
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn source_failures_are_retried_not_cached() {
    let source = Arc::new(FailingSource {
        calls: AtomicUsize::new(0),
    });
    let pipeline = pipeline_over(source.clone());
    let cache = AnalysisCache::new();

    assert!(cache.analyze(&pipeline, "rust", "how", 10).await.is_err());
    assert!(cache.analyze(&pipeline, "rust", "how", 10).await.is_err());
    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
}
