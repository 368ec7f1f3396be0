// Output formatting — emotion tallies shared by the terminal and web views.

pub mod terminal;

use serde::Serialize;

use crate::models::{AnalyzedPost, Emotion};

/// Frequency of one emotion label in a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EmotionCount {
    pub emotion: Emotion,
    pub count: usize,
}

/// Count rows per emotion label.
///
/// Only labels that occur are returned, most frequent first; ties keep the
/// positive, negative, neutral order so the chart is stable across runs.
pub fn emotion_counts(posts: &[AnalyzedPost]) -> Vec<EmotionCount> {
    let mut counts: Vec<EmotionCount> = Emotion::ALL
        .iter()
        .map(|&emotion| EmotionCount {
            emotion,
            count: posts.iter().filter(|p| p.emotion == emotion).count(),
        })
        .filter(|c| c.count > 0)
        .collect();

    // Stable sort, so equal counts stay in Emotion::ALL order
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// Truncate a string to at most `max_chars` characters, appending "..." if truncated.
///
/// Unlike byte slicing (`&text[..120]`), this respects UTF-8 character boundaries
/// and will never panic on multi-byte characters like emoji or accented letters.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let char_count = text.chars().count();
    if char_count <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{truncated}...")
    }
}
