// Colored terminal output for analysis results.
//
// The CLI counterpart of the web page: a success line, the result table, and
// a horizontal bar chart of emotion counts.

use colored::Colorize;

use super::{emotion_counts, truncate_chars, EmotionCount};
use crate::models::{Analysis, Emotion};

/// Widest bar in the emotion chart, in block characters.
const MAX_BAR_WIDTH: usize = 40;

/// Display a full analysis: summary line, table, and chart.
pub fn display_analysis(analysis: &Analysis, channel: &str, keyword: &str) {
    if analysis.is_empty() {
        println!(
            "{}",
            "No posts found with that keyword.".yellow().bold()
        );
        println!(
            "  Checked {} posts from r/{} for \"{}\".",
            analysis.fetched, channel, keyword
        );
        display_skipped(analysis.skipped);
        return;
    }

    println!(
        "{}",
        format!("Found {} matching posts.", analysis.posts.len())
            .green()
            .bold()
    );
    display_skipped(analysis.skipped);

    display_post_table(analysis);
    display_emotion_chart(&emotion_counts(&analysis.posts));
}

/// Display the result rows in source order.
pub fn display_post_table(analysis: &Analysis) {
    println!();
    println!(
        "  {:>3}  {:<60} {:>7}  {:<8}  {}",
        "#".dimmed(),
        "Title".dimmed(),
        "Score".dimmed(),
        "Emotion".dimmed(),
        "URL".dimmed(),
    );
    println!("  {}", "-".repeat(100).dimmed());

    for (i, post) in analysis.posts.iter().enumerate() {
        println!(
            "  {:>3}  {:<60} {:>7}  {:<8}  {}",
            i + 1,
            truncate_chars(&post.title, 57),
            post.score,
            colorize_emotion(post.emotion),
            post.url.dimmed(),
        );
    }
}

/// Display the emotion distribution as a horizontal bar chart.
pub fn display_emotion_chart(counts: &[EmotionCount]) {
    if counts.is_empty() {
        return;
    }

    println!("\n{}", "=== Emotion Distribution ===".bold());
    println!();

    let max = counts.iter().map(|c| c.count).max().unwrap_or(1).max(1);
    for c in counts {
        let width = (c.count * MAX_BAR_WIDTH).div_ceil(max);
        println!(
            "  {:<8} {} {}",
            colorize_emotion(c.emotion),
            "█".repeat(width).cyan(),
            c.count
        );
    }
    println!();
}

fn display_skipped(skipped: usize) {
    if skipped > 0 {
        println!(
            "  {} {} matching posts could not be classified and were skipped",
            "!".yellow(),
            skipped
        );
    }
}

/// Colorize an emotion label.
fn colorize_emotion(emotion: Emotion) -> colored::ColoredString {
    let label = emotion.as_str();
    match emotion {
        Emotion::Positive => label.green(),
        Emotion::Negative => label.red(),
        Emotion::Neutral => label.normal(),
    }
}
