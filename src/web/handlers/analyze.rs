// GET /api/analyze — run (or reuse) a keyword-filtered emotion analysis.
//
// Query: ?channel=AskReddit&keyword=how&limit=10 (all optional, UI defaults).
//
// 200 with rows and counts on success, including the empty "no matches" case.
// 400 for out-of-range input, 502 when Reddit can't be reached or refuses us,
// so the page can tell "nothing matched" from "couldn't ask".

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::config::{DEFAULT_CHANNEL, DEFAULT_KEYWORD, DEFAULT_LIMIT, MAX_UI_LIMIT, MIN_UI_LIMIT};
use crate::output::emotion_counts;
use crate::pipeline::analysis::AnalysisError;
use crate::web::{api_error, AppState};

#[derive(Deserialize, Default)]
pub struct AnalyzeQuery {
    /// Subreddit name, with or without the r/ prefix
    pub channel: Option<String>,
    /// Case-insensitive substring to look for in titles; empty matches all
    pub keyword: Option<String>,
    /// Posts to pull from the hot listing (5–100)
    pub limit: Option<usize>,
}

pub async fn analyze(
    State(state): State<AppState>,
    query: Result<Query<AnalyzeQuery>, QueryRejection>,
) -> Response {
    // Malformed numbers ("abc", "-3") get the same JSON shape as range errors
    let params = match query {
        Ok(Query(params)) => params,
        Err(rejection) => {
            return api_error(
                StatusCode::BAD_REQUEST,
                "invalid_request",
                &rejection.body_text(),
            )
        }
    };

    let channel = params
        .channel
        .map(|c| c.trim().to_string())
        .unwrap_or_else(|| DEFAULT_CHANNEL.to_string());
    let keyword = params
        .keyword
        .unwrap_or_else(|| DEFAULT_KEYWORD.to_string());
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);

    if channel.is_empty() {
        return api_error(
            StatusCode::BAD_REQUEST,
            "invalid_request",
            "Subreddit must not be empty",
        );
    }
    if !(MIN_UI_LIMIT..=MAX_UI_LIMIT).contains(&limit) {
        return api_error(
            StatusCode::BAD_REQUEST,
            "invalid_request",
            &format!("Number of posts must be between {MIN_UI_LIMIT} and {MAX_UI_LIMIT}"),
        );
    }

    match state
        .cache
        .analyze(&state.pipeline, &channel, &keyword, limit)
        .await
    {
        Ok(result) => {
            let analysis = &result.analysis;
            Json(serde_json::json!({
                "channel": channel,
                "keyword": keyword,
                "limit": limit,
                "posts": analysis.posts,
                "counts": emotion_counts(&analysis.posts),
                "fetched": analysis.fetched,
                "skipped": analysis.skipped,
                "analyzed_at": analysis.analyzed_at,
                "cached": result.cached,
            }))
            .into_response()
        }
        Err(AnalysisError::InvalidRequest { reason }) => {
            api_error(StatusCode::BAD_REQUEST, "invalid_request", &reason)
        }
        Err(e @ AnalysisError::SourceUnavailable(_)) => {
            tracing::error!(error = %e, channel = %channel, "Post source unavailable");
            api_error(StatusCode::BAD_GATEWAY, "source_unavailable", &e.to_string())
        }
    }
}
