// Web server — Axum backend for the analyzer page.
//
// The page is plain HTML/JS/CSS embedded at compile time via include_dir!, so
// the binary is self-contained. /api/* routes answer in JSON (including their
// 404s); every other path is a static asset, with index.html as the fallback.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::Body;
use axum::http::{header, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use include_dir::{include_dir, Dir};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::pipeline::analysis::AnalysisPipeline;
use crate::pipeline::cache::AnalysisCache;

pub mod handlers;

static ASSETS: Dir<'static> = include_dir!("$CARGO_MANIFEST_DIR/web/static");

/// Shared application state threaded through all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: AnalysisPipeline,
    pub cache: Arc<AnalysisCache>,
}

impl AppState {
    pub fn new(pipeline: AnalysisPipeline, cache: AnalysisCache) -> Self {
        Self {
            pipeline,
            cache: Arc::new(cache),
        }
    }
}

/// Bind and serve until the process is stopped.
pub async fn run_server(state: AppState, port: u16, bind: &str) -> Result<()> {
    let addr = format!("{bind}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Could not bind {addr}"))?;

    info!("Emotion analyzer listening on http://{addr}");
    axum::serve(listener, build_router(state)).await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health))
        .route("/api/analyze", get(handlers::analyze::analyze))
        .fallback(fallback)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Unknown API paths get a JSON 404; anything else is treated as a page asset.
async fn fallback(uri: Uri) -> Response {
    let path = uri.path().trim_start_matches('/');

    if path == "api" || path.starts_with("api/") {
        return api_error(
            StatusCode::NOT_FOUND,
            "not_found",
            &format!("No such endpoint: /{path}"),
        );
    }

    let (name, file) = match ASSETS.get_file(path) {
        Some(file) => (path, file),
        None => match ASSETS.get_file("index.html") {
            Some(index) => ("index.html", index),
            None => {
                return (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Web assets missing from web/static",
                )
                    .into_response()
            }
        },
    };

    let mut response = Response::new(Body::from(file.contents()));
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(mime_type(name)));
    // Assets are baked into the binary; revalidate so a rebuild shows up on reload
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    response
}

fn mime_type(path: &str) -> &'static str {
    match path.rsplit_once('.').map(|(_, ext)| ext) {
        Some("html") => "text/html; charset=utf-8",
        Some("js") => "text/javascript; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        _ => "application/octet-stream",
    }
}

/// JSON error body with a machine-readable kind next to the message.
pub fn api_error(status: StatusCode, kind: &str, message: &str) -> Response {
    (
        status,
        Json(serde_json::json!({ "error": message, "kind": kind })),
    )
        .into_response()
}
