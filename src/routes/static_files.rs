//! Static File Serving
//!
//! Serves the browser frontend from the configured static directory. When no
//! `index.html` is present a built-in page lists the API instead.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::path::{Path, PathBuf};
use tower_http::services::ServeDir;
use tracing::{info, warn};

pub fn router(static_dir: &Path) -> Router {
    if static_dir.is_dir() {
        info!(path = %static_dir.display(), "Serving static files");
    } else {
        warn!(path = %static_dir.display(), "Static directory not found, serving built-in index");
    }

    let serve_dir = ServeDir::new(static_dir).append_index_html_on_directories(true);

    Router::new()
        .route("/", get(serve_index))
        .with_state(static_dir.to_path_buf())
        .fallback_service(serve_dir)
}

async fn serve_index(State(static_dir): State<PathBuf>) -> Response {
    let html = match tokio::fs::read_to_string(static_dir.join("index.html")).await {
        Ok(content) => content,
        Err(_) => FALLBACK_INDEX.to_string(),
    };

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        html,
    )
        .into_response()
}

const FALLBACK_INDEX: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>PubMed AI Search - API Server</title>
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            max-width: 800px;
            margin: 0 auto;
            padding: 40px 20px;
            color: #1d1d1f;
        }
        h1 { color: #326295; margin-bottom: 10px; }
        .status { background: #eef6ee; border-left: 4px solid #2e8b57; border-radius: 8px; padding: 16px 20px; }
        code { background: #f2f4f7; padding: 2px 6px; border-radius: 4px; }
        pre { background: #f6f8fa; padding: 15px; border-radius: 6px; overflow-x: auto; }
    </style>
</head>
<body>
    <h1>PubMed AI Search</h1>
    <div class="status">
        <p>The proxy is running. No frontend was found in the static directory
        (set <code>STATIC_DIR</code>), or use the terminal client: <code>pubmed-ai tui</code>.</p>
    </div>

    <h3>API Endpoints</h3>
    <ul>
        <li><code>POST /api/generate-query</code> - free text to PubMed query</li>
        <li><code>POST /api/search</code> - esearch ids (JSON)</li>
        <li><code>POST /api/fetch-papers</code> - efetch records (XML)</li>
        <li><code>POST /api/check-free</code> - free full text ids (JSON)</li>
        <li><code>POST /api/generate-summary</code> - AI relevance summary</li>
        <li><code>POST /api/related-papers</code> - similar articles (XML)</li>
        <li><code>GET /api/health</code> - health check</li>
    </ul>

    <h4>Example</h4>
    <pre>curl -X POST http://localhost:3000/api/generate-query \
  -H "Content-Type: application/json" \
  -d '{"userInput": "gout treatment"}'</pre>
</body>
</html>"#;
