//! PubMed passthrough routes
//!
//! JSON from esearch/elink and XML from efetch are forwarded unchanged; the
//! client does its own parsing.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::header,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::Value;
use tracing::info;

use crate::models::{AppState, IdsRequest, RelatedIdsResponse, RelatedRequest, SearchRequest};
use crate::types::{AppError, AppResult};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/search", post(search))
        .route("/api/fetch-papers", post(fetch_papers))
        .route("/api/check-free", post(check_free))
        .route("/api/related-papers", post(related_papers))
        .with_state(state)
}

fn xml(body: String) -> Response {
    ([(header::CONTENT_TYPE, "text/xml; charset=utf-8")], body).into_response()
}

fn require_ids(ids: &[String]) -> AppResult<()> {
    if ids.is_empty() {
        return Err(AppError::InvalidRequest("ids must not be empty".to_string()));
    }
    Ok(())
}

async fn search(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> AppResult<Json<Value>> {
    let Json(request) = payload?;
    info!(query = %request.query, start = request.start, max = request.max, "PubMed search");

    let data = state.pubmed.esearch(&request.query, request.start, request.max).await?;
    Ok(Json(data))
}

async fn fetch_papers(
    State(state): State<AppState>,
    payload: Result<Json<IdsRequest>, JsonRejection>,
) -> AppResult<Response> {
    let Json(request) = payload?;
    require_ids(&request.ids)?;

    let body = state.pubmed.efetch(&request.ids).await?;
    Ok(xml(body))
}

async fn check_free(
    State(state): State<AppState>,
    payload: Result<Json<IdsRequest>, JsonRejection>,
) -> AppResult<Json<Value>> {
    let Json(request) = payload?;
    require_ids(&request.ids)?;

    let data = state.pubmed.check_free(&request.ids).await?;
    Ok(Json(data))
}

async fn related_papers(
    State(state): State<AppState>,
    payload: Result<Json<RelatedRequest>, JsonRejection>,
) -> AppResult<Response> {
    let Json(request) = payload?;

    let related_ids = state.pubmed.related_ids(&request.pmid).await?;
    if related_ids.is_empty() {
        return Ok(Json(RelatedIdsResponse { related_ids }).into_response());
    }

    let body = state.pubmed.efetch(&related_ids).await?;
    Ok(xml(body))
}
