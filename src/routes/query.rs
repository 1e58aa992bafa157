use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use tracing::info;

use crate::agents::QueryAgent;
use crate::models::{AppState, GenerateQueryRequest, GenerateQueryResponse};
use crate::types::AppResult;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/generate-query", post(generate_query))
        .with_state(state)
}

async fn generate_query(
    State(state): State<AppState>,
    payload: Result<Json<GenerateQueryRequest>, JsonRejection>,
) -> AppResult<Json<GenerateQueryResponse>> {
    let Json(request) = payload?;
    info!(input = %request.user_input, "Received query generation request");

    let query = QueryAgent::generate_query(state.llm.as_ref(), &request.user_input).await?;
    Ok(Json(GenerateQueryResponse { query }))
}
