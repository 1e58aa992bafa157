use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};

use crate::agents::SummaryAgent;
use crate::models::{AppState, SummaryRequest, SummaryResponse};
use crate::types::AppResult;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/generate-summary", post(generate_summary))
        .with_state(state)
}

async fn generate_summary(
    State(state): State<AppState>,
    payload: Result<Json<SummaryRequest>, JsonRejection>,
) -> AppResult<Json<SummaryResponse>> {
    let Json(request) = payload?;

    let summary = SummaryAgent::summarize(
        state.llm.as_ref(),
        &request.title,
        &request.abstract_text,
        &request.user_search,
    )
    .await?;

    Ok(Json(SummaryResponse { summary }))
}
