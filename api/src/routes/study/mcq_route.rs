use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
};

use crate::{
    core::app_state::AppState,
    error_handler::AppResult,
    routes::study::study_request::{McqParams, McqResponse},
};

/// Handler: POST /mcq?query=..&num_questions=..
///
/// Defaults: `query = "create MCQs"`, `num_questions = 1`.
pub async fn generate_mcq(
    State(state): State<Arc<AppState>>,
    Query(params): Query<McqParams>,
) -> AppResult<Json<McqResponse>> {
    let multiple_choice_questions = state
        .contextor
        .generate_mcq(params.query.as_deref(), params.num_questions)
        .await?;
    Ok(Json(McqResponse {
        multiple_choice_questions,
    }))
}
