use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
};

use crate::{
    core::app_state::AppState,
    error_handler::AppResult,
    routes::study::study_request::{QaParams, QaResponse},
};

/// Handler: POST /qa?query=..
///
/// Three open-ended questions with answers, generated from the retrieved context.
pub async fn generate_qa(
    State(state): State<Arc<AppState>>,
    Query(params): Query<QaParams>,
) -> AppResult<Json<QaResponse>> {
    let questions = state.contextor.generate_qa(&params.query).await?;
    Ok(Json(QaResponse { questions }))
}
