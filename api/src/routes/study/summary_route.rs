use std::sync::Arc;

use axum::{Json, extract::State};
use contextor::DocumentSummary;

use crate::{core::app_state::AppState, error_handler::AppResult};

/// Handler: GET /summary
pub async fn summarize_document(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<DocumentSummary>> {
    Ok(Json(state.contextor.summarize().await?))
}
