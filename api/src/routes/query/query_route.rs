//! POST /query: answer a question from the indexed documents.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
};
use contextor::QueryAnswer;

use crate::{
    core::app_state::AppState, error_handler::AppResult,
    routes::query::query_request::QueryParams,
};

/// Handler: POST /query?query=..&k=..
///
/// # Example
/// ```bash
/// curl -X POST 'http://127.0.0.1:8000/query?query=What%20color%20is%20the%20sky%3F'
/// ```
pub async fn query_document(
    State(state): State<Arc<AppState>>,
    Query(params): Query<QueryParams>,
) -> AppResult<Json<QueryAnswer>> {
    let answer = state.contextor.ask(&params.query, params.k).await?;
    Ok(Json(answer))
}
