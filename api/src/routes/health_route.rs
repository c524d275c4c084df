//! GET /health: provider probes for every distinct LLM profile. Never fails;
//! unreachable providers are reported with `ok: false`.

use std::sync::Arc;

use ai_llm_service::health_service::HealthStatus;
use axum::{Json, extract::State};
use serde::Serialize;

use crate::core::app_state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub llm: Vec<HealthStatus>,
    pub voice_enabled: bool,
    pub ocr_enabled: bool,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        llm: state.llm.health_all().await,
        voice_enabled: state.voice.is_some(),
        ocr_enabled: state.extractor.ocr_enabled(),
    })
}
