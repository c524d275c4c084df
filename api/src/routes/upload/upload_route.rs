//! POST /upload: store a PDF, extract its text and index it.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Multipart, Query, State},
};
use rag_store::DocumentMeta;
use tracing::{debug, info};

use crate::{
    core::app_state::AppState,
    error_handler::{AppError, AppResult},
    routes::upload::upload_request::{UploadParams, UploadResponse},
};

/// Handler: POST /upload?directory=<sub-dir>
///
/// # Example
/// ```bash
/// curl -X POST 'http://127.0.0.1:8000/upload?directory=biology' \
///   -F 'file=@notes.pdf'
/// ```
pub async fn upload_pdf(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UploadParams>,
    mut multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    let mut upload: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field
            .file_name()
            .map(str::to_string)
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| AppError::BadRequest("multipart field `file` has no file name".into()))?;
        let bytes = field.bytes().await?;
        upload = Some((filename, bytes.to_vec()));
        break;
    }
    let (filename, bytes) =
        upload.ok_or_else(|| AppError::BadRequest("missing multipart field `file`".into()))?;
    if bytes.is_empty() {
        return Err(AppError::BadRequest("uploaded file is empty".into()));
    }
    debug!(%filename, directory = %params.directory, bytes = bytes.len(), "upload received");

    let stored = state
        .storage
        .save_upload(&params.directory, &filename, &bytes)
        .await?;

    let extracted = state.extractor.extract(Arc::from(bytes)).await?;

    let text_file = state
        .storage
        .save_text_mirror(&stored.directory, &stored.filename, &extracted.pages)
        .await?;

    let report = state
        .rag
        .ingest_pages(
            &DocumentMeta {
                filename: stored.filename.clone(),
                directory: stored.directory.clone(),
            },
            &extracted.pages,
        )
        .await?;

    info!(
        filename = %stored.filename,
        pages = extracted.pages.len(),
        used_ocr = extracted.used_ocr,
        chunks = report.chunks(),
        "document indexed"
    );

    Ok(Json(UploadResponse {
        message: "PDF processed and stored in the vector index".into(),
        text_file: text_file.display().to_string(),
        chunks: report.chunks(),
    }))
}
