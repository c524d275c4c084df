use ai_llm_service::AiLlmError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use contextor::ContextorError;
use doc_extract::ExtractError;
use rag_store::RagError;
use serde::Serialize;
use services::storage::StorageError;
use speech_service::SpeechError;
use thiserror::Error;

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot / config ---
    #[error("configuration error: {0}")]
    Config(String),

    // --- IO / network / server ---
    #[error("failed to bind listener")]
    Bind(#[source] std::io::Error),

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Request / routing ---
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Rich HTTP error mapped from lower layers with specific status & code.
    #[error("{message}")]
    Http {
        status: StatusCode,
        code: &'static str,
        message: String,
    },
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Http { status, .. } => *status,
            AppError::Config(_) | AppError::Bind(_) | AppError::Server(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Bind(_) => "BIND_ERROR",
            AppError::Server(_) => "SERVER_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Http { code, .. } => code,
        }
    }

    fn upstream(message: impl Into<String>) -> Self {
        AppError::Http {
            status: StatusCode::BAD_GATEWAY,
            code: "UPSTREAM_UNAVAILABLE",
            message: message.into(),
        }
    }

    fn internal(code: &'static str, message: impl Into<String>) -> Self {
        AppError::Http {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code,
            message: message.into(),
        }
    }

    pub fn voice_disabled() -> Self {
        AppError::Http {
            status: StatusCode::SERVICE_UNAVAILABLE,
            code: "VOICE_DISABLED",
            message: "Speech services are not configured.".into(),
        }
    }
}

#[derive(Serialize)]
pub(crate) struct ErrorBody<'a> {
    pub error: &'a str,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(%status, error = %self, "request failed");
        } else {
            tracing::debug!(%status, error = %self, "request rejected");
        }
        let body = ErrorBody {
            error: self.error_code(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;

impl From<axum::extract::multipart::MultipartError> for AppError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        match err.status() {
            StatusCode::BAD_REQUEST => AppError::BadRequest(err.body_text()),
            StatusCode::PAYLOAD_TOO_LARGE => AppError::Http {
                status: StatusCode::PAYLOAD_TOO_LARGE,
                code: "PAYLOAD_TOO_LARGE",
                message: err.body_text(),
            },
            status => AppError::Http {
                status,
                code: "MULTIPART_ERROR",
                message: err.body_text(),
            },
        }
    }
}

impl From<ContextorError> for AppError {
    fn from(err: ContextorError) -> Self {
        match err {
            ContextorError::NoIndex => AppError::Http {
                status: StatusCode::BAD_REQUEST,
                code: "NO_INDEX",
                message: "No documents have been uploaded yet".into(),
            },
            ContextorError::EmptyQuery | ContextorError::InvalidTopK => {
                AppError::BadRequest(err.to_string())
            }
            ContextorError::UpstreamUnavailable(_) => AppError::upstream(err.to_string()),
            ContextorError::MalformedOutput { .. } => {
                AppError::internal("MALFORMED_OUTPUT", err.to_string())
            }
            ContextorError::Rag(e) => e.into(),
            ContextorError::Llm(e) => e.into(),
        }
    }
}

impl From<RagError> for AppError {
    fn from(err: RagError) -> Self {
        if err.is_upstream() {
            AppError::upstream(err.to_string())
        } else {
            AppError::internal("INDEX_ERROR", err.to_string())
        }
    }
}

impl From<AiLlmError> for AppError {
    fn from(err: AiLlmError) -> Self {
        if err.is_upstream() {
            AppError::upstream(err.to_string())
        } else {
            AppError::Config(err.to_string())
        }
    }
}

impl From<ExtractError> for AppError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::InvalidPdf(_) | ExtractError::NoText { .. } => AppError::Http {
                status: StatusCode::BAD_REQUEST,
                code: "EXTRACTION_FAILED",
                message: err.to_string(),
            },
            ExtractError::Config(_) => AppError::Config(err.to_string()),
            ExtractError::Join(_) => AppError::internal("EXTRACTION_TASK_FAILED", err.to_string()),
            ExtractError::Transport(_)
            | ExtractError::OcrHttp { .. }
            | ExtractError::OcrFailed(_)
            | ExtractError::OcrTimeout(_) => AppError::upstream(err.to_string()),
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidFileName(_) | StorageError::InvalidDirectory(_) => {
                AppError::BadRequest(err.to_string())
            }
            StorageError::Io { .. } => AppError::internal("STORAGE_ERROR", err.to_string()),
        }
    }
}

impl From<SpeechError> for AppError {
    fn from(err: SpeechError) -> Self {
        if err.is_client_error() {
            AppError::BadRequest(err.to_string())
        } else {
            match err {
                SpeechError::MissingConfig(_) | SpeechError::InvalidConfig { .. } => {
                    AppError::Config(err.to_string())
                }
                _ => AppError::upstream(err.to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_status() {
        let cases: Vec<(AppError, StatusCode, &str)> = vec![
            (ContextorError::NoIndex.into(), StatusCode::BAD_REQUEST, "NO_INDEX"),
            (ContextorError::EmptyQuery.into(), StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            (ContextorError::InvalidTopK.into(), StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            (
                ContextorError::UpstreamUnavailable("x".into()).into(),
                StatusCode::BAD_GATEWAY,
                "UPSTREAM_UNAVAILABLE",
            ),
            (
                ContextorError::MalformedOutput {
                    what: "MCQ",
                    reason: "eof".into(),
                }
                .into(),
                StatusCode::INTERNAL_SERVER_ERROR,
                "MALFORMED_OUTPUT",
            ),
            (
                ExtractError::NoText {
                    pages: 2,
                    ocr_attempted: true,
                }
                .into(),
                StatusCode::BAD_REQUEST,
                "EXTRACTION_FAILED",
            ),
            (
                ExtractError::OcrTimeout(3).into(),
                StatusCode::BAD_GATEWAY,
                "UPSTREAM_UNAVAILABLE",
            ),
            (
                RagError::Qdrant("down".into()).into(),
                StatusCode::BAD_GATEWAY,
                "UPSTREAM_UNAVAILABLE",
            ),
            (
                StorageError::InvalidDirectory("..".into()).into(),
                StatusCode::BAD_REQUEST,
                "BAD_REQUEST",
            ),
            (
                AppError::voice_disabled(),
                StatusCode::SERVICE_UNAVAILABLE,
                "VOICE_DISABLED",
            ),
        ];

        for (err, status, code) in cases {
            assert_eq!(err.status_code(), status, "{err}");
            assert_eq!(err.error_code(), code, "{err}");
        }
    }
}
