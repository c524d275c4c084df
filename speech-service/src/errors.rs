use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("[Speech] missing configuration: {0}")]
    MissingConfig(&'static str),

    #[error("[Speech] invalid configuration in {var}: {reason}")]
    InvalidConfig {
        var: &'static str,
        reason: &'static str,
    },

    #[error("[Speech] transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("[Speech] HTTP {status} from {url}: {snippet}")]
    HttpStatus {
        status: StatusCode,
        url: String,
        snippet: String,
    },

    #[error("[Speech] decode error: {0}")]
    Decode(String),

    #[error("[Speech] recognition failed: {0}")]
    Recognition(String),

    #[error("[Speech] invalid audio: {0}")]
    InvalidAudio(String),

    #[error("[Speech] nothing to synthesize")]
    EmptyText,
}

impl SpeechError {
    /// Local input problems, as opposed to failures of the hosted service.
    pub fn is_client_error(&self) -> bool {
        matches!(self, SpeechError::InvalidAudio(_) | SpeechError::EmptyText)
    }
}

pub(crate) fn make_snippet(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(300) {
        Some((idx, _)) => format!("{}…", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}
