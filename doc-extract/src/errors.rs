use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    /// The upload could not be parsed as a PDF.
    #[error("[Extract] invalid PDF: {0}")]
    InvalidPdf(String),

    /// Neither the text layer nor OCR produced any text.
    #[error("[Extract] no text could be extracted from the PDF ({pages} page(s), OCR attempted: {ocr_attempted})")]
    NoText { pages: usize, ocr_attempted: bool },

    #[error("[Extract] OCR configuration: {0}")]
    Config(&'static str),

    #[error("[Extract] OCR transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("[Extract] OCR HTTP {status} from {url}: {snippet}")]
    OcrHttp {
        status: StatusCode,
        url: String,
        snippet: String,
    },

    #[error("[Extract] OCR failed: {0}")]
    OcrFailed(String),

    #[error("[Extract] OCR did not finish after {0} polls")]
    OcrTimeout(u32),

    #[error("[Extract] worker task failed: {0}")]
    Join(String),
}

impl ExtractError {
    /// Problems with the uploaded document itself.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ExtractError::InvalidPdf(_) | ExtractError::NoText { .. }
        )
    }
}
