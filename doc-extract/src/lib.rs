//! PDF → per-page text.
//!
//! - [`text_layer`] reads the embedded text of every page (`lopdf`).
//! - [`azure_read`] OCRs a single page through the Azure Read API.
//! - [`pipeline`] combines both: text layer first, OCR only when no page has text.

use async_trait::async_trait;

pub mod azure_read;
pub mod errors;
pub mod pipeline;
pub mod text_layer;

pub use errors::ExtractError;
pub use pipeline::{ExtractedDocument, PdfExtractor};

/// Embedded text per page, in page order. Pages without text yield `""`.
pub trait TextLayer: Send + Sync {
    fn page_texts(&self, pdf: &[u8]) -> Result<Vec<String>, ExtractError>;
}

/// OCR for one page (1-based) of a PDF.
#[async_trait]
pub trait PageOcr: Send + Sync {
    async fn ocr_page(&self, pdf: &[u8], page: u32) -> Result<String, ExtractError>;
}
