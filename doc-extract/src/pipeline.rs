//! Text layer first, OCR only when the whole document has no text.

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use crate::{PageOcr, TextLayer, errors::ExtractError, text_layer::LopdfTextLayer};

/// Non-empty page texts in page order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDocument {
    pub pages: Vec<String>,
    /// Pages in the PDF, including the ones that produced no text.
    pub page_count: usize,
    pub used_ocr: bool,
}

#[derive(Clone)]
pub struct PdfExtractor {
    text_layer: Arc<dyn TextLayer>,
    ocr: Option<Arc<dyn PageOcr>>,
}

impl PdfExtractor {
    pub fn new(text_layer: Arc<dyn TextLayer>, ocr: Option<Arc<dyn PageOcr>>) -> Self {
        Self { text_layer, ocr }
    }

    /// `lopdf` text layer with an optional OCR fallback.
    pub fn with_ocr(ocr: Option<Arc<dyn PageOcr>>) -> Self {
        Self::new(Arc::new(LopdfTextLayer), ocr)
    }

    pub fn ocr_enabled(&self) -> bool {
        self.ocr.is_some()
    }

    /// Extracts per-page text.
    ///
    /// Pages with an empty text layer are dropped. Only when no page has text is
    /// every page OCRed, once each, in page order; empty OCR results are dropped too.
    ///
    /// # Errors
    /// - [`ExtractError::InvalidPdf`] if the bytes are not a PDF
    /// - [`ExtractError::NoText`] if nothing was extracted (or OCR is not configured)
    /// - OCR transport/HTTP errors are propagated as-is
    pub async fn extract(&self, pdf: Arc<[u8]>) -> Result<ExtractedDocument, ExtractError> {
        let started = Instant::now();

        let layer = self.text_layer.clone();
        let bytes = pdf.clone();
        let raw = tokio::task::spawn_blocking(move || layer.page_texts(&bytes))
            .await
            .map_err(|e| ExtractError::Join(e.to_string()))??;

        let page_count = raw.len();
        let pages: Vec<String> = raw.into_iter().filter(|t| !t.trim().is_empty()).collect();

        if !pages.is_empty() {
            info!(
                page_count,
                text_pages = pages.len(),
                latency_ms = started.elapsed().as_millis(),
                "text layer extracted"
            );
            return Ok(ExtractedDocument {
                pages,
                page_count,
                used_ocr: false,
            });
        }

        let Some(ocr) = &self.ocr else {
            warn!(page_count, "no text layer and OCR is not configured");
            return Err(ExtractError::NoText {
                pages: page_count,
                ocr_attempted: false,
            });
        };

        let mut pages = Vec::new();
        for page in 1..=page_count as u32 {
            let text = ocr.ocr_page(&pdf, page).await?;
            if !text.trim().is_empty() {
                pages.push(text);
            }
        }

        if pages.is_empty() {
            return Err(ExtractError::NoText {
                pages: page_count,
                ocr_attempted: true,
            });
        }

        info!(
            page_count,
            text_pages = pages.len(),
            latency_ms = started.elapsed().as_millis(),
            "OCR fallback extracted"
        );
        Ok(ExtractedDocument {
            pages,
            page_count,
            used_ocr: true,
        })
    }
}
