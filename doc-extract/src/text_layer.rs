//! Embedded text layer via `lopdf`.

use lopdf::Document;
use tracing::{debug, warn};

use crate::{TextLayer, errors::ExtractError};

/// Reads page text with `lopdf::Document::extract_text`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfTextLayer;

impl TextLayer for LopdfTextLayer {
    fn page_texts(&self, pdf: &[u8]) -> Result<Vec<String>, ExtractError> {
        let doc = Document::load_mem(pdf).map_err(|e| ExtractError::InvalidPdf(e.to_string()))?;
        let pages = doc.get_pages();
        debug!(pages = pages.len(), "pdf parsed");

        let mut out = Vec::with_capacity(pages.len());
        for page_no in pages.keys() {
            // A page whose content cannot be decoded counts as a page without text.
            let text = match doc.extract_text(&[*page_no]) {
                Ok(t) => t,
                Err(e) => {
                    warn!(page = page_no, error = %e, "text layer unreadable");
                    String::new()
                }
            };
            out.push(text);
        }
        Ok(out)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{Object, Stream, dictionary};

    /// Builds a PDF with one page per entry; `None` pages carry no text.
    pub(crate) fn build_pdf(pages: &[Option<&str>]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in pages {
            let operations = match text {
                Some(text) => vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
                None => Vec::new(),
            };
            let content = Content { operations };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    #[test]
    fn reads_text_per_page() {
        let pdf = build_pdf(&[Some("The sky is blue."), None]);
        let pages = LopdfTextLayer.page_texts(&pdf).unwrap();
        assert_eq!(pages.len(), 2);
        assert!(pages[0].contains("The sky is blue."));
        assert!(pages[1].trim().is_empty());
    }

    #[test]
    fn garbage_is_invalid_pdf() {
        let err = LopdfTextLayer.page_texts(b"not a pdf").unwrap_err();
        assert!(matches!(err, ExtractError::InvalidPdf(_)));
    }
}
