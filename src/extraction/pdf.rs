//! PDF extraction.

use super::{ExtractionResult, ExtractionStrategy, PdfParser};
use crate::artifact::ArtifactKind;
use crate::error::{FrontlineError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Warning attached when no page of a PDF yields text.
pub const NO_PDF_TEXT_WARNING: &str =
    "no extractable text found in PDF; likely a scanned/image-only document";

/// PDF strategy: non-empty pages in order, each followed by a newline.
pub struct PdfStrategy {
    parser: Arc<dyn PdfParser>,
}

impl PdfStrategy {
    pub fn new(parser: Arc<dyn PdfParser>) -> Self {
        Self { parser }
    }

    fn join_pages(pages: &[String]) -> String {
        let mut text = String::new();
        for page in pages.iter().filter(|p| !p.trim().is_empty()) {
            text.push_str(page);
            text.push('\n');
        }
        text
    }
}

#[async_trait]
impl ExtractionStrategy for PdfStrategy {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::Pdf
    }

    async fn extract(&self, bytes: &[u8], _language: &str) -> Result<ExtractionResult> {
        let pages = self.parser.pages(bytes)?;
        let text = Self::join_pages(&pages);

        debug!("PDF has {} pages, {} characters of text", pages.len(), text.len());

        if text.trim().is_empty() {
            return Ok(ExtractionResult::empty(ArtifactKind::Pdf).with_warning(NO_PDF_TEXT_WARNING));
        }

        Ok(ExtractionResult::new(ArtifactKind::Pdf, text))
    }
}

/// Parser backed by the `pdf-extract` crate.
pub struct PdfExtractParser;

impl PdfParser for PdfExtractParser {
    fn pages(&self, bytes: &[u8]) -> Result<Vec<String>> {
        // pdf-extract can panic on malformed fonts/glyphs
        match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem_by_pages(bytes)
        })) {
            Ok(Ok(pages)) => Ok(pages),
            Ok(Err(e)) => {
                warn!("PDF extraction failed: {}", e);
                Err(FrontlineError::Extraction(format!("Could not read PDF: {}", e)))
            }
            Err(_panic) => {
                error!("PDF extraction panicked - likely malformed document");
                Err(FrontlineError::Extraction(
                    "Could not read PDF: parser panicked on malformed content".to_string(),
                ))
            }
        }
    }
}
