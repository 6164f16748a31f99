//! Text extraction from uploaded artifacts.
//!
//! # Strategies
//!
//! - **Image**: OCR through an [`OcrEngine`] (Tesseract by default).
//! - **PDF**: page-by-page text through a [`PdfParser`].
//! - **DOCX**: paragraph text through a [`DocxParser`].
//!
//! The [`Extractor`] is the only component that knows which strategy handles
//! which kind of artifact.

mod docx;
mod ocr;
mod pdf;

pub use self::docx::{DocxRsParser, DocxStrategy};
pub use self::ocr::{ImageStrategy, TesseractOcr};
pub use self::pdf::{PdfExtractParser, PdfStrategy, NO_PDF_TEXT_WARNING};

use crate::artifact::{ArtifactKind, UploadedArtifact};
use crate::config::Settings;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Text pulled out of an artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub kind: ArtifactKind,
    pub text: String,
    /// Informational notes, in the order they were raised.
    pub warnings: Vec<String>,
}

impl ExtractionResult {
    pub fn new(kind: ArtifactKind, text: String) -> Self {
        Self {
            kind,
            text,
            warnings: Vec::new(),
        }
    }

    /// Result for an artifact that produced nothing.
    pub fn empty(kind: ArtifactKind) -> Self {
        Self::new(kind, String::new())
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    /// Whether there is anything worth summarizing.
    pub fn has_text(&self) -> bool {
        self.kind != ArtifactKind::Unsupported && !self.text.trim().is_empty()
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Optical character recognition engine.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Recognize text in an encoded image using the given language code.
    async fn recognize(&self, image: &[u8], language: &str) -> Result<String>;
}

/// PDF text parser.
pub trait PdfParser: Send + Sync {
    /// Text of each page in document order. Pages may be empty.
    fn pages(&self, bytes: &[u8]) -> Result<Vec<String>>;
}

/// Word-processor document parser.
pub trait DocxParser: Send + Sync {
    /// Text of each paragraph in document order.
    fn paragraphs(&self, bytes: &[u8]) -> Result<Vec<String>>;
}

/// Turns the bytes of one kind of artifact into text.
#[async_trait]
pub trait ExtractionStrategy: Send + Sync {
    /// The artifact kind this strategy handles.
    fn kind(&self) -> ArtifactKind;

    /// Extract text. `language` is only meaningful for OCR.
    async fn extract(&self, bytes: &[u8], language: &str) -> Result<ExtractionResult>;
}

/// Routes artifacts to the strategy that reports their kind.
pub struct Extractor {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl Extractor {
    /// Create an extractor backed by Tesseract, pdf-extract and docx-rs.
    pub fn new(settings: &Settings) -> Self {
        Self::with_engines(
            Arc::new(TesseractOcr::with_command(&settings.ocr.command)),
            Arc::new(PdfExtractParser),
            Arc::new(DocxRsParser),
        )
    }

    /// Create an extractor with custom collaborators.
    pub fn with_engines(
        ocr: Arc<dyn OcrEngine>,
        pdf: Arc<dyn PdfParser>,
        docx: Arc<dyn DocxParser>,
    ) -> Self {
        Self::with_strategies(vec![
            Box::new(ImageStrategy::new(ocr)),
            Box::new(PdfStrategy::new(pdf)),
            Box::new(DocxStrategy::new(docx)),
        ])
    }

    /// Create an extractor from an explicit strategy list. The first
    /// strategy reporting a kind handles it.
    pub fn with_strategies(strategies: Vec<Box<dyn ExtractionStrategy>>) -> Self {
        Self { strategies }
    }

    fn strategy_for(&self, kind: ArtifactKind) -> Option<&dyn ExtractionStrategy> {
        if kind == ArtifactKind::Unsupported {
            return None;
        }
        self.strategies
            .iter()
            .find(|s| s.kind() == kind)
            .map(|s| s.as_ref())
    }

    /// Extract text from an artifact.
    ///
    /// Unsupported artifacts are not an error here: they come back with
    /// `kind = Unsupported`, no text and a warning naming the extension.
    #[instrument(skip(self, artifact), fields(file = %artifact.filename(), hash = %artifact.short_hash()))]
    pub async fn extract(&self, artifact: &UploadedArtifact, language: &str) -> Result<ExtractionResult> {
        let kind = artifact.kind();

        let Some(strategy) = self.strategy_for(kind) else {
            warn!("Rejecting unsupported artifact");
            return Ok(ExtractionResult::empty(ArtifactKind::Unsupported).with_warning(format!(
                "Unsupported file format: {}",
                artifact.display_extension()
            )));
        };

        info!("Extracting text ({}, {} bytes)", kind, artifact.bytes().len());
        let mut result = strategy.extract(artifact.bytes(), language).await?;

        result.kind = kind;
        result.warnings = result
            .warnings
            .into_iter()
            .map(|w| w.trim().to_string())
            .filter(|w| !w.is_empty())
            .collect();

        for warning in &result.warnings {
            warn!("{}", warning);
        }
        debug!("Extracted {} characters", result.char_count());

        Ok(result)
    }
}
