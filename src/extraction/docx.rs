//! Word-processor (DOCX) extraction.

use super::{DocxParser, ExtractionResult, ExtractionStrategy};
use crate::artifact::ArtifactKind;
use crate::error::{FrontlineError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// DOCX strategy: paragraphs joined by newlines. Tables, headers and
/// embedded objects are not treated specially.
pub struct DocxStrategy {
    parser: Arc<dyn DocxParser>,
}

impl DocxStrategy {
    pub fn new(parser: Arc<dyn DocxParser>) -> Self {
        Self { parser }
    }
}

#[async_trait]
impl ExtractionStrategy for DocxStrategy {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::Docx
    }

    async fn extract(&self, bytes: &[u8], _language: &str) -> Result<ExtractionResult> {
        let paragraphs = self.parser.paragraphs(bytes)?;
        debug!("DOCX has {} paragraphs", paragraphs.len());
        Ok(ExtractionResult::new(ArtifactKind::Docx, paragraphs.join("\n")))
    }
}

/// Parser backed by the `docx-rs` crate.
pub struct DocxRsParser;

impl DocxRsParser {
    fn run_text(run: &docx_rs::Run, output: &mut String) {
        for child in &run.children {
            if let docx_rs::RunChild::Text(text) = child {
                output.push_str(&text.text);
            }
        }
    }

    fn paragraph_text(paragraph: &docx_rs::Paragraph) -> String {
        let mut text = String::new();
        for child in &paragraph.children {
            match child {
                docx_rs::ParagraphChild::Run(run) => Self::run_text(run, &mut text),
                docx_rs::ParagraphChild::Hyperlink(link) => {
                    for inner in &link.children {
                        if let docx_rs::ParagraphChild::Run(run) = inner {
                            Self::run_text(run, &mut text);
                        }
                    }
                }
                _ => {}
            }
        }
        text
    }
}

impl DocxParser for DocxRsParser {
    fn paragraphs(&self, bytes: &[u8]) -> Result<Vec<String>> {
        let doc = docx_rs::read_docx(bytes)
            .map_err(|e| FrontlineError::Extraction(format!("Could not read DOCX: {}", e)))?;

        let paragraphs = doc
            .document
            .children
            .iter()
            .filter_map(|child| match child {
                docx_rs::DocumentChild::Paragraph(paragraph) => Some(Self::paragraph_text(paragraph)),
                _ => None,
            })
            .collect();

        Ok(paragraphs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StaticDocx;
    use docx_rs::{Docx, Paragraph, Run};

    fn build_docx(paragraphs: &[&str]) -> Vec<u8> {
        let mut docx = Docx::new();
        for text in paragraphs {
            docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*text)));
        }

        let mut buffer = std::io::Cursor::new(Vec::new());
        docx.build().pack(&mut buffer).unwrap();
        buffer.into_inner()
    }

    #[tokio::test]
    async fn test_joins_paragraphs() {
        let strategy = DocxStrategy::new(Arc::new(StaticDocx::new(&["Hello", "World"])));
        let result = strategy.extract(&[], "eng").await.unwrap();

        assert_eq!(result.text, "Hello\nWorld");
        assert_eq!(result.kind, ArtifactKind::Docx);
        assert!(result.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_keeps_empty_paragraphs() {
        let strategy = DocxStrategy::new(Arc::new(StaticDocx::new(&["Title", "", "Body"])));
        let result = strategy.extract(&[], "eng").await.unwrap();
        assert_eq!(result.text, "Title\n\nBody");
    }

    #[test]
    fn test_reads_real_docx() {
        let bytes = build_docx(&["Hello", "World"]);
        let paragraphs = DocxRsParser.paragraphs(&bytes).unwrap();
        assert_eq!(paragraphs, vec!["Hello".to_string(), "World".to_string()]);
    }

    #[test]
    fn test_corrupt_docx_is_error() {
        let result = DocxRsParser.paragraphs(b"PK\x03\x04 truncated zip");
        assert!(matches!(result, Err(FrontlineError::Extraction(_))));
    }
}
