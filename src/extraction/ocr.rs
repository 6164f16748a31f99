//! Image extraction through Tesseract OCR.

use super::{ExtractionResult, ExtractionStrategy, OcrEngine};
use crate::artifact::ArtifactKind;
use crate::error::{FrontlineError, Result};
use async_trait::async_trait;
use std::io::Cursor;
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;
use tracing::{debug, instrument};

/// Image strategy: whatever the recognizer returns, empty included.
pub struct ImageStrategy {
    engine: Arc<dyn OcrEngine>,
}

impl ImageStrategy {
    pub fn new(engine: Arc<dyn OcrEngine>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl ExtractionStrategy for ImageStrategy {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::Image
    }

    async fn extract(&self, bytes: &[u8], language: &str) -> Result<ExtractionResult> {
        let text = self.engine.recognize(bytes, language).await?;
        Ok(ExtractionResult::new(ArtifactKind::Image, text))
    }
}

/// OCR engine backed by the `tesseract` command-line tool.
///
/// Images are decoded first so that a corrupt upload is reported as such
/// rather than as a Tesseract failure, then handed over as PNG.
pub struct TesseractOcr {
    command: String,
}

impl TesseractOcr {
    pub fn with_command(command: &str) -> Self {
        Self {
            command: command.to_string(),
        }
    }

    /// Decode any supported image format and re-encode it as PNG.
    fn normalize_to_png(image: &[u8]) -> Result<Vec<u8>> {
        let decoded = ::image::load_from_memory(image)
            .map_err(|e| FrontlineError::Extraction(format!("Could not decode image: {}", e)))?;

        let mut png = Vec::new();
        decoded
            .write_to(&mut Cursor::new(&mut png), ::image::ImageFormat::Png)
            .map_err(|e| FrontlineError::Extraction(format!("Could not re-encode image: {}", e)))?;
        Ok(png)
    }
}

#[async_trait]
impl OcrEngine for TesseractOcr {
    #[instrument(skip(self, image), fields(bytes = image.len()))]
    async fn recognize(&self, image: &[u8], language: &str) -> Result<String> {
        let png = Self::normalize_to_png(image)?;

        let input = tempfile::Builder::new().suffix(".png").tempfile()?;
        tokio::fs::write(input.path(), &png).await?;

        debug!("Running {} with language {}", self.command, language);

        let result = Command::new(&self.command)
            .arg(input.path())
            .arg("stdout")
            .arg("-l")
            .arg(language)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await;

        let output = match result {
            Ok(o) => o,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(FrontlineError::ToolNotFound(self.command.clone()));
            }
            Err(e) => {
                return Err(FrontlineError::Ocr(format!("{} execution failed: {e}", self.command)));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FrontlineError::Ocr(format!(
                "{} failed for language '{}': {}",
                self.command,
                language,
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).to_string();
        debug!("Recognized {} characters", text.chars().count());
        Ok(text)
    }
}
