//! Uploaded artifacts and their classification.
//!
//! Classification is by filename extension only. A file whose extension does
//! not match its content is routed by the extension and fails in the strategy.

use crate::error::{FrontlineError, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;

/// Extensions handled by OCR.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff"];

/// Kind of artifact, which decides the extraction strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Image,
    Pdf,
    Docx,
    Unsupported,
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArtifactKind::Image => write!(f, "image"),
            ArtifactKind::Pdf => write!(f, "pdf"),
            ArtifactKind::Docx => write!(f, "docx"),
            ArtifactKind::Unsupported => write!(f, "unsupported"),
        }
    }
}

/// Lowercased extension of a filename, without the dot.
pub fn extension_of(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

/// Map a filename to the artifact kind.
pub fn classify(filename: &str) -> ArtifactKind {
    match extension_of(filename).as_deref() {
        Some(ext) if IMAGE_EXTENSIONS.contains(&ext) => ArtifactKind::Image,
        Some("pdf") => ArtifactKind::Pdf,
        Some("docx") => ArtifactKind::Docx,
        _ => ArtifactKind::Unsupported,
    }
}

/// Lowercase hex SHA-256 of the given bytes.
pub fn content_hash(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

fn mime_hint_for(kind: ArtifactKind, extension: Option<&str>) -> Option<&'static str> {
    match (kind, extension) {
        (ArtifactKind::Pdf, _) => Some("application/pdf"),
        (ArtifactKind::Docx, _) => {
            Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document")
        }
        (ArtifactKind::Image, Some("jpg" | "jpeg")) => Some("image/jpeg"),
        (ArtifactKind::Image, Some("png")) => Some("image/png"),
        (ArtifactKind::Image, Some("bmp")) => Some("image/bmp"),
        (ArtifactKind::Image, Some("tiff")) => Some("image/tiff"),
        _ => None,
    }
}

/// A file entering the pipeline.
///
/// Immutable once built; `content_hash` identifies it in logs.
#[derive(Debug, Clone)]
pub struct UploadedArtifact {
    filename: String,
    mime_hint: Option<String>,
    bytes: Vec<u8>,
    content_hash: String,
}

impl UploadedArtifact {
    /// Build an artifact from raw bytes and the name it was uploaded under.
    pub fn from_bytes(bytes: Vec<u8>, filename: impl Into<String>) -> Self {
        let filename = filename.into();
        let filename = if filename.trim().is_empty() {
            "uploaded_file".to_string()
        } else {
            filename
        };

        let kind = classify(&filename);
        let mime_hint = mime_hint_for(kind, extension_of(&filename).as_deref()).map(str::to_string);
        let content_hash = content_hash(&bytes);

        Self {
            filename,
            mime_hint,
            bytes,
            content_hash,
        }
    }

    /// Read an artifact from disk.
    pub async fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(FrontlineError::InvalidInput(format!(
                "File not found: {}",
                path.display()
            )));
        }

        let bytes = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("uploaded_file")
            .to_string();

        Ok(Self::from_bytes(bytes, filename))
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn mime_hint(&self) -> Option<&str> {
        self.mime_hint.as_deref()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }

    /// First 12 hex characters of the content hash, for log lines.
    pub fn short_hash(&self) -> &str {
        &self.content_hash[..12]
    }

    pub fn kind(&self) -> ArtifactKind {
        classify(&self.filename)
    }

    /// Extension as shown to users, e.g. `.xyz`, or `(none)`.
    pub fn display_extension(&self) -> String {
        extension_of(&self.filename)
            .map(|ext| format!(".{}", ext))
            .unwrap_or_else(|| "(none)".to_string())
    }
}
