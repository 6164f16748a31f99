//! Error types for Frontline.

use thiserror::Error;

/// Library-level error type for Frontline operations.
#[derive(Error, Debug)]
pub enum FrontlineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Text extraction failed: {0}")]
    Extraction(String),

    #[error("OCR failed: {0}")]
    Ocr(String),

    #[error("Summarization failed: {0}")]
    Summarization(String),

    #[error("Narration failed: {0}")]
    Narration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Completion API error: {0}")]
    CompletionApi(String),

    #[error("Reference speaker sample not available: {0}")]
    MissingSpeakerSample(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("External tool failed: {0}")]
    ToolFailed(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for Frontline operations.
pub type Result<T> = std::result::Result<T, FrontlineError>;
