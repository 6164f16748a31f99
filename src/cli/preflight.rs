//! Pre-flight checks before expensive operations.
//!
//! Validates that required tools and configuration are available
//! before starting operations that would otherwise fail midway.

use crate::artifact::ArtifactKind;
use crate::config::{Settings, API_KEY_ENV};
use crate::error::{FrontlineError, Result};
use std::process::Command;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Extraction needs the OCR tool for images.
    Extract(ArtifactKind),
    /// The full pipeline needs the API key on top of extraction.
    Narrate(ArtifactKind),
    /// Narration alone has no hard requirement; tiers fail over at runtime.
    Speak,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Extract(kind) => {
            check_kind(kind, settings)?;
        }
        Operation::Narrate(kind) => {
            check_api_key(settings)?;
            check_kind(kind, settings)?;
        }
        Operation::Speak => {}
    }
    Ok(())
}

fn check_kind(kind: ArtifactKind, settings: &Settings) -> Result<()> {
    if kind == ArtifactKind::Image {
        check_tool(&settings.ocr.command)?;
    }
    Ok(())
}

/// Check if the summarization API key is configured.
fn check_api_key(settings: &Settings) -> Result<()> {
    match settings.summarization_api_key() {
        Some(_) => Ok(()),
        None => Err(FrontlineError::Config(format!(
            "{} not set. Set it with: export {}='gsk_...' or summarization.api_key in the config",
            API_KEY_ENV, API_KEY_ENV
        ))),
    }
}

/// Check if an external tool is available.
fn check_tool(name: &str) -> Result<()> {
    match Command::new(name).arg("--version").output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(FrontlineError::ToolNotFound(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(FrontlineError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(FrontlineError::ToolNotFound(format!("{}: {}", name, e))),
    }
}
