//! Extract command implementation.

use crate::artifact::UploadedArtifact;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::extraction::Extractor;
use anyhow::Result;

/// Run the extract command.
pub async fn run_extract(file: &str, language: Option<String>, settings: Settings) -> Result<()> {
    let artifact = UploadedArtifact::from_path(&Settings::expand_path(file)).await?;

    if let Err(e) = preflight::check(Operation::Extract(artifact.kind()), &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'frontline doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let language = language.unwrap_or_else(|| settings.ocr.language_default.clone());
    let extractor = Extractor::new(&settings);

    let spinner = Output::spinner(&format!("Extracting {}...", artifact.filename()));
    let result = extractor.extract(&artifact, &language).await;
    spinner.finish_and_clear();

    let result = result?;

    Output::header(artifact.filename());
    Output::kv("Kind", &result.kind.to_string());
    if let Some(mime) = artifact.mime_hint() {
        Output::kv("Type", mime);
    }
    Output::kv("SHA-256", artifact.content_hash());
    Output::kv("Characters", &result.char_count().to_string());
    for warning in &result.warnings {
        Output::warning(warning);
    }

    if result.has_text() {
        println!();
        println!("{}", result.text);
    }

    Ok(())
}
