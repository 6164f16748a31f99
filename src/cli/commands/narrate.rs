//! Narrate command implementation.

use crate::artifact::UploadedArtifact;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::{Orchestrator, PipelineOutcome};
use anyhow::Result;
use std::path::{Path, PathBuf};

/// Run the narrate command.
pub async fn run_narrate(
    file: &str,
    language: Option<String>,
    output: Option<String>,
    json: bool,
    settings: Settings,
) -> Result<()> {
    let artifact = UploadedArtifact::from_path(&Settings::expand_path(file)).await?;

    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Narrate(artifact.kind()), &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'frontline doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let language = language.unwrap_or_else(|| settings.ocr.language_default.clone());
    let audio_path = match output {
        Some(path) => Settings::expand_path(&path),
        None => default_audio_path(&settings.output_dir(), artifact.filename()),
    };

    let orchestrator = Orchestrator::new(settings)?;

    let spinner = if json {
        None
    } else {
        Some(Output::spinner(&format!("Processing {}...", artifact.filename())))
    };
    let outcome = orchestrator.run(&artifact, &language).await;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    if let Some(audio) = outcome.audio() {
        save_audio(&audio_path, audio).await?;
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&outcome, &audio_path);
    }

    match (&outcome.stage_failed, &outcome.failure) {
        (Some(stage), failure) => Err(anyhow::anyhow!(
            "Pipeline stopped at {}: {}",
            stage,
            failure.as_deref().unwrap_or("unknown error")
        )),
        (None, _) => Ok(()),
    }
}

fn print_outcome(outcome: &PipelineOutcome, audio_path: &Path) {
    Output::header("Extracted text");
    Output::kv("Kind", &outcome.extraction.kind.to_string());
    Output::kv("Characters", &outcome.extraction.char_count().to_string());
    for warning in &outcome.extraction.warnings {
        Output::warning(warning);
    }
    if outcome.extraction.has_text() {
        Output::block(&outcome.extraction.text, Some(600));
    }

    if let Some(summary) = &outcome.summary {
        Output::header("Report");
        Output::block(&summary.report_text, None);
    }

    if let Some(narration) = &outcome.narration {
        Output::header("Narration");
        Output::kv("Voice", &narration.model_tier.to_string());
        if narration.truncated {
            Output::kv("Truncated", "yes");
        }
        for error in &narration.attempt_errors {
            Output::list_item(error);
        }
    }

    println!();
    match &outcome.stage_failed {
        None => Output::success(&format!("Narration written to {}", audio_path.display())),
        Some(stage) => Output::error(&format!(
            "Stopped at {}: {}",
            stage,
            outcome.failure.as_deref().unwrap_or("unknown error")
        )),
    }
}

/// `<output_dir>/<file stem>-<timestamp>.wav`
fn default_audio_path(output_dir: &Path, filename: &str) -> PathBuf {
    let stem = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("narration");
    let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    output_dir.join(format!("{}-{}.wav", stem, stamp))
}

/// Write audio bytes, creating parent directories.
pub(super) async fn save_audio(path: &Path, audio: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, audio).await?;
    Ok(())
}
