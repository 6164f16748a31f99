//! Pipeline orchestrator for Frontline.
//!
//! Runs extraction, summarization and narration for one artifact and reports
//! whatever was produced before the first failing stage.

use crate::artifact::UploadedArtifact;
use crate::config::{Prompts, Settings};
use crate::error::{FrontlineError, Result};
use crate::extraction::{ExtractionResult, Extractor};
use crate::narration::{ModelTier, NarrationResult, Narrator};
use crate::summarization::{ChatCompletionService, Summarizer, SummaryResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Pipeline stages, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStage {
    Extraction,
    Summarization,
    Narration,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineStage::Extraction => write!(f, "extraction"),
            PipelineStage::Summarization => write!(f, "summarization"),
            PipelineStage::Narration => write!(f, "narration"),
        }
    }
}

/// Result of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutcome {
    /// Correlation id for this run.
    pub request_id: Uuid,
    /// SHA-256 of the artifact.
    pub content_hash: String,
    pub extraction: ExtractionResult,
    pub summary: Option<SummaryResult>,
    pub narration: Option<NarrationResult>,
    /// First stage that failed, `None` when every stage succeeded.
    pub stage_failed: Option<PipelineStage>,
    /// Human-readable cause of the failure.
    pub failure: Option<String>,
}

impl PipelineOutcome {
    pub fn is_complete(&self) -> bool {
        self.stage_failed.is_none()
    }

    pub fn audio(&self) -> Option<&[u8]> {
        self.narration.as_ref().and_then(|n| n.audio.as_deref())
    }
}

/// The main orchestrator for the Frontline pipeline.
pub struct Orchestrator {
    settings: Settings,
    extractor: Extractor,
    summarizer: Summarizer,
    narrator: Narrator,
}

impl Orchestrator {
    /// Create a new orchestrator with the default collaborators.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let api_key = settings.summarization_api_key().ok_or_else(|| {
            FrontlineError::Config(format!(
                "No summarization API key. Set summarization.api_key or {}",
                crate::config::API_KEY_ENV
            ))
        })?;

        let service = ChatCompletionService::with_config(&settings.summarization, &api_key)?;
        info!(
            "Using {} at {} for reports",
            settings.summarization.model, settings.summarization.api_base
        );

        let extractor = Extractor::new(&settings);
        let summarizer = Summarizer::new(Arc::new(service)).with_prompts(prompts);
        let narrator = Narrator::new(&settings)?;

        Ok(Self {
            settings,
            extractor,
            summarizer,
            narrator,
        })
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: Settings,
        extractor: Extractor,
        summarizer: Summarizer,
        narrator: Narrator,
    ) -> Self {
        Self {
            settings,
            extractor,
            summarizer,
            narrator,
        }
    }

    pub fn extractor(&self) -> &Extractor {
        &self.extractor
    }

    /// Language used when the caller does not choose one.
    pub fn default_language(&self) -> &str {
        &self.settings.ocr.language_default
    }

    /// Run the whole pipeline for one artifact.
    #[instrument(skip(self, artifact), fields(file = %artifact.filename(), hash = %artifact.short_hash()))]
    pub async fn run(&self, artifact: &UploadedArtifact, language: &str) -> PipelineOutcome {
        let mut outcome = PipelineOutcome {
            request_id: Uuid::new_v4(),
            content_hash: artifact.content_hash().to_string(),
            extraction: ExtractionResult::empty(artifact.kind()),
            summary: None,
            narration: None,
            stage_failed: None,
            failure: None,
        };
        info!(request_id = %outcome.request_id, "Starting pipeline");

        // Extraction
        match self.extractor.extract(artifact, language).await {
            Ok(extraction) => outcome.extraction = extraction,
            Err(e) => return Self::halt(outcome, PipelineStage::Extraction, e.to_string()),
        }

        if !outcome.extraction.has_text() {
            let cause = outcome
                .extraction
                .warnings
                .first()
                .cloned()
                .unwrap_or_else(|| format!("No text extracted from {} artifact", outcome.extraction.kind));
            return Self::halt(outcome, PipelineStage::Extraction, cause);
        }
        info!("Extracted {} characters", outcome.extraction.char_count());

        // Summarization
        match self.summarizer.summarize(&outcome.extraction.text).await {
            Ok(summary) => outcome.summary = Some(summary),
            Err(e) => return Self::halt(outcome, PipelineStage::Summarization, e.to_string()),
        }

        // Narration
        let report = outcome
            .summary
            .as_ref()
            .map(|s| s.report_text.clone())
            .unwrap_or_default();
        let narration = self.narrator.narrate(&report).await;

        if narration.model_tier == ModelTier::None {
            let cause = format!(
                "Narration failed, report is available as text only ({})",
                narration.attempt_errors.join("; ")
            );
            outcome.narration = Some(narration);
            return Self::halt(outcome, PipelineStage::Narration, cause);
        }

        outcome.narration = Some(narration);
        info!("Pipeline complete");
        outcome
    }

    fn halt(mut outcome: PipelineOutcome, stage: PipelineStage, cause: String) -> PipelineOutcome {
        warn!("Pipeline stopped at {}: {}", stage, cause);
        outcome.stage_failed = Some(stage);
        outcome.failure = Some(cause);
        outcome
    }
}
