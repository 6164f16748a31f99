//! Speech synthesis for reports.
//!
//! # Fallback chain
//!
//! ```text
//! NotStarted --sample present--> PrimaryAttempt --ok--> Succeeded(Primary)
//!     |                               |
//!     +--sample missing--+            +--error--+
//!                        v                      v
//!                   FallbackAttempt <-----------+
//!                        |--ok----> Succeeded(Fallback)
//!                        +--error-> Failed
//! ```
//!
//! The primary tier is a multilingual voice-cloning model that needs a
//! reference speaker sample. The fallback is a plain single-speaker voice that
//! only gets a short excerpt. Neither tier is retried.

mod espeak;
mod xtts;

pub use espeak::EspeakSynthesizer;
pub use xtts::XttsSynthesizer;

use crate::config::Settings;
use crate::error::{FrontlineError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

/// Appended to reports cut at the narration limit.
pub const ELLIPSIS: &str = "...";

/// Voice-cloning synthesis model.
#[async_trait]
pub trait VoiceCloningSynthesizer: Send + Sync {
    /// Speak `text` in the voice of `speaker_sample` (WAV bytes). Returns WAV bytes.
    async fn synthesize(&self, text: &str, speaker_sample: &[u8], language: &str) -> Result<Vec<u8>>;
}

/// Single-speaker synthesis model.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Speak `text`. Returns WAV bytes.
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>>;
}

/// Which model produced the audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    Primary,
    Fallback,
    None,
}

impl std::fmt::Display for ModelTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelTier::Primary => write!(f, "primary"),
            ModelTier::Fallback => write!(f, "fallback"),
            ModelTier::None => write!(f, "none"),
        }
    }
}

/// States of one narration run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NarrationState {
    NotStarted,
    PrimaryAttempt,
    FallbackAttempt,
    Succeeded(ModelTier),
    Failed,
}

/// Outcome of narrating one report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrationResult {
    /// WAV bytes. Never serialized; front ends ship audio separately.
    #[serde(skip)]
    pub audio: Option<Vec<u8>>,
    pub model_tier: ModelTier,
    pub truncated: bool,
    /// Why each skipped or failed tier did not produce audio.
    pub attempt_errors: Vec<String>,
}

impl NarrationResult {
    pub fn succeeded(&self) -> bool {
        self.model_tier != ModelTier::None && self.audio.is_some()
    }
}

/// Cut `text` to `max_chars` characters plus [`ELLIPSIS`] when it is longer.
///
/// Returns the text to speak and whether it was cut.
pub fn truncate_for_narration(text: &str, max_chars: usize) -> (String, bool) {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => (format!("{}{}", &text[..byte_idx], ELLIPSIS), true),
        None => (text.to_string(), false),
    }
}

/// First `max_chars` characters of `text`.
pub fn excerpt(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Narration limits and voice parameters.
#[derive(Debug, Clone)]
pub struct NarrationConfig {
    pub reference_speaker: Option<PathBuf>,
    pub target_language: String,
    pub max_chars: usize,
    pub fallback_chars: usize,
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self {
            reference_speaker: None,
            target_language: "en".to_string(),
            max_chars: 1000,
            fallback_chars: 500,
        }
    }
}

impl NarrationConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            reference_speaker: settings.reference_speaker_path(),
            target_language: settings.narration.target_language.clone(),
            max_chars: settings.narration.max_narration_chars,
            fallback_chars: settings.narration.fallback_excerpt_chars,
        }
    }
}

/// Drives the primary/fallback chain for one report at a time.
pub struct Narrator {
    primary: Arc<dyn VoiceCloningSynthesizer>,
    fallback: Arc<dyn SpeechSynthesizer>,
    config: NarrationConfig,
    /// Serializes use of the primary model.
    primary_lock: Mutex<()>,
}

impl Narrator {
    /// Create a narrator backed by an XTTS server and espeak-ng.
    pub fn new(settings: &Settings) -> Result<Self> {
        let primary = XttsSynthesizer::with_config(&settings.narration.primary)?;
        let fallback = EspeakSynthesizer::with_config(&settings.narration.fallback);

        Ok(Self::with_components(
            Arc::new(primary),
            Arc::new(fallback),
            NarrationConfig::from_settings(settings),
        ))
    }

    /// Create a narrator with custom synthesizers.
    pub fn with_components(
        primary: Arc<dyn VoiceCloningSynthesizer>,
        fallback: Arc<dyn SpeechSynthesizer>,
        config: NarrationConfig,
    ) -> Self {
        Self {
            primary,
            fallback,
            config,
            primary_lock: Mutex::new(()),
        }
    }

    /// Read the reference speaker sample.
    async fn speaker_sample(&self) -> Result<Vec<u8>> {
        let path = self.config.reference_speaker.as_ref().ok_or_else(|| {
            FrontlineError::MissingSpeakerSample("no reference speaker path configured".to_string())
        })?;

        match tokio::fs::read(path).await {
            Ok(bytes) if !bytes.is_empty() => Ok(bytes),
            Ok(_) => Err(FrontlineError::MissingSpeakerSample(format!(
                "{} is empty",
                path.display()
            ))),
            Err(e) => Err(FrontlineError::MissingSpeakerSample(format!(
                "{}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Narrate a report. Never fails: a run where both tiers fail comes back
    /// with `model_tier = None` and no audio.
    #[instrument(skip(self, report), fields(chars = report.chars().count()))]
    pub async fn narrate(&self, report: &str) -> NarrationResult {
        let (text, truncated) = truncate_for_narration(report, self.config.max_chars);
        if truncated {
            info!("Report truncated to {} characters for narration", self.config.max_chars);
        }

        let mut state = NarrationState::NotStarted;
        let mut sample: Option<Vec<u8>> = None;
        let mut audio: Option<Vec<u8>> = None;
        let mut attempt_errors = Vec::new();

        loop {
            debug!("Narration state: {:?}", state);
            state = match state {
                NarrationState::NotStarted => match self.speaker_sample().await {
                    Ok(bytes) => {
                        sample = Some(bytes);
                        NarrationState::PrimaryAttempt
                    }
                    Err(e) => {
                        warn!("Skipping voice-cloning model: {}", e);
                        attempt_errors.push(e.to_string());
                        NarrationState::FallbackAttempt
                    }
                },

                NarrationState::PrimaryAttempt => match sample.as_deref() {
                    None => NarrationState::FallbackAttempt,
                    Some(speaker) => {
                        let _guard = self.primary_lock.lock().await;
                        match self
                            .primary
                            .synthesize(&text, speaker, &self.config.target_language)
                            .await
                        {
                            Ok(wav) => {
                                audio = Some(wav);
                                NarrationState::Succeeded(ModelTier::Primary)
                            }
                            Err(e) => {
                                warn!("Voice-cloning model failed: {}", e);
                                attempt_errors.push(format!("primary: {}", e));
                                NarrationState::FallbackAttempt
                            }
                        }
                    }
                },

                NarrationState::FallbackAttempt => {
                    let short = excerpt(&text, self.config.fallback_chars);
                    match self.fallback.synthesize(short).await {
                        Ok(wav) => {
                            audio = Some(wav);
                            NarrationState::Succeeded(ModelTier::Fallback)
                        }
                        Err(e) => {
                            warn!("Fallback voice failed: {}", e);
                            attempt_errors.push(format!("fallback: {}", e));
                            NarrationState::Failed
                        }
                    }
                }

                NarrationState::Succeeded(_) | NarrationState::Failed => break,
            };
        }

        let model_tier = match state {
            NarrationState::Succeeded(tier) => tier,
            _ => ModelTier::None,
        };
        if model_tier == ModelTier::None {
            audio = None;
        }

        info!("Narration finished with {} tier", model_tier);

        NarrationResult {
            audio,
            model_tier,
            truncated,
            attempt_errors,
        }
    }
}
