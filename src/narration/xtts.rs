//! Voice-cloning synthesis through a Coqui XTTS server.

use super::VoiceCloningSynthesizer;
use crate::config::PrimaryVoiceSettings;
use crate::error::{FrontlineError, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// Client for a voice-cloning TTS server exposing `POST /api/tts`.
///
/// Expected server contract:
///
/// - request: `multipart/form-data` with text fields `text`, `language_id`
///   and `model_name`, plus the reference sample as the `speaker_wav` file
///   part (`audio/wav`)
/// - response: `200` with the WAV bytes as the body; any other status is a
///   failure and its body is reported as the cause
///
/// The stock `tts-server` shipped with Coqui TTS does not take uploads
/// (it reads `speaker_idx`/`language_idx`/`style_wav` as query parameters
/// naming files already on the server). Run an XTTS API wrapper that accepts
/// this form, or point `narration.primary.endpoint` at a shim.
pub struct XttsSynthesizer {
    client: reqwest::Client,
    url: Url,
    model: String,
}

impl XttsSynthesizer {
    pub fn with_config(settings: &PrimaryVoiceSettings) -> Result<Self> {
        let base = Url::parse(&settings.endpoint).map_err(|e| {
            FrontlineError::Config(format!("Invalid speech endpoint '{}': {}", settings.endpoint, e))
        })?;
        let url = base
            .join("api/tts")
            .map_err(|e| FrontlineError::Config(format!("Invalid speech endpoint: {}", e)))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            url,
            model: settings.model.clone(),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl VoiceCloningSynthesizer for XttsSynthesizer {
    #[instrument(skip(self, text, speaker_sample), fields(url = %self.url, chars = text.len()))]
    async fn synthesize(&self, text: &str, speaker_sample: &[u8], language: &str) -> Result<Vec<u8>> {
        let speaker = Part::bytes(speaker_sample.to_vec())
            .file_name("speaker.wav")
            .mime_str("audio/wav")?;

        let form = Form::new()
            .text("text", text.to_string())
            .text("language_id", language.to_string())
            .text("model_name", self.model.clone())
            .part("speaker_wav", speaker);

        let response = self.client.post(self.url.clone()).multipart(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FrontlineError::Narration(format!(
                "speech server returned {}: {}",
                status,
                body.trim()
            )));
        }

        let audio = response.bytes().await?.to_vec();
        if audio.is_empty() {
            return Err(FrontlineError::Narration("speech server returned no audio".to_string()));
        }

        debug!("Received {} bytes of audio", audio.len());
        Ok(audio)
    }
}
