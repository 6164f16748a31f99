//! Single-speaker fallback voice through espeak-ng.

use super::SpeechSynthesizer;
use crate::config::FallbackVoiceSettings;
use crate::error::{FrontlineError, Result};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, instrument};

/// Runs `<command> --stdout -v <voice>` with the text on stdin and reads WAV from stdout.
pub struct EspeakSynthesizer {
    command: String,
    voice: String,
}

impl EspeakSynthesizer {
    pub fn with_config(settings: &FallbackVoiceSettings) -> Self {
        Self {
            command: settings.command.clone(),
            voice: settings.voice.clone(),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for EspeakSynthesizer {
    #[instrument(skip(self, text), fields(command = %self.command, chars = text.len()))]
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let spawned = Command::new(&self.command)
            .arg("--stdout")
            .arg("-v")
            .arg(&self.voice)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn();

        let mut child = match spawned {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(FrontlineError::ToolNotFound(self.command.clone()));
            }
            Err(e) => {
                return Err(FrontlineError::ToolFailed(format!("{} execution failed: {e}", self.command)));
            }
        };

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes()).await?;
            stdin.shutdown().await?;
        }

        let output = child.wait_with_output().await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FrontlineError::ToolFailed(format!(
                "{} failed: {}",
                self.command,
                stderr.trim()
            )));
        }

        if output.stdout.is_empty() {
            return Err(FrontlineError::Narration(format!("{} produced no audio", self.command)));
        }

        debug!("Synthesized {} bytes of audio", output.stdout.len());
        Ok(output.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_command() {
        let synth = EspeakSynthesizer::with_config(&FallbackVoiceSettings {
            command: "definitely-not-installed-tts".to_string(),
            voice: "en".to_string(),
        });
        let result = synth.synthesize("hello").await;
        assert!(matches!(result, Err(FrontlineError::ToolNotFound(_))));
    }
}
