//! Speak command implementation.

use super::narrate::save_audio;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::narration::Narrator;
use anyhow::Result;
use tokio::io::AsyncReadExt;

/// Run the speak command.
pub async fn run_speak(text: &str, output: String, settings: Settings) -> Result<()> {
    preflight::check(Operation::Speak, &settings)?;

    let text = if text == "-" {
        let mut buf = String::new();
        tokio::io::stdin().read_to_string(&mut buf).await?;
        buf
    } else {
        text.to_string()
    };

    if text.trim().is_empty() {
        Output::error("Nothing to narrate.");
        return Err(anyhow::anyhow!("empty text"));
    }

    let narrator = Narrator::new(&settings)?;

    let spinner = Output::spinner("Synthesizing...");
    let result = narrator.narrate(&text).await;
    spinner.finish_and_clear();

    for error in &result.attempt_errors {
        Output::warning(error);
    }

    match &result.audio {
        Some(audio) => {
            let path = Settings::expand_path(&output);
            save_audio(&path, audio).await?;
            Output::success(&format!(
                "Narration written to {} ({} voice{})",
                path.display(),
                result.model_tier,
                if result.truncated { ", truncated" } else { "" }
            ));
            Ok(())
        }
        None => {
            Output::error("No voice could narrate the text.");
            Err(anyhow::anyhow!("narration failed"))
        }
    }
}
