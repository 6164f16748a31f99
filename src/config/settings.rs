//! Configuration settings for Frontline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable consulted when no summarization API key is configured.
pub const API_KEY_ENV: &str = "GROQ_API_KEY";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub summarization: SummarizationSettings,
    pub ocr: OcrSettings,
    pub narration: NarrationSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory where narrated audio is written when no output path is given.
    pub output_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            output_dir: ".".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

/// Summarization service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizationSettings {
    /// API key for the completion service. Falls back to `GROQ_API_KEY`.
    pub api_key: Option<String>,
    /// Base URL of the OpenAI-compatible completion API.
    pub api_base: String,
    /// Model used for the report.
    pub model: String,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for SummarizationSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: "https://api.groq.com/openai/v1".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            timeout_seconds: 120,
        }
    }
}

/// OCR settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSettings {
    /// Language code used when the caller does not pick one (eng, fra, spa, deu, ...).
    pub language_default: String,
    /// Tesseract executable.
    pub command: String,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            language_default: "eng".to_string(),
            command: "tesseract".to_string(),
        }
    }
}

/// Narration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrationSettings {
    /// Reference speaker sample for the voice-cloning model.
    pub reference_speaker_path: Option<String>,
    /// Language the report is spoken in.
    pub target_language: String,
    /// Reports longer than this many characters are truncated before synthesis.
    pub max_narration_chars: usize,
    /// Excerpt length handed to the fallback model.
    pub fallback_excerpt_chars: usize,
    pub primary: PrimaryVoiceSettings,
    pub fallback: FallbackVoiceSettings,
}

impl Default for NarrationSettings {
    fn default() -> Self {
        Self {
            reference_speaker_path: Some("sample_speaker.wav".to_string()),
            target_language: "en".to_string(),
            max_narration_chars: 1000,
            fallback_excerpt_chars: 500,
            primary: PrimaryVoiceSettings::default(),
            fallback: FallbackVoiceSettings::default(),
        }
    }
}

/// Voice-cloning speech service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrimaryVoiceSettings {
    /// Base URL of the TTS server.
    pub endpoint: String,
    /// Model the server should use.
    pub model: String,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for PrimaryVoiceSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:5002".to_string(),
            model: "tts_models/multilingual/multi-dataset/xtts_v2".to_string(),
            timeout_seconds: 300,
        }
    }
}

/// Local single-speaker synthesizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackVoiceSettings {
    /// espeak-ng compatible executable.
    pub command: String,
    /// Voice name passed with `-v`.
    pub voice: String,
}

impl Default for FallbackVoiceSettings {
    fn default() -> Self {
        Self {
            command: "espeak-ng".to_string(),
            voice: "en".to_string(),
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::FrontlineError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("frontline")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded output directory path.
    pub fn output_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.output_dir)
    }

    /// Get the expanded reference speaker path, if one is configured.
    pub fn reference_speaker_path(&self) -> Option<PathBuf> {
        self.narration
            .reference_speaker_path
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .map(Self::expand_path)
    }

    /// Resolve the summarization API key from config, then the environment.
    pub fn summarization_api_key(&self) -> Option<String> {
        self.summarization
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.ocr.language_default, "eng");
        assert_eq!(settings.narration.max_narration_chars, 1000);
        assert_eq!(settings.narration.fallback_excerpt_chars, 500);
        assert_eq!(settings.summarization.model, "llama-3.3-70b-versatile");
    }

    #[test]
    fn test_partial_toml() {
        let content = r#"
[ocr]
language_default = "fra"

[narration]
max_narration_chars = 800
"#;
        let settings: Settings = toml::from_str(content).unwrap();
        assert_eq!(settings.ocr.language_default, "fra");
        assert_eq!(settings.ocr.command, "tesseract");
        assert_eq!(settings.narration.max_narration_chars, 800);
        assert_eq!(settings.narration.fallback_excerpt_chars, 500);
        assert_eq!(settings.narration.target_language, "en");
    }

    #[test]
    fn test_blank_speaker_path_is_none() {
        let mut settings = Settings::default();
        settings.narration.reference_speaker_path = Some("  ".to_string());
        assert!(settings.reference_speaker_path().is_none());
    }

    #[test]
    fn test_configured_api_key_wins() {
        let mut settings = Settings::default();
        settings.summarization.api_key = Some("gsk_configured".to_string());
        assert_eq!(settings.summarization_api_key().as_deref(), Some("gsk_configured"));
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let settings = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(settings.ocr.language_default, "eng");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut settings = Settings::default();
        settings.ocr.language_default = "deu".to_string();
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.ocr.language_default, "deu");
    }
}
