//! Configuration module for Frontline.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{Prompts, SummarizationPrompts};
pub use settings::{
    FallbackVoiceSettings, GeneralSettings, NarrationSettings, OcrSettings,
    PrimaryVoiceSettings, PromptSettings, Settings, SummarizationSettings, API_KEY_ENV,
};
