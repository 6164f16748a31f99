//! Config command implementation.

use crate::cli::{ConfigAction, Output};
use crate::config::{Settings, API_KEY_ENV};
use anyhow::Result;
use std::path::PathBuf;

/// Where the summarization API key comes from.
#[derive(Debug, PartialEq, Eq)]
enum KeySource {
    ConfigFile,
    Environment,
    Missing,
}

impl KeySource {
    fn of(settings: &Settings) -> Self {
        let configured = settings
            .summarization
            .api_key
            .as_deref()
            .is_some_and(|k| !k.is_empty());

        if configured {
            KeySource::ConfigFile
        } else if settings.summarization_api_key().is_some() {
            KeySource::Environment
        } else {
            KeySource::Missing
        }
    }

    fn describe(&self) -> String {
        match self {
            KeySource::ConfigFile => "summarization.api_key".to_string(),
            KeySource::Environment => format!("{} environment variable", API_KEY_ENV),
            KeySource::Missing => format!("not set (config or {})", API_KEY_ENV),
        }
    }
}

/// Copy of the settings that is safe to print.
fn redacted(settings: &Settings) -> Settings {
    let mut shown = settings.clone();
    if let Some(key) = shown.summarization.api_key.as_mut() {
        if !key.is_empty() {
            *key = "<redacted>".to_string();
        }
    }
    shown
}

/// Run the config command.
///
/// `config_path` is the `--config` override, if one was given.
pub fn run_config(action: &ConfigAction, config_path: Option<&str>, settings: Settings) -> Result<()> {
    let config_path = config_path
        .map(Settings::expand_path)
        .unwrap_or_else(Settings::default_config_path);

    match action {
        ConfigAction::Show => {
            Output::header("Frontline configuration");
            Output::kv(
                "File",
                &if config_path.exists() {
                    config_path.display().to_string()
                } else {
                    format!("{} (not found, using defaults)", config_path.display())
                },
            );
            Output::kv("API key", &KeySource::of(&settings).describe());
            Output::kv("Speaker sample", &describe_speaker(settings.reference_speaker_path()));
            Output::kv("Audio output", &settings.output_dir().display().to_string());
            println!();

            let toml_str = toml::to_string_pretty(&redacted(&settings))
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
            println!("{}", toml_str);
        }

        ConfigAction::Edit => {
            if !config_path.exists() {
                settings.save_to(&config_path)?;
                Output::info(&format!("Created default config at {}", config_path.display()));
            }

            let editor = std::env::var("VISUAL")
                .or_else(|_| std::env::var("EDITOR"))
                .unwrap_or_else(|_| "vi".to_string());

            Output::info(&format!("Opening config in {}...", editor));

            match std::process::Command::new(&editor).arg(&config_path).status() {
                Ok(s) if s.success() => {
                    match Settings::load_from(Some(&config_path)) {
                        Ok(_) => Output::success("Config saved."),
                        Err(e) => Output::warning(&format!("Config saved but does not parse: {}", e)),
                    }
                }
                Ok(_) => {
                    Output::warning("Editor exited with non-zero status.");
                }
                Err(e) => {
                    Output::error(&format!("Failed to open editor: {}", e));
                    Output::info(&format!("Config file is at: {}", config_path.display()));
                }
            }
        }

        ConfigAction::Path => {
            println!("{}", config_path.display());
        }
    }

    Ok(())
}

fn describe_speaker(path: Option<PathBuf>) -> String {
    match path {
        None => "not configured (fallback voice only)".to_string(),
        Some(path) if path.is_file() => path.display().to_string(),
        Some(path) => format!("{} (missing, fallback voice only)", path.display()),
    }
}
