//! Prompt templates for Frontline.
//!
//! The summarization prompt can be overridden by placing `summarization.toml`
//! in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub summarization: SummarizationPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}

/// Prompt for the war-correspondent report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizationPrompts {
    /// Single user message. `{{text}}` is replaced by the extracted text.
    pub user: String,
}

impl Default for SummarizationPrompts {
    fn default() -> Self {
        Self {
            user: "Summarize this as a war reporter in about 300-400 words: {{text}}. \
                   Just the report is enough. Nothing else."
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let summarization_path = custom_path.join("summarization.toml");
            if summarization_path.exists() {
                let content = std::fs::read_to_string(&summarization_path)?;
                prompts.summarization = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render the summarization prompt around `text`.
    ///
    /// Config variables are substituted first and `{{text}}` last, so the
    /// extracted text is embedded verbatim even when it contains placeholders.
    pub fn render_summarization(&self, text: &str) -> String {
        let vars: std::collections::HashMap<String, String> = self
            .variables
            .iter()
            .filter(|(key, _)| key.as_str() != "text")
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        Self::render(&self.summarization.user, &vars).replace("{{text}}", text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_prompt_asks_for_report_only() {
        let prompts = Prompts::default();
        assert!(prompts.summarization.user.contains("{{text}}"));
        assert!(prompts.summarization.user.contains("300-400 words"));
        assert!(prompts.summarization.user.contains("Nothing else."));
    }

    #[test]
    fn test_render_template() {
        let template = "Hello {{name}}, you have {{count}} messages.";
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "Alice".to_string());
        vars.insert("count".to_string(), "5".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Hello Alice, you have 5 messages.");
    }

    #[test]
    fn test_text_is_substituted_last() {
        let mut custom = HashMap::new();
        custom.insert("text".to_string(), "from config".to_string());
        custom.insert("era".to_string(), "1944".to_string());
        let mut prompts = Prompts::load(None, Some(&custom)).unwrap();
        prompts.summarization.user = "[{{era}}] {{text}}".to_string();

        let rendered = prompts.render_summarization("Memo template uses {{era}} placeholder");
        assert_eq!(rendered, "[1944] Memo template uses {{era}} placeholder");
    }

    #[test]
    fn test_custom_dir_override() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("summarization.toml"),
            "user = \"Brief me: {{text}}\"\n",
        )
        .unwrap();

        let prompts = Prompts::load(dir.path().to_str(), None).unwrap();
        assert_eq!(prompts.summarization.user, "Brief me: {{text}}");
    }
}
