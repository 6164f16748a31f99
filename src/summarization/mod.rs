//! Report generation from extracted text.
//!
//! The extracted text is embedded in a single editorial prompt and sent to a
//! completion service once. The reply is used as-is: the prompt already asks
//! for the report body only.

mod chat;

pub use chat::ChatCompletionService;

use crate::config::Prompts;
use crate::error::{FrontlineError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Trait for text completion services.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Send one prompt and return the model's reply.
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// The condensed report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryResult {
    pub report_text: String,
}

impl SummaryResult {
    pub fn char_count(&self) -> usize {
        self.report_text.chars().count()
    }
}

/// Wraps extracted text in the report prompt and calls the completion service.
pub struct Summarizer {
    service: Arc<dyn CompletionService>,
    prompts: Prompts,
}

impl Summarizer {
    pub fn new(service: Arc<dyn CompletionService>) -> Self {
        Self {
            service,
            prompts: Prompts::default(),
        }
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// The exact prompt sent for the given text.
    pub fn build_prompt(&self, text: &str) -> String {
        self.prompts.render_summarization(text)
    }

    /// Produce the report for one extraction.
    #[instrument(skip(self, text), fields(chars = text.len()))]
    pub async fn summarize(&self, text: &str) -> Result<SummaryResult> {
        if text.trim().is_empty() {
            return Err(FrontlineError::Summarization(
                "Nothing to summarize: extracted text is empty".to_string(),
            ));
        }

        let prompt = self.build_prompt(text);
        debug!("Prompt is {} characters", prompt.len());

        let report_text = self
            .service
            .complete(&prompt)
            .await
            .map_err(|e| FrontlineError::Summarization(e.to_string()))?;

        if report_text.trim().is_empty() {
            return Err(FrontlineError::Summarization(
                "Completion service returned an empty report".to_string(),
            ));
        }

        let summary = SummaryResult { report_text };
        info!("Report generated ({} characters)", summary.char_count());
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingCompletion;

    #[tokio::test]
    async fn test_prompt_embeds_text() {
        let service = Arc::new(RecordingCompletion::replying("The guns fell silent at dawn."));
        let summarizer = Summarizer::new(service.clone());

        let summary = summarizer.summarize("Hello war.\n").await.unwrap();
        assert_eq!(summary.report_text, "The guns fell silent at dawn.");

        let prompts = service.prompts();
        assert_eq!(prompts.len(), 1);
        assert_eq!(
            prompts[0],
            "Summarize this as a war reporter in about 300-400 words: Hello war.\n. \
             Just the report is enough. Nothing else."
        );
    }

    #[tokio::test]
    async fn test_reply_is_not_post_processed() {
        let reply = "Here is your report:\n\nDispatch from the front.\n\nHope this helps!";
        let summarizer = Summarizer::new(Arc::new(RecordingCompletion::replying(reply)));

        let summary = summarizer.summarize("text").await.unwrap();
        assert_eq!(summary.report_text, reply);
    }

    #[tokio::test]
    async fn test_whitespace_input_never_calls_service() {
        let service = Arc::new(RecordingCompletion::replying("unused"));
        let summarizer = Summarizer::new(service.clone());

        let result = summarizer.summarize(" \n\t ").await;
        assert!(matches!(result, Err(FrontlineError::Summarization(_))));
        assert!(service.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_service_failure_called_once() {
        let service = Arc::new(RecordingCompletion::failing());
        let summarizer = Summarizer::new(service.clone());

        let result = summarizer.summarize("orders from HQ").await;
        assert!(matches!(result, Err(FrontlineError::Summarization(_))));
        assert_eq!(service.prompts().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_reply_is_error() {
        let summarizer = Summarizer::new(Arc::new(RecordingCompletion::replying("  ")));
        tokio_test::assert_err!(summarizer.summarize("orders from HQ").await);
    }

    #[test]
    fn test_custom_prompt_template() {
        let mut prompts = Prompts::default();
        prompts.summarization.user = "[{{outlet}}] {{text}}".to_string();
        prompts.variables.insert("outlet".to_string(), "Field Gazette".to_string());

        let summarizer =
            Summarizer::new(Arc::new(RecordingCompletion::replying("x"))).with_prompts(prompts);
        assert_eq!(summarizer.build_prompt("body"), "[Field Gazette] body");
    }

    #[tokio::test]
    async fn test_placeholders_in_text_are_sent_verbatim() {
        let mut prompts = Prompts::default();
        prompts.variables.insert("era".to_string(), "1944".to_string());

        let service = Arc::new(RecordingCompletion::replying("Report."));
        let summarizer = Summarizer::new(service.clone()).with_prompts(prompts);

        let text = "Memo template uses {{era}} placeholder";
        for _ in 0..20 {
            summarizer.summarize(text).await.unwrap();
        }

        let sent = service.prompts();
        assert_eq!(sent.len(), 20);
        assert!(sent.iter().all(|p| p.contains(text)));
        assert!(sent.iter().all(|p| !p.contains("1944")));
    }
}
