//! Frontline - documents in, war-correspondent dispatches out
//!
//! A CLI tool and small HTTP service that pulls the text out of an uploaded
//! document, rewrites it as a war-reporter style report and narrates the
//! report in a cloned voice.
//!
//! # Overview
//!
//! Frontline lets you:
//! - Extract text from images (OCR), PDFs and DOCX files
//! - Summarize the text with an OpenAI-compatible chat model (Groq by default)
//! - Narrate the report with a voice-cloning TTS server, falling back to a
//!   local single-speaker voice
//!
//! # Architecture
//!
//! - `artifact` - Uploaded documents and format classification
//! - `config` - Configuration management
//! - `extraction` - Text extraction strategies and dispatcher
//! - `summarization` - Report generation
//! - `narration` - Speech synthesis with a two-tier fallback
//! - `orchestrator` - Pipeline coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use frontline::artifact::UploadedArtifact;
//! use frontline::config::Settings;
//! use frontline::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     let artifact = UploadedArtifact::from_path("dispatch.pdf".as_ref()).await?;
//!     let outcome = orchestrator.run(&artifact, "eng").await;
//!     if let Some(summary) = &outcome.summary {
//!         println!("{}", summary.report_text);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod artifact;
pub mod cli;
pub mod config;
pub mod error;
pub mod extraction;
pub mod narration;
pub mod openai;
pub mod orchestrator;
pub mod summarization;

#[cfg(test)]
mod testing;

pub use error::{FrontlineError, Result};
