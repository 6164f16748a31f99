//! In-memory collaborators for unit tests.

use crate::error::{FrontlineError, Result};
use crate::extraction::{DocxParser, OcrEngine, PdfParser};
use crate::narration::{SpeechSynthesizer, VoiceCloningSynthesizer};
use crate::summarization::CompletionService;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub struct StaticOcr {
    text: String,
    languages: Mutex<Vec<String>>,
}

impl StaticOcr {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            languages: Mutex::new(Vec::new()),
        }
    }

    pub fn languages(&self) -> Vec<String> {
        self.languages.lock().unwrap().clone()
    }
}

#[async_trait]
impl OcrEngine for StaticOcr {
    async fn recognize(&self, _image: &[u8], language: &str) -> Result<String> {
        self.languages.lock().unwrap().push(language.to_string());
        Ok(self.text.clone())
    }
}

pub struct StaticPdf {
    pages: Vec<String>,
}

impl StaticPdf {
    pub fn new(pages: &[&str]) -> Self {
        Self {
            pages: pages.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl PdfParser for StaticPdf {
    fn pages(&self, _bytes: &[u8]) -> Result<Vec<String>> {
        Ok(self.pages.clone())
    }
}

pub struct FailingPdf;

impl PdfParser for FailingPdf {
    fn pages(&self, _bytes: &[u8]) -> Result<Vec<String>> {
        Err(FrontlineError::Extraction("Could not read PDF: bad xref table".to_string()))
    }
}

pub struct StaticDocx {
    paragraphs: Vec<String>,
}

impl StaticDocx {
    pub fn new(paragraphs: &[&str]) -> Self {
        Self {
            paragraphs: paragraphs.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl DocxParser for StaticDocx {
    fn paragraphs(&self, _bytes: &[u8]) -> Result<Vec<String>> {
        Ok(self.paragraphs.clone())
    }
}

/// Completion service that records every prompt it receives.
pub struct RecordingCompletion {
    reply: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl RecordingCompletion {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionService for RecordingCompletion {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply
            .clone()
            .ok_or_else(|| FrontlineError::CompletionApi("request timed out".to_string()))
    }
}

/// Voice-cloning synthesizer that records the texts it was asked to speak.
pub struct RecordingCloner {
    succeed: bool,
    calls: Mutex<Vec<(String, usize, String)>>,
}

impl RecordingCloner {
    pub fn succeeding() -> Self {
        Self {
            succeed: true,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            succeed: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// (text, speaker sample length, language) per call.
    pub fn calls(&self) -> Vec<(String, usize, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl VoiceCloningSynthesizer for RecordingCloner {
    async fn synthesize(&self, text: &str, speaker_sample: &[u8], language: &str) -> Result<Vec<u8>> {
        self.calls
            .lock()
            .unwrap()
            .push((text.to_string(), speaker_sample.len(), language.to_string()));
        if self.succeed {
            Ok(b"RIFF-primary".to_vec())
        } else {
            Err(FrontlineError::Narration("CUDA out of memory".to_string()))
        }
    }
}

pub struct RecordingSpeaker {
    succeed: bool,
    calls: Mutex<Vec<String>>,
}

impl RecordingSpeaker {
    pub fn succeeding() -> Self {
        Self {
            succeed: true,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            succeed: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechSynthesizer for RecordingSpeaker {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        self.calls.lock().unwrap().push(text.to_string());
        if self.succeed {
            Ok(b"RIFF-fallback".to_vec())
        } else {
            Err(FrontlineError::ToolNotFound("espeak-ng".to_string()))
        }
    }
}

/// Tracks how many calls overlap.
#[derive(Default)]
pub struct InFlightGauge {
    current: AtomicUsize,
    max: AtomicUsize,
}

impl InFlightGauge {
    fn enter(self: &Arc<Self>) -> InFlightGuard {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.max.fetch_max(now, Ordering::SeqCst);
        InFlightGuard(self.clone())
    }

    /// Highest number of simultaneous calls seen.
    pub fn max(&self) -> usize {
        self.max.load(Ordering::SeqCst)
    }
}

struct InFlightGuard(Arc<InFlightGauge>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.current.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Voice-cloning synthesizer that takes a while and reports overlap.
pub struct SlowCloner {
    gauge: Arc<InFlightGauge>,
    delay: Duration,
}

impl SlowCloner {
    pub fn new(gauge: Arc<InFlightGauge>, delay: Duration) -> Self {
        Self { gauge, delay }
    }
}

#[async_trait]
impl VoiceCloningSynthesizer for SlowCloner {
    async fn synthesize(&self, _text: &str, _speaker_sample: &[u8], _language: &str) -> Result<Vec<u8>> {
        let _guard = self.gauge.enter();
        tokio::time::sleep(self.delay).await;
        Ok(b"RIFF-primary".to_vec())
    }
}

/// Completion service that takes a while and reports overlap.
pub struct SlowCompletion {
    gauge: Arc<InFlightGauge>,
    delay: Duration,
}

impl SlowCompletion {
    pub fn new(gauge: Arc<InFlightGauge>, delay: Duration) -> Self {
        Self { gauge, delay }
    }
}

#[async_trait]
impl CompletionService for SlowCompletion {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        let _guard = self.gauge.enter();
        tokio::time::sleep(self.delay).await;
        Ok("Report.".to_string())
    }
}
