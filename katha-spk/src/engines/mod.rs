//! TTS engine implementations

pub mod custom;
pub mod espeak;
pub mod null;

use crate::catalog::Voice;
use crate::error::SpeechError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;

/// A single unit of speech handed to an engine: cleaned text plus the
/// prosody and voice it should be rendered with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Utterance {
    pub text: String,
    pub voice: Option<Voice>,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

/// An utterance in flight. Resolves when the utterance has finished
/// playing, was cancelled, or failed.
pub struct SpeechHandle {
    inner: Pin<Box<dyn Future<Output = Result<(), SpeechError>> + Send>>,
}

impl SpeechHandle {
    /// Wrap a completion future
    pub fn new(future: impl Future<Output = Result<(), SpeechError>> + Send + 'static) -> Self {
        Self {
            inner: Box::pin(future),
        }
    }

    /// Wait for the utterance to finish
    pub async fn wait(self) -> Result<(), SpeechError> {
        self.inner.await
    }
}

/// Trait for TTS engines
#[async_trait]
pub trait TtsEngine: Send + Sync {
    /// Start rendering one utterance. Submission never suspends, so a
    /// caller can hold a lock across it; the returned handle resolves
    /// when the utterance has finished playing, not when it was
    /// accepted. While the engine is paused the handle stays
    /// unresolved; cancel resolves it.
    fn submit(&self, utterance: &Utterance) -> Result<SpeechHandle, SpeechError>;

    /// Render one utterance to completion
    async fn speak(&self, utterance: &Utterance) -> Result<(), SpeechError> {
        self.submit(utterance)?.wait().await
    }

    /// Suspend playback, holding the in-flight utterance mid-stream
    async fn pause(&self) -> Result<(), SpeechError>;

    /// Continue a previously paused utterance
    async fn resume(&self) -> Result<(), SpeechError>;

    /// Discard the in-flight utterance. Its handle resolves; the caller
    /// is expected to ignore the result.
    async fn cancel(&self) -> Result<(), SpeechError>;

    /// Check if engine is available
    fn is_available(&self) -> bool;

    /// Get engine name
    fn name(&self) -> &str;
}
