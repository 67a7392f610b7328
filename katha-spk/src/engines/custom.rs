//! Custom TTS engine implementation
//! Allows users to provide their own TTS engine implementations

use crate::engines::{SpeechHandle, TtsEngine, Utterance};
use crate::error::SpeechError;
use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Future returned by a custom engine closure. A speak future should
/// resolve when the utterance has finished playing; a control future
/// when the operation has taken effect.
pub type SpeakFuture = Pin<Box<dyn Future<Output = Result<(), SpeechError>> + Send>>;

type ControlFn = Arc<dyn Fn() -> SpeakFuture + Send + Sync>;

/// Custom TTS engine wrapper
/// Allows users to provide their own TTS engine implementation
///
/// Playback control is opt-in: pause, resume and cancel forward to the
/// hooks registered with [`with_pause`](Self::with_pause),
/// [`with_resume`](Self::with_resume) and
/// [`with_cancel`](Self::with_cancel). Without a hook the call succeeds
/// but the in-flight utterance keeps playing.
pub struct CustomEngine {
    name: String,
    speak_fn: Arc<dyn Fn(Utterance) -> SpeakFuture + Send + Sync>,
    available_fn: Arc<dyn Fn() -> bool + Send + Sync>,
    pause_fn: Option<ControlFn>,
    resume_fn: Option<ControlFn>,
    cancel_fn: Option<ControlFn>,
}

impl CustomEngine {
    /// Create a custom engine that is always available
    pub fn new<F>(name: impl Into<String>, speak_fn: F) -> Self
    where
        F: Fn(Utterance) -> SpeakFuture + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            speak_fn: Arc::new(speak_fn),
            available_fn: Arc::new(|| true),
            pause_fn: None,
            resume_fn: None,
            cancel_fn: None,
        }
    }

    /// Override the availability check
    pub fn with_availability<F>(mut self, available_fn: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        self.available_fn = Arc::new(available_fn);
        self
    }

    /// Forward pause to a hook that holds the in-flight utterance
    pub fn with_pause<F>(mut self, pause_fn: F) -> Self
    where
        F: Fn() -> SpeakFuture + Send + Sync + 'static,
    {
        self.pause_fn = Some(Arc::new(pause_fn));
        self
    }

    /// Forward resume to a hook that releases a paused utterance
    pub fn with_resume<F>(mut self, resume_fn: F) -> Self
    where
        F: Fn() -> SpeakFuture + Send + Sync + 'static,
    {
        self.resume_fn = Some(Arc::new(resume_fn));
        self
    }

    /// Forward cancel to a hook that discards the in-flight utterance
    pub fn with_cancel<F>(mut self, cancel_fn: F) -> Self
    where
        F: Fn() -> SpeakFuture + Send + Sync + 'static,
    {
        self.cancel_fn = Some(Arc::new(cancel_fn));
        self
    }
}

#[async_trait]
impl TtsEngine for CustomEngine {
    fn submit(&self, utterance: &Utterance) -> Result<SpeechHandle, SpeechError> {
        if utterance.text.is_empty() {
            return Err(SpeechError::Synthesis("Utterance text cannot be empty".to_string()));
        }

        Ok(SpeechHandle::new((self.speak_fn)(utterance.clone())))
    }

    async fn pause(&self) -> Result<(), SpeechError> {
        match &self.pause_fn {
            Some(pause_fn) => pause_fn().await,
            None => Ok(()),
        }
    }

    async fn resume(&self) -> Result<(), SpeechError> {
        match &self.resume_fn {
            Some(resume_fn) => resume_fn().await,
            None => Ok(()),
        }
    }

    async fn cancel(&self) -> Result<(), SpeechError> {
        match &self.cancel_fn {
            Some(cancel_fn) => cancel_fn().await,
            None => Ok(()),
        }
    }

    fn is_available(&self) -> bool {
        (self.available_fn)()
    }

    fn name(&self) -> &str {
        &self.name
    }
}
