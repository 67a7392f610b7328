//! Engine used when no synthesis capability exists

use crate::catalog::{Voice, VoiceCatalog};
use crate::engines::{SpeechHandle, TtsEngine, Utterance};
use crate::error::SpeechError;
use async_trait::async_trait;

/// Engine that reports itself unavailable and refuses to speak.
/// Lets callers construct a narrator on hosts without any TTS backend.
pub struct NullEngine;

impl NullEngine {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NullEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TtsEngine for NullEngine {
    fn submit(&self, _utterance: &Utterance) -> Result<SpeechHandle, SpeechError> {
        Err(SpeechError::Engine("no speech synthesis capability".to_string()))
    }

    async fn pause(&self) -> Result<(), SpeechError> {
        Ok(())
    }

    async fn resume(&self) -> Result<(), SpeechError> {
        Ok(())
    }

    async fn cancel(&self) -> Result<(), SpeechError> {
        Ok(())
    }

    fn is_available(&self) -> bool {
        false
    }

    fn name(&self) -> &str {
        "null"
    }
}

#[async_trait]
impl VoiceCatalog for NullEngine {
    async fn list(&self) -> Result<Vec<Voice>, SpeechError> {
        Ok(Vec::new())
    }
}
