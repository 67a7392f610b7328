//! Voice catalogs and preference-based voice resolution

use crate::error::SpeechError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// An installed voice as reported by an engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Voice {
    pub name: String,
    pub language: String,
}

/// Source of installed voices. Engines that can enumerate their voices
/// implement this next to TtsEngine.
#[async_trait]
pub trait VoiceCatalog: Send + Sync {
    async fn list(&self) -> Result<Vec<Voice>, SpeechError>;
}

/// Fixed in-memory catalog, mainly for tests and custom engines
pub struct StaticCatalog {
    voices: Vec<Voice>,
}

impl StaticCatalog {
    pub fn new(voices: Vec<Voice>) -> Self {
        Self { voices }
    }
}

#[async_trait]
impl VoiceCatalog for StaticCatalog {
    async fn list(&self) -> Result<Vec<Voice>, SpeechError> {
        Ok(self.voices.clone())
    }
}

/// Pick the best voice for a language from an installed set.
///
/// Preference substrings are tried first, in order, case-insensitively
/// against voice names. Then an exact language tag match, then a voice
/// whose primary subtag equals the requested one, then the first voice.
pub fn resolve_voice<'a>(
    language: &str,
    preferences: &[String],
    voices: &'a [Voice],
) -> Option<&'a Voice> {
    for preference in preferences {
        let preference = preference.to_lowercase();
        if let Some(voice) = voices
            .iter()
            .find(|v| v.name.to_lowercase().contains(&preference))
        {
            return Some(voice);
        }
    }

    if let Some(voice) = voices.iter().find(|v| v.language == language) {
        return Some(voice);
    }

    let primary = language.split('-').next().unwrap_or(language);
    if let Some(voice) = voices
        .iter()
        .find(|v| v.language.split('-').next().unwrap_or(&v.language) == primary)
    {
        return Some(voice);
    }

    voices.first()
}
