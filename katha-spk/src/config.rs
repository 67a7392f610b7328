//! Configuration for the narration facade

use crate::options::SpeakOptions;
use serde::{Deserialize, Serialize};

/// Narration configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Engine backing the narrator
    pub engine: EngineKind,

    /// Default language tag (BCP 47 style, e.g. "en-IN")
    pub language: String,

    /// Voice name substrings tried in order when resolving a voice
    pub voice_preferences: Vec<String>,

    /// Speech rate multiplier (0.1-10.0, default 0.9)
    pub rate: f32,

    /// Pitch multiplier (0.1-10.0, default 1.1)
    pub pitch: f32,

    /// Volume (0.0-1.0, default 0.9)
    pub volume: f32,

    /// Interpret markup tags in input text
    pub markup: bool,
}

/// TTS engine selection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum EngineKind {
    /// espeak-ng driven as a child process
    Espeak,
    /// No-op engine for environments without synthesis capability
    Null,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            engine: EngineKind::Espeak,
            language: "en-IN".to_string(),
            voice_preferences: vec![
                "lekha".to_string(),
                "heera".to_string(),
                "veena".to_string(),
                "rishi".to_string(),
            ],
            rate: 0.9,
            pitch: 1.1,
            volume: 0.9,
            markup: true,
        }
    }
}

impl SpeechConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.language.is_empty() {
            return Err("Language code cannot be empty".to_string());
        }

        if self.language.len() > 32 {
            return Err("Language code too long (max 32 chars)".to_string());
        }

        // Basic format check: should be like "en-IN" or "en"
        if !self.language.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err("Language code contains invalid characters (only alphanumeric and '-' allowed)".to_string());
        }

        if !(0.1..=10.0).contains(&self.rate) {
            return Err("Rate must be between 0.1 and 10.0".to_string());
        }

        if !(0.1..=10.0).contains(&self.pitch) {
            return Err("Pitch must be between 0.1 and 10.0".to_string());
        }

        if !(0.0..=1.0).contains(&self.volume) {
            return Err("Volume must be between 0.0 and 1.0".to_string());
        }

        Ok(())
    }

    /// Speak options seeded from this configuration
    pub fn speak_options(&self) -> SpeakOptions {
        SpeakOptions::default()
            .with_language(self.language.clone())
            .with_voice_preferences(self.voice_preferences.clone())
            .with_rate(self.rate)
            .with_pitch(self.pitch)
            .with_volume(self.volume)
            .with_markup(self.markup)
    }
}
