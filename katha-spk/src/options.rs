//! Per-call speak options and completion callbacks

use crate::error::SpeechError;
use std::fmt;

/// Fired once when a narration finishes or is superseded without error
pub type EndCallback = Box<dyn FnOnce() + Send + 'static>;

/// Fired once when a narration aborts with an error
pub type ErrorCallback = Box<dyn FnOnce(SpeechError) + Send + 'static>;

/// Options for a single speak call.
///
/// The rate, pitch and volume here apply only when the input is treated
/// as plain text; markup input derives prosody from its tags.
pub struct SpeakOptions {
    /// Language tag requested for voice resolution
    pub language: String,

    /// Voice name substrings tried in order
    pub voice_preferences: Vec<String>,

    /// Speech rate multiplier (0.1-10.0)
    pub rate: f32,

    /// Pitch multiplier (0.1-10.0)
    pub pitch: f32,

    /// Volume (0.0-1.0)
    pub volume: f32,

    /// Interpret markup tags in the input
    pub markup: bool,

    pub(crate) on_end: Option<EndCallback>,
    pub(crate) on_error: Option<ErrorCallback>,
}

impl Default for SpeakOptions {
    fn default() -> Self {
        Self {
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
            on_end: None,
            on_error: None,
        }
    }
}

impl SpeakOptions {
    /// Preset tuned for long-form story narration
    pub fn storytelling() -> Self {
        Self {
            rate: 0.9,
            pitch: 1.1,
            volume: 1.0,
            ..Self::default()
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_voice_preferences(mut self, preferences: Vec<String>) -> Self {
        self.voice_preferences = preferences;
        self
    }

    pub fn with_rate(mut self, rate: f32) -> Self {
        self.rate = rate;
        self
    }

    pub fn with_pitch(mut self, pitch: f32) -> Self {
        self.pitch = pitch;
        self
    }

    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = volume;
        self
    }

    pub fn with_markup(mut self, markup: bool) -> Self {
        self.markup = markup;
        self
    }

    /// Register a completion callback, fired at most once
    pub fn on_end(mut self, callback: impl FnOnce() + Send + 'static) -> Self {
        self.on_end = Some(Box::new(callback));
        self
    }

    /// Register an error callback, fired at most once
    pub fn on_error(mut self, callback: impl FnOnce(SpeechError) + Send + 'static) -> Self {
        self.on_error = Some(Box::new(callback));
        self
    }

    /// Validate options
    pub fn validate(&self) -> Result<(), String> {
        if self.language.is_empty() {
            return Err("Language code cannot be empty".to_string());
        }

        if self.language.len() > 32 {
            return Err("Language code too long (max 32 chars)".to_string());
        }

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
}

impl fmt::Debug for SpeakOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpeakOptions")
            .field("language", &self.language)
            .field("voice_preferences", &self.voice_preferences)
            .field("rate", &self.rate)
            .field("pitch", &self.pitch)
            .field("volume", &self.volume)
            .field("markup", &self.markup)
            .field("on_end", &self.on_end.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}
