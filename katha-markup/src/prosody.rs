//! Prosody state carried by text segments

use serde::{Deserialize, Serialize};

/// How a span of text should be rendered: rate and pitch as multipliers
/// around 1.0, volume in 0.0-1.0, and an optional language override
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prosody {
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
    pub language: Option<String>,
}

impl Default for Prosody {
    fn default() -> Self {
        Self {
            rate: 1.0,
            pitch: 1.0,
            volume: 0.9,
            language: None,
        }
    }
}

impl Prosody {
    /// Apply an emphasis level in place. "strong" and "x-strong" push the
    /// voice slower, higher and louder; "reduced" does the opposite. Any
    /// other level (including "moderate") keeps the ambient prosody.
    pub fn apply_emphasis(&mut self, level: &str) {
        match level {
            "strong" | "x-strong" => {
                self.rate = 0.9;
                self.pitch = 1.1;
                self.volume = 1.0;
            }
            "reduced" => {
                self.rate = 1.1;
                self.pitch = 0.9;
                self.volume = 0.7;
            }
            _ => {}
        }
    }
}

/// Resolve a rate attribute value: named keyword, numeric literal, or the
/// fixed default when the value is neither
pub fn rate_value(raw: &str) -> f32 {
    match raw {
        "x-slow" => 0.5,
        "slow" => 0.7,
        "medium" => 1.0,
        "fast" => 1.3,
        "x-fast" => 1.5,
        _ => raw.parse().unwrap_or(1.0),
    }
}

/// Resolve a pitch attribute value
pub fn pitch_value(raw: &str) -> f32 {
    match raw {
        "x-low" => 0.7,
        "low" => 0.85,
        "medium" => 1.0,
        "high" => 1.15,
        "x-high" => 1.3,
        _ => raw.parse().unwrap_or(1.0),
    }
}

/// Resolve a volume attribute value
pub fn volume_value(raw: &str) -> f32 {
    match raw {
        "silent" => 0.0,
        "x-soft" => 0.3,
        "soft" => 0.5,
        "medium" => 0.7,
        "loud" => 0.9,
        "x-loud" => 1.0,
        _ => raw.parse().unwrap_or(0.9),
    }
}
