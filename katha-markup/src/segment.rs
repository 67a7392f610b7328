//! Speakable segments produced by the compiler

use crate::prosody::Prosody;
use serde::{Deserialize, Serialize};

/// Break duration when a break tag carries no usable attribute
pub const DEFAULT_BREAK_MS: u64 = 500;

/// Atomic playback unit: a span of text with resolved prosody, or a timed
/// pause. Segments are immutable once produced and consumed in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Segment {
    Text { text: String, prosody: Prosody },
    Break { duration_ms: u64 },
}

impl Segment {
    pub fn text(text: impl Into<String>, prosody: Prosody) -> Self {
        Self::Text {
            text: text.into(),
            prosody,
        }
    }

    pub fn is_break(&self) -> bool {
        matches!(self, Self::Break { .. })
    }
}

/// Look up a named break strength. Unknown strengths resolve to nothing so
/// the caller can fall back to the default duration.
pub fn strength_ms(strength: &str) -> Option<u64> {
    match strength {
        "none" => Some(0),
        "x-weak" => Some(100),
        "weak" => Some(200),
        "medium" => Some(500),
        "strong" => Some(1000),
        "x-strong" => Some(2000),
        _ => None,
    }
}
