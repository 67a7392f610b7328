//! katha-spk: Narrated playback for marked-up text
//!
//! Provides story narration with:
//! - A playback scheduler that plays compiled segments one at a time
//! - espeak-ng, custom and null TTS engines
//! - Preference-based voice resolution against installed voices
//! - Pause, resume and cancel over the active narration

pub mod catalog;
pub mod config;
pub mod engines;
pub mod error;
pub mod narrator;
pub mod options;
pub mod timer;

pub use catalog::{resolve_voice, StaticCatalog, Voice, VoiceCatalog};
pub use config::{EngineKind, SpeechConfig};
pub use engines::custom::{CustomEngine, SpeakFuture};
pub use engines::espeak::EspeakEngine;
pub use engines::null::NullEngine;
pub use engines::{SpeechHandle, TtsEngine, Utterance};
pub use error::{SpeechError, SpeechResult};
pub use narrator::{Narrator, PlaybackState};
pub use options::SpeakOptions;
pub use timer::{Timer, TokioTimer};
