//! katha-markup: speech markup compiler for katha
//!
//! Parses a small SSML flavored tag language embedded in story text into an
//! ordered list of speakable segments:
//! - <break time="500ms"/> or <break strength="medium"/>
//! - <emphasis level="strong">text</emphasis>
//! - <prosody rate="slow" pitch="high" volume="loud">text</prosody>
//! - <lang xml:lang="hi-IN">text</lang>
//!
//! The scanner is deliberately flat: tags do not nest, and any closing tag
//! resets prosody to the request default.

pub mod parser;
pub mod prosody;
pub mod segment;
pub mod text;

pub use parser::MarkupParser;
pub use prosody::Prosody;
pub use segment::{Segment, DEFAULT_BREAK_MS};
pub use text::clean_text;
