//! Single-pass markup scanner

use crate::prosody::{pitch_value, rate_value, volume_value, Prosody};
use crate::segment::{strength_ms, Segment, DEFAULT_BREAK_MS};
use crate::text::clean_text;
use regex::Regex;

/// Compiles markup text into an ordered segment list.
///
/// The scanner walks the input once, left to right. Literal text between
/// tags accumulates in a pending buffer under the current prosody; break
/// tags and prosody changes flush the buffer, and any closing tag resets
/// prosody to the supplied default. There is no nesting stack.
pub struct MarkupParser {
    tag_re: Regex,
    attr_re: Regex,
    strip_re: Regex,
}

impl MarkupParser {
    pub fn new() -> Self {
        Self {
            tag_re: Regex::new(r"<(/?)([\w-]+)([^>]*)>").expect("tag pattern is valid"),
            attr_re: Regex::new(r#"([\w:-]+)\s*=\s*["']([^"']*)["']"#).expect("attribute pattern is valid"),
            strip_re: Regex::new(r"<[^>]+>").expect("strip pattern is valid"),
        }
    }

    /// Compile markup into segments. Input without any tag delimiter takes
    /// the plain path and produces at most one segment.
    pub fn parse(&self, text: &str, default: &Prosody) -> Vec<Segment> {
        if !text.contains('<') {
            return self.parse_plain(text, default);
        }
        self.parse_markup(text, default)
    }

    /// Plain path used when markup handling is disabled: drop tag markers,
    /// clean the text, and wrap whatever remains in a single segment.
    pub fn parse_plain(&self, text: &str, default: &Prosody) -> Vec<Segment> {
        let cleaned = clean_text(&self.strip_tags(text));
        if cleaned.is_empty() {
            return Vec::new();
        }
        vec![Segment::text(cleaned, default.clone())]
    }

    /// Remove tag markers, keeping the literal text between them
    pub fn strip_tags(&self, text: &str) -> String {
        self.strip_re.replace_all(text, "").into_owned()
    }

    fn parse_markup(&self, text: &str, default: &Prosody) -> Vec<Segment> {
        let mut segments = Vec::new();
        let mut prosody = default.clone();
        let mut pending = String::new();
        let mut last = 0;

        for caps in self.tag_re.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            pending.push_str(&text[last..whole.start()]);
            last = whole.end();

            let closing = caps.get(1).map(|m| !m.as_str().is_empty()).unwrap_or(false);
            let name = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            let attrs = caps.get(3).map(|m| m.as_str()).unwrap_or("");

            if closing {
                flush(&mut segments, &mut pending, &prosody);
                prosody = default.clone();
                continue;
            }

            match name {
                "break" => {
                    flush(&mut segments, &mut pending, &prosody);
                    segments.push(Segment::Break {
                        duration_ms: self.break_duration(attrs),
                    });
                }
                "emphasis" => {
                    flush(&mut segments, &mut pending, &prosody);
                    let level = self.attr(attrs, "level");
                    prosody.apply_emphasis(level.as_deref().unwrap_or("moderate"));
                }
                "prosody" => {
                    flush(&mut segments, &mut pending, &prosody);
                    if let Some(raw) = self.attr(attrs, "rate") {
                        prosody.rate = rate_value(&raw);
                    }
                    if let Some(raw) = self.attr(attrs, "pitch") {
                        prosody.pitch = pitch_value(&raw);
                    }
                    if let Some(raw) = self.attr(attrs, "volume") {
                        prosody.volume = volume_value(&raw);
                    }
                }
                "lang" => {
                    flush(&mut segments, &mut pending, &prosody);
                    if let Some(language) = self.attr(attrs, "xml:lang") {
                        if !language.is_empty() {
                            prosody.language = Some(language);
                        }
                    }
                }
                // say-as is recognized but passes its text through untouched
                "say-as" => {}
                // unknown tags are dropped, their markers never reach the output
                _ => {}
            }
        }

        pending.push_str(&text[last..]);
        flush(&mut segments, &mut pending, &prosody);
        segments
    }

    /// Break duration resolution: an explicit integer time attribute wins,
    /// then the named strength table, then the 500 ms default
    fn break_duration(&self, attrs: &str) -> u64 {
        if let Some(raw) = self.attr(attrs, "time") {
            if let Some(ms) = parse_break_time(&raw) {
                return ms;
            }
        }
        if let Some(strength) = self.attr(attrs, "strength") {
            if let Some(ms) = strength_ms(&strength) {
                return ms;
            }
        }
        DEFAULT_BREAK_MS
    }

    fn attr(&self, attrs: &str, name: &str) -> Option<String> {
        for caps in self.attr_re.captures_iter(attrs) {
            if let (Some(key), Some(value)) = (caps.get(1), caps.get(2)) {
                if key.as_str() == name {
                    return Some(value.as_str().to_string());
                }
            }
        }
        None
    }
}

impl Default for MarkupParser {
    fn default() -> Self {
        Self::new()
    }
}

fn flush(segments: &mut Vec<Segment>, pending: &mut String, prosody: &Prosody) {
    let cleaned = clean_text(pending);
    pending.clear();
    if !cleaned.is_empty() {
        segments.push(Segment::text(cleaned, prosody.clone()));
    }
}

/// Parse a break time attribute: a whole number with an "ms" or "s" unit.
/// Anything else falls through to the strength table.
fn parse_break_time(raw: &str) -> Option<u64> {
    if let Some(value) = raw.strip_suffix("ms") {
        return value.parse().ok();
    }
    if let Some(value) = raw.strip_suffix('s') {
        return value.parse::<u64>().ok().and_then(|seconds| seconds.checked_mul(1000));
    }
    None
}
