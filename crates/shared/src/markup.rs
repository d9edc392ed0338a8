//! Parser for the bullet text returned by the completion service.
//!
//! Bullets are separated by `;` and may mark bold text as `**bold**`. The
//! parser turns that into [`Bullet`]s made of typed [`Span`]s, leaving the
//! document writer free of any markup handling.

use serde::{Deserialize, Serialize};

pub const SEGMENT_DELIMITER: char = ';';
pub const BOLD_MARKER: &str = "**";
pub const MIN_BULLETS: usize = 5;
pub const PLACEHOLDER_BULLET: &str = "Additional point placeholder.";

/// A run of text with uniform styling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub text: String,
    pub bold: bool,
}

impl Span {
    pub fn regular(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bullet {
    pub spans: Vec<Span>,
}

impl Bullet {
    /// The bullet text without markup
    pub fn plain_text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

pub fn split_segments(raw: &str) -> Vec<String> {
    raw.split(SEGMENT_DELIMITER).map(str::to_string).collect()
}

/// Append placeholder segments until there are at least `min`
pub fn pad_segments(mut segments: Vec<String>, min: usize) -> Vec<String> {
    if segments.len() < min {
        let missing = min - segments.len();
        segments.extend(std::iter::repeat(PLACEHOLDER_BULLET.to_string()).take(missing));
    }
    segments
}

/// Split one segment into regular and bold spans, in order.
///
/// Pairs of `**` are matched left to right, shortest first. A marker with no
/// partner stays in the text as-is. Empty spans are dropped.
pub fn parse_spans(segment: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut rest = segment;

    while let Some(open) = rest.find(BOLD_MARKER) {
        let after_open = &rest[open + BOLD_MARKER.len()..];
        let Some(close) = after_open.find(BOLD_MARKER) else {
            break;
        };
        push_span(&mut spans, &rest[..open], false);
        push_span(&mut spans, &after_open[..close], true);
        rest = &after_open[close + BOLD_MARKER.len()..];
    }
    push_span(&mut spans, rest, false);

    spans
}

fn push_span(spans: &mut Vec<Span>, text: &str, bold: bool) {
    if !text.is_empty() {
        spans.push(Span {
            text: text.to_string(),
            bold,
        });
    }
}

/// Parse already-split segments, trimming each and dropping blank ones
pub fn parse_segments<S: AsRef<str>>(segments: &[S]) -> Vec<Bullet> {
    segments
        .iter()
        .map(|segment| segment.as_ref().trim())
        .filter(|segment| !segment.is_empty())
        .map(|segment| Bullet {
            spans: parse_spans(segment),
        })
        .collect()
}

pub fn parse_bullets(raw: &str) -> Vec<Bullet> {
    parse_segments(&split_segments(raw))
}

/// Split, drop blank segments, pad to [`MIN_BULLETS`], then parse.
///
/// Blank segments are removed before padding so the result always holds at
/// least [`MIN_BULLETS`] bullets.
pub fn bullets_with_minimum(raw: &str) -> Vec<Bullet> {
    let segments: Vec<String> = split_segments(raw)
        .into_iter()
        .filter(|segment| !segment.trim().is_empty())
        .collect();
    parse_segments(&pad_segments(segments, MIN_BULLETS))
}
