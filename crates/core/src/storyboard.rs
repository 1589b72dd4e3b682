//! Storyboard extraction from model-generated text.
//!
//! Model output is unreliable: sometimes a clean JSON array, sometimes a
//! fenced code block, sometimes a numbered prose list. Parsing runs in two
//! tiers — a strict structured parse, then a line-oriented fallback — and
//! always yields a deterministic, validated shape or a hard parse error.
//! An empty storyboard is never silently accepted.

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

use crate::error::CoreError;

/// Duration assigned to a shot when the model does not provide one.
pub const DEFAULT_SHOT_DURATION_SECS: f64 = 5.0;

/// One shot extracted from model output, not yet persisted.
///
/// Guaranteed by [`parse_storyboard`]: sequence numbers are unique and
/// >= 1, content is non-empty, duration is positive.
#[derive(Debug, Clone, PartialEq)]
pub struct StoryboardDraft {
    pub sequence_number: i32,
    pub content: String,
    pub duration: f64,
}

/// Parse model output into an ordered list of storyboard drafts.
///
/// 1. Strip surrounding markdown code fences.
/// 2. Try a strict parse: a JSON array of objects. Non-object elements
///    are dropped; a missing or invalid `sequence_number` defaults to the
///    1-based position; `content` is coerced to a trimmed string (empty
///    content drops the element); `duration` is coerced to a positive
///    float, defaulting to [`DEFAULT_SHOT_DURATION_SECS`].
/// 3. If the text does not decode as a JSON array, fall back to
///    line-oriented parsing of numbered lines.
/// 4. Zero surviving entries is a [`CoreError::Parse`].
pub fn parse_storyboard(text: &str) -> Result<Vec<StoryboardDraft>, CoreError> {
    let stripped = strip_code_fences(text);

    let drafts = match serde_json::from_str::<serde_json::Value>(stripped.trim()) {
        Ok(serde_json::Value::Array(items)) => parse_structured(&items),
        _ => parse_lines(&stripped),
    };

    if drafts.is_empty() {
        return Err(CoreError::Parse(
            "model output contained no usable storyboard entries".to_string(),
        ));
    }

    Ok(normalize(drafts))
}

// ---------------------------------------------------------------------------
// Tier 1: structured parse
// ---------------------------------------------------------------------------

fn parse_structured(items: &[serde_json::Value]) -> Vec<StoryboardDraft> {
    let mut drafts = Vec::with_capacity(items.len());

    for (idx, item) in items.iter().enumerate() {
        let Some(map) = item.as_object() else {
            continue;
        };

        let content = match map.get("content") {
            Some(serde_json::Value::String(s)) => s.trim().to_string(),
            Some(serde_json::Value::Number(n)) => n.to_string(),
            _ => String::new(),
        };
        if content.is_empty() {
            continue;
        }

        let sequence_number = map
            .get("sequence_number")
            .and_then(|v| v.as_i64())
            .filter(|&n| n >= 1 && n <= i32::MAX as i64)
            .map(|n| n as i32)
            .unwrap_or(idx as i32 + 1);

        drafts.push(StoryboardDraft {
            sequence_number,
            content,
            duration: coerce_duration(map.get("duration")),
        });
    }

    drafts
}

/// Coerce a JSON value into a positive, finite duration in seconds.
///
/// Accepts numbers and numeric strings; anything else (including zero and
/// negatives) falls back to the default.
fn coerce_duration(value: Option<&serde_json::Value>) -> f64 {
    let parsed = match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(d) if d.is_finite() && d > 0.0 => d,
        _ => DEFAULT_SHOT_DURATION_SECS,
    }
}

// ---------------------------------------------------------------------------
// Tier 2: line-oriented fallback
// ---------------------------------------------------------------------------

/// Matches a line opening a new shot: an integer, a separator, then text.
fn shot_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+)[.、:)\-]\s*(.+)$").expect("valid regex"))
}

fn parse_lines(text: &str) -> Vec<StoryboardDraft> {
    let mut drafts: Vec<StoryboardDraft> = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(caps) = shot_line_re().captures(line) {
            // Capture 1 is all digits; values too large for i32 fall back
            // to positional renumbering in `normalize`.
            let sequence_number = caps[1].parse::<i32>().unwrap_or(0);
            drafts.push(StoryboardDraft {
                sequence_number,
                content: caps[2].trim().to_string(),
                duration: DEFAULT_SHOT_DURATION_SECS,
            });
        } else if let Some(open) = drafts.last_mut() {
            // Continuation line: space-join onto the open entry.
            open.content.push(' ');
            open.content.push_str(line);
        }
    }

    drafts
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Order entries by sequence number and guarantee uniqueness.
///
/// If the model emitted duplicate or non-positive sequence numbers, the
/// whole list is renumbered 1..n preserving order — downstream consumers
/// rely on sequence numbers being unique within a script.
fn normalize(mut drafts: Vec<StoryboardDraft>) -> Vec<StoryboardDraft> {
    drafts.sort_by_key(|d| d.sequence_number);

    let mut seen = HashSet::with_capacity(drafts.len());
    let degenerate = drafts
        .iter()
        .any(|d| d.sequence_number < 1 || !seen.insert(d.sequence_number));

    if degenerate {
        for (idx, draft) in drafts.iter_mut().enumerate() {
            draft.sequence_number = idx as i32 + 1;
        }
    }

    drafts
}

// ---------------------------------------------------------------------------
// Fence stripping
// ---------------------------------------------------------------------------

/// Remove a surrounding markdown code fence, with or without a language tag.
fn strip_code_fences(text: &str) -> String {
    static OPEN: OnceLock<Regex> = OnceLock::new();
    static CLOSE: OnceLock<Regex> = OnceLock::new();
    let open = OPEN.get_or_init(|| Regex::new(r"^\s*```[\w-]*\s*").expect("valid regex"));
    let close = CLOSE.get_or_init(|| Regex::new(r"\s*```\s*$").expect("valid regex"));

    let without_open = open.replace(text, "");
    close.replace(&without_open, "").into_owned()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
