//! Transcript cleaning
//!
//! Every rewrite below removes characters or leaves the line untouched, so
//! repeating the line pass until it stops changing terminates in a fixpoint.

use regex::Regex;
use std::sync::LazyLock;

use crate::transcript::{NormalizedTranscript, RawTranscript};

/// Longest run of words accepted as a speaker name
const MAX_SPEAKER_WORDS: usize = 4;

const TS: &str = r"(?:\d{1,2}:)?\d{1,2}:\d{2}(?:[.,]\d{1,3})?";

static CUE_TIMING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"^{TS}\s*-->")).expect("static regex compiles"));

static TIMESTAMP_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"^[\[(]?{TS}[\])]?$")).expect("static regex compiles"));

static LEADING_TIMESTAMP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"^{TS}\s+(.+)$")).expect("static regex compiles"));

static BRACKETED_TIMESTAMP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"[\[(]{TS}[\])]")).expect("static regex compiles"));

static BOILERPLATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:webvtt\b|kind:|language:|transcript(?:ion)?\s+(?:was\s+)?(?:auto-?)?generated\s+by\b|this\s+transcript\s+(?:was|is)\b|auto-?generated\s+transcript\b|recording\s+(?:started|stopped|ended|in\s+progress)\b|this\s+(?:meeting|call)\s+is\s+being\s+(?:recorded|transcribed)\b|(?:meeting|transcription)\s+(?:started|ended)\b)",
    )
    .expect("static regex compiles")
});

static VOICE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^<v(?:\.[^\s>]*)?\s+(?P<name>[^>]+?)\s*>\s*").expect("static regex compiles")
});

static CUE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"</?(?:c|i|b|u|v|lang|ruby|rt)(?:[.\s][^>]*)?>|<{TS}>"
    ))
    .expect("static regex compiles")
});

static NOISE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\[\s*[a-z][a-z '\-]{0,30}\]|\(\s*(?:filler|inaudible|crosstalk|laughter|laughs|laughing|applause|music|silence|noise|background noise|coughs?|pause|unintelligible|indistinct)\s*\)",
    )
    .expect("static regex compiles")
});

static FILLER_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:u+h*m+|u+h+|e+r+m+|h+m+|m+h+m+)\b,?").expect("static regex compiles")
});

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("static regex compiles"));

static SPEAKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:\*\*)?(?P<name>\p{L}[\p{L}\p{M}'.\- ]{0,38}?)\s?(?:\*\*)?:(?:\*\*)?(?:\s+|$)(?P<text>.*)$",
    )
    .expect("static regex compiles")
});

/// Clean a raw transcript. Never fails; unrecognised content is kept as-is.
pub fn normalize(raw: &RawTranscript) -> NormalizedTranscript {
    let text = normalize_text(&raw.text);

    tracing::debug!(
        "Normalized {}: {} -> {} chars",
        raw.source,
        raw.text.chars().count(),
        text.chars().count()
    );

    NormalizedTranscript {
        source: raw.source.clone(),
        text,
    }
}

/// Clean transcript text to its canonical form.
pub fn normalize_text(text: &str) -> String {
    let mut current = clean_text(text);
    // A pass that changes anything removes at least one byte.
    for _ in 0..=current.len() {
        let next = clean_text(&current);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

fn clean_text(text: &str) -> String {
    text.lines()
        .filter_map(clean_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn clean_line(line: &str) -> Option<String> {
    let line = trim_line(line);
    if is_boilerplate(line) {
        return None;
    }

    let line = VOICE_TAG.replace(line, "${name}: ");
    let line = CUE_TAG.replace_all(&line, "");
    let line = BRACKETED_TIMESTAMP.replace_all(&line, " ");
    let line = NOISE_MARKER.replace_all(&line, " ");
    let line = FILLER_WORD.replace_all(&line, " ");
    let line = WHITESPACE.replace_all(&line, " ");
    let line = strip_leading_timestamp(trim_line(&line));

    if is_boilerplate(line) {
        return None;
    }

    match speaker_label(line) {
        Some((_, "")) => None,
        Some((name, text)) => Some(format!("{name}: {text}")),
        None => Some(line.to_string()),
    }
}

fn trim_line(line: &str) -> &str {
    line.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
}

fn is_boilerplate(line: &str) -> bool {
    line.is_empty()
        || line.bytes().all(|b| b.is_ascii_digit())
        || line == "NOTE"
        || line.starts_with("NOTE ")
        || CUE_TIMING.is_match(line)
        || TIMESTAMP_ONLY.is_match(line)
        || BOILERPLATE.is_match(line)
}

/// `00:12 Alice: hi` -> `Alice: hi`; a bare time that starts a sentence is kept.
fn strip_leading_timestamp(line: &str) -> &str {
    match LEADING_TIMESTAMP.captures(line).and_then(|caps| caps.get(1)) {
        Some(rest) if speaker_label(rest.as_str()).is_some() => rest.as_str(),
        _ => line,
    }
}

/// Split a line into speaker name and spoken text.
pub(crate) fn speaker_label(line: &str) -> Option<(&str, &str)> {
    let caps = SPEAKER.captures(line)?;
    let name = caps.name("name")?.as_str().trim();
    if name.is_empty() || name.split_whitespace().count() > MAX_SPEAKER_WORDS {
        return None;
    }
    let text = caps.name("text").map_or("", |m| m.as_str().trim());
    Some((name, text))
}
