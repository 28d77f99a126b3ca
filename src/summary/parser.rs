//! Model output parsing
//!
//! A tolerant line matcher over free text. Anything that does not match the
//! format the prompt asked for becomes a degraded result, never an error.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

use crate::llm::ModelResponse;
use crate::prompt::OutputFormat;
use crate::summary::{ActionItem, SummaryResult};

static SUMMARY_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|\s)[#*]*\s*summary[*]*\s*:[*]*").expect("static regex compiles")
});

static ACTION_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|\s)[#*]*\s*action[\s_-]?items[*]*\s*:[*]*")
        .expect("static regex compiles")
});

static BULLET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[-•+–]|\*(?:\s|$)|\d{1,3}[.)])\s*").expect("static regex compiles")
});

static CHECKBOX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[[ xX]?\]\s*").expect("static regex compiles"));

static PAREN_GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[(\[](?P<inner>[^)\]]*)[)\]]").expect("static regex compiles"));

static MARKER_PART: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?P<key>owner|assignee|due|deadline)\b\s*:?\s*(?P<value>.*?)\s*$")
        .expect("static regex compiles")
});

static TAIL_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?P<key>owner|assignee|due|deadline):\s*(?P<value>[^,;]*)")
        .expect("static regex compiles")
});

static LEADING_OWNER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:\*\*)?(?P<name>\p{Lu}[\p{L}'.\-]*(?:\s+\p{Lu}[\p{L}'.\-]*){0,2})(?:\*\*)?\s?:(?:\*\*)?\s+(?P<rest>.+)$",
    )
    .expect("static regex compiles")
});

static MENTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\s)@(?P<name>\p{L}[\p{L}\p{N}._\-]*)").expect("static regex compiles")
});

static JSON_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").expect("static regex compiles")
});

/// Labels that start a line like a name but never denote an owner.
const NOT_OWNERS: &[&str] = &[
    "action", "decision", "follow-up", "followup", "item", "next step", "next steps", "note",
    "task", "todo",
];

const NONE_VALUES: &[&str] = &[
    "none", "n/a", "na", "-", "nil", "null", "unknown", "tbd", "nobody", "unassigned",
    "nothing", "no action items", "none identified",
];

/// Parses model replies in the format a prompt template requested.
#[derive(Debug, Clone, Copy)]
pub struct OutputParser {
    format: OutputFormat,
}

impl OutputParser {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn parse(&self, response: &ModelResponse) -> SummaryResult {
        let parsed = match self.format {
            OutputFormat::Delimited => parse_delimited(&response.text),
            OutputFormat::Json => parse_json(&response.text),
        };

        match parsed {
            Some(result) => {
                tracing::debug!(
                    "Parsed {:?} response: {} action items",
                    self.format,
                    result.action_items.len()
                );
                result
            }
            None => {
                tracing::warn!(
                    "Model response did not match the {:?} format, keeping raw text",
                    self.format
                );
                SummaryResult::degraded(response.text.clone())
            }
        }
    }
}

fn parse_delimited(text: &str) -> Option<SummaryResult> {
    let summary_end = SUMMARY_MARKER.find(text)?.end();
    let after_summary = &text[summary_end..];
    let action = ACTION_MARKER.find(after_summary)?;

    let summary = after_summary[..action.start()].trim();
    if summary.is_empty() {
        return None;
    }

    let items = after_summary[action.end()..]
        .lines()
        .filter_map(parse_item)
        .collect();

    Some(SummaryResult::structured(summary, items))
}

enum Marker {
    Owner,
    Due,
}

fn marker_key(key: &str) -> Marker {
    match key.to_lowercase().as_str() {
        "owner" | "assignee" => Marker::Owner,
        _ => Marker::Due,
    }
}

/// `owner: Bob, due: Friday` inside brackets; `None` unless every part is a marker.
fn marker_fields(inner: &str) -> Option<Vec<(Marker, &str)>> {
    inner
        .split([',', ';'])
        .map(|part| {
            let caps = MARKER_PART.captures(part)?;
            let value = caps.name("value")?.as_str();
            if value.to_lowercase().starts_with("to ") {
                return None;
            }
            Some((marker_key(caps.name("key")?.as_str()), value))
        })
        .collect()
}

/// One action-item line. Owner and due hint come only from explicit markers.
fn parse_item(line: &str) -> Option<ActionItem> {
    let line = BULLET.replace(line.trim(), "");
    let line = CHECKBOX.replace(&line, "");
    let line = line.trim();
    if line.is_empty() || is_none_value(line) {
        return None;
    }

    let mut owner = None;
    let mut due_hint = None;

    let mut rest = String::with_capacity(line.len());
    let mut last = 0;
    for caps in PAREN_GROUP.captures_iter(line) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.name("inner")) else {
            continue;
        };
        let Some(fields) = marker_fields(inner.as_str()) else {
            continue;
        };
        rest.push_str(&line[last..whole.start()]);
        last = whole.end();
        for (marker, value) in fields {
            match marker {
                Marker::Owner => owner = owner.or_else(|| clean_value(value)),
                Marker::Due => due_hint = due_hint.or_else(|| clean_value(value)),
            }
        }
    }
    rest.push_str(&line[last..]);

    for caps in TAIL_MARKER.captures_iter(&rest) {
        let (Some(key), Some(value)) = (caps.name("key"), caps.name("value")) else {
            continue;
        };
        match marker_key(key.as_str()) {
            Marker::Owner => owner = owner.or_else(|| clean_value(value.as_str())),
            Marker::Due => due_hint = due_hint.or_else(|| clean_value(value.as_str())),
        }
    }
    let mut rest = TAIL_MARKER.replace_all(&rest, "").trim().to_string();

    if owner.is_none() {
        if let Some(caps) = LEADING_OWNER.captures(&rest) {
            let name = caps.name("name").map_or("", |m| m.as_str());
            if !NOT_OWNERS.contains(&name.to_lowercase().as_str()) {
                owner = clean_value(name);
                rest = caps.name("rest").map_or("", |m| m.as_str()).to_string();
            }
        }
    }

    if owner.is_none() {
        owner = MENTION
            .captures(&rest)
            .and_then(|caps| caps.name("name"))
            .and_then(|m| clean_value(m.as_str()));
    }

    let description = rest
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | ':' | '-' | '–' | '—'))
        .to_string();

    if description.is_empty() {
        return None;
    }

    Some(ActionItem {
        description,
        owner,
        due_hint,
    })
}

fn is_none_value(value: &str) -> bool {
    let value = value.trim().trim_end_matches('.').to_lowercase();
    NONE_VALUES.contains(&value.as_str())
}

fn clean_value(value: &str) -> Option<String> {
    let value = value.trim_matches(|c: char| {
        c.is_whitespace() || matches!(c, '*' | '"' | '\'' | ',' | ';' | '.' | '`')
    });
    if value.is_empty() || is_none_value(value) {
        None
    } else {
        Some(value.to_string())
    }
}

fn parse_json(text: &str) -> Option<SummaryResult> {
    if let Some(result) = JSON_FENCE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| serde_json::from_str::<Value>(m.as_str()).ok())
        .and_then(|value| summary_from_json(&value))
    {
        return Some(result);
    }

    // Balanced objects anywhere in the text; the last one carrying a summary wins
    let candidates: Vec<Value> = text
        .match_indices('{')
        .filter_map(|(start, _)| {
            serde_json::Deserializer::from_str(&text[start..])
                .into_iter::<Value>()
                .next()
                .and_then(|value| value.ok())
        })
        .collect();

    candidates.iter().rev().find_map(summary_from_json)
}

fn summary_from_json(value: &Value) -> Option<SummaryResult> {
    let object = value.as_object()?;
    let summary = object.get("summary")?.as_str()?.trim();
    if summary.is_empty() {
        return None;
    }

    let items = ["items", "actionItems", "action_items"]
        .iter()
        .find_map(|key| object.get(*key).and_then(Value::as_array))
        .map(|items| items.iter().filter_map(item_from_json).collect())
        .unwrap_or_default();

    Some(SummaryResult::structured(summary, items))
}

fn item_from_json(value: &Value) -> Option<ActionItem> {
    if let Some(text) = value.as_str() {
        return parse_item(text);
    }

    let object = value.as_object()?;
    let description = json_str(object, &["action", "description", "task"])
        .and_then(clean_value)?;

    Some(ActionItem {
        description,
        owner: json_str(object, &["owner", "assignee"]).and_then(clean_value),
        due_hint: json_str(object, &["due", "dueHint", "due_date"]).and_then(clean_value),
    })
}

fn json_str<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .find_map(|key| object.get(*key).and_then(Value::as_str))
}
