use serde_json::Value;

use crate::AlbumEntry;

/// Target substrings that identify the response kinds whose meaning depends on
/// the endpoint. Media listings are recognised by body shape alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifierRules {
    pub detail_paths: Vec<String>,
    pub album_list_paths: Vec<String>,
}

impl Default for ClassifierRules {
    fn default() -> Self {
        Self {
            detail_paths: vec!["/live/detail".to_string()],
            album_list_paths: vec!["/album/list".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Classification<'a> {
    /// Detail response naming the current activity.
    ActivityDetail { name: &'a str },
    /// Album list response carrying `{id, name}` entries.
    AlbumListing { entries: Vec<AlbumEntry> },
    /// Picture-bearing response; records are raw JSON objects.
    MediaListing { records: &'a [Value] },
    Unclassified,
}

impl ClassifierRules {
    pub fn classify<'a>(&self, target: &str, body: &'a Value) -> Classification<'a> {
        if let Some(records) = media_records(body) {
            return Classification::MediaListing { records };
        }

        if matches_any(target, &self.detail_paths) {
            if let Some(name) = body
                .pointer("/result/name")
                .and_then(Value::as_str)
                .filter(|name| !name.is_empty())
            {
                return Classification::ActivityDetail { name };
            }
        }

        if matches_any(target, &self.album_list_paths) {
            if let Some(list) = album_list(body) {
                let entries = list
                    .iter()
                    .filter(|entry| entry.is_object())
                    .map(AlbumEntry::from_json)
                    .collect();
                return Classification::AlbumListing { entries };
            }
        }

        Classification::Unclassified
    }
}

/// Parses an intercepted body; anything that is not JSON yields `None`.
pub fn parse_body(text: &str) -> Option<Value> {
    serde_json::from_str(text).ok()
}

fn matches_any(target: &str, patterns: &[String]) -> bool {
    patterns
        .iter()
        .any(|pattern| !pattern.is_empty() && target.contains(pattern.as_str()))
}

fn media_records(body: &Value) -> Option<&[Value]> {
    body.pointer("/result/pics_array")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
}

// Known nesting shapes, most specific first.
fn album_list(body: &Value) -> Option<&Vec<Value>> {
    body.pointer("/data/list")
        .and_then(Value::as_array)
        .or_else(|| body.get("result").and_then(Value::as_array))
        .or_else(|| body.pointer("/result/list").and_then(Value::as_array))
}

/// One observed response: where the request went and its body, if it parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct InterceptedResponse {
    pub target: String,
    pub body: Option<Value>,
}

impl InterceptedResponse {
    pub fn new(target: impl Into<String>, body: Option<Value>) -> Self {
        Self {
            target: target.into(),
            body,
        }
    }

    pub fn from_text(target: impl Into<String>, text: &str) -> Self {
        Self::new(target, parse_body(text))
    }
}
