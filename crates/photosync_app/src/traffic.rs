//! Capture files as a source of intercepted responses.
//!
//! Two formats are read: HAR 1.2 archives exported from browser dev tools, and
//! JSON Lines files holding one `{"target": ..., "body": ...}` object per line.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use base64::Engine;
use photosync_core::{parse_body, InterceptedResponse};
use photosync_logging::sync_debug;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrafficError {
    #[error("failed to read {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse HAR {path:?}: {source}")]
    Har {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrafficFormat {
    Har,
    JsonLines,
}

impl TrafficFormat {
    /// `.har` files are archives; anything else is sniffed from the content.
    fn detect(path: &Path, content: &str) -> Self {
        let is_har_extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("har"));
        if is_har_extension || looks_like_har(content) {
            TrafficFormat::Har
        } else {
            TrafficFormat::JsonLines
        }
    }
}

#[derive(Debug, Deserialize)]
struct HarLog {
    log: HarRoot,
}

#[derive(Debug, Deserialize)]
struct HarRoot {
    // Entries are decoded one by one so a single odd entry is skipped alone.
    #[serde(default)]
    entries: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct HarEntry {
    request: HarRequest,
    response: HarResponse,
}

#[derive(Debug, Deserialize)]
struct HarRequest {
    url: String,
}

#[derive(Debug, Deserialize)]
struct HarResponse {
    #[serde(default)]
    content: HarContent,
}

#[derive(Debug, Default, Deserialize)]
struct HarContent {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CapturedLine {
    target: String,
    #[serde(default)]
    body: Value,
}

pub fn read_traffic(path: &Path) -> Result<Vec<InterceptedResponse>, TrafficError> {
    let content = fs::read_to_string(path).map_err(|source| TrafficError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    match TrafficFormat::detect(path, &content) {
        TrafficFormat::Har => parse_har(&content).map_err(|source| TrafficError::Har {
            path: path.to_path_buf(),
            source,
        }),
        TrafficFormat::JsonLines => Ok(parse_json_lines(&content)),
    }
}

fn looks_like_har(content: &str) -> bool {
    serde_json::from_str::<Value>(content)
        .ok()
        .and_then(|value| value.pointer("/log/entries").map(Value::is_array))
        .unwrap_or(false)
}

pub fn parse_har(content: &str) -> Result<Vec<InterceptedResponse>, serde_json::Error> {
    let har: HarLog = serde_json::from_str(content)?;
    let responses = har
        .log
        .entries
        .into_iter()
        .enumerate()
        .filter_map(|(idx, raw)| match serde_json::from_value::<HarEntry>(raw) {
            Ok(entry) => Some(entry),
            Err(err) => {
                sync_debug!("Skipping HAR entry {}: {}", idx, err);
                None
            }
        })
        .filter_map(|entry| {
            let text = entry_text(&entry.response.content)?;
            Some(InterceptedResponse::from_text(entry.request.url, &text))
        })
        .collect();
    Ok(responses)
}

fn entry_text(content: &HarContent) -> Option<String> {
    let text = content.text.as_deref()?;
    if content.encoding.as_deref() != Some("base64") {
        return Some(text.to_string());
    }
    match base64::engine::general_purpose::STANDARD.decode(text) {
        Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        Err(err) => {
            sync_debug!("Skipping HAR entry with bad base64 content: {}", err);
            None
        }
    }
}

/// One response per readable line; bodies may be inline JSON or JSON text.
pub fn parse_json_lines(content: &str) -> Vec<InterceptedResponse> {
    content
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
        .filter_map(|(line_no, line)| match serde_json::from_str::<CapturedLine>(line) {
            Ok(captured) => Some(captured),
            Err(err) => {
                sync_debug!("Skipping capture line {}: {}", line_no, err);
                None
            }
        })
        .map(|captured| match captured.body {
            Value::String(text) => InterceptedResponse::from_text(captured.target, &text),
            Value::Null => InterceptedResponse::new(captured.target, None),
            body => InterceptedResponse::new(captured.target, Some(body)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;

    fn har_with(entries: Value) -> String {
        json!({ "log": { "version": "1.2", "entries": entries } }).to_string()
    }

    #[test]
    fn har_entries_become_responses() {
        let body = json!({ "result": { "name": "Expo" } }).to_string();
        let encoded = base64::engine::general_purpose::STANDARD.encode(&body);
        let har = har_with(json!([
            { "request": { "url": "https://api/live/detail?id=1" },
              "response": { "content": { "text": body } } },
            { "request": { "url": "https://api/live/detail?id=2" },
              "response": { "content": { "text": encoded, "encoding": "base64" } } },
            { "request": { "url": "https://cdn/a.jpg" },
              "response": { "content": { "mimeType": "image/jpeg" } } },
        ]));

        let responses = parse_har(&har).unwrap();

        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0].target, "https://api/live/detail?id=1");
        assert_eq!(responses[0].body, responses[1].body);
        assert_eq!(
            responses[1].body,
            Some(json!({ "result": { "name": "Expo" } }))
        );
    }

    #[test]
    fn unreadable_har_entries_are_skipped_alone() {
        let har = har_with(json!([
            { "request": { "url": "/pics?key=1" },
              "response": { "content": { "text": "{\"a\": 1}" } } },
            { "request": { "method": "GET" },
              "response": { "content": { "text": "{}" } } },
            { "request": { "url": "/pics?key=2" } },
            "not an entry",
            { "request": { "url": "/pics?key=3" },
              "response": { "content": { "text": "{\"b\": 2}" } } },
        ]));

        let responses = parse_har(&har).unwrap();

        assert_eq!(
            responses,
            vec![
                InterceptedResponse::new("/pics?key=1", Some(json!({ "a": 1 }))),
                InterceptedResponse::new("/pics?key=3", Some(json!({ "b": 2 }))),
            ]
        );
    }

    #[test]
    fn json_lines_accept_inline_and_text_bodies() {
        let content = concat!(
            "{\"target\": \"/pics?key=1\", \"body\": {\"result\": {\"pics_array\": []}}}\n",
            "\n",
            "not json at all\n",
            "{\"target\": \"/album/list\", \"body\": \"{\\\"result\\\": []}\"}\n",
            "{\"target\": \"/page\", \"body\": \"<html>\"}\n",
        );

        let responses = parse_json_lines(content);

        assert_eq!(responses.len(), 3);
        assert_eq!(
            responses[0].body,
            Some(json!({ "result": { "pics_array": [] } }))
        );
        assert_eq!(responses[1].body, Some(json!({ "result": [] })));
        assert_eq!(responses[2].body, None);
    }

    #[test]
    fn format_is_sniffed_without_extension() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("capture.txt");
        let har = har_with(json!([
            { "request": { "url": "/pics?key=1" },
              "response": { "content": { "text": "{}" } } },
        ]));
        fs::write(&path, har).unwrap();

        let responses = read_traffic(&path).unwrap();
        assert_eq!(responses, vec![InterceptedResponse::new("/pics?key=1", Some(json!({})))]);
    }

    #[test]
    fn broken_har_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("capture.har");
        fs::write(&path, "{\"log\": 3}").unwrap();

        assert!(matches!(read_traffic(&path), Err(TrafficError::Har { .. })));
    }
}
