use std::collections::HashMap;

use serde_json::Value;

/// Album name used when a listing's album key has not been seen yet.
pub const DEFAULT_ALBUM_NAME: &str = "default album";
/// Activity name used before any detail response has been observed.
pub const DEFAULT_ACTIVITY_NAME: &str = "unnamed";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumEntry {
    pub id: Option<String>,
    pub name: Option<String>,
}

impl AlbumEntry {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: Some(name.into()),
        }
    }

    /// Reads `{id, name}` from a listing element; ids may be strings or numbers.
    pub fn from_json(value: &Value) -> Self {
        Self {
            id: value.get("id").and_then(json_identifier),
            name: value
                .get("name")
                .and_then(Value::as_str)
                .filter(|name| !name.is_empty())
                .map(ToOwned::to_owned),
        }
    }
}

/// Session-wide album id to album name mapping. Last write wins, never pruned.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AlbumDirectory {
    names: HashMap<String, String>,
}

impl AlbumDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upserts every entry that carries an id; returns how many were recorded.
    pub fn record_albums<I>(&mut self, entries: I) -> usize
    where
        I: IntoIterator<Item = AlbumEntry>,
    {
        let mut recorded = 0;
        for entry in entries {
            let Some(id) = entry.id else {
                continue;
            };
            let name = entry
                .name
                .unwrap_or_else(|| DEFAULT_ALBUM_NAME.to_string());
            self.names.insert(id, name);
            recorded += 1;
        }
        recorded
    }

    pub fn lookup(&self, id: &str) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    /// Name for `id`, or [`DEFAULT_ALBUM_NAME`] when unknown.
    pub fn resolve(&self, id: &str) -> &str {
        self.lookup(id).unwrap_or(DEFAULT_ALBUM_NAME)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// The current activity's display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityContext {
    name: String,
}

impl Default for ActivityContext {
    fn default() -> Self {
        Self {
            name: DEFAULT_ACTIVITY_NAME.to_string(),
        }
    }
}

impl ActivityContext {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }
}

pub(crate) fn json_identifier(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}
