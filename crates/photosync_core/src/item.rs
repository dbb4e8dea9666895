use serde::{Deserialize, Serialize};

/// One resource descriptor queued for transfer to the local agent.
///
/// Serializes to the agent's wire shape `{url, name, album, activity}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransferItem {
    url: String,
    name: String,
    album: String,
    activity: String,
}

impl TransferItem {
    pub fn new(
        url: impl Into<String>,
        name: impl Into<String>,
        album: impl Into<String>,
        activity: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            name: name.into(),
            album: album.into(),
            activity: activity.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn album(&self) -> &str {
        &self.album
    }

    pub fn activity(&self) -> &str {
        &self.activity
    }

    pub fn key(&self) -> CaptureKey {
        CaptureKey {
            url: self.url.clone(),
            album: self.album.clone(),
        }
    }
}

/// Deduplication identity: the same URL captured under two albums is two keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CaptureKey {
    url: String,
    album: String,
}

impl CaptureKey {
    pub fn new(url: impl Into<String>, album: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            album: album.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn album(&self) -> &str {
        &self.album
    }
}
