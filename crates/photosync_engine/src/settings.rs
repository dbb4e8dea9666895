use std::time::Duration;

use reqwest::Url;

use crate::{AgentError, FailureKind};

/// Where the local agent lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Per-request bound for `/progress`, both for the probe and for polling.
    pub status_timeout: Duration,
    pub submit_timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            connect_timeout: Duration::from_secs(2),
            status_timeout: Duration::from_secs(3),
            submit_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_secs(1),
        }
    }
}

impl AgentSettings {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// `{base}/{path}`, tolerating a trailing slash on the base.
    pub fn endpoint(&self, path: &str) -> Result<Url, AgentError> {
        let base = self.base_url.trim_end_matches('/');
        let raw = format!("{base}/{}", path.trim_start_matches('/'));
        Url::parse(&raw).map_err(|err| AgentError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    pub(crate) fn build_client(&self) -> Result<reqwest::Client, AgentError> {
        // No overall timeout here: the event stream stays open indefinitely.
        reqwest::Client::builder()
            .connect_timeout(self.connect_timeout)
            .build()
            .map_err(|err| AgentError::new(FailureKind::Network, err.to_string()))
    }
}
