use futures_util::stream::{self, BoxStream, StreamExt};
use photosync_core::ProgressState;
use photosync_logging::sync_debug;
use reqwest::header::{ACCEPT, CACHE_CONTROL, CONTENT_TYPE};

use crate::sse::SseDecoder;
use crate::types::map_reqwest_error;
use crate::{AgentError, AgentSettings, FailureKind};

const PROGRESS_PATH: &str = "progress";
const EVENTS_PATH: &str = "events";
const EVENT_STREAM: &str = "text/event-stream";

/// Progress messages from an open push subscription. The stream ends when the
/// agent closes the connection.
pub type ProgressStream = BoxStream<'static, Result<ProgressState, AgentError>>;

#[async_trait::async_trait]
pub trait StatusSource: Send + Sync {
    /// One pull of the current progress.
    async fn fetch_progress(&self) -> Result<ProgressState, AgentError>;
    /// Opens a push subscription; `Ok` means the handshake succeeded.
    async fn subscribe(&self) -> Result<ProgressStream, AgentError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestStatusSource {
    settings: AgentSettings,
    client: reqwest::Client,
}

impl ReqwestStatusSource {
    pub fn new(settings: AgentSettings) -> Result<Self, AgentError> {
        let client = settings.build_client()?;
        Ok(Self { settings, client })
    }
}

#[async_trait::async_trait]
impl StatusSource for ReqwestStatusSource {
    async fn fetch_progress(&self) -> Result<ProgressState, AgentError> {
        let url = self.settings.endpoint(PROGRESS_PATH)?;
        let response = self
            .client
            .get(url)
            .timeout(self.settings.status_timeout)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(AgentError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        parse_progress(&bytes)
    }

    async fn subscribe(&self) -> Result<ProgressStream, AgentError> {
        let url = self.settings.endpoint(EVENTS_PATH)?;
        let response = self
            .client
            .get(url)
            .header(ACCEPT, EVENT_STREAM)
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(AgentError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let essence = content_type.split(';').next().unwrap_or_default().trim();
        if !essence.eq_ignore_ascii_case(EVENT_STREAM) {
            return Err(AgentError::new(
                FailureKind::UnsupportedContentType { content_type },
                "push subscription refused",
            ));
        }

        let mut decoder = SseDecoder::new();
        let messages = response.bytes_stream().flat_map(move |chunk| {
            let batch: Vec<Result<ProgressState, AgentError>> = match chunk {
                Ok(bytes) => decoder
                    .feed(&bytes)
                    .into_iter()
                    .filter_map(|data| match parse_progress(data.as_bytes()) {
                        Ok(progress) => Some(Ok(progress)),
                        Err(err) => {
                            // Unreadable messages are skipped, the stream stays up.
                            sync_debug!("Ignoring push message: {}", err);
                            None
                        }
                    })
                    .collect(),
                Err(err) => vec![Err(map_reqwest_error(err))],
            };
            stream::iter(batch)
        });

        Ok(messages.boxed())
    }
}

fn parse_progress(bytes: &[u8]) -> Result<ProgressState, AgentError> {
    serde_json::from_slice(bytes)
        .map_err(|err| AgentError::new(FailureKind::MalformedBody, err.to_string()))
}
