use photosync_core::{SubmitOutcome, TransferItem};
use photosync_logging::{sync_debug, sync_info, sync_warn};
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;

use crate::types::map_reqwest_error;
use crate::{AgentError, AgentSettings, FailureKind};

const SYNC_PATH: &str = "sync";
const ACCEPTED_STATUS: &str = "ok";

#[async_trait::async_trait]
pub trait SyncClient: Send + Sync {
    /// Sends one batch. Never retries; the caller decides what to do next.
    async fn submit(&self, items: &[TransferItem]) -> SubmitOutcome;
}

#[derive(Debug, Clone)]
pub struct ReqwestSyncClient {
    settings: AgentSettings,
    client: reqwest::Client,
}

impl ReqwestSyncClient {
    pub fn new(settings: AgentSettings) -> Result<Self, AgentError> {
        let client = settings.build_client()?;
        Ok(Self { settings, client })
    }

    async fn post_batch(&self, items: &[TransferItem]) -> Result<SubmitOutcome, AgentError> {
        let url = self.settings.endpoint(SYNC_PATH)?;
        let body = serde_json::to_vec(items)
            .map_err(|err| AgentError::new(FailureKind::MalformedBody, err.to_string()))?;

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .timeout(self.settings.submit_timeout)
            .body(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        sync_debug!("sync reply http={} bytes={}", status, bytes.len());

        let reply: Value = serde_json::from_slice(&bytes).map_err(|err| {
            AgentError::new(FailureKind::MalformedBody, format!("http {status}: {err}"))
        })?;
        interpret_reply(&reply).ok_or_else(|| {
            AgentError::new(
                FailureKind::MalformedBody,
                format!("http {status}: expected a JSON object"),
            )
        })
    }
}

#[async_trait::async_trait]
impl SyncClient for ReqwestSyncClient {
    async fn submit(&self, items: &[TransferItem]) -> SubmitOutcome {
        match self.post_batch(items).await {
            Ok(outcome) => {
                sync_info!("Submitted {} items: {}", items.len(), outcome);
                outcome
            }
            Err(err) => {
                sync_warn!("Submitting {} items failed: {}", items.len(), err);
                SubmitOutcome::TransportError {
                    message: err.to_string(),
                }
            }
        }
    }
}

/// `{"status": "ok"}` is the only acceptance; any other object is a rejection.
fn interpret_reply(reply: &Value) -> Option<SubmitOutcome> {
    let object = reply.as_object()?;
    let status = object.get("status");
    if status.and_then(Value::as_str) == Some(ACCEPTED_STATUS) {
        return Some(SubmitOutcome::Accepted {
            total: object.get("total").and_then(Value::as_u64),
        });
    }

    let status = match status {
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    };
    Some(SubmitOutcome::Rejected {
        status,
        message: object
            .get("message")
            .and_then(Value::as_str)
            .map(ToOwned::to_owned),
    })
}
