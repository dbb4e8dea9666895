use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use photosync_core::{StatusSnapshot, TransferItem};
use photosync_logging::sync_debug;
use tokio::sync::watch;

use crate::{
    AgentError, AgentSettings, EngineEvent, ReqwestStatusSource, ReqwestSyncClient,
    StatusChannel, StatusSource, SyncClient,
};

enum EngineCommand {
    Submit { items: Vec<TransferItem> },
    ConnectStatus,
    ReconnectStatus,
    Shutdown,
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to start engine runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error(transparent)]
    Agent(#[from] AgentError),
}

/// Runs agent IO on a background thread with its own tokio runtime.
///
/// Commands go in over a channel; results come back as [`EngineEvent`]s so the
/// caller's state machine stays on its own thread.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: AgentSettings) -> Result<Self, EngineError> {
        let sync_client = Arc::new(ReqwestSyncClient::new(settings.clone())?);
        let source = Arc::new(ReqwestStatusSource::new(settings.clone())?);
        Self::with_clients(sync_client, source, &settings)
    }

    pub fn with_clients(
        sync_client: Arc<dyn SyncClient>,
        source: Arc<dyn StatusSource>,
        settings: &AgentSettings,
    ) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Runtime::new()?;
        let channel = StatusChannel::new(source, settings);

        thread::spawn(move || {
            runtime.spawn(forward_status(channel.subscribe(), event_tx.clone()));
            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::Submit { items } => {
                        let sync_client = sync_client.clone();
                        let event_tx = event_tx.clone();
                        runtime.spawn(async move {
                            let outcome = sync_client.submit(&items).await;
                            let _ = event_tx.send(EngineEvent::SubmitCompleted { items, outcome });
                        });
                    }
                    EngineCommand::ConnectStatus => {
                        let channel = channel.clone();
                        runtime.spawn(async move { channel.connect().await });
                    }
                    EngineCommand::ReconnectStatus => {
                        let channel = channel.clone();
                        runtime.spawn(async move {
                            channel.reconnect_push().await;
                        });
                    }
                    EngineCommand::Shutdown => {
                        channel.shutdown();
                        break;
                    }
                }
            }
            sync_debug!("Engine thread stopping");
            runtime.shutdown_timeout(Duration::from_millis(500));
        });

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn submit(&self, items: Vec<TransferItem>) {
        let _ = self.cmd_tx.send(EngineCommand::Submit { items });
    }

    pub fn connect_status(&self) {
        let _ = self.cmd_tx.send(EngineCommand::ConnectStatus);
    }

    pub fn reconnect_status(&self) {
        let _ = self.cmd_tx.send(EngineCommand::ReconnectStatus);
    }

    pub fn shutdown(&self) {
        let _ = self.cmd_tx.send(EngineCommand::Shutdown);
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn forward_status(
    mut snapshots: watch::Receiver<StatusSnapshot>,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    while snapshots.changed().await.is_ok() {
        let snapshot = snapshots.borrow_and_update().clone();
        if event_tx.send(EngineEvent::Status(snapshot)).is_err() {
            break;
        }
    }
}
