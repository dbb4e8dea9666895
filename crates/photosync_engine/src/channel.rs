use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use futures_util::StreamExt;
use photosync_core::{ChannelMode, ProgressState, StatusSnapshot};
use photosync_logging::{sync_debug, sync_info, sync_warn};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::{AgentError, AgentSettings, FailureKind, ProgressStream, StatusSource};

/// Keeps a live [`StatusSnapshot`] of the agent's progress.
///
/// A push subscription is preferred; when it cannot be opened or drops, the
/// channel falls back to pulling `/progress` at a fixed interval. Polling never
/// promotes itself back to push, only [`StatusChannel::connect`] and
/// [`StatusChannel::reconnect_push`] do. Exactly one background task (push
/// reader or poller) is alive at any time.
///
/// Must be used from within a tokio runtime.
#[derive(Clone)]
pub struct StatusChannel {
    inner: Arc<ChannelInner>,
}

struct ChannelInner {
    source: Arc<dyn StatusSource>,
    poll_interval: Duration,
    request_timeout: Duration,
    snapshot_tx: watch::Sender<StatusSnapshot>,
    // The active task's token. Replaced and cancelled only while locked, so a
    // task holding an uncancelled token under the lock is still current.
    active: Mutex<Option<CancellationToken>>,
}

impl StatusChannel {
    pub fn new(source: Arc<dyn StatusSource>, settings: &AgentSettings) -> Self {
        let (snapshot_tx, _) = watch::channel(StatusSnapshot::default());
        Self {
            inner: Arc::new(ChannelInner {
                source,
                poll_interval: settings.poll_interval,
                request_timeout: settings.status_timeout,
                snapshot_tx,
                active: Mutex::new(None),
            }),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<StatusSnapshot> {
        self.inner.snapshot_tx.subscribe()
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        self.inner.snapshot_tx.borrow().clone()
    }

    pub fn mode(&self) -> ChannelMode {
        self.inner.snapshot_tx.borrow().mode
    }

    /// Initial connect: probe `/progress` once, then push on success or poll
    /// on failure.
    pub async fn connect(&self) {
        match self.inner.fetch_with_timeout().await {
            Ok(progress) => {
                sync_info!("Agent reachable, opening push subscription");
                self.inner.publish(|snapshot| {
                    snapshot.online = true;
                    snapshot.progress = Some(progress);
                });
                self.inner.open_push().await;
            }
            Err(err) => {
                sync_warn!("Agent probe failed, polling instead: {}", err);
                self.inner.enter_polling(None);
            }
        }
    }

    /// Tries the push handshake again. On success polling stops; on failure
    /// the channel keeps (or starts) polling. Returns whether push is active.
    pub async fn reconnect_push(&self) -> bool {
        self.inner.open_push().await
    }

    /// Cancels the active task and returns to `Disconnected`. Progress values
    /// are kept.
    pub fn shutdown(&self) {
        let mut active = self.inner.lock_active();
        if let Some(token) = active.take() {
            token.cancel();
        }
        self.inner.publish(|snapshot| {
            snapshot.mode = ChannelMode::Disconnected;
            snapshot.online = false;
        });
    }
}

impl ChannelInner {
    fn lock_active(&self) -> MutexGuard<'_, Option<CancellationToken>> {
        // A poisoned slot only means a publisher panicked; the token is still valid.
        self.active
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn publish(&self, apply: impl FnOnce(&mut StatusSnapshot)) {
        self.snapshot_tx.send_if_modified(|snapshot| {
            let before = snapshot.clone();
            apply(snapshot);
            *snapshot != before
        });
    }

    /// Publishes only if `token` still belongs to the active task.
    fn publish_if_current(&self, token: &CancellationToken, apply: impl FnOnce(&mut StatusSnapshot)) {
        let _active = self.lock_active();
        if !token.is_cancelled() {
            self.publish(apply);
        }
    }

    fn install(&self, active: &mut Option<CancellationToken>) -> CancellationToken {
        if let Some(previous) = active.take() {
            previous.cancel();
        }
        let token = CancellationToken::new();
        *active = Some(token.clone());
        token
    }

    async fn fetch_with_timeout(&self) -> Result<ProgressState, AgentError> {
        match tokio::time::timeout(self.request_timeout, self.source.fetch_progress()).await {
            Ok(result) => result,
            Err(_) => Err(AgentError::new(
                FailureKind::Timeout,
                format!("no status within {:?}", self.request_timeout),
            )),
        }
    }

    async fn open_push(self: &Arc<Self>) -> bool {
        match self.source.subscribe().await {
            Ok(stream) => {
                let token = {
                    let mut active = self.lock_active();
                    let token = self.install(&mut active);
                    self.publish(|snapshot| {
                        snapshot.mode = ChannelMode::Pushing;
                        snapshot.online = true;
                    });
                    token
                };
                sync_info!("Push subscription open");
                tokio::spawn(push_loop(self.clone(), stream, token));
                true
            }
            Err(err) => {
                sync_warn!("Push subscription failed, polling instead: {}", err);
                self.enter_polling(None);
                false
            }
        }
    }

    /// Switches to polling unless already polling. With `superseded`, does
    /// nothing if that task's token has been cancelled in the meantime.
    fn enter_polling(self: &Arc<Self>, superseded: Option<&CancellationToken>) {
        let mut active = self.lock_active();
        if superseded.is_some_and(CancellationToken::is_cancelled) {
            return;
        }
        let already_polling =
            self.snapshot_tx.borrow().mode == ChannelMode::Polling && active.is_some();
        if already_polling {
            self.publish(|snapshot| snapshot.online = false);
            return;
        }
        let token = self.install(&mut active);
        self.publish(|snapshot| {
            snapshot.mode = ChannelMode::Polling;
            snapshot.online = false;
        });
        drop(active);
        sync_info!("Polling agent every {:?}", self.poll_interval);
        tokio::spawn(poll_loop(self.clone(), token));
    }
}

async fn push_loop(inner: Arc<ChannelInner>, mut stream: ProgressStream, token: CancellationToken) {
    loop {
        tokio::select! {
            _ = token.cancelled() => return,
            next = stream.next() => match next {
                Some(Ok(progress)) => {
                    inner.publish_if_current(&token, |snapshot| {
                        snapshot.online = true;
                        snapshot.progress = Some(progress);
                    });
                }
                Some(Err(err)) => {
                    sync_warn!("Push subscription error: {}", err);
                    break;
                }
                None => {
                    sync_warn!("Push subscription closed by agent");
                    break;
                }
            },
        }
    }
    drop(stream);
    inner.enter_polling(Some(&token));
}

async fn poll_loop(inner: Arc<ChannelInner>, token: CancellationToken) {
    let mut ticker = tokio::time::interval(inner.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = token.cancelled() => return,
            _ = ticker.tick() => {}
        }
        let result = tokio::select! {
            _ = token.cancelled() => return,
            result = inner.fetch_with_timeout() => result,
        };
        match result {
            Ok(progress) => inner.publish_if_current(&token, |snapshot| {
                snapshot.online = true;
                snapshot.progress = Some(progress);
            }),
            Err(err) => {
                sync_debug!("Status poll failed: {}", err);
                // Last known progress stays on display.
                inner.publish_if_current(&token, |snapshot| snapshot.online = false);
            }
        }
    }
}
