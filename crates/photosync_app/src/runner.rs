use std::time::{Duration, Instant};

use photosync_core::{
    update, CaptureSession, ClassifierRules, Effect, InterceptedResponse, Msg, SessionViewModel,
    SyncStatus,
};
use photosync_engine::{EngineEvent, EngineHandle};
use photosync_logging::{sync_debug, sync_info, sync_warn};

const PUMP_SLICE: Duration = Duration::from_millis(50);

/// Owns the session state and the engine; every change goes through
/// [`update`] on the caller's thread.
pub struct SessionRunner {
    state: CaptureSession,
    engine: EngineHandle,
}

impl SessionRunner {
    pub fn new(rules: ClassifierRules, engine: EngineHandle) -> Self {
        Self {
            state: CaptureSession::with_rules(rules),
            engine,
        }
    }

    pub fn view(&self) -> SessionViewModel {
        self.state.view()
    }

    pub fn state(&self) -> &CaptureSession {
        &self.state
    }

    pub fn consume_dirty(&mut self) -> bool {
        self.state.consume_dirty()
    }

    pub fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.run_effects(effects);
    }

    pub fn ingest_all(&mut self, responses: Vec<InterceptedResponse>) {
        for response in responses {
            self.dispatch(Msg::ResponseIntercepted(response));
        }
    }

    pub fn connect_status(&self) {
        self.engine.connect_status();
    }

    /// Waits up to `wait` for one engine event and applies it. Returns whether
    /// an event arrived.
    pub fn pump(&mut self, wait: Duration) -> bool {
        match self.engine.recv_timeout(wait) {
            Some(event) => {
                self.dispatch(map_event(event));
                true
            }
            None => false,
        }
    }

    /// Sends the pending queue and blocks until the agent answers or `limit`
    /// passes. Returns the resulting sync status.
    pub fn sync_and_wait(&mut self, limit: Duration) -> SyncStatus {
        self.dispatch(Msg::SyncClicked);
        let deadline = Instant::now() + limit;
        while self.state.is_submitting() && Instant::now() < deadline {
            self.pump(PUMP_SLICE);
        }
        self.state.sync_status().clone()
    }

    /// Applies engine events until `duration` elapses or `stop` holds.
    pub fn watch(
        &mut self,
        duration: Duration,
        mut on_change: impl FnMut(&SessionViewModel),
        stop: impl Fn(&SessionViewModel) -> bool,
    ) {
        let deadline = Instant::now() + duration;
        while Instant::now() < deadline {
            self.pump(PUMP_SLICE);
            if self.consume_dirty() {
                let view = self.view();
                on_change(&view);
                if stop(&view) {
                    break;
                }
            }
        }
    }

    fn run_effects(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Submit { items } => {
                    sync_info!("Submit batch of {} items", items.len());
                    self.engine.submit(items);
                }
                Effect::ReconnectStatus => {
                    sync_debug!("Reconnect push subscription");
                    self.engine.reconnect_status();
                }
            }
        }
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::SubmitCompleted { items, outcome } => {
            if !outcome.is_accepted() {
                sync_warn!("Batch of {} items not accepted: {}", items.len(), outcome);
            }
            Msg::SyncFinished { items, outcome }
        }
        EngineEvent::Status(snapshot) => Msg::StatusUpdated(snapshot),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use photosync_core::{ProgressState, SubmitOutcome, TransferItem};
    use photosync_engine::{AgentError, AgentSettings, ProgressStream, StatusSource, SyncClient};
    use serde_json::json;

    use super::*;

    struct ScriptedSync {
        outcome: SubmitOutcome,
        batches: Mutex<Vec<Vec<TransferItem>>>,
    }

    #[async_trait::async_trait]
    impl SyncClient for ScriptedSync {
        async fn submit(&self, items: &[TransferItem]) -> SubmitOutcome {
            self.batches.lock().unwrap().push(items.to_vec());
            self.outcome.clone()
        }
    }

    struct SilentAgent;

    #[async_trait::async_trait]
    impl StatusSource for SilentAgent {
        async fn fetch_progress(&self) -> Result<ProgressState, AgentError> {
            Err(AgentSettings::with_base_url("::").endpoint("progress").unwrap_err())
        }

        async fn subscribe(&self) -> Result<ProgressStream, AgentError> {
            Err(AgentSettings::with_base_url("::").endpoint("events").unwrap_err())
        }
    }

    /// Still reports the batch it finished before this session started.
    struct FinishedAgent;

    #[async_trait::async_trait]
    impl StatusSource for FinishedAgent {
        async fn fetch_progress(&self) -> Result<ProgressState, AgentError> {
            Ok(ProgressState {
                total: 5,
                completed: 5,
                finished: true,
                ..ProgressState::default()
            })
        }

        async fn subscribe(&self) -> Result<ProgressStream, AgentError> {
            Err(AgentSettings::with_base_url("::").endpoint("events").unwrap_err())
        }
    }

    fn runner_with(outcome: SubmitOutcome) -> (SessionRunner, Arc<ScriptedSync>) {
        runner_with_agent(outcome, Arc::new(SilentAgent))
    }

    fn runner_with_agent(
        outcome: SubmitOutcome,
        agent: Arc<dyn StatusSource>,
    ) -> (SessionRunner, Arc<ScriptedSync>) {
        let sync = Arc::new(ScriptedSync {
            outcome,
            batches: Mutex::new(Vec::new()),
        });
        let engine = EngineHandle::with_clients(
            sync.clone(),
            agent,
            &AgentSettings::default(),
        )
        .unwrap();
        (SessionRunner::new(ClassifierRules::default(), engine), sync)
    }

    fn listing() -> Vec<InterceptedResponse> {
        vec![
            InterceptedResponse::new(
                "https://api/album/list",
                Some(json!({ "result": [{ "id": 5, "name": "Hall" }] })),
            ),
            InterceptedResponse::new(
                "https://api/pics?key=5",
                Some(json!({ "result": { "pics_array": [
                    { "id": 1, "pic_url": "//cdn/1.jpg" },
                    { "id": 2, "pic_url": "//cdn/2.jpg" },
                ] } })),
            ),
        ]
    }

    #[test]
    fn accepted_sync_empties_pending_queue() {
        let (mut runner, sync) = runner_with(SubmitOutcome::Accepted { total: Some(2) });
        runner.ingest_all(listing());
        assert_eq!(runner.view().pending_count, 2);

        let status = runner.sync_and_wait(Duration::from_secs(3));

        assert_eq!(status, SyncStatus::Succeeded { count: 2 });
        assert_eq!(runner.view().pending_count, 0);
        assert_eq!(runner.view().seen_count, 2);
        let batches = sync.batches.lock().unwrap();
        assert_eq!(batches.len(), 1);
        assert!(batches[0].iter().all(|item| item.album() == "Hall"));
    }

    #[test]
    fn rejected_sync_keeps_queue() {
        let (mut runner, _sync) = runner_with(SubmitOutcome::Rejected {
            status: "error".to_string(),
            message: None,
        });
        runner.ingest_all(listing());

        let status = runner.sync_and_wait(Duration::from_secs(3));

        assert!(matches!(status, SyncStatus::Failed { .. }));
        assert_eq!(runner.view().pending_count, 2);
        assert!(runner.view().sync_enabled);
    }

    #[test]
    fn watch_ignores_previous_finished_batch() {
        let (mut runner, _sync) = runner_with_agent(
            SubmitOutcome::Accepted { total: Some(2) },
            Arc::new(FinishedAgent),
        );
        runner.connect_status();
        let deadline = Instant::now() + Duration::from_secs(3);
        while !runner.view().progress.finished && Instant::now() < deadline {
            runner.pump(PUMP_SLICE);
        }
        assert!(runner.view().progress.finished);

        runner.ingest_all(listing());
        let status = runner.sync_and_wait(Duration::from_secs(3));
        assert_eq!(status, SyncStatus::Succeeded { count: 2 });

        let watch_for = Duration::from_millis(1500);
        let started = Instant::now();
        let mut summaries = Vec::new();
        runner.watch(
            watch_for,
            |view| summaries.push(view.progress.summary.clone()),
            |view| view.progress.finished,
        );

        assert!(started.elapsed() >= watch_for);
        assert!(!runner.view().progress.finished);
        assert_eq!(summaries.first().map(String::as_str), Some("waiting for sync..."));
    }
}
