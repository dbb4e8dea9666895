use crate::extract::extract_items;
use crate::view_model::{ProgressView, SessionViewModel};
use crate::{
    ActivityContext, AlbumDirectory, CaptureStore, Classification, ClassifierRules,
    InterceptedResponse, StatusSnapshot, SubmitOutcome, TransferItem,
};

/// Which rule an intercepted response matched, and what it changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestReport {
    Activity { name: String },
    Albums { recorded: usize },
    Media { extracted: usize, added: usize },
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SyncStatus {
    #[default]
    Idle,
    NothingToSync,
    Submitting { count: usize },
    Succeeded { count: usize },
    Failed { outcome: SubmitOutcome },
}

/// Everything one page session accumulates. Created at session start and
/// dropped at session end; nothing here is global.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CaptureSession {
    rules: ClassifierRules,
    albums: AlbumDirectory,
    activity: ActivityContext,
    store: CaptureStore,
    sync: SyncStatus,
    status: StatusSnapshot,
    // Batch size the agent confirmed; set until it reports progress for it.
    expected_total: Option<u64>,
    dirty: bool,
}

impl CaptureSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: ClassifierRules) -> Self {
        Self {
            rules,
            ..Self::default()
        }
    }

    pub fn view(&self) -> SessionViewModel {
        SessionViewModel {
            activity_name: self.activity.name().to_string(),
            album_count: self.albums.len(),
            seen_count: self.store.seen_count(),
            pending_count: self.store.pending_count(),
            sync_label: sync_label(&self.sync).to_string(),
            sync_enabled: !self.is_submitting(),
            online: self.status.online,
            mode: self.status.mode,
            progress: ProgressView::from_progress(self.status.progress.as_ref()),
            dirty: self.dirty,
        }
    }

    pub fn store(&self) -> &CaptureStore {
        &self.store
    }

    pub fn albums(&self) -> &AlbumDirectory {
        &self.albums
    }

    pub fn activity(&self) -> &ActivityContext {
        &self.activity
    }

    pub fn sync_status(&self) -> &SyncStatus {
        &self.sync
    }

    pub fn status(&self) -> &StatusSnapshot {
        &self.status
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.sync, SyncStatus::Submitting { .. })
    }

    /// Returns whether anything visible changed since the last call.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Routes one response through classification, album and activity
    /// bookkeeping, extraction and the store.
    pub fn ingest(&mut self, response: &InterceptedResponse) -> IngestReport {
        let Some(body) = response.body.as_ref() else {
            return IngestReport::Ignored;
        };

        let report = match self.rules.classify(&response.target, body) {
            Classification::ActivityDetail { name } => {
                self.activity.set_name(name);
                IngestReport::Activity {
                    name: name.to_string(),
                }
            }
            Classification::AlbumListing { entries } => IngestReport::Albums {
                recorded: self.albums.record_albums(entries),
            },
            Classification::MediaListing { records } => {
                let items = extract_items(&response.target, records, &self.albums, &self.activity);
                let extracted = items.len();
                let added = self.store.extend(items);
                IngestReport::Media { extracted, added }
            }
            Classification::Unclassified => IngestReport::Ignored,
        };

        if report != IngestReport::Ignored {
            self.mark_dirty();
        }
        report
    }

    /// Takes the pending snapshot for submission, or `None` when there is
    /// nothing to send or a submission is already in flight.
    pub(crate) fn begin_sync(&mut self) -> Option<Vec<TransferItem>> {
        if self.is_submitting() {
            return None;
        }
        let snapshot = self.store.drain();
        self.sync = if snapshot.is_empty() {
            SyncStatus::NothingToSync
        } else {
            SyncStatus::Submitting {
                count: snapshot.len(),
            }
        };
        self.mark_dirty();
        (!snapshot.is_empty()).then_some(snapshot)
    }

    pub(crate) fn finish_sync(&mut self, items: &[TransferItem], outcome: SubmitOutcome) {
        self.sync = if let SubmitOutcome::Accepted { total } = outcome {
            self.store.commit(items);
            self.await_batch_progress(total.unwrap_or(items.len() as u64));
            SyncStatus::Succeeded { count: items.len() }
        } else {
            SyncStatus::Failed { outcome }
        };
        self.mark_dirty();
    }

    /// A finished report left over from an earlier batch must not read as the
    /// new batch being done.
    fn await_batch_progress(&mut self, total: u64) {
        self.expected_total = Some(total);
        if self.status.progress.as_ref().is_some_and(|progress| progress.finished) {
            self.status.progress = None;
        }
    }

    pub(crate) fn apply_status(&mut self, mut snapshot: StatusSnapshot) {
        if let Some(expected) = self.expected_total {
            match &snapshot.progress {
                Some(progress) if progress.finished && progress.total != expected => {
                    snapshot.progress = self.status.progress.clone();
                }
                Some(_) => self.expected_total = None,
                None => {}
            }
        }
        if self.status != snapshot {
            self.status = snapshot;
            self.mark_dirty();
        }
    }
}

fn sync_label(status: &SyncStatus) -> &'static str {
    match status {
        SyncStatus::Idle => "Sync to local",
        SyncStatus::NothingToSync => "Nothing to sync",
        SyncStatus::Submitting { .. } => "Sending...",
        SyncStatus::Succeeded { .. } => "Synced",
        SyncStatus::Failed {
            outcome: SubmitOutcome::TransportError { .. },
        } => "Agent unreachable, retry sync",
        SyncStatus::Failed { .. } => "Sync failed, retry sync",
    }
}
