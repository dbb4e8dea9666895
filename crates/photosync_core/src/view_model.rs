use crate::{ChannelMode, ProgressState};

const WAITING_TEXT: &str = "waiting for sync...";
const ALL_DONE_TEXT: &str = "all done";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionViewModel {
    pub activity_name: String,
    pub album_count: usize,
    pub seen_count: usize,
    pub pending_count: usize,
    pub sync_label: String,
    pub sync_enabled: bool,
    pub online: bool,
    pub mode: ChannelMode,
    pub progress: ProgressView,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressView {
    pub percent: u8,
    pub summary: String,
    pub current: String,
    pub finished: bool,
}

impl Default for ProgressView {
    fn default() -> Self {
        Self::from_progress(None)
    }
}

impl ProgressView {
    pub fn from_progress(progress: Option<&ProgressState>) -> Self {
        let Some(progress) = progress.filter(|p| p.total > 0) else {
            return Self {
                percent: 0,
                summary: WAITING_TEXT.to_string(),
                current: "-".to_string(),
                finished: false,
            };
        };

        let mut summary = format!(
            "done {}/{}, failed {}",
            progress.completed, progress.total, progress.failed
        );
        if progress.finished {
            summary.push_str(" \u{2714}");
        }
        let current = if progress.finished {
            ALL_DONE_TEXT.to_string()
        } else if progress.current.is_empty() {
            "-".to_string()
        } else {
            progress.current.clone()
        };

        Self {
            percent: progress.percent(),
            summary,
            current,
            finished: progress.finished,
        }
    }
}
