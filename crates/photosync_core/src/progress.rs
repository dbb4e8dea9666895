use serde::{Deserialize, Serialize};

/// Transfer progress as reported by the agent. Replaced wholesale on every
/// update; missing fields read as zero, empty or false.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressState {
    pub total: u64,
    pub completed: u64,
    pub failed: u64,
    pub current: String,
    pub finished: bool,
}

impl ProgressState {
    /// Completed share of `total`, clamped to 0..=100.
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        let ratio = self.completed as f64 / self.total as f64;
        (ratio * 100.0).round().min(100.0) as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelMode {
    #[default]
    Disconnected,
    Pushing,
    Polling,
}

/// What the status channel currently knows. `online` tracks transport health
/// and is independent of `progress`, which keeps the last known values.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusSnapshot {
    pub mode: ChannelMode,
    pub online: bool,
    pub progress: Option<ProgressState>,
}
