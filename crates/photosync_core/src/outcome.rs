use std::fmt;

/// Result of handing one batch to the agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The agent answered `{"status": "ok"}`.
    Accepted { total: Option<u64> },
    /// Well-formed answer without the success marker.
    Rejected {
        status: String,
        message: Option<String>,
    },
    /// Network failure, timeout or an unreadable body.
    TransportError { message: String },
}

impl SubmitOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmitOutcome::Accepted { .. })
    }
}

impl fmt::Display for SubmitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitOutcome::Accepted { total: Some(total) } => write!(f, "accepted ({total} items)"),
            SubmitOutcome::Accepted { total: None } => write!(f, "accepted"),
            SubmitOutcome::Rejected {
                status,
                message: Some(message),
            } => write!(f, "rejected with status {status:?}: {message}"),
            SubmitOutcome::Rejected {
                status,
                message: None,
            } => write!(f, "rejected with status {status:?}"),
            SubmitOutcome::TransportError { message } => write!(f, "transport error: {message}"),
        }
    }
}
