use crate::TransferItem;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send this snapshot to the agent as one batch.
    Submit { items: Vec<TransferItem> },
    /// Try to reopen the push subscription.
    ReconnectStatus,
}
