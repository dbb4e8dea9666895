#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// The host adapter observed a response.
    ResponseIntercepted(crate::InterceptedResponse),
    /// User clicked the sync control.
    SyncClicked,
    /// The agent answered a submission started by `Effect::Submit`.
    SyncFinished {
        items: Vec<crate::TransferItem>,
        outcome: crate::SubmitOutcome,
    },
    /// The status channel published a new snapshot.
    StatusUpdated(crate::StatusSnapshot),
    /// User asked to reconnect the push subscription.
    ReconnectClicked,
}
