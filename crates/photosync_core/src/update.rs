use crate::{CaptureSession, Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: CaptureSession, msg: Msg) -> (CaptureSession, Vec<Effect>) {
    let effects = match msg {
        Msg::ResponseIntercepted(response) => {
            state.ingest(&response);
            Vec::new()
        }
        Msg::SyncClicked => match state.begin_sync() {
            Some(items) => vec![Effect::Submit { items }],
            None => Vec::new(),
        },
        Msg::SyncFinished { items, outcome } => {
            // A stale answer cannot commit: the control stays disabled until
            // the in-flight submission reports back.
            if state.is_submitting() {
                state.finish_sync(&items, outcome);
            }
            Vec::new()
        }
        Msg::StatusUpdated(snapshot) => {
            state.apply_status(snapshot);
            Vec::new()
        }
        Msg::ReconnectClicked => vec![Effect::ReconnectStatus],
    };

    (state, effects)
}
