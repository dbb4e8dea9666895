//! Photosync core: capture pipeline, deduplicating store and the pure session
//! state machine.
mod album;
mod classify;
mod effect;
mod extract;
mod item;
mod msg;
mod outcome;
mod progress;
mod state;
mod store;
mod update;
mod view_model;

pub use album::{
    ActivityContext, AlbumDirectory, AlbumEntry, DEFAULT_ACTIVITY_NAME, DEFAULT_ALBUM_NAME,
};
pub use classify::{parse_body, Classification, ClassifierRules, InterceptedResponse};
pub use effect::Effect;
pub use extract::{album_key, extract_items, normalize_url};
pub use item::{CaptureKey, TransferItem};
pub use msg::Msg;
pub use outcome::SubmitOutcome;
pub use progress::{ChannelMode, ProgressState, StatusSnapshot};
pub use state::{CaptureSession, IngestReport, SyncStatus};
pub use store::CaptureStore;
pub use update::update;
pub use view_model::{ProgressView, SessionViewModel};
