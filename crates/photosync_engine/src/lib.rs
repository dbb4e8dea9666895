//! Photosync engine: agent IO, the status channel and effect execution.
mod channel;
mod engine;
mod settings;
mod sse;
mod status;
mod sync;
mod types;

pub use channel::StatusChannel;
pub use engine::{EngineError, EngineHandle};
pub use settings::AgentSettings;
pub use sse::SseDecoder;
pub use status::{ProgressStream, ReqwestStatusSource, StatusSource};
pub use sync::{ReqwestSyncClient, SyncClient};
pub use types::{AgentError, EngineEvent, FailureKind};
