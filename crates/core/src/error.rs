use thiserror::Error;

use crate::host::HostEventKind;

#[derive(Debug, Error)]
pub enum RecorderError {
    /// The host could not attach a listener the recorder depends on.
    #[error("failed to attach {event} listener: {reason}")]
    ListenerAttach {
        event: HostEventKind,
        reason: String,
    },
    #[error("invalid recorder config: {0}")]
    Config(#[from] serde_json::Error),
}
