use thiserror::Error;
use uuid::Uuid;

use crate::kernel::event::OutputId;

/// Errors at the session boundary. Extraction and policy themselves never fail.
#[derive(Debug, Error)]
pub enum TriageError {
    #[error("session {0} is closed; start a new session")]
    SessionClosed(Uuid),

    #[error("no pending output {0:?}")]
    UnknownOutput(OutputId),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum PhrasingError {
    #[error("no API key configured")]
    MissingKey,

    #[error("phrasing request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("phrasing service returned {0}")]
    Status(reqwest::StatusCode),

    #[error("phrasing service returned an empty reply")]
    EmptyReply,

    #[error("phrasing timed out after {0} ms")]
    Timeout(u64),
}
