use thiserror::Error;

use fl_core::{AbilityId, Role};

/// A single action primitive failed.  Transient by definition: the loop
/// driver logs it and reschedules.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ActionError {
    #[error("agent is not ready")]
    NotReady,

    #[error("agent is disconnected")]
    Disconnected,

    #[error("ability {0} is on cooldown")]
    OnCooldown(AbilityId),

    #[error("insufficient resource: need {needed}, have {available}")]
    InsufficientResource { needed: u32, available: u32 },

    #[error("rejected by world server: {0}")]
    Rejected(String),

    #[error("transport error: {0}")]
    Transport(String),
}

pub type ActionResult<T> = Result<T, ActionError>;

/// `connect()` failed.  The message is the world server's reason text and
/// drives the backoff choice (`wait_<N>_second`, `limits`, …).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConnectError {
    #[error("connection rejected: {0}")]
    Rejected(String),

    #[error("transport error: {0}")]
    Transport(String),
}

impl ConnectError {
    /// The raw reason text, without the variant prefix.
    pub fn reason(&self) -> &str {
        match self {
            ConnectError::Rejected(r) | ConnectError::Transport(r) => r,
        }
    }
}

/// Building a replacement handle failed.  Configuration class: retrying
/// cannot succeed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FactoryError {
    #[error("no handle implementation for role {0}")]
    UnsupportedRole(Role),

    #[error("unknown shard {0}")]
    UnknownShard(String),
}

pub type FactoryResult<T> = Result<T, FactoryError>;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("directory unavailable: {0}")]
    Unavailable(String),

    #[error("invalid query: {0}")]
    Query(String),
}
