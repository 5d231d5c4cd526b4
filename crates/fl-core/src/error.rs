//! Framework error type.
//!
//! Sub-crates define their own error enums and wrap `FleetError` as one
//! variant where they surface configuration problems.

use thiserror::Error;

use crate::AgentId;

/// The top-level error type for `fl-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum FleetError {
    #[error("agent {0} not found")]
    AgentNotFound(AgentId),

    #[error("unknown role {0:?}")]
    UnknownRole(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for all `fl-*` crates.
pub type FleetResult<T> = Result<T, FleetError>;
