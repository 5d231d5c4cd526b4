use thiserror::Error;

use fl_agent::FactoryError;
use fl_core::{AgentId, FleetError};
use fl_schedule::ScheduleError;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("scheduler configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error(transparent)]
    Factory(#[from] FactoryError),

    #[error("strategist task has exited")]
    Closed,

    #[error("agent {0} is already running")]
    AgentExists(AgentId),

    #[error("fleet is full ({max} agents)")]
    FleetFull { max: usize },

    #[error("agent {0} is not running")]
    AgentNotFound(AgentId),
}

impl From<FleetError> for SchedulerError {
    fn from(e: FleetError) -> Self {
        SchedulerError::Config(e.to_string())
    }
}

pub type SchedulerResult<T> = Result<T, SchedulerError>;
