use thiserror::Error;

use fl_schedule::ScheduleError;

#[derive(Debug, Error)]
pub enum CombatError {
    #[error("combat configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}

pub type CombatResult<T> = Result<T, CombatError>;
