use thiserror::Error;

use fl_core::StrategyId;

use crate::LoopName;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("cadence parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unknown loop name {0:?}")]
    UnknownLoop(String),

    #[error("cooldown interval needs at least one ability")]
    EmptyCooldownSet,

    #[error("scheduler is stopped")]
    Stopped,

    #[error("strategy {0} is not held by this scheduler")]
    NotHeld(StrategyId),

    #[error("loop {name} is already owned by strategy {owner}")]
    SlotTaken { name: LoopName, owner: StrategyId },
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
