//! `LoopName` — the closed set of loop slots a scheduler can hold.

use std::fmt;
use std::str::FromStr;

use crate::ScheduleError;

/// One named loop slot.  At most one loop per name runs on a scheduler.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub enum LoopName {
    Attack,
    Heal,
    Buff,
    Donate,
    Move,
    Loot,
    Potion,
    Respawn,
    Trade,
    Party,
    Tracker,
}

impl LoopName {
    pub const ALL: [LoopName; 11] = [
        LoopName::Attack,
        LoopName::Heal,
        LoopName::Buff,
        LoopName::Donate,
        LoopName::Move,
        LoopName::Loot,
        LoopName::Potion,
        LoopName::Respawn,
        LoopName::Trade,
        LoopName::Party,
        LoopName::Tracker,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LoopName::Attack  => "attack",
            LoopName::Heal    => "heal",
            LoopName::Buff    => "buff",
            LoopName::Donate  => "donate",
            LoopName::Move    => "move",
            LoopName::Loot    => "loot",
            LoopName::Potion  => "potion",
            LoopName::Respawn => "respawn",
            LoopName::Trade   => "trade",
            LoopName::Party   => "party",
            LoopName::Tracker => "tracker",
        }
    }
}

impl FromStr for LoopName {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        LoopName::ALL
            .into_iter()
            .find(|n| n.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ScheduleError::UnknownLoop(wanted.to_owned()))
    }
}

impl fmt::Display for LoopName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
