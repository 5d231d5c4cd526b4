//! `fl-schedule` — what a scheduler runs and when.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                   |
//! |---------------|------------------------------------------------------------|
//! | [`name`]      | `LoopName` — closed set of loop slots                      |
//! | [`interval`]  | `Interval` (`Fixed` / `Cooldown`), `cooldown_delay`        |
//! | [`strategy`]  | `Loop`, `LoopSlot`, `Strategy`, `StrategyBuilder`          |
//! | [`timer`]     | `TimerQueue` (`BTreeMap<Instant, Vec<TimerEntry>>`)        |
//! | [`loader`]    | `load_cadences_csv`, `load_cadences_reader`                |
//! | [`error`]     | `ScheduleError`, `ScheduleResult<T>`                       |
//!
//! # Chain model (summary)
//!
//! Every registered loop is either pending in the `TimerQueue` or in flight,
//! never both:
//!
//! ```text
//! arm(now)  →  fire  →  action(agent).await  →  re-read registry
//!                                                 ├─ gone / Stop  → end of chain
//!                                                 └─ present      → arm(now + next_delay)
//! ```
//!
//! The driver itself lives in `fl-sim`; this crate holds the data it drives.

pub mod error;
pub mod interval;
pub mod loader;
pub mod name;
pub mod strategy;
pub mod timer;


pub use error::{ScheduleError, ScheduleResult};
pub use interval::{cooldown_delay, Interval};
pub use loader::{load_cadences_csv, load_cadences_reader, CadenceTable};
pub use name::LoopName;
pub use strategy::{Hook, Loop, LoopAction, LoopFuture, LoopSlot, Strategy, StrategyBuilder};
pub use timer::{TimerEntry, TimerQueue};
