//! `fl-sim` — runs the loops of every controlled agent.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                  |
//! |----------------|-----------------------------------------------------------|
//! | [`strategist`] | `Strategist` event loop, `StrategistHandle`, status       |
//! | [`builder`]    | `StrategistBuilder`                                       |
//! | [`link`]       | `LinkState`, `backoff_for`                                |
//! | [`observer`]   | `SchedulerObserver` trait, `NoopObserver`                 |
//! | [`fleet`]      | `Fleet`: one spawned strategist per agent                 |
//! | [`error`]      | `SchedulerError`, `SchedulerResult<T>`                    |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use fl_sim::{Fleet, NoopObserver};
//!
//! let mut fleet = Fleet::new(config, factory);
//! let control = fleet.start(handle, identity, shard, NoopObserver).await?;
//! control.apply(combat).await?;
//! // ...
//! fleet.stop_all().await;
//! ```

pub mod builder;
pub mod error;
pub mod fleet;
pub mod link;
pub mod observer;
pub mod strategist;


pub use builder::StrategistBuilder;
pub use error::{SchedulerError, SchedulerResult};
pub use fleet::Fleet;
pub use link::{backoff_for, LinkState};
pub use observer::{NoopObserver, SchedulerObserver};
pub use strategist::{Strategist, StrategistHandle, StrategistStatus};
