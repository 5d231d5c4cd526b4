//! `fl-output` — scheduler event recording for the rust_fleet controller.
//!
//! | Backend | Files created                          |
//! |---------|----------------------------------------|
//! | CSV     | `loop_events.csv`, `link_events.csv`   |
//!
//! Backends implement [`OutputWriter`] and are driven by
//! [`OutputObserver`], which implements `fl_sim::SchedulerObserver`.  Wrap
//! the backend in a [`SharedWriter`] to record a whole fleet into one set
//! of files.
//!
//! # Usage
//!
//! ```rust,ignore
//! use fl_output::{CsvWriter, OutputObserver, SharedWriter};
//!
//! let writer = SharedWriter::new(CsvWriter::new(Path::new("./output"))?);
//! fleet.start(handle, identity, shard, OutputObserver::new(writer.clone())).await?;
//! // ...
//! fleet.stop_all().await;
//! writer.clone().finish()?;
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;


pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::{OutputObserver, DEFAULT_BATCH};
pub use row::{LinkEventRow, LoopEvent, LoopEventRow};
pub use writer::{OutputWriter, SharedWriter};
