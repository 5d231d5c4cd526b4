//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `loop_events.csv`
//! - `link_events.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::{LinkEventRow, LoopEventRow, OutputResult};
use crate::writer::OutputWriter;

/// Writes scheduler output to two CSV files.
pub struct CsvWriter {
    loops:    Writer<File>,
    links:    Writer<File>,
    finished: bool,
}

impl CsvWriter {
    /// Open (or create) the two CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut loops = Writer::from_path(dir.join("loop_events.csv"))?;
        loops.write_record(["agent_id", "at_ms", "loop", "event", "delay_ms", "error"])?;

        let mut links = Writer::from_path(dir.join("link_events.csv"))?;
        links.write_record(["agent_id", "at_ms", "event", "detail"])?;

        Ok(Self {
            loops,
            links,
            finished: false,
        })
    }
}

impl OutputWriter for CsvWriter {
    fn write_loop_events(&mut self, rows: &[LoopEventRow]) -> OutputResult<()> {
        for row in rows {
            self.loops.write_record(&[
                row.agent_id.to_string(),
                row.at_ms.to_string(),
                row.loop_name.to_string(),
                row.event.to_string(),
                row.delay_ms.map(|d| d.to_string()).unwrap_or_default(),
                row.error.clone().unwrap_or_default(),
            ])?;
        }
        Ok(())
    }

    fn write_link_event(&mut self, row: &LinkEventRow) -> OutputResult<()> {
        self.links.write_record(&[
            row.agent_id.to_string(),
            row.at_ms.to_string(),
            row.event.to_owned(),
            row.detail.clone(),
        ])?;
        Ok(())
    }

    fn flush(&mut self) -> OutputResult<()> {
        self.loops.flush()?;
        self.links.flush()?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.flush()
    }
}
