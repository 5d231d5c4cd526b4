//! CSV cadence loader.
//!
//! Lets an operator retune loop cadences per character without rebuilding
//! strategies.  The resulting table is applied with
//! [`StrategyBuilder::cadences`][crate::StrategyBuilder::cadences].
//!
//! # CSV format
//!
//! One row per loop name.  Exactly one of `interval_ms` and `abilities`
//! must be set; `abilities` is a `;`-separated list of ability ids.
//!
//! ```csv
//! loop,interval_ms,abilities
//! attack,,0;3
//! heal,,5
//! move,250,
//! loot,1000,
//! ```
//!
//! A later row for the same loop overrides an earlier one.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use fl_core::AbilityId;

use crate::{Interval, LoopName, ScheduleError};

pub type CadenceTable = BTreeMap<LoopName, Interval>;

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct CadenceRecord {
    #[serde(rename = "loop")]
    name:        String,
    interval_ms: Option<u64>,
    abilities:   Option<String>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load a cadence table from a CSV file.
pub fn load_cadences_csv(path: &Path) -> Result<CadenceTable, ScheduleError> {
    let file = std::fs::File::open(path).map_err(ScheduleError::Io)?;
    load_cadences_reader(file)
}

/// Like [`load_cadences_csv`] but accepts any `Read` source.
pub fn load_cadences_reader<R: Read>(reader: R) -> Result<CadenceTable, ScheduleError> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut table = CadenceTable::new();

    for result in csv_reader.deserialize::<CadenceRecord>() {
        let row = result.map_err(|e| ScheduleError::Parse(e.to_string()))?;
        let name: LoopName = row.name.parse()?;
        let abilities = row.abilities.as_deref().map(str::trim).filter(|s| !s.is_empty());

        let interval = match (row.interval_ms, abilities) {
            (Some(ms), None) => Interval::fixed_ms(ms),
            (None, Some(list)) => Interval::cooldown(parse_abilities(list)?)?,
            _ => {
                return Err(ScheduleError::Parse(format!(
                    "loop {name}: set exactly one of interval_ms and abilities"
                )));
            }
        };
        if let Some(previous) = table.insert(name, interval) {
            tracing::debug!(name = %name, ?previous, "cadence row overrides an earlier one");
        }
    }

    tracing::debug!(loops = table.len(), "loaded cadence table");
    Ok(table)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn parse_abilities(list: &str) -> Result<Vec<AbilityId>, ScheduleError> {
    list.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u16>().map(AbilityId).map_err(|_| {
                ScheduleError::Parse(format!("invalid ability id {s:?}: expected a u16"))
            })
        })
        .collect()
}
