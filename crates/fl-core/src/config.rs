//! Fleet configuration.
//!
//! Loaded from a TOML file by the application and handed to the schedulers.
//! Every field has a default, so an empty file is a valid configuration:
//!
//! ```toml
//! [scheduler]
//! cooldown_floor_ms = 50
//! slot_conflict     = "overwrite"   # or "remove_previous", "reject"
//!
//! [reconnect]
//! wait_buffer_ms        = 2000
//! rate_limit_backoff_ms = 40000
//! default_backoff_ms    = 10000
//!
//! [fleet]
//! max_agents = 8
//!
//! [donation]
//! pair_cooldown_ms = 5000
//! max_amount       = 100
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{FleetError, FleetResult};

// ── Sections ──────────────────────────────────────────────────────────────────

/// What `apply_strategy` does when a loop name is already owned by another
/// held strategy.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotConflict {
    /// Replace the stored definition; the previous owner gets no callback.
    #[default]
    Overwrite,
    /// Fully remove the previous owner (calling its `on_remove`) first.
    RemovePrevious,
    /// Refuse to apply the new strategy.
    Reject,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Lower bound on cooldown-derived delays.  Guards against a stale zero
    /// cooldown turning a loop into a tight spin.
    pub cooldown_floor_ms: u64,
    pub slot_conflict:     SlotConflict,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { cooldown_floor_ms: 50, slot_conflict: SlotConflict::Overwrite }
    }
}

impl SchedulerConfig {
    #[inline]
    pub fn cooldown_floor(&self) -> Duration {
        Duration::from_millis(self.cooldown_floor_ms)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconnectConfig {
    /// Added on top of a server-requested wait.
    pub wait_buffer_ms:        u64,
    /// Backoff after a connection-limit rejection.
    pub rate_limit_backoff_ms: u64,
    /// Backoff after any other failure.
    pub default_backoff_ms:    u64,
    /// Retry period while moving an agent to another shard.
    pub shard_switch_retry_ms: u64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            wait_buffer_ms:        2_000,
            rate_limit_backoff_ms: 40_000,
            default_backoff_ms:    10_000,
            shard_switch_retry_ms: 1_000,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetSection {
    /// Maximum number of agents one process drives at once.
    pub max_agents: usize,
}

impl Default for FleetSection {
    fn default() -> Self {
        Self { max_agents: 8 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DonationConfig {
    /// Minimum gap between two donations from the same donor to the same
    /// recipient.
    pub pair_cooldown_ms: u64,
    pub min_amount:       u32,
    pub max_amount:       u32,
}

impl Default for DonationConfig {
    fn default() -> Self {
        Self { pair_cooldown_ms: 5_000, min_amount: 1, max_amount: 100 }
    }
}

// ── FleetConfig ───────────────────────────────────────────────────────────────

/// Top-level configuration for one controller process.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetConfig {
    pub scheduler: SchedulerConfig,
    pub reconnect: ReconnectConfig,
    pub fleet:     FleetSection,
    pub donation:  DonationConfig,
}

impl FleetConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> FleetResult<Self> {
        let config: FleetConfig =
            toml::from_str(text).map_err(|e| FleetError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: &Path) -> FleetResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Reject values that would break scheduler invariants.
    pub fn validate(&self) -> FleetResult<()> {
        if self.scheduler.cooldown_floor_ms == 0 {
            return Err(FleetError::Config(
                "scheduler.cooldown_floor_ms must be > 0".into(),
            ));
        }
        if self.fleet.max_agents == 0 {
            return Err(FleetError::Config("fleet.max_agents must be > 0".into()));
        }
        if self.donation.min_amount > self.donation.max_amount {
            return Err(FleetError::Config(format!(
                "donation.min_amount ({}) exceeds donation.max_amount ({})",
                self.donation.min_amount, self.donation.max_amount
            )));
        }
        Ok(())
    }
}
