//! Connection state of one agent and the backoff rules between attempts.
//!
//! ```text
//!   Connected ──(link drops)──▶ Disconnected ──▶ Reconnecting ──ok──▶ Connected
//!                                                   │  ▲
//!                                   connect failed  │  │ backoff elapsed
//!                                                   ▼  │
//!                                                 Backoff { until }
//!
//!   Reconnecting ──(factory error)──▶ PermanentlyFailed
//! ```

use std::fmt;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use tokio::time::Instant;

use fl_core::ReconnectConfig;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LinkState {
    Connected,
    Disconnected,
    Reconnecting,
    Backoff { until: Instant },
    /// A replacement handle cannot be built.  Never retried.
    PermanentlyFailed,
}

impl LinkState {
    pub fn label(&self) -> &'static str {
        match self {
            LinkState::Connected         => "connected",
            LinkState::Disconnected      => "disconnected",
            LinkState::Reconnecting      => "reconnecting",
            LinkState::Backoff { .. }    => "backoff",
            LinkState::PermanentlyFailed => "failed",
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, LinkState::Connected)
    }
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// `wait_<N>_second` anywhere in the server's reason text.
static WAIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"wait_(\d+)_second").expect("wait pattern compiles"));

/// How long to wait before the next connect attempt after a failure with
/// `reason`.
///
/// | Reason contains     | Delay                         |
/// |---------------------|-------------------------------|
/// | `wait_<N>_second`   | `N s + wait_buffer_ms`        |
/// | `limits`            | `rate_limit_backoff_ms`       |
/// | anything else       | `default_backoff_ms`          |
pub fn backoff_for(reason: &str, config: &ReconnectConfig) -> Duration {
    let explicit = WAIT_RE
        .captures(reason)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<u64>().ok());

    match explicit {
        Some(secs) => Duration::from_secs(secs) + Duration::from_millis(config.wait_buffer_ms),
        None if reason.contains("limits") => Duration::from_millis(config.rate_limit_backoff_ms),
        None => Duration::from_millis(config.default_backoff_ms),
    }
}
