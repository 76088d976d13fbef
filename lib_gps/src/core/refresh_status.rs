use chrono::{DateTime, Utc};
use serde::Serialize;

/// Operational state of the refresh loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshState {
    /// Waiting for the next tick.
    #[default]
    Idle,
    /// A fetch, parse and install cycle is running.
    Refreshing,
    /// Cancelled; no further cycles are scheduled.
    Stopped,
}

/// What the refresh loop has done so far.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshStatus {
    /// Current loop state.
    pub state: RefreshState,
    /// When the current snapshot was installed. `None` until the first success.
    pub last_success: Option<DateTime<Utc>>,
    /// Message of the latest failed cycle, cleared by the next success.
    pub last_error: Option<String>,
    /// Installed snapshots.
    pub successes: u64,
    /// Failed cycles.
    pub failures: u64,
}
