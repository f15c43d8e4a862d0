use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::{Phase, Trigger};
use crate::storage::Settings;

/// Everything a front end needs to (re)render the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A transition was applied. Self-transitions are reported too.
    PhaseChanged {
        from: Phase,
        to: Phase,
        trigger: Trigger,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        phase: Phase,
        remaining_secs: u64,
        remaining_display: String,
        fast_test: bool,
        settings: Settings,
        at: DateTime<Utc>,
    },
}
