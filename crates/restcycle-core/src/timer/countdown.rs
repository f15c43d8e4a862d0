//! Whole-second countdown.
//!
//! The countdown has no thread or clock of its own. The caller invokes
//! `tick()` once per second; each call counts as exactly one elapsed second,
//! whatever the scheduler delay was.
//!
//! ```text
//! Inactive -> Running -> Inactive   (completed or cancelled)
//! ```

use serde::{Deserialize, Serialize};

use crate::session::Phase;

/// Length substituted when a countdown is started with zero seconds.
pub const FAST_TEST_SECONDS: u64 = 5;

/// Outcome of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Tick {
    /// Still running; this many seconds remain.
    Running { remaining_secs: u64 },
    /// Reached zero on this tick. Reported once per start.
    Completed { owner: Phase },
}

#[derive(Debug, Clone, Default)]
pub struct Countdown {
    owner: Option<Phase>,
    remaining_secs: u64,
    total_secs: u64,
}

impl Countdown {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn is_active(&self) -> bool {
        self.owner.is_some()
    }

    /// Phase that armed the running countdown.
    pub fn owner(&self) -> Option<Phase> {
        self.owner
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn total_secs(&self) -> u64 {
        self.total_secs
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.total_secs - self.remaining_secs
    }

    /// Length a countdown started with `duration_secs` will actually run.
    pub fn effective_secs(duration_secs: u64) -> u64 {
        if duration_secs == 0 {
            FAST_TEST_SECONDS
        } else {
            duration_secs
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Arm the countdown for `owner`, replacing any running one.
    ///
    /// Zero seconds becomes [`FAST_TEST_SECONDS`].
    pub fn start(&mut self, owner: Phase, duration_secs: u64) {
        let secs = Self::effective_secs(duration_secs);
        self.owner = Some(owner);
        self.remaining_secs = secs;
        self.total_secs = secs;
    }

    /// Disarm. Calling this on an inactive countdown does nothing.
    pub fn cancel(&mut self) {
        self.owner = None;
        self.remaining_secs = 0;
        self.total_secs = 0;
    }

    /// Count one second. Returns `None` when inactive.
    pub fn tick(&mut self) -> Option<Tick> {
        let owner = self.owner?;
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs > 0 {
            return Some(Tick::Running {
                remaining_secs: self.remaining_secs,
            });
        }
        self.owner = None;
        Some(Tick::Completed { owner })
    }
}

/// Render seconds as `MM:SS`. Negative input shows as `00:00`.
pub fn format_mmss(secs: i64) -> String {
    let secs = secs.max(0);
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
