//! Session engine.
//!
//! Owns the phase, the single countdown, the run configuration and the
//! shell. Every user action and every tick goes through [`dispatch`]; the
//! returned effects are applied in order, then the transition callback runs.
//!
//! ## Usage
//!
//! ```ignore
//! let mut session = Session::new(run_config, store, shell);
//! session.on_transition(|event| render(event));
//! session.toggle();
//! // Once per second:
//! session.tick();
//! ```

use chrono::Utc;
use tracing::{debug, warn};

use super::dispatch::{dispatch, Effect, Phase, Trigger};
use crate::error::{SettingsError, ShellError};
use crate::events::Event;
use crate::shell::Shell;
use crate::storage::{RunConfig, Settings, SettingsStore};
use crate::timer::{format_mmss, Countdown, Tick};

type TransitionCallback = Box<dyn FnMut(&Event)>;

pub struct Session<S: Shell> {
    phase: Phase,
    countdown: Countdown,
    config: RunConfig,
    store: SettingsStore,
    shell: S,
    on_transition: Option<TransitionCallback>,
    exit_requested: bool,
}

impl<S: Shell> Session<S> {
    /// New session in `Idle`. Nothing is started until the user activates.
    pub fn new(config: RunConfig, store: SettingsStore, shell: S) -> Self {
        Self {
            phase: Phase::Idle,
            countdown: Countdown::new(),
            config,
            store,
            shell,
            on_transition: None,
            exit_requested: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Seconds left in the active phase; zero outside Working/Resting.
    pub fn remaining_secs(&self) -> u64 {
        if self.phase.is_timed() {
            self.countdown.remaining_secs()
        } else {
            0
        }
    }

    pub fn remaining_display(&self) -> String {
        format_mmss(i64::try_from(self.remaining_secs()).unwrap_or(i64::MAX))
    }

    pub fn run_config(&self) -> &RunConfig {
        &self.config
    }

    pub fn settings(&self) -> Settings {
        self.config.settings
    }

    pub fn store(&self) -> &SettingsStore {
        &self.store
    }

    /// Set once a quit has been processed; the loop should stop.
    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    pub fn shell(&self) -> &S {
        &self.shell
    }

    pub fn shell_mut(&mut self) -> &mut S {
        &mut self.shell
    }

    pub fn into_shell(self) -> S {
        self.shell
    }

    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            phase: self.phase,
            remaining_secs: self.remaining_secs(),
            remaining_display: self.remaining_display(),
            fast_test: self.config.fast_test,
            settings: self.config.settings,
            at: Utc::now(),
        }
    }

    /// Register the transition callback, replacing any previous one.
    pub fn on_transition(&mut self, callback: impl FnMut(&Event) + 'static) {
        self.on_transition = Some(Box::new(callback));
    }

    // ── Commands ─────────────────────────────────────────────────────
    //
    // Each returns whether a transition was applied.

    pub fn toggle(&mut self) -> bool {
        self.fire(Trigger::Toggle)
    }

    pub fn force_break(&mut self) -> bool {
        self.fire(Trigger::ForceBreak)
    }

    pub fn exit_break(&mut self) -> bool {
        self.fire(Trigger::ExitBreak)
    }

    pub fn confirm(&mut self) -> bool {
        self.fire(Trigger::Confirm)
    }

    pub fn decline(&mut self) -> bool {
        self.fire(Trigger::Decline)
    }

    /// Stop whatever is running and ask the loop to exit.
    pub fn quit(&mut self) -> bool {
        self.fire(Trigger::Quit)
    }

    pub fn open_settings(&mut self) {
        let current = self.config.settings;
        let result = self.shell.open_settings(&current);
        report("settings editor", result);
    }

    /// Persist `settings` and adopt them for this run.
    ///
    /// The new values apply even if writing the file fails; the write error
    /// is returned so the editor can tell the user. A running work phase is
    /// restarted with the new length; run-only overrides such as fast-test
    /// mode are dropped.
    ///
    /// # Errors
    /// Returns the store's error when the file could not be written.
    pub fn save_settings(&mut self, settings: Settings) -> Result<(), SettingsError> {
        let settings = settings.clamped();
        let saved = self.store.save(&settings);
        if let Err(e) = &saved {
            warn!(error = %e, "settings not persisted");
        }
        self.config = RunConfig::from_settings(settings);
        self.fire(Trigger::SettingsSaved);
        saved
    }

    /// Advance the active countdown by one second.
    ///
    /// A tick for a countdown that no longer belongs to the current phase
    /// changes nothing.
    pub fn tick(&mut self) -> Option<Tick> {
        let owner = self.countdown.owner()?;
        if owner != self.phase {
            debug!(%owner, phase = %self.phase, "stale tick ignored");
            return None;
        }
        let tick = self.countdown.tick()?;
        if let Tick::Completed { .. } = tick {
            self.fire(Trigger::CountdownCompleted);
        }
        Some(tick)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn fire(&mut self, trigger: Trigger) -> bool {
        let Some(transition) = dispatch(self.phase, trigger, &self.config) else {
            debug!(phase = %self.phase, ?trigger, "trigger does not apply");
            return false;
        };

        let from = self.phase;
        self.phase = transition.next;
        let (internal, presented): (Vec<_>, Vec<_>) =
            transition.effects.into_iter().partition(Effect::is_internal);
        for effect in internal {
            self.apply(effect);
        }
        debug!(%from, to = %self.phase, ?trigger, remaining = self.remaining_secs(), "transition");

        let event = Event::PhaseChanged {
            from,
            to: self.phase,
            trigger,
            remaining_secs: self.remaining_secs(),
            at: Utc::now(),
        };
        report("transition", self.shell.show_transition(&event));
        if let Some(callback) = self.on_transition.as_mut() {
            callback(&event);
        }
        for effect in presented {
            self.apply(effect);
        }
        true
    }

    fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::StartCountdown { phase, secs } => self.countdown.start(phase, secs),
            Effect::CancelCountdown => self.countdown.cancel(),
            Effect::Notify { title, body } => {
                report("notification", self.shell.notify(&title, &body));
            }
            Effect::ShowBreak {
                secs,
                always_on_top,
            } => report("break window", self.shell.show_break(secs, always_on_top)),
            Effect::CloseBreak => report("break window", self.shell.close_break()),
            Effect::PromptConfirmation { always_on_top } => {
                report("confirmation prompt", self.shell.prompt_confirmation(always_on_top));
            }
            Effect::DismissPrompt => report("confirmation prompt", self.shell.dismiss_prompt()),
            Effect::Exit => self.exit_requested = true,
        }
    }
}

/// Central sink for presentation failures.
fn report(what: &str, result: Result<(), ShellError>) {
    match result {
        Ok(()) => {}
        Err(ShellError::NotificationUnavailable(reason)) => {
            debug!(%reason, "notification skipped");
        }
        Err(e) => warn!(what, error = %e, "presentation call failed"),
    }
}
