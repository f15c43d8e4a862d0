//! Transition rules.
//!
//! `dispatch` is a pure function of the current phase, the trigger and the
//! run configuration. It decides the next phase and the ordered side
//! effects; applying them is the [`Session`](super::Session)'s job.
//!
//! ```text
//! Idle -> Working -> Resting -> AwaitingConfirmation -> Working ...
//!   ^        |          |               |
//!   +--------+----------+---------------+   (toggle / decline / quit)
//! ```

use serde::{Deserialize, Serialize};

use crate::storage::RunConfig;
use crate::timer::Countdown;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Working,
    Resting,
    /// Break finished; waiting for the user to say whether to resume.
    AwaitingConfirmation,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Working => "working",
            Phase::Resting => "resting",
            Phase::AwaitingConfirmation => "awaiting confirmation",
        }
    }

    /// Phases that own a running countdown.
    pub fn is_timed(self) -> bool {
        matches!(self, Phase::Working | Phase::Resting)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    /// Activate when idle, deactivate otherwise.
    Toggle,
    ForceBreak,
    /// Leave the break before its countdown ends.
    ExitBreak,
    Confirm,
    /// Decline or dismiss the confirmation prompt.
    Decline,
    CountdownCompleted,
    SettingsSaved,
    Quit,
}

/// Side effect requested by a transition, in execution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StartCountdown { phase: Phase, secs: u64 },
    CancelCountdown,
    Notify { title: String, body: String },
    ShowBreak { secs: u64, always_on_top: bool },
    CloseBreak,
    PromptConfirmation { always_on_top: bool },
    DismissPrompt,
    Exit,
}

impl Effect {
    /// Applied by the session itself rather than handed to the shell.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Effect::StartCountdown { .. } | Effect::CancelCountdown | Effect::Exit
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub next: Phase,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn to(next: Phase) -> Self {
        Self {
            next,
            effects: Vec::new(),
        }
    }

    fn then(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    fn then_all(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }

    fn notify_if(self, enabled: bool, title: &str, body: impl Into<String>) -> Self {
        if enabled {
            self.then(Effect::Notify {
                title: title.to_string(),
                body: body.into(),
            })
        } else {
            self
        }
    }
}

/// Apply the transition table. `None` means the trigger does not apply in
/// this phase and nothing changes.
pub fn dispatch(phase: Phase, trigger: Trigger, config: &RunConfig) -> Option<Transition> {
    use Phase::*;
    use Trigger::*;

    let notify = config.notifications_enabled();
    let transition = match (phase, trigger) {
        (Idle, Toggle) => enter_work(config).notify_if(
            notify,
            "Timer activated",
            format!("Work: {}", config.work_label()),
        ),
        (Idle, ForceBreak) | (Working, CountdownCompleted) => enter_rest(config),
        (Working, ForceBreak) => Transition::to(Resting)
            .then(Effect::CancelCountdown)
            .then_all(enter_rest(config).effects),
        (Working, SettingsSaved) => enter_work(config).notify_if(
            notify,
            "Settings saved",
            "The work cycle was restarted.",
        ),
        (Resting, CountdownCompleted) => Transition::to(AwaitingConfirmation)
            .then(Effect::CloseBreak)
            .then(Effect::PromptConfirmation {
                always_on_top: config.always_on_top(),
            }),
        (Resting, ExitBreak) => Transition::to(AwaitingConfirmation)
            .then(Effect::CancelCountdown)
            .then(Effect::CloseBreak)
            .then(Effect::PromptConfirmation {
                always_on_top: config.always_on_top(),
            }),
        (AwaitingConfirmation, Confirm) => enter_work(config).notify_if(
            notify,
            "Back to work",
            "Restarting the work cycle.",
        ),
        (AwaitingConfirmation, Decline) => Transition::to(Idle),
        (Working | Resting | AwaitingConfirmation, Toggle) => deactivate(phase, config),
        (Idle, Quit) => Transition::to(Idle).then(Effect::Exit),
        (_, Quit) => deactivate(phase, config).then(Effect::Exit),
        _ => return None,
    };
    Some(transition)
}

fn enter_work(config: &RunConfig) -> Transition {
    Transition::to(Phase::Working).then(Effect::StartCountdown {
        phase: Phase::Working,
        secs: config.work_seconds(),
    })
}

/// Shared entry action for a natural and a forced break.
fn enter_rest(config: &RunConfig) -> Transition {
    let secs = config.rest_seconds();
    Transition::to(Phase::Resting)
        .then(Effect::StartCountdown {
            phase: Phase::Resting,
            secs,
        })
        .then(Effect::ShowBreak {
            secs: Countdown::effective_secs(secs),
            always_on_top: config.always_on_top(),
        })
        .notify_if(
            config.notifications_enabled(),
            "Break time",
            config.rest_label(),
        )
}

/// Back to Idle, tearing down whatever the phase had open.
fn deactivate(phase: Phase, config: &RunConfig) -> Transition {
    let cleanup = match phase {
        Phase::Working => vec![Effect::CancelCountdown],
        Phase::Resting => vec![Effect::CancelCountdown, Effect::CloseBreak],
        Phase::AwaitingConfirmation => vec![Effect::DismissPrompt],
        Phase::Idle => Vec::new(),
    };
    Transition::to(Phase::Idle)
        .then_all(cleanup)
        .notify_if(config.notifications_enabled(), "Timer stopped", "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Overrides, Settings};
    use proptest::prelude::*;

    const PHASES: [Phase; 4] = [
        Phase::Idle,
        Phase::Working,
        Phase::Resting,
        Phase::AwaitingConfirmation,
    ];

    const TRIGGERS: [Trigger; 8] = [
        Trigger::Toggle,
        Trigger::ForceBreak,
        Trigger::ExitBreak,
        Trigger::Confirm,
        Trigger::Decline,
        Trigger::CountdownCompleted,
        Trigger::SettingsSaved,
        Trigger::Quit,
    ];

    fn config() -> RunConfig {
        RunConfig::from_settings(Settings::default())
    }

    fn quiet() -> RunConfig {
        Overrides {
            no_notify: true,
            ..Overrides::default()
        }
        .apply(Settings::default())
    }

    fn has_notify(t: &Transition) -> bool {
        t.effects.iter().any(|e| matches!(e, Effect::Notify { .. }))
    }

    #[test]
    fn toggle_from_idle_starts_work() {
        let t = dispatch(Phase::Idle, Trigger::Toggle, &config()).unwrap();
        assert_eq!(t.next, Phase::Working);
        assert_eq!(
            t.effects[0],
            Effect::StartCountdown {
                phase: Phase::Working,
                secs: 20 * 60
            }
        );
        assert!(matches!(&t.effects[1], Effect::Notify { title, .. } if title == "Timer activated"));
    }

    #[test]
    fn natural_and_forced_break_share_entry_action() {
        let natural = dispatch(Phase::Working, Trigger::CountdownCompleted, &config()).unwrap();
        let forced = dispatch(Phase::Working, Trigger::ForceBreak, &config()).unwrap();
        assert_eq!(natural.next, Phase::Resting);
        assert_eq!(forced.next, Phase::Resting);
        assert_eq!(forced.effects[0], Effect::CancelCountdown);
        assert_eq!(&forced.effects[1..], &natural.effects[..]);
        assert_eq!(
            natural.effects[1],
            Effect::ShowBreak {
                secs: 10 * 60,
                always_on_top: true
            }
        );
    }

    #[test]
    fn break_end_and_early_exit_both_prompt() {
        let natural = dispatch(Phase::Resting, Trigger::CountdownCompleted, &config()).unwrap();
        let early = dispatch(Phase::Resting, Trigger::ExitBreak, &config()).unwrap();
        assert_eq!(natural.next, Phase::AwaitingConfirmation);
        assert_eq!(early.next, Phase::AwaitingConfirmation);
        assert!(natural.effects.contains(&Effect::PromptConfirmation { always_on_top: true }));
        assert!(early.effects.contains(&Effect::PromptConfirmation { always_on_top: true }));
        assert!(!has_notify(&natural));
    }

    #[test]
    fn confirmation_answers() {
        let yes = dispatch(Phase::AwaitingConfirmation, Trigger::Confirm, &config()).unwrap();
        assert_eq!(yes.next, Phase::Working);
        assert!(has_notify(&yes));
        let no = dispatch(Phase::AwaitingConfirmation, Trigger::Decline, &config()).unwrap();
        assert_eq!(no.next, Phase::Idle);
        assert!(no.effects.is_empty());
    }

    #[test]
    fn deactivate_cleans_up_per_phase() {
        let working = dispatch(Phase::Working, Trigger::Toggle, &config()).unwrap();
        assert_eq!(working.next, Phase::Idle);
        assert_eq!(working.effects[0], Effect::CancelCountdown);
        let resting = dispatch(Phase::Resting, Trigger::Toggle, &config()).unwrap();
        assert_eq!(&resting.effects[..2], &[Effect::CancelCountdown, Effect::CloseBreak]);
        let waiting = dispatch(Phase::AwaitingConfirmation, Trigger::Toggle, &config()).unwrap();
        assert_eq!(waiting.effects[0], Effect::DismissPrompt);
    }

    #[test]
    fn quit_always_ends_idle_with_exit() {
        for phase in PHASES {
            let t = dispatch(phase, Trigger::Quit, &config()).unwrap();
            assert_eq!(t.next, Phase::Idle);
            assert_eq!(t.effects.last(), Some(&Effect::Exit));
        }
    }

    #[test]
    fn disabled_notifications_emit_none() {
        for phase in PHASES {
            for trigger in TRIGGERS {
                if let Some(t) = dispatch(phase, trigger, &quiet()) {
                    assert!(!has_notify(&t), "{phase:?} + {trigger:?} notified");
                }
            }
        }
    }

    #[test]
    fn fast_test_break_window_shows_substituted_length() {
        let fast = Overrides {
            fast_test: true,
            ..Overrides::default()
        }
        .apply(Settings::default());
        let t = dispatch(Phase::Working, Trigger::CountdownCompleted, &fast).unwrap();
        assert!(t.effects.contains(&Effect::StartCountdown {
            phase: Phase::Resting,
            secs: 0
        }));
        assert!(t.effects.contains(&Effect::ShowBreak {
            secs: 5,
            always_on_top: true
        }));
    }

    #[test]
    fn inapplicable_triggers_are_rejected() {
        let cfg = config();
        assert!(dispatch(Phase::Idle, Trigger::Confirm, &cfg).is_none());
        assert!(dispatch(Phase::Idle, Trigger::CountdownCompleted, &cfg).is_none());
        assert!(dispatch(Phase::Working, Trigger::ExitBreak, &cfg).is_none());
        assert!(dispatch(Phase::Resting, Trigger::ForceBreak, &cfg).is_none());
        assert!(dispatch(Phase::Resting, Trigger::Confirm, &cfg).is_none());
        assert!(dispatch(Phase::AwaitingConfirmation, Trigger::CountdownCompleted, &cfg).is_none());
        assert!(dispatch(Phase::Idle, Trigger::SettingsSaved, &cfg).is_none());
    }

    fn trigger_strategy() -> impl Strategy<Value = Trigger> {
        proptest::sample::select(TRIGGERS.to_vec())
    }

    proptest! {
        #[test]
        fn resting_never_reaches_working_without_confirmation(
            triggers in proptest::collection::vec(trigger_strategy(), 0..64)
        ) {
            let cfg = config();
            let mut phase = Phase::Idle;
            for trigger in triggers {
                if let Some(t) = dispatch(phase, trigger, &cfg) {
                    if phase == Phase::Resting {
                        prop_assert_ne!(t.next, Phase::Working);
                    }
                    if t.next == Phase::Working && phase != Phase::Working {
                        prop_assert!(phase == Phase::Idle || phase == Phase::AwaitingConfirmation);
                    }
                    phase = t.next;
                }
            }
        }
    }
}
