//! # restcycle Core Library
//!
//! Business logic for the restcycle eye-break timer: a work countdown, a
//! forced break with its own countdown, and a confirmation step before the
//! next work phase. The `restcycle` binary is a thin terminal shell over
//! this crate.
//!
//! ## Architecture
//!
//! - **Countdown**: a whole-second counter advanced by the caller's 1 Hz tick
//! - **Session**: the phase state machine; a pure `dispatch` function decides
//!   transitions and the [`Session`] applies their effects
//! - **Storage**: TOML-based settings with clamping and silent recovery
//! - **Shell**: trait the presentation layer implements
//!
//! ## Key Components
//!
//! - [`Session`]: phase state machine and collaborator interface
//! - [`Countdown`]: the single active countdown
//! - [`SettingsStore`]: settings persistence
//! - [`Shell`]: presentation boundary

pub mod error;
pub mod events;
pub mod session;
pub mod shell;
pub mod storage;
pub mod timer;

pub use error::{CoreError, SettingsError, ShellError};
pub use events::Event;
pub use session::{dispatch, Effect, Phase, Session, Transition, Trigger};
pub use shell::Shell;
pub use storage::{Overrides, RunConfig, Settings, SettingsStore};
pub use timer::{format_mmss, Countdown, Tick, FAST_TEST_SECONDS};
