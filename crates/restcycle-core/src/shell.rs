//! Boundary between the session and whatever draws it.
//!
//! Implementations render the break window, the confirmation prompt and the
//! settings editor, and deliver desktop notifications. Every call may fail;
//! the session logs the error and carries on.

use crate::error::ShellError;
use crate::events::Event;
use crate::storage::Settings;

pub trait Shell {
    /// Called with the `PhaseChanged` event once the new phase and its
    /// countdown are in place, before any of the transition's own output.
    fn show_transition(&mut self, _event: &Event) -> Result<(), ShellError> {
        Ok(())
    }

    fn notify(&mut self, title: &str, body: &str) -> Result<(), ShellError>;

    /// Open the break window with a `secs` countdown.
    fn show_break(&mut self, secs: u64, always_on_top: bool) -> Result<(), ShellError>;

    fn close_break(&mut self) -> Result<(), ShellError>;

    /// Ask whether to go back to work.
    fn prompt_confirmation(&mut self, always_on_top: bool) -> Result<(), ShellError>;

    fn dismiss_prompt(&mut self) -> Result<(), ShellError>;

    /// Open the settings editor seeded with `current`.
    fn open_settings(&mut self, current: &Settings) -> Result<(), ShellError>;
}
