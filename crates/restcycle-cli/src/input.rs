//! Interactive commands typed while the timer runs.

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(multicall = true)]
pub struct InputLine {
    #[command(subcommand)]
    pub command: InputCommand,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum InputCommand {
    /// Start or stop the work/rest cycle
    #[command(visible_alias = "t")]
    Toggle,
    /// Take a break right now
    #[command(name = "break", visible_alias = "b")]
    ForceBreak,
    /// Leave the current break early
    #[command(name = "exit", visible_alias = "x")]
    ExitBreak,
    /// Go back to work after a break
    #[command(visible_alias = "y")]
    Yes,
    /// Stay idle after a break
    #[command(visible_alias = "n")]
    No,
    /// Show the current phase and time left
    #[command(visible_alias = "s")]
    Status,
    /// Open the settings editor
    Settings,
    /// Change a value in the settings editor
    Set {
        /// work_minutes, rest_minutes, show_notifications or always_on_top
        key: String,
        value: String,
    },
    /// Save the edited settings and apply them
    Save,
    /// Close the settings editor without saving
    Cancel,
    /// Stop the timer and exit
    #[command(visible_alias = "q")]
    Quit,
}

/// Parse one line. `Ok(None)` for a blank line; `Err` carries clap's
/// rendered message (including `help` output).
pub fn parse(line: &str) -> Result<Option<InputCommand>, String> {
    let words: Vec<&str> = line.split_whitespace().collect();
    if words.is_empty() {
        return Ok(None);
    }
    InputLine::try_parse_from(words)
        .map(|parsed| Some(parsed.command))
        .map_err(|e| e.render().to_string())
}
