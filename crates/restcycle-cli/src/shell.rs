//! Terminal presentation of the session.
//!
//! The break "window" is a banner plus a countdown line redrawn in place,
//! the confirmation prompt is a question answered with `yes`/`no`, and the
//! settings editor is a draft changed with `set` and committed with `save`.
//! Desktop notifications go through notify-rust.
//!
//! In JSON mode every line on the writer is a JSON object: events as they
//! are, plain messages as `{"type": "Message", "text": ...}`, and no
//! in-place countdown.

use std::io::{self, Write};

use notify_rust::{Notification, Timeout};
use restcycle_core::{format_mmss, Event, Settings, Shell, ShellError};

const APP_NAME: &str = "restcycle";
const NOTIFICATION_ICON: &str = "appointment-soon";
const NOTIFICATION_TIMEOUT_MS: u32 = 3000;

pub struct TerminalShell<W: Write> {
    out: W,
    desktop_notifications: bool,
    json: bool,
    /// The countdown line was drawn without a trailing newline.
    partial_line: bool,
    break_open: bool,
    prompt_open: bool,
    draft: Option<Settings>,
}

impl<W: Write> TerminalShell<W> {
    pub fn new(out: W, desktop_notifications: bool, json: bool) -> Self {
        Self {
            out,
            desktop_notifications,
            json,
            partial_line: false,
            break_open: false,
            prompt_open: false,
            draft: None,
        }
    }

    pub fn json(&self) -> bool {
        self.json
    }

    #[cfg(test)]
    pub fn prompt_open(&self) -> bool {
        self.prompt_open
    }

    #[cfg(test)]
    pub fn draft(&self) -> Option<&Settings> {
        self.draft.as_ref()
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Print one full line.
    pub fn say(&mut self, message: &str) -> io::Result<()> {
        if self.json {
            if message.is_empty() {
                return Ok(());
            }
            let line = serde_json::json!({ "type": "Message", "text": message.trim() });
            return self.write_line(&line.to_string());
        }
        self.write_line(message)
    }

    pub fn print_event(&mut self, event: &Event) -> io::Result<()> {
        let json = serde_json::to_string(event).map_err(io::Error::from)?;
        self.write_line(&json)
    }

    /// Redraw the break countdown in place.
    pub fn render_break(&mut self, remaining_secs: u64) -> io::Result<()> {
        if !self.break_open || self.json {
            return Ok(());
        }
        let secs = i64::try_from(remaining_secs).unwrap_or(i64::MAX);
        write!(self.out, "\r  rest {} ", format_mmss(secs))?;
        self.partial_line = true;
        self.out.flush()
    }

    /// Change one field of the open settings draft.
    pub fn edit(&mut self, key: &str, value: &str) -> Result<Settings, String> {
        let draft = self
            .draft
            .as_mut()
            .ok_or_else(|| "settings editor is not open (type `settings`)".to_string())?;
        draft.set_field(key, value)?;
        Ok(*draft)
    }

    /// The user answered the confirmation prompt.
    pub fn answer_prompt(&mut self) {
        self.prompt_open = false;
    }

    /// Close the editor, handing back the draft for saving.
    pub fn take_draft(&mut self) -> Option<Settings> {
        self.draft.take()
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.end_partial_line()?;
        writeln!(self.out, "{line}")?;
        self.out.flush()
    }

    fn end_partial_line(&mut self) -> io::Result<()> {
        if self.partial_line {
            writeln!(self.out)?;
            self.partial_line = false;
        }
        Ok(())
    }

    fn attention(&mut self, always_on_top: bool) -> io::Result<()> {
        if always_on_top && !self.json {
            write!(self.out, "\x07")?;
        }
        Ok(())
    }

    fn print_settings(&mut self, settings: &Settings) -> io::Result<()> {
        self.say(&format!("  work_minutes       = {}", settings.work_minutes))?;
        self.say(&format!("  rest_minutes       = {}", settings.rest_minutes))?;
        self.say(&format!("  show_notifications = {}", settings.show_notifications))?;
        self.say(&format!("  always_on_top      = {}", settings.always_on_top))
    }
}

impl<W: Write> Shell for TerminalShell<W> {
    fn show_transition(&mut self, event: &Event) -> Result<(), ShellError> {
        if self.json {
            return Ok(self.print_event(event)?);
        }
        if let Event::PhaseChanged {
            from,
            to,
            remaining_secs,
            ..
        } = event
        {
            if to.is_timed() {
                let secs = i64::try_from(*remaining_secs).unwrap_or(i64::MAX);
                self.say(&format!("[{from} -> {to}] {} left", format_mmss(secs)))?;
            } else {
                self.say(&format!("[{from} -> {to}]"))?;
            }
        }
        Ok(())
    }

    fn notify(&mut self, title: &str, body: &str) -> Result<(), ShellError> {
        if body.is_empty() {
            self.say(&format!("* {title}"))?;
        } else {
            self.say(&format!("* {title}: {body}"))?;
        }
        if !self.desktop_notifications {
            return Ok(());
        }
        Notification::new()
            .appname(APP_NAME)
            .summary(title)
            .body(body)
            .icon(NOTIFICATION_ICON)
            .timeout(Timeout::Milliseconds(NOTIFICATION_TIMEOUT_MS))
            .show()
            .map(|_| ())
            .map_err(|e| ShellError::NotificationUnavailable(e.to_string()))
    }

    fn show_break(&mut self, secs: u64, always_on_top: bool) -> Result<(), ShellError> {
        self.attention(always_on_top)?;
        self.say("")?;
        self.say("  ==== Rest your eyes ====")?;
        self.say("  Look at something 20 feet (6 m) away and blink gently.")?;
        self.say("  Type `exit` to leave the break early.")?;
        self.break_open = true;
        self.render_break(secs)?;
        Ok(())
    }

    fn close_break(&mut self) -> Result<(), ShellError> {
        if self.break_open {
            self.break_open = false;
            self.end_partial_line()?;
            self.say("  ==== Break over ====")?;
        }
        Ok(())
    }

    fn prompt_confirmation(&mut self, always_on_top: bool) -> Result<(), ShellError> {
        self.attention(always_on_top)?;
        self.prompt_open = true;
        self.say("Back to work? [yes/no]")?;
        Ok(())
    }

    fn dismiss_prompt(&mut self) -> Result<(), ShellError> {
        if self.prompt_open {
            self.prompt_open = false;
            self.say("(prompt dismissed)")?;
        }
        Ok(())
    }

    fn open_settings(&mut self, current: &Settings) -> Result<(), ShellError> {
        self.draft = Some(*current);
        self.say("Settings (change with `set <key> <value>`, then `save` or `cancel`):")?;
        self.print_settings(current)?;
        Ok(())
    }
}
