//! The single loop that drives the session.
//!
//! Ticks, typed commands and termination signals are serialized through one
//! `select!`, so no two transitions ever overlap.

use std::future::Future;
use std::io::{self, Write};
use std::time::Duration;

use restcycle_core::{Phase, Session, Tick};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::input::{self, InputCommand};
use crate::shell::TerminalShell;

pub type TerminalSession<W> = Session<TerminalShell<W>>;

/// Run until the session asks to exit, reading commands from stdin.
pub async fn run<W: Write>(session: &mut TerminalSession<W>) {
    let input = BufReader::new(tokio::io::stdin());
    drive(session, input, shutdown_signal()).await;
}

async fn drive<W, R, F>(session: &mut TerminalSession<W>, mut input: R, shutdown: F)
where
    W: Write,
    R: AsyncBufRead + Unpin,
    F: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    ticker.tick().await;

    // Bytes of the line being read; kept across cancelled reads.
    let mut pending = Vec::new();
    let mut input_open = true;
    tokio::pin!(shutdown);

    while !session.exit_requested() {
        tokio::select! {
            _ = ticker.tick() => {
                let result = on_tick(session);
                check_output(session, result);
            }
            read = input.read_until(b'\n', &mut pending), if input_open => match read {
                Ok(0) => {
                    if !pending.is_empty() {
                        take_line(session, &mut pending);
                    }
                    debug!("input closed, quitting");
                    input_open = false;
                    quit(session);
                }
                Ok(_) => take_line(session, &mut pending),
                Err(e) => {
                    warn!(error = %e, "could not read input, quitting");
                    input_open = false;
                    quit(session);
                }
            },
            () = &mut shutdown => {
                info!("termination signal received");
                quit(session);
            }
        }
    }
}

fn quit<W: Write>(session: &mut TerminalSession<W>) {
    if !session.exit_requested() {
        session.quit();
    }
}

/// Terminal write failures never stop the loop. A closed output means
/// nobody is watching, so the session quits.
fn check_output<W: Write>(session: &mut TerminalSession<W>, result: io::Result<()>) {
    match result {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
            warn!("output closed, quitting");
            quit(session);
        }
        Err(e) => warn!(error = %e, "could not write to the terminal"),
    }
}

fn take_line<W: Write>(session: &mut TerminalSession<W>, pending: &mut Vec<u8>) {
    let line = String::from_utf8_lossy(pending).into_owned();
    pending.clear();
    let result = handle_line(session, line.trim_end_matches(['\r', '\n']));
    check_output(session, result);
}

fn on_tick<W: Write>(session: &mut TerminalSession<W>) -> io::Result<()> {
    if let Some(Tick::Running { remaining_secs }) = session.tick() {
        if session.phase() == Phase::Resting {
            session.shell_mut().render_break(remaining_secs)?;
        }
    }
    Ok(())
}

fn handle_line<W: Write>(session: &mut TerminalSession<W>, line: &str) -> io::Result<()> {
    match input::parse(line) {
        Ok(Some(command)) => apply(session, command),
        Ok(None) => print_status(session),
        Err(message) => session.shell_mut().say(message.trim_end()),
    }
}

fn apply<W: Write>(session: &mut TerminalSession<W>, command: InputCommand) -> io::Result<()> {
    let answers_prompt = matches!(command, InputCommand::Yes | InputCommand::No);
    let applied = match command {
        InputCommand::Toggle => session.toggle(),
        InputCommand::ForceBreak => session.force_break(),
        InputCommand::ExitBreak => session.exit_break(),
        InputCommand::Yes => session.confirm(),
        InputCommand::No => session.decline(),
        InputCommand::Quit => session.quit(),
        InputCommand::Status => return print_status(session),
        InputCommand::Settings => {
            session.open_settings();
            return Ok(());
        }
        InputCommand::Set { key, value } => {
            let message = match session.shell_mut().edit(&key, &value) {
                Ok(draft) => format!(
                    "  draft: work {} min, rest {} min, notifications {}, on top {}",
                    draft.work_minutes,
                    draft.rest_minutes,
                    draft.show_notifications,
                    draft.always_on_top
                ),
                Err(e) => e,
            };
            return session.shell_mut().say(&message);
        }
        InputCommand::Save => return save_settings(session),
        InputCommand::Cancel => {
            let message = match session.shell_mut().take_draft() {
                Some(_) => "settings unchanged",
                None => "settings editor is not open",
            };
            return session.shell_mut().say(message);
        }
    };

    if applied && answers_prompt {
        session.shell_mut().answer_prompt();
    } else if !applied {
        let phase = session.phase();
        session
            .shell_mut()
            .say(&format!("not available while {phase}"))?;
    }
    Ok(())
}

fn save_settings<W: Write>(session: &mut TerminalSession<W>) -> io::Result<()> {
    let Some(draft) = session.shell_mut().take_draft() else {
        return session.shell_mut().say("settings editor is not open");
    };
    let message = match session.save_settings(draft) {
        Ok(()) => format!("settings saved to {}", session.store().path().display()),
        Err(e) => format!("settings applied for this run but not saved: {e}"),
    };
    session.shell_mut().say(&message)
}

fn print_status<W: Write>(session: &mut TerminalSession<W>) -> io::Result<()> {
    if session.shell().json() {
        let snapshot = session.snapshot();
        return session.shell_mut().print_event(&snapshot);
    }
    let config = *session.run_config();
    let mut line = format!("{}", session.phase());
    if session.phase().is_timed() {
        line.push_str(&format!(", {} left", session.remaining_display()));
    }
    line.push_str(&format!(
        " (work {}, rest {})",
        config.work_label(),
        config.rest_label()
    ));
    session.shell_mut().say(&line)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "could not listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "could not listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
