use std::path::PathBuf;

use clap::Parser;
use restcycle_core::{Overrides, Session, SettingsStore};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod event_loop;
mod input;
mod shell;

use shell::TerminalShell;

#[derive(Parser)]
#[command(
    name = "restcycle",
    version,
    about = "Work/rest timer that enforces eye breaks"
)]
struct Cli {
    /// Fast test mode: 5-second work and rest phases
    #[arg(long)]
    test: bool,
    /// Work minutes for this run (1-240)
    #[arg(long, value_name = "MINUTES", allow_negative_numbers = true)]
    work: Option<i64>,
    /// Rest minutes for this run (1-120)
    #[arg(long, value_name = "MINUTES", allow_negative_numbers = true)]
    rest: Option<i64>,
    /// Disable notifications for this run
    #[arg(long)]
    no_notify: bool,
    /// Disable the always-on-top hint for this run
    #[arg(long)]
    no_ontop: bool,
    /// Log every transition
    #[arg(long, short)]
    verbose: bool,
    /// Start the work phase right away instead of waiting in idle
    #[arg(long)]
    start: bool,
    /// Settings file (default: ~/.config/restcycle/settings.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Print transitions and status as JSON lines
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            work_minutes: self.work,
            rest_minutes: self.rest,
            no_notify: self.no_notify,
            no_ontop: self.no_ontop,
            fast_test: self.test,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "warn,restcycle=debug,restcycle_core=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> restcycle_core::error::Result<()> {
    let store = match &cli.config {
        Some(path) => SettingsStore::new(path),
        None => SettingsStore::open_default(),
    };
    let config = cli.overrides().apply(store.load());
    info!(path = %store.path().display(), ?config, "starting");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let shell = TerminalShell::new(std::io::stdout(), true, cli.json);
    let mut session = Session::new(config, store, shell);
    if !cli.json {
        let greeting = session
            .shell_mut()
            .say("restcycle ready. Type `toggle` to start, `help` for commands.");
        if let Err(e) = greeting {
            warn!(error = %e, "could not write to the terminal");
        }
    }
    if cli.start {
        session.toggle();
    }

    runtime.block_on(event_loop::run(&mut session));
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
