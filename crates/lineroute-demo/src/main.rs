//! Interactive console built on `lineroute`.
//!
//! Reads lines from the terminal and dispatches them to the example
//! controllers until a handler asks to exit (`Say goodbye to <name>, please.`)
//! or input ends. Type `help` for the list of commands.

mod controllers;
mod ui;

use std::error::Error as _;

use clap::Parser;
use console::Style;
use lineroute::{CommandError, CommandService};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::ui::{Console, TermSecrets, TerminalLines};

/// lineroute demo - route free-form lines to handlers
#[derive(Parser, Debug)]
#[command(name = "lineroute-demo")]
#[command(version)]
#[command(about = "Interactive console demonstrating lineroute routes and controllers")]
struct Cli {
    /// Prompt shown before each input line
    #[arg(long, default_value = "> ")]
    prompt: String,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    verbose: bool,

    /// Execute LINE and exit instead of starting the interactive loop
    #[arg(short = 'c', long = "command", value_name = "LINE")]
    commands: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let out = Console::stdout();
    let err = Console::stderr();

    let service = CommandService::new();
    controllers::register_all(&service, &out, Box::new(TermSecrets::new()))?;
    tracing::debug!(routes = service.route_count(), "demo ready");

    if !cli.commands.is_empty() {
        for line in &cli.commands {
            if let Err(error) = service.execute(line.as_str()) {
                report(&err, &error)?;
            }
            if service.exit_requested() {
                break;
            }
        }
        return Ok(());
    }

    out.line("Type 'help' to show the available commands.")?;
    let mut lines = TerminalLines::new(cli.prompt);
    service.run(&mut lines, |error| {
        if let Err(io) = report(&err, error) {
            tracing::warn!(error = %io, "could not report command error");
        }
    })?;
    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("LINEROUTE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Prints `[ERROR: <kind>] <message>` and the cause chain, in red.
fn report(console: &Console, error: &CommandError) -> std::io::Result<()> {
    let red = Style::new().red();
    for line in error_lines(error) {
        console.styled(line, &red)?;
    }
    Ok(())
}

fn error_lines(error: &CommandError) -> Vec<String> {
    let mut lines = vec![format!("[ERROR: {}] {}", error.kind(), error.message())];
    let mut cause = error.source();
    while let Some(current) = cause {
        lines.push(format!("  caused by: {}", current));
        cause = current.source();
    }
    lines
}
