//! ve-fields - entity field filtering and value resolution CLI.
//!
//! Commands:
//! - `ve-fields filter --schema <file> [--criteria <json>] [--selector]`
//! - `ve-fields resolve --record <file> --descriptor <json> [--locale <locale>] [--render]`
//! - `ve-fields summarize --schema <file> --record <file>`
//! - `ve-fields locales --record <file> [--template-locale <locale>...]`
//!
//! Exit codes:
//! - 0: Success
//! - 1: Error

use clap::Parser;
use tracing_subscriber::EnvFilter;

use ve_fields::commands;
use ve_fields::Cli;
use visual_editor_fields::EngineConfig;

fn main() {
    let cli = Cli::parse();

    let filter = if cli.debug {
        EnvFilter::new("ve_fields=debug,visual_editor_fields=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();

    std::process::exit(result_to_exit(run(&cli)));
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = EngineConfig::load(cli.config.as_deref())?;
    let output = commands::run(&cli.command, &config)?;
    println!("{}", commands::render(&output, cli.format)?);
    Ok(())
}

/// Convert a `Result<(), E: Display>` to an exit code.
fn result_to_exit<E: std::fmt::Display>(result: Result<(), E>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    }
}
