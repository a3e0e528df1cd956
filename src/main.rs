mod cli;
mod dispatcher;

use clap::{CommandFactory, Parser};
use colored::Colorize;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use dispatcher::{dispatch_command, Context};
use resico::config::Config;
use resico::error::TaxError;

fn main() -> ExitCode {
    // Logs go to stderr so JSON on stdout stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {:#}", "Error:".red().bold(), err);
            // Bad input is the caller's fault; anything else is ours
            match err.downcast_ref::<TaxError>() {
                Some(tax_err) if tax_err.is_invalid_input() => ExitCode::from(2),
                _ => ExitCode::FAILURE,
            }
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load()?;
    let ctx = Context::resolve(&cli, &config);

    match cli.command {
        Some(command) => dispatch_command(command, &ctx),
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    }
}
