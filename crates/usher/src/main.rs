mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::{CommandFactory, FromArgMatches};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    init_tracing(cli.global.verbose, cli.global.log_json);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli, &matches).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8, json: bool) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.with_target(false).init();
    }
}

async fn run(mut cli: Cli, matches: &clap::ArgMatches) -> Result<(), CliError> {
    match cli.command {
        // Config commands manage the file themselves
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        Command::Completions(args) => {
            let mut cmd = Cli::command();
            clap_complete::generate(args.shell, &mut cmd, "usher", &mut std::io::stdout());
            Ok(())
        }

        cmd => {
            let cfg = config::load(&cli.global)?;
            config::apply_defaults(&mut cli.global, &cfg, matches);

            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &cfg, &cli.global).await
        }
    }
}
