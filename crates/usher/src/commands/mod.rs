//! Command dispatch: bridges CLI args -> core operations -> output formatting.

pub mod config_cmd;
pub mod remote;
pub mod schedule;
pub mod serve;
pub mod tokens;
pub mod util;
pub mod vault;

use crate::cli::{Command, GlobalOpts};
use crate::config::Config;
use crate::error::CliError;

/// Dispatch a command that works from the loaded config.
pub async fn dispatch(cmd: Command, cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Serve(args) => serve::handle(cfg, &args).await,
        Command::Generate(args) => tokens::generate(cfg, &args, global),
        Command::Validate(args) => tokens::validate(cfg, &args, global),
        Command::Schedule(args) => schedule::handle(cfg, &args, global),
        Command::Seal(args) => vault::seal(cfg, &args, global),
        Command::Unseal(args) => vault::unseal(cfg, &args, global),
        Command::Remote(args) => remote::handle(cfg, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "config and completions are not dispatched".into(),
        )),
    }
}
