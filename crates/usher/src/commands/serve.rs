//! `usher serve`: run the HTTP boundary until interrupted.

use tracing::info;

use usher_server::AppState;

use crate::cli::ServeArgs;
use crate::config::{self, Config};
use crate::error::CliError;

pub async fn handle(cfg: &Config, args: &ServeArgs) -> Result<(), CliError> {
    let tokens = cfg.token_service()?;
    let secrets = config::server_secrets(cfg)?;
    let cors = config::cors_policy(cfg);
    let addr = args.bind.unwrap_or(cfg.server.bind);

    info!(
        %addr,
        utc_offset_minutes = cfg.schedule.utc_offset_minutes,
        target_weekday = %cfg.schedule.target_weekday,
        services = ?tokens.scheduler().service_numbers(),
        any_origin = cors.allows_any(),
        "starting usher server"
    );

    let router = usher_server::build_router(AppState::new(tokens, secrets), &cors);
    let listener = usher_server::bind(addr).await?;
    usher_server::serve(listener, router).await?;
    Ok(())
}
