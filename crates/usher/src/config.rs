//! CLI configuration: thin wrapper around `usher_config` shared types.
//!
//! Adds resolution that respects `GlobalOpts` overrides (`--config`,
//! `--at`, `--url`) and translates the file into server runtime types.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use clap::ArgMatches;
use clap::ValueEnum;
use clap::parser::ValueSource;
use secrecy::SecretString;
use tracing::warn;

use usher_config::SecretKind;
use usher_server::{CorsPolicy, ServerSecrets};

use crate::cli::{ColorMode, GlobalOpts, OutputFormat, SecretArg};
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use usher_config::{Config, load_config_from, resolve_secret, save_config_to};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Config file location: `--config` / `USHER_CONFIG`, else the platform default.
pub fn config_file(global: &GlobalOpts) -> PathBuf {
    global.config.clone().unwrap_or_else(usher_config::config_path)
}

/// Load and validate the config. A missing file yields defaults.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    Ok(load_config_from(&config_file(global))?)
}

/// Fill flags the user left at their clap default from `[defaults]`.
pub fn apply_defaults(global: &mut GlobalOpts, cfg: &Config, matches: &ArgMatches) {
    let defaulted = |id: &str| {
        matches!(
            matches.value_source(id),
            None | Some(ValueSource::DefaultValue)
        )
    };

    if defaulted("output") {
        match OutputFormat::from_str(&cfg.defaults.output, true) {
            Ok(format) => global.output = format,
            Err(e) => warn!(value = %cfg.defaults.output, error = %e, "ignoring defaults.output"),
        }
    }
    if defaulted("color") {
        match ColorMode::from_str(&cfg.defaults.color, true) {
            Ok(mode) => global.color = mode,
            Err(e) => warn!(value = %cfg.defaults.color, error = %e, "ignoring defaults.color"),
        }
    }
    if defaulted("timeout") {
        global.timeout = cfg.defaults.timeout;
    }
}

/// The instant to evaluate against: `--at` if given, otherwise now.
pub fn evaluation_instant(global: &GlobalOpts) -> Result<DateTime<Utc>, CliError> {
    match global.at.as_deref() {
        None => Ok(Utc::now()),
        Some(raw) => DateTime::parse_from_rfc3339(raw.trim())
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| CliError::Validation {
                field: "--at".into(),
                reason: format!("expected an RFC 3339 timestamp: {e}"),
            }),
    }
}

pub fn secret(cfg: &Config, kind: SecretArg) -> Result<SecretString, CliError> {
    Ok(resolve_secret(cfg, secret_kind(kind))?)
}

pub fn secret_kind(arg: SecretArg) -> SecretKind {
    match arg {
        SecretArg::Qr => SecretKind::Qr,
        SecretArg::UserData => SecretKind::UserData,
        SecretArg::Cache => SecretKind::Cache,
    }
}

/// Resolve all three server secrets, failing on the first one missing.
pub fn server_secrets(cfg: &Config) -> Result<ServerSecrets, CliError> {
    Ok(ServerSecrets::new(
        secret(cfg, SecretArg::Qr)?,
        secret(cfg, SecretArg::UserData)?,
        secret(cfg, SecretArg::Cache)?,
    ))
}

pub fn cors_policy(cfg: &Config) -> CorsPolicy {
    CorsPolicy {
        allowed_origins: cfg.server.allowed_origins.clone(),
        max_age: Duration::from_secs(cfg.server.cors_max_age_secs),
    }
}

/// Remote base URL: `--url` / `USHER_REMOTE_URL`, then `defaults.remote_url`.
pub fn remote_url(flag: Option<&str>, cfg: &Config) -> Result<url::Url, CliError> {
    let raw = flag
        .or(cfg.defaults.remote_url.as_deref())
        .ok_or(CliError::NoRemote)?;
    raw.parse().map_err(|_| CliError::Validation {
        field: "url".into(),
        reason: format!("invalid URL: {raw}"),
    })
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["usher"];
        argv.extend_from_slice(args);
        argv.extend_from_slice(&["schedule"]);
        Cli::try_parse_from(argv).map(|cli| cli.global).unwrap_or_else(|e| panic!("{e}"))
    }

    #[test]
    fn at_flag_accepts_offsets() {
        let g = global(&["--at", "2025-01-05T08:30:00+03:00"]);
        let at = evaluation_instant(&g).ok();
        assert_eq!(
            at.map(|t| t.to_rfc3339()).as_deref(),
            Some("2025-01-05T05:30:00+00:00")
        );
    }

    #[test]
    fn at_flag_rejects_garbage() {
        let g = global(&["--at", "next sunday"]);
        assert!(matches!(
            evaluation_instant(&g),
            Err(CliError::Validation { .. })
        ));
    }

    #[test]
    fn remote_flag_beats_config() {
        let mut cfg = Config::default();
        cfg.defaults.remote_url = Some("https://config.example".into());

        let url = remote_url(Some("https://flag.example"), &cfg).ok();
        assert_eq!(url.map(String::from).as_deref(), Some("https://flag.example/"));

        let url = remote_url(None, &cfg).ok();
        assert_eq!(url.map(String::from).as_deref(), Some("https://config.example/"));

        assert!(matches!(
            remote_url(None, &Config::default()),
            Err(CliError::NoRemote)
        ));
    }

    #[test]
    fn config_defaults_fill_only_unset_flags() {
        use clap::{CommandFactory, FromArgMatches};

        let mut cfg = Config::default();
        cfg.defaults.output = "yaml".into();
        cfg.defaults.timeout = 5;

        let matches = Cli::command()
            .try_get_matches_from(["usher", "--timeout", "60", "schedule"])
            .unwrap_or_else(|e| panic!("{e}"));
        let mut cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| panic!("{e}"));
        apply_defaults(&mut cli.global, &cfg, &matches);

        assert!(matches!(cli.global.output, OutputFormat::Yaml));
        assert_eq!(cli.global.timeout, 60);
    }

    #[test]
    fn cors_policy_mirrors_server_section() {
        let policy = cors_policy(&Config::default());
        assert_eq!(policy.allowed_origins, vec!["*".to_owned()]);
        assert_eq!(policy.max_age, Duration::from_secs(86_400));
    }
}
