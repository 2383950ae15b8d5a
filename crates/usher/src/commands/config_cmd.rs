//! Config subcommand handlers.

use usher_config::SecretKind;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

const REDACTED: &str = "********";

// ── Helpers ─────────────────────────────────────────────────────────

fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> CliError {
    CliError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

/// A copy safe to print: plaintext secrets are masked.
fn redacted(cfg: &Config) -> Config {
    let mut shown = cfg.clone();
    for source in [
        &mut shown.secrets.qr,
        &mut shown.secrets.user_data,
        &mut shown.secrets.cache,
    ] {
        if source.value.is_some() {
            source.value = Some(REDACTED.into());
        }
    }
    shown
}

/// Apply `key = value` to `cfg`. Keys are `section.field`.
fn set_value(cfg: &mut Config, key: &str, value: String) -> Result<(), CliError> {
    match key {
        "defaults.output" => cfg.defaults.output = value,
        "defaults.color" => cfg.defaults.color = value,
        "defaults.timeout" => {
            cfg.defaults.timeout = value
                .parse()
                .map_err(|_| invalid(key, "must be a number (seconds)"))?;
        }
        "defaults.remote_url" => {
            value
                .parse::<url::Url>()
                .map_err(|e| invalid(key, format!("invalid URL: {e}")))?;
            cfg.defaults.remote_url = Some(value);
        }
        "server.bind" => {
            cfg.server.bind = value
                .parse()
                .map_err(|_| invalid(key, "must be an address like 0.0.0.0:8787"))?;
        }
        "server.allowed_origins" => {
            cfg.server.allowed_origins = value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect();
        }
        "server.cors_max_age_secs" => {
            cfg.server.cors_max_age_secs = value
                .parse()
                .map_err(|_| invalid(key, "must be a number (seconds)"))?;
        }
        "schedule.utc_offset_minutes" => {
            cfg.schedule.utc_offset_minutes = value
                .parse()
                .map_err(|_| invalid(key, "must be a whole number of minutes, e.g. 180"))?;
        }
        "schedule.target_weekday" => {
            cfg.schedule.target_weekday = value
                .parse()
                .map_err(|_| invalid(key, "must be a weekday, e.g. Sun or Sunday"))?;
        }
        "schedule.resource_path" => cfg.schedule.resource_path = value,
        "secrets.qr.env" => cfg.secrets.qr.env = value,
        "secrets.user_data.env" => cfg.secrets.user_data.env = value,
        "secrets.cache.env" => cfg.secrets.cache.env = value,
        other => {
            return Err(invalid(
                other,
                format!(
                    "unknown config key '{other}'. Valid keys: defaults.output, defaults.color, \
                     defaults.timeout, defaults.remote_url, server.bind, server.allowed_origins, \
                     server.cors_max_age_secs, schedule.utc_offset_minutes, \
                     schedule.target_weekday, schedule.resource_path, secrets.<kind>.env"
                ),
            ));
        }
    }
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let path = config::config_file(global);

    match args.command {
        // ── Init ────────────────────────────────────────────────────
        ConfigCommand::Init { force } => {
            if path.exists() && !force {
                return Err(invalid(
                    "config",
                    format!("{} already exists (use --force to overwrite)", path.display()),
                ));
            }
            config::save_config_to(&Config::default(), &path)?;

            eprintln!("✓ Configuration written to {}", path.display());
            eprintln!("  Store secrets with: usher config set-secret qr");
            eprintln!("  (or set {} and friends)", SecretKind::Qr.default_env());
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = redacted(&config::load(global)?);
            let out = output::render_single(
                global.output,
                &cfg,
                |c| toml::to_string_pretty(c).unwrap_or_default(),
                |_| path.display().to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            println!("{}", path.display());
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load(global)?;
            set_value(&mut cfg, &key, value)?;
            cfg.validate()?;
            config::save_config_to(&cfg, &path)?;
            eprintln!("✓ Set {key}");
            Ok(())
        }

        // ── Secrets ─────────────────────────────────────────────────
        ConfigCommand::SetSecret { kind } => {
            let kind = config::secret_kind(kind);
            let secret = rpassword::prompt_password(format!("{kind} secret: ")).map_err(prompt_err)?;
            if secret.is_empty() {
                return Err(invalid("secret", "value cannot be empty"));
            }
            usher_config::store_secret(kind, &secret)?;
            eprintln!("✓ {kind} secret stored in system keyring");
            Ok(())
        }

        ConfigCommand::DeleteSecret { kind } => {
            let kind = config::secret_kind(kind);
            usher_config::delete_secret(kind)?;
            eprintln!("✓ {kind} secret removed from system keyring");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_value_parses_typed_fields() {
        let mut cfg = Config::default();
        set_value(&mut cfg, "server.bind", "127.0.0.1:9000".into()).ok();
        set_value(&mut cfg, "schedule.target_weekday", "Saturday".into()).ok();
        set_value(&mut cfg, "server.allowed_origins", "https://a.example, https://b.example".into()).ok();

        assert_eq!(cfg.server.bind.port(), 9000);
        assert_eq!(cfg.schedule.target_weekday, chrono::Weekday::Sat);
        assert_eq!(
            cfg.server.allowed_origins,
            vec!["https://a.example".to_owned(), "https://b.example".to_owned()]
        );
    }

    #[test]
    fn set_value_rejects_unknown_keys_and_bad_values() {
        let mut cfg = Config::default();
        assert!(set_value(&mut cfg, "server.port", "1".into()).is_err());
        assert!(set_value(&mut cfg, "schedule.utc_offset_minutes", "three".into()).is_err());
        assert!(set_value(&mut cfg, "defaults.remote_url", "not a url".into()).is_err());
    }

    #[test]
    fn show_masks_plaintext_secrets() {
        let mut cfg = Config::default();
        cfg.secrets.qr.value = Some("hunter2".into());

        let shown = redacted(&cfg);
        assert_eq!(shown.secrets.qr.value.as_deref(), Some(REDACTED));
        assert_eq!(shown.secrets.cache.value, None);
    }
}
