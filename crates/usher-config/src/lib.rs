//! Shared configuration for the usher server and CLI.
//!
//! TOML file + `USHER_` environment layering, secret resolution
//! (env + keyring + plaintext), and translation of the schedule section
//! into a `usher_core::QrTokenService`.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use chrono::Weekday;
use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use thiserror::Error;

use usher_core::{DEFAULT_RESOURCE_PATH, QrTokenService, ServiceScheduler, WeeklySchedule};

/// Keyring service name under which every secret is stored.
pub const KEYRING_SERVICE: &str = "usher";

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "USHER_CONFIG";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no {kind} secret configured (set {env}, store it in the keyring, or add it to the config file)")]
    NoSecret { kind: SecretKind, env: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration shared by the server and the CLI.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// CLI defaults.
    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub schedule: ScheduleSection,

    #[serde(default)]
    pub secrets: SecretsSection,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Request timeout for remote calls, in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Base URL of a deployed server, used by `usher remote`.
    pub remote_url: Option<String>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
            remote_url: None,
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// HTTP boundary settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSection {
    #[serde(default = "default_bind")]
    pub bind: SocketAddr,

    /// Origins allowed by CORS. `"*"` allows any origin.
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,

    #[serde(default = "default_cors_max_age")]
    pub cors_max_age_secs: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            allowed_origins: default_allowed_origins(),
            cors_max_age_secs: default_cors_max_age(),
        }
    }
}

fn default_bind() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, 8787))
}
fn default_allowed_origins() -> Vec<String> {
    vec!["*".into()]
}
fn default_cors_max_age() -> u64 {
    86_400
}

/// The weekly service table and how it maps onto UTC.
///
/// Days present in the file replace the default table's day; to drop the
/// default Sunday services set `sunday = []`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScheduleSection {
    /// Fixed offset of local time east of UTC. No DST.
    #[serde(default = "default_utc_offset")]
    pub utc_offset_minutes: i32,

    /// Weekday used when pre-generating tokens for a numbered service.
    #[serde(default = "default_target_weekday")]
    pub target_weekday: Weekday,

    #[serde(default = "default_resource_path")]
    pub resource_path: String,

    #[serde(default = "WeeklySchedule::sunday_services")]
    pub weekly: WeeklySchedule,
}

impl Default for ScheduleSection {
    fn default() -> Self {
        Self {
            utc_offset_minutes: default_utc_offset(),
            target_weekday: default_target_weekday(),
            resource_path: default_resource_path(),
            weekly: WeeklySchedule::sunday_services(),
        }
    }
}

fn default_utc_offset() -> i32 {
    180
}
fn default_target_weekday() -> Weekday {
    Weekday::Sun
}
fn default_resource_path() -> String {
    DEFAULT_RESOURCE_PATH.into()
}

/// Where each server secret comes from.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SecretsSection {
    #[serde(default = "SecretSource::qr")]
    pub qr: SecretSource,

    #[serde(default = "SecretSource::user_data")]
    pub user_data: SecretSource,

    #[serde(default = "SecretSource::cache")]
    pub cache: SecretSource,
}

impl Default for SecretsSection {
    fn default() -> Self {
        Self {
            qr: SecretSource::qr(),
            user_data: SecretSource::user_data(),
            cache: SecretSource::cache(),
        }
    }
}

impl SecretsSection {
    pub fn source(&self, kind: SecretKind) -> &SecretSource {
        match kind {
            SecretKind::Qr => &self.qr,
            SecretKind::UserData => &self.user_data,
            SecretKind::Cache => &self.cache,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SecretSource {
    /// Environment variable holding the secret.
    pub env: String,

    /// Plaintext secret (prefer keyring or env var).
    pub value: Option<String>,
}

impl SecretSource {
    fn named(env: &str) -> Self {
        Self {
            env: env.into(),
            value: None,
        }
    }

    fn qr() -> Self {
        Self::named(SecretKind::Qr.default_env())
    }

    fn user_data() -> Self {
        Self::named(SecretKind::UserData.default_env())
    }

    fn cache() -> Self {
        Self::named(SecretKind::Cache.default_env())
    }
}

/// The three independent server secrets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum SecretKind {
    /// Seals service-window check-in tokens.
    Qr,
    /// Generic user-data encryption (`encrypt-user-data`).
    UserData,
    /// Per-subject key derivation (`secure-encrypt` / `secure-decrypt`).
    Cache,
}

impl SecretKind {
    pub fn default_env(self) -> &'static str {
        match self {
            Self::Qr => "QR_SECRET_KEY",
            Self::UserData => "USER_DATA_KEY",
            Self::Cache => "CACHE_SECRET_KEY",
        }
    }

    /// Account name inside the [`KEYRING_SERVICE`] keyring entry.
    pub fn keyring_user(self) -> String {
        format!("{self}-secret")
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path: `USHER_CONFIG`, then XDG / platform conventions.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    ProjectDirs::from("org", "usher", "usher").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("usher");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from `path` + environment.
///
/// A missing file is not an error; defaults and environment still apply.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("USHER_").split("__"));

    let config: Config = figment.extract()?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Reject tables the scheduler would refuse, bad resource paths, and
    /// an empty origin list.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.token_service().map(drop)?;

        if !self.schedule.resource_path.starts_with('/') {
            return Err(ConfigError::Validation {
                field: "schedule.resource_path".into(),
                reason: format!("must start with '/', got '{}'", self.schedule.resource_path),
            });
        }
        if self.server.allowed_origins.is_empty() {
            return Err(ConfigError::Validation {
                field: "server.allowed_origins".into(),
                reason: "at least one origin is required (use \"*\" for any)".into(),
            });
        }
        Ok(())
    }

    /// Build the token service described by the `[schedule]` section.
    pub fn token_service(&self) -> Result<QrTokenService, ConfigError> {
        let schedule = &self.schedule;
        let scheduler =
            ServiceScheduler::from_offset_minutes(schedule.weekly.clone(), schedule.utc_offset_minutes)
                .map_err(|e| ConfigError::Validation {
                    field: "schedule".into(),
                    reason: e.to_string(),
                })?;
        Ok(QrTokenService::new(
            scheduler,
            schedule.resource_path.clone(),
            schedule.target_weekday,
        ))
    }
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize `cfg` as pretty TOML, creating parent directories.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Secret resolution ───────────────────────────────────────────────

/// Resolve a secret from the chain: env var, then keyring, then plaintext.
pub fn resolve_secret(cfg: &Config, kind: SecretKind) -> Result<SecretString, ConfigError> {
    resolve_secret_with(cfg, kind, keyring_secret)
}

fn keyring_secret(kind: SecretKind) -> Option<String> {
    keyring::Entry::new(KEYRING_SERVICE, &kind.keyring_user())
        .and_then(|entry| entry.get_password())
        .ok()
}

fn resolve_secret_with(
    cfg: &Config,
    kind: SecretKind,
    keyring: impl FnOnce(SecretKind) -> Option<String>,
) -> Result<SecretString, ConfigError> {
    let source = cfg.secrets.source(kind);

    // 1. Env var
    if let Ok(val) = std::env::var(&source.env) {
        if !val.is_empty() {
            return Ok(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Some(secret) = keyring(kind) {
        return Ok(SecretString::from(secret));
    }

    // 3. Plaintext in config
    if let Some(ref value) = source.value {
        return Ok(SecretString::from(value.clone()));
    }

    Err(ConfigError::NoSecret {
        kind,
        env: source.env.clone(),
    })
}

/// Store a secret in the system keyring.
pub fn store_secret(kind: SecretKind, value: &str) -> Result<(), ConfigError> {
    keyring::Entry::new(KEYRING_SERVICE, &kind.keyring_user())?.set_password(value)?;
    Ok(())
}

/// Remove a secret from the system keyring. Missing entries are not an error.
pub fn delete_secret(kind: SecretKind) -> Result<(), ConfigError> {
    match keyring::Entry::new(KEYRING_SERVICE, &kind.keyring_user())?.delete_credential() {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(e.into()),
    }
}
