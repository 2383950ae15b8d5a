//! CLI error types with miette diagnostics.
//!
//! Maps core, config, server, and client errors into user-facing errors
//! with actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use usher_config::ConfigError;
use usher_core::CoreError;
use usher_server::ApiError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONFIG: i32 = 3;
    pub const NOT_SCHEDULED: i32 = 4;
    pub const REJECTED: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Schedule ─────────────────────────────────────────────────────

    #[error("No active service at {at}")]
    #[diagnostic(
        code(usher::no_active_service),
        help(
            "Tokens can only be minted during a service window.\n\
             Run: usher schedule  to see the weekly table,\n\
             or:  usher generate --service <N>  to mint for an upcoming service."
        )
    )]
    NoActiveService { at: String },

    #[error("Service {service} is not scheduled on {weekday}")]
    #[diagnostic(
        code(usher::not_scheduled),
        help("Run: usher schedule  to see which services run on which days")
    )]
    NotScheduled { service: u32, weekday: String },

    #[error("Invalid service number: {service}")]
    #[diagnostic(
        code(usher::invalid_service),
        help("Configured services: {available}")
    )]
    InvalidService { service: u32, available: String },

    // ── Tokens ───────────────────────────────────────────────────────

    #[error("Token rejected ({reason}): {message}")]
    #[diagnostic(code(usher::token_rejected))]
    TokenRejected { reason: String, message: String },

    #[error("{message}")]
    #[diagnostic(
        code(usher::decryption_failed),
        help("Check that the data was sealed with the same secret (and --uid, if any).")
    )]
    Decryption { message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(usher::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("No {kind} secret configured")]
    #[diagnostic(
        code(usher::no_secret),
        help(
            "Set the {env} environment variable,\n\
             or store it with: usher config set-secret {kind}"
        )
    )]
    NoSecret { kind: String, env: String },

    #[error("No remote server configured")]
    #[diagnostic(
        code(usher::no_remote),
        help(
            "Pass --url, set USHER_REMOTE_URL,\n\
             or run: usher config set defaults.remote_url <URL>"
        )
    )]
    NoRemote,

    #[error("Configuration error: {0}")]
    #[diagnostic(
        code(usher::config),
        help("Check the config file. Run: usher config path  to locate it.")
    )]
    Config(#[source] ConfigError),

    // ── Remote ───────────────────────────────────────────────────────

    #[error("Could not connect to server at {url}")]
    #[diagnostic(
        code(usher::connection_failed),
        help("Check that the server is running and reachable.\nURL: {url}")
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(usher::timeout),
        help("Increase timeout with --timeout or check server responsiveness.")
    )]
    Timeout { seconds: u64 },

    #[error("Server error ({status}): {message}")]
    #[diagnostic(code(usher::remote))]
    Remote { status: u16, message: String },

    #[error("Unexpected response from server: {message}")]
    #[diagnostic(code(usher::unexpected_response))]
    UnexpectedResponse { message: String },

    // ── Server ───────────────────────────────────────────────────────

    #[error(transparent)]
    #[diagnostic(code(usher::server))]
    Server(#[from] usher_server::ServerError),

    // ── Internal ─────────────────────────────────────────────────────

    #[error("{0}")]
    #[diagnostic(code(usher::internal))]
    Internal(String),

    // ── IO / Serialization ───────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(usher::json), help("Check the JSON input and try again."))]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NoActiveService { .. } | Self::NotScheduled { .. } => exit_code::NOT_SCHEDULED,
            Self::InvalidService { .. } | Self::Validation { .. } => exit_code::USAGE,
            Self::TokenRejected { .. } => exit_code::REJECTED,
            Self::NoSecret { .. } | Self::NoRemote | Self::Config(_) => exit_code::CONFIG,
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError ─────────────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NoActiveService => Self::NoActiveService {
                at: "the requested time".into(),
            },
            CoreError::NotScheduled { service, weekday } => Self::NotScheduled {
                service,
                weekday: weekday.to_string(),
            },
            CoreError::InvalidServiceNumber { service } => Self::InvalidService {
                service,
                available: "(see usher schedule)".into(),
            },
            CoreError::Decryption => Self::Decryption {
                message: "Failed to decrypt data".into(),
            },
            CoreError::InvalidSchedule { message } => Self::Validation {
                field: "schedule".into(),
                reason: message,
            },
            other => Self::Internal(other.to_string()),
        }
    }
}

// ── ConfigError → CliError ───────────────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoSecret { kind, env } => Self::NoSecret {
                kind: kind.to_string(),
                env,
            },
            ConfigError::Io(e) => Self::Io(e),
            other => Self::Config(other),
        }
    }
}

// ── ApiError → CliError ──────────────────────────────────────────────

impl From<ApiError> for CliError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::BadRequest(reason) => Self::Validation {
                field: "data".into(),
                reason,
            },
            ApiError::Crypto(message) => Self::Decryption {
                message: message.into(),
            },
            other => Self::Internal(other.to_string()),
        }
    }
}

// ── usher_api::Error → CliError ──────────────────────────────────────

impl From<usher_api::Error> for CliError {
    fn from(err: usher_api::Error) -> Self {
        match err {
            usher_api::Error::Transport(e) => {
                let url = e
                    .url()
                    .map_or_else(|| "(unknown)".into(), ToString::to_string);
                if e.is_connect() {
                    Self::ConnectionFailed {
                        url,
                        source: Box::new(e),
                    }
                } else {
                    Self::UnexpectedResponse {
                        message: e.to_string(),
                    }
                }
            }
            usher_api::Error::InvalidUrl(e) => Self::Validation {
                field: "url".into(),
                reason: e.to_string(),
            },
            usher_api::Error::Timeout { timeout_secs } => Self::Timeout {
                seconds: timeout_secs,
            },
            usher_api::Error::Api { status, message } => Self::Remote { status, message },
            usher_api::Error::Deserialization { message, .. } => {
                Self::UnexpectedResponse { message }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Weekday;
    use usher_config::SecretKind;

    use super::*;

    #[test]
    fn schedule_errors_share_an_exit_code() {
        assert_eq!(
            CliError::from(CoreError::NoActiveService).exit_code(),
            exit_code::NOT_SCHEDULED
        );
        let err = CliError::from(CoreError::NotScheduled {
            service: 2,
            weekday: Weekday::Mon,
        });
        assert_eq!(err.exit_code(), exit_code::NOT_SCHEDULED);
        assert_eq!(err.to_string(), "Service 2 is not scheduled on Mon");
    }

    #[test]
    fn missing_secret_is_a_config_failure() {
        let err = CliError::from(ConfigError::NoSecret {
            kind: SecretKind::UserData,
            env: "USER_DATA_KEY".into(),
        });
        assert_eq!(err.exit_code(), exit_code::CONFIG);
        assert_eq!(err.to_string(), "No user-data secret configured");
    }

    #[test]
    fn remote_errors_keep_their_status() {
        let err = CliError::from(usher_api::Error::Api {
            status: 400,
            message: "No active service at this time".into(),
        });
        assert_eq!(err.exit_code(), exit_code::GENERAL);
        assert_eq!(
            err.to_string(),
            "Server error (400): No active service at this time"
        );

        let err = CliError::from(usher_api::Error::Timeout { timeout_secs: 5 });
        assert_eq!(err.exit_code(), exit_code::TIMEOUT);
    }

    #[test]
    fn boundary_errors_map_to_usage_and_decryption() {
        let err = CliError::from(ApiError::BadRequest(
            "userData must be a string or object".into(),
        ));
        assert_eq!(err.exit_code(), exit_code::USAGE);

        let err = CliError::from(ApiError::Crypto("Failed to decrypt user data"));
        assert!(matches!(err, CliError::Decryption { .. }));
        assert_eq!(err.to_string(), "Failed to decrypt user data");
    }

    #[test]
    fn rejected_tokens_exit_distinctly() {
        let err = CliError::TokenRejected {
            reason: "EXPIRED".into(),
            message: "QR code has expired".into(),
        };
        assert_eq!(err.exit_code(), exit_code::REJECTED);
    }
}
