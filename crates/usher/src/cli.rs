//! Clap derive structures for the `usher` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// usher -- issue and check service-window check-in tokens
#[derive(Debug, Parser)]
#[command(
    name = "usher",
    version,
    about = "Issue and check time-bound check-in tokens for scheduled services",
    long_about = "Issue and check encrypted, time-bound check-in tokens.\n\n\
        A token admits entry only during the service window it was minted for.\n\
        Run the HTTP server with `usher serve`, operate on tokens locally, or\n\
        drive a deployed server with `usher remote`.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Path to the config file
    #[arg(long, env = "USHER_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "USHER_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Evaluate as if it were this instant (RFC 3339, e.g. 2025-01-05T08:30:00+03:00)
    #[arg(long, env = "USHER_AT", global = true)]
    pub at: Option<String>,

    /// Request timeout in seconds for remote calls
    #[arg(long, env = "USHER_TIMEOUT", default_value = "30", global = true)]
    pub timeout: u64,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP server
    Serve(ServeArgs),

    /// Mint a check-in token
    #[command(alias = "gen")]
    Generate(GenerateArgs),

    /// Check whether a token admits entry
    Validate(ValidateArgs),

    /// Show the weekly service table or the window active now
    #[command(alias = "sched")]
    Schedule(ScheduleArgs),

    /// Encrypt JSON data (per-subject with --uid)
    Seal(SealArgs),

    /// Decrypt data produced by `seal`
    Unseal(UnsealArgs),

    /// Call a deployed usher server
    Remote(RemoteArgs),

    /// Manage configuration and stored secrets
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  LOCAL TOKEN OPERATIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Listen address (overrides server.bind)
    #[arg(long, short = 'b', env = "USHER_BIND")]
    pub bind: Option<SocketAddr>,
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Mint for the next occurrence of this service instead of the active one
    #[arg(long, short = 's')]
    pub service: Option<u32>,
}

#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// The token, raw or percent-encoded
    pub token: String,
}

#[derive(Debug, Args)]
pub struct ScheduleArgs {
    /// Show only the window active at the evaluation instant
    #[arg(long)]
    pub active: bool,
}

/// JSON input for sealing: inline, from a file, or from stdin (`-`).
#[derive(Debug, Args)]
pub struct DataInput {
    /// JSON document to encrypt (`-` reads stdin)
    #[arg(conflicts_with = "file")]
    pub data: Option<String>,

    /// Read the JSON document from a file
    #[arg(long, short = 'f')]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct SealArgs {
    /// Derive a per-subject key for this user id
    #[arg(long, short = 'u')]
    pub uid: Option<String>,

    #[command(flatten)]
    pub input: DataInput,
}

#[derive(Debug, Args)]
pub struct UnsealArgs {
    /// User id the data was sealed for
    #[arg(long, short = 'u')]
    pub uid: Option<String>,

    /// Encrypted data as printed by `seal`
    pub encrypted: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  REMOTE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct RemoteArgs {
    /// Server base URL (overrides defaults.remote_url)
    #[arg(long, env = "USHER_REMOTE_URL")]
    pub url: Option<String>,

    #[command(subcommand)]
    pub command: RemoteCommand,
}

#[derive(Debug, Subcommand)]
pub enum RemoteCommand {
    /// Show server name, version, and endpoints
    Info,

    /// Mint a token on the server
    Generate {
        /// Mint for the next occurrence of this service
        #[arg(long, short = 's')]
        service: Option<u32>,
    },

    /// Validate a token on the server
    Validate {
        /// The token, raw or percent-encoded
        token: String,
    },

    /// Encrypt JSON data on the server
    Seal {
        /// Use the per-subject endpoint for this user id
        #[arg(long, short = 'u')]
        uid: Option<String>,

        #[command(flatten)]
        input: DataInput,
    },

    /// Decrypt data on the server
    Unseal {
        /// User id the data was sealed for
        #[arg(long, short = 'u')]
        uid: Option<String>,

        /// Encrypted data
        encrypted: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Write a config file populated with defaults
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Display current resolved configuration
    Show,

    /// Print the config file path
    Path,

    /// Set a configuration value
    Set {
        /// Config key (e.g. "server.bind", "schedule.utc_offset_minutes")
        key: String,

        /// Value to set
        value: String,
    },

    /// Store a secret in the system keyring
    SetSecret {
        /// Which secret to store
        kind: SecretArg,
    },

    /// Remove a secret from the system keyring
    DeleteSecret {
        /// Which secret to remove
        kind: SecretArg,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SecretArg {
    /// Seals check-in tokens
    Qr,
    /// Generic user-data encryption
    UserData,
    /// Per-subject key derivation
    Cache,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
