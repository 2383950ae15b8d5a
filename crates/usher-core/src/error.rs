// ── Core error types ──
//
// Failures surfaced by the scheduler, the cipher, and the token service.
// Validation outcomes are NOT errors -- `QrTokenService::validate` always
// returns a `ValidationResult`. These variants cover generation, key use,
// and schedule construction.

use chrono::Weekday;
use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Domain errors ────────────────────────────────────────────────
    #[error("No active service at this time")]
    NoActiveService,

    #[error("Invalid service number: {service}")]
    InvalidServiceNumber { service: u32 },

    #[error("Service {service} is not scheduled on {weekday}")]
    NotScheduled { service: u32, weekday: Weekday },

    // ── Cryptographic errors ─────────────────────────────────────────
    /// The cipher primitive failed while sealing. Internal fault.
    #[error("Encryption failed: {reason}")]
    Encryption { reason: String },

    /// Malformed encoding, wrong key, or tampered ciphertext.
    ///
    /// Deliberately carries no detail: callers must not be able to tell
    /// these cases apart.
    #[error("Decryption failed")]
    Decryption,

    // ── Schedule errors ──────────────────────────────────────────────
    #[error("Invalid schedule: {message}")]
    InvalidSchedule { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("payload serialization failed: {err}"))
    }
}
