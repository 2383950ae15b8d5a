use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use super::TokenPayload;

/// Why a token was accepted or rejected.
///
/// The decision tree is strict and terminal in one call:
/// `MALFORMED_INPUT → DECRYPTION_FAILED → {NOT_YET_VALID | EXPIRED | VALID}`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    Valid,
    NotYetValid,
    Expired,
    DecryptionFailed,
    MalformedInput,
}

impl ReasonCode {
    /// Human-readable message for end users.
    pub fn message(self) -> &'static str {
        match self {
            Self::Valid => "QR code is valid",
            Self::NotYetValid => "QR code is not yet valid",
            Self::Expired => "QR code has expired",
            Self::DecryptionFailed => "QR code is not recognized",
            Self::MalformedInput => "QR code data is missing or malformed",
        }
    }
}

/// Outcome of validating a token. Never stored.
///
/// `payload` is present whenever decryption succeeded, even if the window
/// check failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub reason: ReasonCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<TokenPayload>,
}

impl ValidationResult {
    pub fn malformed() -> Self {
        Self::rejected(ReasonCode::MalformedInput, None)
    }

    pub fn decryption_failed() -> Self {
        Self::rejected(ReasonCode::DecryptionFailed, None)
    }

    pub fn valid(payload: TokenPayload) -> Self {
        Self {
            is_valid: true,
            reason: ReasonCode::Valid,
            payload: Some(payload),
        }
    }

    pub fn rejected(reason: ReasonCode, payload: Option<TokenPayload>) -> Self {
        Self {
            is_valid: false,
            reason,
            payload,
        }
    }

    pub fn message(&self) -> &'static str {
        self.reason.message()
    }
}
