// ── Boundary operations ──
//
// What each endpoint does, independent of how the request arrived. The
// fetch handlers and the RPC-callable adapter both call into here, so the
// two entry points cannot drift apart.

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use usher_core::{
    IssuedToken, ReasonCode, ServiceWindow, TokenCipher, TokenPayload, ValidationResult,
    format_instant,
};

use crate::error::ApiError;
use crate::state::AppState;

// ── Response bodies ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrResponse {
    pub success: bool,
    pub qr_data: String,
    pub service_info: ServiceWindow,
}

impl From<IssuedToken> for QrResponse {
    fn from(issued: IssuedToken) -> Self {
        Self {
            success: true,
            qr_data: issued.token.into_string(),
            service_info: issued.window,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateResponse {
    pub success: bool,
    pub is_valid: bool,
    pub reason: ReasonCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<TokenPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<String>,
    pub message: String,
}

impl From<ValidationResult> for ValidateResponse {
    fn from(result: ValidationResult) -> Self {
        let message = result.message().to_owned();
        let valid_from = result.payload.as_ref().map(|p| format_instant(&p.window_start));
        let valid_until = result.payload.as_ref().map(|p| format_instant(&p.window_end));
        Self {
            success: true,
            is_valid: result.is_valid,
            reason: result.reason,
            payload: result.payload,
            valid_from,
            valid_until,
            message,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedResponse {
    pub success: bool,
    pub encrypted_data: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecryptedResponse {
    pub success: bool,
    pub decrypted_data: Value,
}

// ── Input helpers ───────────────────────────────────────────────────

/// A JSON field counts as present unless it is absent, `null`, or `""`.
pub(crate) fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null() && v.as_str() != Some(""))
}

pub(crate) fn present_str(value: Option<&Value>) -> Option<&str> {
    present(value).and_then(Value::as_str)
}

/// Parse a service number from a query string or callable argument.
pub(crate) fn parse_service(value: &Value) -> Result<u32, ApiError> {
    let invalid = || ApiError::BadRequest("service must be a positive integer".into());
    let number = match value {
        Value::Number(n) => n.as_u64().ok_or_else(invalid)?,
        Value::String(s) => s.trim().parse::<u64>().map_err(|_| invalid())?,
        _ => return Err(invalid()),
    };
    u32::try_from(number).map_err(|_| invalid())
}

// ── QR tokens ───────────────────────────────────────────────────────

pub fn generate_now(state: &AppState) -> Result<QrResponse, ApiError> {
    let issued = state
        .tokens()
        .generate_for_now(state.now(), &state.secrets().qr)?;
    Ok(issued.into())
}

pub fn generate_for_service(state: &AppState, service: u32) -> Result<QrResponse, ApiError> {
    let issued = state
        .tokens()
        .generate_for_service(service, state.now(), &state.secrets().qr)?;
    Ok(issued.into())
}

/// Never fails; an absent token validates as `MALFORMED_INPUT`.
pub fn validate(state: &AppState, qr_data: Option<&str>) -> ValidateResponse {
    let result = state
        .tokens()
        .validate(qr_data.unwrap_or_default(), &state.secrets().qr, state.now());
    debug!(reason = %result.reason, "validated QR token");
    result.into()
}

// ── Generic user data ───────────────────────────────────────────────

/// Serialize caller data for the user-data key. Strings must already hold
/// JSON and are sealed as-is; objects and arrays are serialized.
pub fn user_data_text(user_data: &Value) -> Result<String, ApiError> {
    match user_data {
        Value::String(text) => {
            serde_json::from_str::<Value>(text)
                .map_err(|_| ApiError::BadRequest("userData must be valid JSON string".into()))?;
            Ok(text.clone())
        }
        Value::Object(_) | Value::Array(_) => Ok(user_data.to_string()),
        _ => Err(ApiError::BadRequest(
            "userData must be a string or object".into(),
        )),
    }
}

pub fn sealed(
    cipher: &TokenCipher,
    plaintext: &str,
    now: DateTime<Utc>,
) -> Result<EncryptedResponse, ApiError> {
    let token = cipher.encrypt(plaintext.as_bytes())?;
    Ok(EncryptedResponse {
        success: true,
        encrypted_data: token.into_string(),
        timestamp: format_instant(&now),
    })
}

pub fn opened(
    cipher: &TokenCipher,
    encrypted: &str,
    failure: &'static str,
) -> Result<DecryptedResponse, ApiError> {
    let plaintext = cipher.decrypt(encrypted).map_err(|_| ApiError::Crypto(failure))?;
    let decrypted_data = serde_json::from_slice(&plaintext).map_err(|e| {
        debug!(error = %e, "decrypted data is not JSON");
        ApiError::Crypto(failure)
    })?;
    Ok(DecryptedResponse {
        success: true,
        decrypted_data,
    })
}

pub fn encrypt_user_data(state: &AppState, user_data: &Value) -> Result<EncryptedResponse, ApiError> {
    let text = user_data_text(user_data)?;
    sealed(
        &TokenCipher::from_secret(&state.secrets().user_data),
        &text,
        state.now(),
    )
}

pub fn decrypt_user_data(state: &AppState, encrypted: &str) -> Result<DecryptedResponse, ApiError> {
    opened(
        &TokenCipher::from_secret(&state.secrets().user_data),
        encrypted,
        "Failed to decrypt user data",
    )
}

// ── Per-subject data ────────────────────────────────────────────────

/// PBKDF2 is deliberately slow; keep it off the async workers.
async fn subject_cipher(uid: &str, secret: &SecretString) -> Result<TokenCipher, ApiError> {
    let uid = uid.to_owned();
    let secret = SecretString::from(secret.expose_secret().to_owned());
    tokio::task::spawn_blocking(move || TokenCipher::for_subject(&uid, &secret))
        .await
        .map_err(|e| ApiError::Internal(format!("key derivation task failed: {e}")))
}

pub async fn secure_encrypt(
    state: &AppState,
    uid: &str,
    user_data: &Value,
) -> Result<EncryptedResponse, ApiError> {
    let now = state.now();
    let cipher = subject_cipher(uid, &state.secrets().cache).await?;
    sealed(&cipher, &user_data.to_string(), now)
}

pub async fn secure_decrypt(
    state: &AppState,
    uid: &str,
    encrypted: &str,
) -> Result<DecryptedResponse, ApiError> {
    let cipher = subject_cipher(uid, &state.secrets().cache).await?;
    opened(&cipher, encrypted, "Failed to decrypt data securely")
}
