// Response bodies returned by the usher HTTP boundary.
//
// Field names follow the server's camelCase JSON. The `success` flag is
// dropped: a successful parse already implies it.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `GET /`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
    pub status: String,
    #[serde(default)]
    pub endpoints: BTreeMap<String, String>,
}

/// The window a generated token is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInfo {
    pub service_number: u32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// `GET /generate-qr` and `GET /generate-qr-for-service`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedQr {
    pub qr_data: String,
    pub service_info: ServiceInfo,
}

/// `POST /validate-qr`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QrValidation {
    pub is_valid: bool,
    pub reason: String,
    #[serde(default)]
    pub payload: Option<Value>,
    #[serde(default)]
    pub valid_from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub valid_until: Option<DateTime<Utc>>,
    pub message: String,
}

/// `POST /secure-encrypt` and `POST /encrypt-user-data`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Encrypted {
    pub encrypted_data: String,
    pub timestamp: DateTime<Utc>,
}

/// `POST /secure-decrypt` and `POST /decrypt-user-data`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Decrypted {
    pub decrypted_data: Value,
}

/// `{success:false, error}` failure body.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
}
