use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ServiceWindow, serialize_instant};

/// The plaintext sealed inside every check-in token.
///
/// This is the sole unit of trust: nothing outside the ciphertext carries
/// authority. Keys are kept to single letters on the wire to keep QR codes
/// small and readable by clients already deployed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPayload {
    #[serde(rename = "x", serialize_with = "serialize_instant")]
    pub window_start: DateTime<Utc>,

    #[serde(rename = "y", serialize_with = "serialize_instant")]
    pub window_end: DateTime<Utc>,

    /// What the token authorizes (the check-in landing path).
    #[serde(rename = "u")]
    pub resource_path: String,

    #[serde(rename = "s", default, skip_serializing_if = "Option::is_none")]
    pub service_number: Option<u32>,
}

impl TokenPayload {
    /// Build the payload for a scheduled window.
    pub fn for_window(window: &ServiceWindow, resource_path: impl Into<String>) -> Self {
        Self {
            window_start: window.start,
            window_end: window.end,
            resource_path: resource_path.into(),
            service_number: Some(window.service_number),
        }
    }

    /// `windowStart < windowEnd`. A payload failing this was not issued by us.
    pub fn is_well_formed(&self) -> bool {
        self.window_start < self.window_end
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn serializes_with_compact_keys_and_millisecond_instants() {
        let payload = TokenPayload {
            window_start: Utc.with_ymd_and_hms(2025, 1, 5, 5, 0, 0).unwrap(),
            window_end: Utc.with_ymd_and_hms(2025, 1, 5, 7, 15, 0).unwrap(),
            resource_path: "/qrcode/scan".into(),
            service_number: Some(1),
        };

        let json = serde_json::to_string(&payload).unwrap();
        assert_eq!(
            json,
            r#"{"x":"2025-01-05T05:00:00.000Z","y":"2025-01-05T07:15:00.000Z","u":"/qrcode/scan","s":1}"#
        );
    }

    #[test]
    fn accepts_payloads_without_service_number() {
        let json = r#"{"x":"2025-01-05T05:00:00Z","y":"2025-01-05T07:00:00.000Z","u":"/qrcode/scan"}"#;
        let payload: TokenPayload = serde_json::from_str(json).unwrap();

        assert_eq!(payload.service_number, None);
        assert!(payload.is_well_formed());
    }
}
