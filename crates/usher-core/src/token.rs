// ── QR token service ──
//
// Composes the scheduler and the cipher into the two user-facing
// operations. Generation: window → payload → JSON → opaque token.
// Validation runs the same path backwards and ends in a time-window check.

use chrono::{DateTime, Utc, Weekday};
use secrecy::SecretString;
use tracing::{debug, info};

use crate::cipher::{OpaqueToken, TokenCipher};
use crate::error::CoreError;
use crate::model::{ReasonCode, ServiceWindow, TokenPayload, ValidationResult};
use crate::schedule::ServiceScheduler;
use crate::transport::decode_transport;

/// Default resource path sealed into every token.
pub const DEFAULT_RESOURCE_PATH: &str = "/qrcode/scan";

/// A freshly minted token plus the window it is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: OpaqueToken,
    pub window: ServiceWindow,
}

/// Stateless token issuer and validator.
///
/// One instance is shared by every adapter (HTTP handlers, the RPC-callable
/// endpoint, and the CLI). `now` and the secret are always passed in.
#[derive(Debug, Clone)]
pub struct QrTokenService {
    scheduler: ServiceScheduler,
    resource_path: String,
    target_weekday: Weekday,
}

impl QrTokenService {
    pub fn new(
        scheduler: ServiceScheduler,
        resource_path: impl Into<String>,
        target_weekday: Weekday,
    ) -> Self {
        Self {
            scheduler,
            resource_path: resource_path.into(),
            target_weekday,
        }
    }

    pub fn scheduler(&self) -> &ServiceScheduler {
        &self.scheduler
    }

    /// Mint a token for the service active at `now`.
    pub fn generate_for_now(
        &self,
        now: DateTime<Utc>,
        secret: &SecretString,
    ) -> Result<IssuedToken, CoreError> {
        let window = self
            .scheduler
            .current_window(now)
            .ok_or(CoreError::NoActiveService)?;
        self.seal(window, secret)
    }

    /// Mint a token for the next occurrence of `service` on the target weekday.
    pub fn generate_for_service(
        &self,
        service: u32,
        now: DateTime<Utc>,
        secret: &SecretString,
    ) -> Result<IssuedToken, CoreError> {
        let window = self
            .scheduler
            .next_occurrence(now, service, self.target_weekday)?;
        self.seal(window, secret)
    }

    fn seal(&self, window: ServiceWindow, secret: &SecretString) -> Result<IssuedToken, CoreError> {
        let payload = TokenPayload::for_window(&window, self.resource_path.as_str());
        let plaintext = serde_json::to_vec(&payload)?;
        let token = TokenCipher::from_secret(secret).encrypt(&plaintext)?;

        info!(
            service = window.service_number,
            start = %window.start,
            end = %window.end,
            "issued check-in token"
        );
        Ok(IssuedToken { token, window })
    }

    /// Decide whether `token` admits entry at `now`.
    ///
    /// Never fails: every outcome is a [`ValidationResult`]. The token may be
    /// percent-encoded. The window is inclusive at both ends.
    pub fn validate(
        &self,
        token: &str,
        secret: &SecretString,
        now: DateTime<Utc>,
    ) -> ValidationResult {
        let token = decode_transport(token);
        if token.is_empty() {
            return ValidationResult::malformed();
        }

        let Ok(plaintext) = TokenCipher::from_secret(secret).decrypt(&token) else {
            return ValidationResult::decryption_failed();
        };

        let payload = match serde_json::from_slice::<TokenPayload>(&plaintext) {
            Ok(payload) if payload.is_well_formed() => payload,
            Ok(_) => {
                debug!("decrypted payload has an inverted window");
                return ValidationResult::decryption_failed();
            }
            Err(e) => {
                debug!(error = %e, "decrypted payload is not a token payload");
                return ValidationResult::decryption_failed();
            }
        };

        let result = if now < payload.window_start {
            ValidationResult::rejected(ReasonCode::NotYetValid, Some(payload))
        } else if now > payload.window_end {
            ValidationResult::rejected(ReasonCode::Expired, Some(payload))
        } else {
            ValidationResult::valid(payload)
        };

        debug!(reason = %result.reason, "validated check-in token");
        result
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeDelta, TimeZone};
    use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::schedule::WeeklySchedule;

    fn utc(h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 5, h, mi, 0).unwrap()
    }

    fn secret() -> SecretString {
        SecretString::from("qr-secret".to_owned())
    }

    fn service() -> QrTokenService {
        let scheduler =
            ServiceScheduler::from_offset_minutes(WeeklySchedule::sunday_services(), 180).unwrap();
        QrTokenService::new(scheduler, DEFAULT_RESOURCE_PATH, Weekday::Sun)
    }

    #[test]
    fn window_boundaries() {
        let service = service();
        let issued = service.generate_for_now(utc(5, 30), &secret()).unwrap();
        let token = issued.token.as_str();
        let (t0, t1) = (issued.window.start, issued.window.end);
        let second = TimeDelta::seconds(1);

        let at = |now| service.validate(token, &secret(), now).reason;
        assert_eq!(at(t0 - second), ReasonCode::NotYetValid);
        assert_eq!(at(t0), ReasonCode::Valid);
        assert_eq!(at(t1), ReasonCode::Valid);
        assert_eq!(at(t1 + second), ReasonCode::Expired);
    }

    #[test]
    fn generate_then_validate_during_second_service() {
        let service = service();
        // Local 11:00.
        let now = utc(8, 0);
        let issued = service.generate_for_now(now, &secret()).unwrap();
        let result = service.validate(issued.token.as_str(), &secret(), now);

        assert!(result.is_valid);
        assert_eq!(result.reason, ReasonCode::Valid);
        let payload = result.payload.unwrap();
        assert_eq!(payload.service_number, Some(2));
        assert_eq!(payload.resource_path, "/qrcode/scan");
        assert_eq!(payload.window_start, utc(7, 0));
    }

    #[test]
    fn rejected_results_keep_the_payload() {
        let service = service();
        let issued = service.generate_for_now(utc(5, 30), &secret()).unwrap();
        let result = service.validate(issued.token.as_str(), &secret(), utc(12, 0));

        assert!(!result.is_valid);
        assert_eq!(result.reason, ReasonCode::Expired);
        assert_eq!(result.payload.unwrap().service_number, Some(1));
    }

    #[test]
    fn no_active_service() {
        let err = service().generate_for_now(utc(0, 0), &secret()).unwrap_err();
        assert!(matches!(err, CoreError::NoActiveService));
    }

    #[test]
    fn generate_for_service_checks_the_table() {
        let service = service();
        let wednesday = Utc.with_ymd_and_hms(2025, 1, 8, 9, 0, 0).unwrap();

        let issued = service.generate_for_service(3, wednesday, &secret()).unwrap();
        assert_eq!(
            issued.window.start,
            Utc.with_ymd_and_hms(2025, 1, 12, 9, 0, 0).unwrap()
        );

        assert!(matches!(
            service.generate_for_service(4, wednesday, &secret()),
            Err(CoreError::InvalidServiceNumber { service: 4 })
        ));
    }

    #[test]
    fn empty_input_is_malformed() {
        let service = service();
        for token in ["", "   ", "\n"] {
            let result = service.validate(token, &secret(), utc(5, 30));
            assert_eq!(result, ValidationResult::malformed());
        }
    }

    #[test]
    fn foreign_tokens_fail_decryption() {
        let service = service();
        let issued = service.generate_for_now(utc(5, 30), &secret()).unwrap();
        let other = SecretString::from("other-secret".to_owned());

        let result = service.validate(issued.token.as_str(), &other, utc(5, 30));
        assert_eq!(result, ValidationResult::decryption_failed());

        let result = service.validate("definitely not a token", &secret(), utc(5, 30));
        assert_eq!(result.reason, ReasonCode::DecryptionFailed);
    }

    #[test]
    fn non_payload_plaintext_fails_decryption() {
        let cipher = TokenCipher::from_secret(&secret());
        let service = service();

        let not_json = cipher.encrypt(b"hello").unwrap();
        assert_eq!(
            service.validate(not_json.as_str(), &secret(), utc(5, 30)).reason,
            ReasonCode::DecryptionFailed
        );

        let inverted = cipher
            .encrypt(br#"{"x":"2025-01-05T07:00:00.000Z","y":"2025-01-05T05:00:00.000Z","u":"/qrcode/scan"}"#)
            .unwrap();
        assert_eq!(
            service.validate(inverted.as_str(), &secret(), utc(6, 0)).reason,
            ReasonCode::DecryptionFailed
        );
    }

    #[test]
    fn accepts_percent_encoded_tokens() {
        let service = service();
        let issued = service.generate_for_now(utc(5, 30), &secret()).unwrap();
        let encoded = utf8_percent_encode(issued.token.as_str(), NON_ALPHANUMERIC).to_string();

        assert!(service.validate(&encoded, &secret(), utc(5, 30)).is_valid);
    }
}
