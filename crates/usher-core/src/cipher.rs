// ── Token cipher ──
//
// AES-256-GCM over small JSON payloads. An opaque token is the standard
// padded base64 of `nonce(12) || ciphertext || tag(16)`. Keys are derived
// deterministically from a server-held secret so independently deployed
// encrypt and decrypt endpoints agree without sharing state.

use std::fmt;

use aes_gcm::Aes256Gcm;
use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{Aead, KeyInit};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rand::RngCore;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;
use zeroize::Zeroizing;

use crate::error::CoreError;

pub const KEY_LEN: usize = 32;
pub const NONCE_LEN: usize = 12;
pub const TAG_LEN: usize = 16;

/// PBKDF2-HMAC-SHA256 rounds for per-subject keys.
pub const SUBJECT_KEY_ROUNDS: u32 = 100_000;

/// The string handed to end users. Only [`TokenCipher`] looks inside it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OpaqueToken(String);

impl OpaqueToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for OpaqueToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<OpaqueToken> for String {
    fn from(token: OpaqueToken) -> Self {
        token.0
    }
}

/// Symmetric AEAD keyed from a secret.
///
/// Cheap to clone; the key is wiped from memory on drop.
#[derive(Clone)]
pub struct TokenCipher {
    key: Zeroizing<[u8; KEY_LEN]>,
}

impl fmt::Debug for TokenCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCipher")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

impl TokenCipher {
    /// Key = SHA-256 of the secret's UTF-8 bytes.
    pub fn from_secret(secret: &SecretString) -> Self {
        let digest = Sha256::digest(secret.expose_secret().as_bytes());
        Self {
            key: Zeroizing::new(digest.into()),
        }
    }

    /// Per-subject key, see [`derive_key`]. Slow on purpose; callers on an
    /// async runtime should run this on a blocking thread.
    pub fn for_subject(subject_id: &str, secret: &SecretString) -> Self {
        Self {
            key: derive_key(subject_id, secret),
        }
    }

    pub fn encrypt(&self, plaintext: &[u8]) -> Result<OpaqueToken, CoreError> {
        let cipher = Aes256Gcm::new(GenericArray::from_slice(self.key.as_slice()));

        let mut nonce = [0u8; NONCE_LEN];
        rand::rng().fill_bytes(&mut nonce);

        let ciphertext = cipher
            .encrypt(GenericArray::from_slice(&nonce), plaintext)
            .map_err(|e| CoreError::Encryption {
                reason: e.to_string(),
            })?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);

        Ok(OpaqueToken(STANDARD.encode(sealed)))
    }

    /// Every failure collapses into [`CoreError::Decryption`]; the cause is
    /// only ever logged at debug level.
    pub fn decrypt(&self, token: &str) -> Result<Vec<u8>, CoreError> {
        let sealed = STANDARD.decode(token).map_err(|e| {
            debug!(error = %e, "token is not valid base64");
            CoreError::Decryption
        })?;

        if sealed.len() < NONCE_LEN + TAG_LEN {
            debug!(len = sealed.len(), "token too short");
            return Err(CoreError::Decryption);
        }

        let (nonce, ciphertext) = sealed.split_at(NONCE_LEN);
        let cipher = Aes256Gcm::new(GenericArray::from_slice(self.key.as_slice()));

        cipher
            .decrypt(GenericArray::from_slice(nonce), ciphertext)
            .map_err(|_| {
                debug!("token failed authentication");
                CoreError::Decryption
            })
    }
}

/// PBKDF2-HMAC-SHA256 with [`SUBJECT_KEY_ROUNDS`] rounds.
///
/// The secret is the password and `"{subject_id}:{secret}"` the salt, so two
/// subjects sharing one server secret still get unrelated keys.
pub fn derive_key(subject_id: &str, secret: &SecretString) -> Zeroizing<[u8; KEY_LEN]> {
    let secret = secret.expose_secret();
    let salt = Zeroizing::new(format!("{subject_id}:{secret}"));

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2::pbkdf2_hmac::<Sha256>(
        secret.as_bytes(),
        salt.as_bytes(),
        SUBJECT_KEY_ROUNDS,
        key.as_mut_slice(),
    );
    key
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    const PAYLOAD: &[u8] =
        br#"{"x":"2025-01-05T05:00:00.000Z","y":"2025-01-05T07:15:00.000Z","u":"/qrcode/scan","s":1}"#;

    fn secret(s: &str) -> SecretString {
        SecretString::from(s.to_owned())
    }

    #[test]
    fn round_trips_plaintext() {
        let cipher = TokenCipher::from_secret(&secret("sunday-secret"));
        let token = cipher.encrypt(PAYLOAD).unwrap();

        assert_eq!(cipher.decrypt(token.as_str()).unwrap(), PAYLOAD);
        assert_eq!(
            TokenCipher::from_secret(&secret("sunday-secret"))
                .decrypt(token.as_str())
                .unwrap(),
            PAYLOAD
        );
    }

    #[test]
    fn every_token_uses_a_fresh_nonce() {
        let cipher = TokenCipher::from_secret(&secret("sunday-secret"));
        let tokens: HashSet<_> = (0..10_000)
            .map(|_| cipher.encrypt(PAYLOAD).unwrap().into_string())
            .collect();

        assert_eq!(tokens.len(), 10_000);
    }

    #[test]
    fn flipped_bytes_never_decrypt() {
        let cipher = TokenCipher::from_secret(&secret("sunday-secret"));
        let sealed = STANDARD.decode(cipher.encrypt(PAYLOAD).unwrap().as_str()).unwrap();

        for i in 0..sealed.len() {
            let mut tampered = sealed.clone();
            tampered[i] ^= 0x01;
            let result = cipher.decrypt(&STANDARD.encode(&tampered));
            assert!(matches!(result, Err(CoreError::Decryption)), "byte {i}");
        }
    }

    #[test]
    fn replaced_characters_never_decrypt() {
        let cipher = TokenCipher::from_secret(&secret("sunday-secret"));
        let token = cipher.encrypt(PAYLOAD).unwrap().into_string();

        for (i, c) in token.char_indices() {
            let replacement = if c == 'A' { "B" } else { "A" };
            let mut tampered = token.clone();
            tampered.replace_range(i..=i, replacement);
            assert!(cipher.decrypt(&tampered).is_err(), "char {i}");
        }
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = TokenCipher::from_secret(&secret("secret-a"))
            .encrypt(PAYLOAD)
            .unwrap();
        assert!(matches!(
            TokenCipher::from_secret(&secret("secret-b")).decrypt(token.as_str()),
            Err(CoreError::Decryption)
        ));
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        let cipher = TokenCipher::from_secret(&secret("sunday-secret"));
        let truncated = STANDARD.encode([0u8; NONCE_LEN + TAG_LEN - 1]);
        for token in ["", "not base64!", "c2hvcnQ=", truncated.as_str()] {
            assert!(matches!(cipher.decrypt(token), Err(CoreError::Decryption)));
        }
    }

    #[test]
    fn subject_keys_are_isolated() {
        let server = secret("user-data-secret");
        let alice = TokenCipher::for_subject("A", &server);
        let bob = TokenCipher::for_subject("B", &server);

        let token = alice.encrypt(b"{\"name\":\"Alice\"}").unwrap();
        assert!(bob.decrypt(token.as_str()).is_err());
        assert_eq!(
            TokenCipher::for_subject("A", &server)
                .decrypt(token.as_str())
                .unwrap(),
            b"{\"name\":\"Alice\"}"
        );
    }

    #[test]
    fn debug_output_hides_the_key() {
        let cipher = TokenCipher::from_secret(&secret("sunday-secret"));
        assert!(format!("{cipher:?}").contains("REDACTED"));
    }
}
