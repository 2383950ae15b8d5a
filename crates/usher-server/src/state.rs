// ── Shared handler state ──
//
// Immutable after startup. Handlers clone the `Arc` and read the clock once
// per request.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use usher_core::{Clock, QrTokenService, SystemClock};

/// The three server-held secrets, one per token type.
pub struct ServerSecrets {
    /// Seals service-window tokens.
    pub qr: SecretString,
    /// Keys `encrypt-user-data` / `decrypt-user-data`.
    pub user_data: SecretString,
    /// Folded into per-subject keys for `secure-encrypt` / `secure-decrypt`.
    pub cache: SecretString,
}

impl ServerSecrets {
    pub fn new(qr: SecretString, user_data: SecretString, cache: SecretString) -> Self {
        Self {
            qr,
            user_data,
            cache,
        }
    }
}

impl fmt::Debug for ServerSecrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerSecrets").finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

struct Inner {
    tokens: QrTokenService,
    secrets: ServerSecrets,
    clock: Arc<dyn Clock>,
}

impl AppState {
    /// State backed by the system clock.
    pub fn new(tokens: QrTokenService, secrets: ServerSecrets) -> Self {
        Self::with_clock(tokens, secrets, Arc::new(SystemClock))
    }

    pub fn with_clock(
        tokens: QrTokenService,
        secrets: ServerSecrets,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                tokens,
                secrets,
                clock,
            }),
        }
    }

    pub fn tokens(&self) -> &QrTokenService {
        &self.inner.tokens
    }

    pub fn secrets(&self) -> &ServerSecrets {
        &self.inner.secrets
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.inner.clock.now()
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("tokens", &self.inner.tokens)
            .field("secrets", &self.inner.secrets)
            .finish_non_exhaustive()
    }
}
