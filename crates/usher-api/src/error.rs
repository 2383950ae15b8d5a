use thiserror::Error;

/// Everything that can go wrong talking to a deployed usher server.
#[derive(Debug, Error)]
pub enum Error {
    // ── Network ─────────────────────────────────────────────────────
    /// The request never produced a response.
    #[error("request to usher server failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("bad server URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("no response within {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Server ──────────────────────────────────────────────────────
    /// The server answered `{success:false, error}`.
    #[error("Server error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    // ── Payload ─────────────────────────────────────────────────────
    /// The body was not the JSON shape the endpoint promises. `body` keeps
    /// the raw text.
    #[error("unexpected response body: {message}")]
    Deserialization { message: String, body: String },
}
