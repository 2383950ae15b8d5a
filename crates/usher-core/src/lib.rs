// usher-core: Service-window scheduling and encrypted, time-bound check-in tokens.
//
// Everything here is pure and stateless. Adapters (HTTP, RPC, CLI) read the
// clock once per call and pass `now` down.

pub mod cipher;
pub mod clock;
pub mod error;
pub mod model;
pub mod schedule;
pub mod token;
pub mod transport;

// ── Primary re-exports ──────────────────────────────────────────────
pub use cipher::{OpaqueToken, TokenCipher, derive_key};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::CoreError;
pub use model::{ReasonCode, ServiceWindow, TokenPayload, ValidationResult, format_instant};
pub use schedule::{ClockTime, ServiceScheduler, ServiceSlot, WeeklySchedule};
pub use token::{DEFAULT_RESOURCE_PATH, IssuedToken, QrTokenService};
pub use transport::decode_transport;

// Callers hold secrets in the same type the cipher takes.
pub use secrecy::{ExposeSecret, SecretString};
