// ── Domain model ──
//
// Value objects shared by the scheduler, the token service, and every
// adapter. All are immutable once built and are never persisted here.

mod payload;
mod validation;
mod window;

pub use payload::TokenPayload;
pub use validation::{ReasonCode, ValidationResult};
pub use window::ServiceWindow;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serializer;

/// Format an instant as ISO-8601 with millisecond precision and a `Z` suffix.
///
/// This is the shape browsers produce with `Date.prototype.toISOString`, so
/// tokens and responses stay readable by existing front-end code.
pub fn format_instant(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) fn serialize_instant<S: Serializer>(
    instant: &DateTime<Utc>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_instant(instant))
}
