use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::serialize_instant;

/// Absolute UTC bounds of one service's check-in window.
///
/// Produced fresh by [`ServiceScheduler`](crate::ServiceScheduler) on each
/// call. The end already includes the configured grace buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceWindow {
    #[serde(rename = "startTime", serialize_with = "serialize_instant")]
    pub start: DateTime<Utc>,
    #[serde(rename = "endTime", serialize_with = "serialize_instant")]
    pub end: DateTime<Utc>,
    pub service_number: u32,
}
