use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// A local time of day, stored as minutes since local midnight.
///
/// Ranges over `00:00..=24:00`; `24:00` lets a slot run to the end of the day.
/// Configuration may spell it as fractional hours (`10.25` is `10:15`) or
/// as an `"HH:MM"` string. It always serializes as `"HH:MM"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "ClockTimeRepr", into = "String")]
pub struct ClockTime(u32);

impl ClockTime {
    pub const MIDNIGHT: Self = Self(0);
    pub const END_OF_DAY: Self = Self(MINUTES_PER_DAY);

    /// Caller guarantees `minutes <= MINUTES_PER_DAY`.
    pub(crate) const fn new_unchecked(minutes: u32) -> Self {
        Self(minutes)
    }

    pub fn from_minutes(minutes: u32) -> Result<Self, CoreError> {
        if minutes > MINUTES_PER_DAY {
            return Err(CoreError::InvalidSchedule {
                message: format!("time of day out of range: {minutes} minutes"),
            });
        }
        Ok(Self(minutes))
    }

    pub fn from_hm(hour: u32, minute: u32) -> Result<Self, CoreError> {
        if minute >= 60 {
            return Err(CoreError::InvalidSchedule {
                message: format!("minute out of range: {minute}"),
            });
        }
        Self::from_minutes(hour.saturating_mul(60).saturating_add(minute))
    }

    /// Fractional hours, rounded to the nearest minute.
    #[allow(
        clippy::as_conversions,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn from_hours(hours: f64) -> Result<Self, CoreError> {
        if !hours.is_finite() || !(0.0..=24.0).contains(&hours) {
            return Err(CoreError::InvalidSchedule {
                message: format!("hour out of range: {hours}"),
            });
        }
        // Range-checked above: the product lies in 0.0..=1440.0.
        Self::from_minutes((hours * 60.0).round() as u32)
    }

    pub fn minutes(self) -> u32 {
        self.0
    }

    pub fn hour(self) -> u32 {
        self.0 / 60
    }

    pub fn minute(self) -> u32 {
        self.0 % 60
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for ClockTime {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::InvalidSchedule {
            message: format!("expected HH:MM, got '{s}'"),
        };
        let (hour, minute) = s.trim().split_once(':').ok_or_else(invalid)?;
        let hour: u32 = hour.parse().map_err(|_| invalid())?;
        let minute: u32 = minute.parse().map_err(|_| invalid())?;
        Self::from_hm(hour, minute)
    }
}

impl From<ClockTime> for String {
    fn from(time: ClockTime) -> Self {
        time.to_string()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ClockTimeRepr {
    Hours(f64),
    Text(String),
}

impl TryFrom<ClockTimeRepr> for ClockTime {
    type Error = CoreError;

    fn try_from(repr: ClockTimeRepr) -> Result<Self, Self::Error> {
        match repr {
            ClockTimeRepr::Hours(hours) => Self::from_hours(hours),
            ClockTimeRepr::Text(text) => text.parse(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn fractional_hours_round_to_minutes() {
        assert_eq!(ClockTime::from_hours(10.25).unwrap().to_string(), "10:15");
        assert_eq!(ClockTime::from_hours(8.0).unwrap().minutes(), 480);
        assert_eq!(ClockTime::from_hours(24.0).unwrap(), ClockTime::END_OF_DAY);
    }

    #[test]
    fn parses_hh_mm() {
        let t: ClockTime = "07:45".parse().unwrap();
        assert_eq!((t.hour(), t.minute()), (7, 45));
        assert_eq!("24:00".parse::<ClockTime>().unwrap(), ClockTime::END_OF_DAY);
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!("25:00".parse::<ClockTime>().is_err());
        assert!("07:60".parse::<ClockTime>().is_err());
        assert!("7".parse::<ClockTime>().is_err());
        assert!("24:01".parse::<ClockTime>().is_err());
        assert!(ClockTime::from_hours(-1.0).is_err());
        assert!(ClockTime::from_hours(f64::NAN).is_err());
    }

    #[test]
    fn deserializes_numbers_and_strings() {
        #[derive(Deserialize)]
        struct Slot {
            start: ClockTime,
            end: ClockTime,
        }

        let slot: Slot = serde_json::from_str(r#"{"start": 8, "end": "10:15"}"#).unwrap();
        assert_eq!(slot.start.to_string(), "08:00");
        assert_eq!(slot.end.minutes(), 615);
    }
}
