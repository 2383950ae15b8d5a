use std::collections::BTreeSet;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use super::ClockTime;
use crate::error::CoreError;

/// One configured service: `[start, end)` in local time.
///
/// `end` already carries the grace buffer (a service ending at 10:00 is
/// configured as 10:15). The buffer is data, never computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSlot {
    pub service: u32,
    pub start: ClockTime,
    pub end: ClockTime,
}

impl ServiceSlot {
    pub fn new(service: u32, start: ClockTime, end: ClockTime) -> Self {
        Self {
            service,
            start,
            end,
        }
    }

    /// Start inclusive, end exclusive.
    pub fn contains(&self, minute_of_day: u32) -> bool {
        self.start.minutes() <= minute_of_day && minute_of_day < self.end.minutes()
    }
}

/// Day-of-week → ordered service slots. Order matters: the first slot
/// containing the current time wins, so overlapping grace buffers resolve
/// to the earlier service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeeklySchedule {
    pub sunday: Vec<ServiceSlot>,
    pub monday: Vec<ServiceSlot>,
    pub tuesday: Vec<ServiceSlot>,
    pub wednesday: Vec<ServiceSlot>,
    pub thursday: Vec<ServiceSlot>,
    pub friday: Vec<ServiceSlot>,
    pub saturday: Vec<ServiceSlot>,
}

const WEEK: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

impl WeeklySchedule {
    /// A schedule with nothing configured on any day.
    pub fn empty() -> Self {
        Self {
            sunday: Vec::new(),
            monday: Vec::new(),
            tuesday: Vec::new(),
            wednesday: Vec::new(),
            thursday: Vec::new(),
            friday: Vec::new(),
            saturday: Vec::new(),
        }
    }

    /// Three Sunday services, two hours each, with a 15-minute grace buffer.
    pub fn sunday_services() -> Self {
        let at = ClockTime::new_unchecked;
        Self {
            sunday: vec![
                ServiceSlot::new(1, at(8 * 60), at(10 * 60 + 15)),
                ServiceSlot::new(2, at(10 * 60), at(12 * 60 + 15)),
                ServiceSlot::new(3, at(12 * 60), at(14 * 60 + 15)),
            ],
            ..Self::empty()
        }
    }

    pub fn day(&self, weekday: Weekday) -> &[ServiceSlot] {
        match weekday {
            Weekday::Sun => &self.sunday,
            Weekday::Mon => &self.monday,
            Weekday::Tue => &self.tuesday,
            Weekday::Wed => &self.wednesday,
            Weekday::Thu => &self.thursday,
            Weekday::Fri => &self.friday,
            Weekday::Sat => &self.saturday,
        }
    }

    pub fn day_mut(&mut self, weekday: Weekday) -> &mut Vec<ServiceSlot> {
        match weekday {
            Weekday::Sun => &mut self.sunday,
            Weekday::Mon => &mut self.monday,
            Weekday::Tue => &mut self.tuesday,
            Weekday::Wed => &mut self.wednesday,
            Weekday::Thu => &mut self.thursday,
            Weekday::Fri => &mut self.friday,
            Weekday::Sat => &mut self.saturday,
        }
    }

    /// Days in Sunday-first order, including empty ones.
    pub fn iter(&self) -> impl Iterator<Item = (Weekday, &[ServiceSlot])> {
        WEEK.iter().map(move |&day| (day, self.day(day)))
    }

    /// Every service number configured on any day.
    pub fn service_numbers(&self) -> BTreeSet<u32> {
        self.iter()
            .flat_map(|(_, slots)| slots.iter().map(|slot| slot.service))
            .collect()
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        for (day, slots) in self.iter() {
            for slot in slots {
                if slot.service == 0 {
                    return Err(CoreError::InvalidSchedule {
                        message: format!("{day}: service numbers start at 1"),
                    });
                }
                if slot.start >= slot.end {
                    return Err(CoreError::InvalidSchedule {
                        message: format!(
                            "{day}: service {} starts at {} but ends at {}",
                            slot.service, slot.start, slot.end
                        ),
                    });
                }
            }
        }
        Ok(())
    }
}

impl Default for WeeklySchedule {
    fn default() -> Self {
        Self::empty()
    }
}
