// ── Service scheduler ──
//
// Maps an instant onto the weekly service table. The table is expressed in
// local wall-clock time at a constant UTC offset; there is no DST handling
// and no timezone database lookup.

mod clock_time;
mod weekly;

pub use clock_time::{ClockTime, MINUTES_PER_DAY};
pub use weekly::{ServiceSlot, WeeklySchedule};

use std::collections::BTreeSet;

use chrono::{
    DateTime, Datelike, Days, FixedOffset, NaiveDate, TimeDelta, TimeZone, Timelike, Utc, Weekday,
};
use tracing::debug;

use crate::error::CoreError;
use crate::model::ServiceWindow;

/// Resolves which service is active at a given instant, and where a
/// service's next occurrence falls.
///
/// Stateless after construction: every call is a pure function of its
/// arguments, so one scheduler can be shared across any number of requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceScheduler {
    schedule: WeeklySchedule,
    offset: FixedOffset,
}

impl ServiceScheduler {
    /// Build a scheduler, rejecting tables with inverted slots or service 0.
    pub fn new(schedule: WeeklySchedule, offset: FixedOffset) -> Result<Self, CoreError> {
        schedule.validate()?;
        Ok(Self { schedule, offset })
    }

    /// Convenience for configuration, which stores the offset in minutes east of UTC.
    pub fn from_offset_minutes(schedule: WeeklySchedule, minutes: i32) -> Result<Self, CoreError> {
        let offset = minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| CoreError::InvalidSchedule {
                message: format!("UTC offset out of range: {minutes} minutes"),
            })?;
        Self::new(schedule, offset)
    }

    /// Every service number configured on any day.
    pub fn service_numbers(&self) -> BTreeSet<u32> {
        self.schedule.service_numbers()
    }

    pub fn is_configured(&self, service: u32) -> bool {
        self.schedule
            .iter()
            .any(|(_, slots)| slots.iter().any(|slot| slot.service == service))
    }

    /// The window of the service active at `now`, if any.
    ///
    /// Slots are scanned in configured order and the first one containing
    /// the local time of day wins.
    pub fn current_window(&self, now: DateTime<Utc>) -> Option<ServiceWindow> {
        let local = now.with_timezone(&self.offset);
        let weekday = local.weekday();
        let minute_of_day = local.hour() * 60 + local.minute();

        let Some(slot) = self
            .schedule
            .day(weekday)
            .iter()
            .find(|slot| slot.contains(minute_of_day))
        else {
            debug!(%weekday, minute_of_day, "no service active");
            return None;
        };

        debug!(%weekday, minute_of_day, service = slot.service, "matched service slot");
        self.window_on(local.date_naive(), slot)
    }

    /// The window of `service` on the next `weekday`, counting today.
    ///
    /// When today already is `weekday` the window is today's, even if it has
    /// already closed.
    pub fn next_occurrence(
        &self,
        now: DateTime<Utc>,
        service: u32,
        weekday: Weekday,
    ) -> Result<ServiceWindow, CoreError> {
        if !self.is_configured(service) {
            return Err(CoreError::InvalidServiceNumber { service });
        }
        let slot = self
            .schedule
            .day(weekday)
            .iter()
            .find(|slot| slot.service == service)
            .ok_or(CoreError::NotScheduled { service, weekday })?;

        let today = now.with_timezone(&self.offset).date_naive();
        let days_ahead =
            (7 + weekday.num_days_from_sunday() - today.weekday().num_days_from_sunday()) % 7;
        let date = today
            .checked_add_days(Days::new(u64::from(days_ahead)))
            .ok_or_else(|| CoreError::Internal("date out of range".into()))?;

        debug!(service, %weekday, days_ahead, %date, "resolved next occurrence");
        self.window_on(date, slot)
            .ok_or_else(|| CoreError::Internal("date out of range".into()))
    }

    /// Local `date` at the slot's clock times, shifted back to UTC.
    fn window_on(&self, date: NaiveDate, slot: &ServiceSlot) -> Option<ServiceWindow> {
        let midnight = date.and_hms_opt(0, 0, 0)?;
        let shift = TimeDelta::seconds(i64::from(self.offset.local_minus_utc()));
        let at = |time: ClockTime| {
            midnight
                .checked_add_signed(TimeDelta::minutes(i64::from(time.minutes())))?
                .checked_sub_signed(shift)
                .map(|naive| Utc.from_utc_datetime(&naive))
        };

        Some(ServiceWindow {
            start: at(slot.start)?,
            end: at(slot.end)?,
            service_number: slot.service,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    fn scheduler() -> ServiceScheduler {
        ServiceScheduler::from_offset_minutes(WeeklySchedule::sunday_services(), 180).unwrap()
    }

    #[test]
    fn first_service_window_is_shifted_to_utc() {
        // Local 08:30 on Sunday 2025-01-05.
        let window = scheduler().current_window(utc(2025, 1, 5, 5, 30)).unwrap();

        assert_eq!(window.service_number, 1);
        assert_eq!(window.start, utc(2025, 1, 5, 5, 0));
        assert_eq!(window.end, utc(2025, 1, 5, 7, 15));
    }

    #[test]
    fn gap_in_schedule_has_no_window() {
        // Local 02:00 Sunday.
        assert_eq!(scheduler().current_window(utc(2025, 1, 4, 23, 0)), None);
        // Local 07:59 Sunday.
        assert_eq!(scheduler().current_window(utc(2025, 1, 5, 4, 59)), None);
        // Monday morning.
        assert_eq!(scheduler().current_window(utc(2025, 1, 6, 6, 0)), None);
    }

    #[test]
    fn overlapping_buffers_resolve_to_earlier_service() {
        // Local 10:10: inside service 1's grace buffer and service 2's start.
        let window = scheduler().current_window(utc(2025, 1, 5, 7, 10)).unwrap();
        assert_eq!(window.service_number, 1);

        // Local 10:15: service 1's end is exclusive.
        let window = scheduler().current_window(utc(2025, 1, 5, 7, 15)).unwrap();
        assert_eq!(window.service_number, 2);
        assert_eq!(window.start, utc(2025, 1, 5, 7, 0));
    }

    #[test]
    fn next_occurrence_looks_ahead_to_target_weekday() {
        // Wednesday 2025-01-08.
        let window = scheduler()
            .next_occurrence(utc(2025, 1, 8, 12, 0), 2, Weekday::Sun)
            .unwrap();

        assert_eq!(window.service_number, 2);
        assert_eq!(window.start, utc(2025, 1, 12, 7, 0));
        assert_eq!(window.end, utc(2025, 1, 12, 9, 15));
    }

    #[test]
    fn next_occurrence_on_target_day_is_today() {
        let window = scheduler()
            .next_occurrence(utc(2025, 1, 5, 13, 0), 3, Weekday::Sun)
            .unwrap();

        assert_eq!(window.start, utc(2025, 1, 5, 9, 0));
        assert_eq!(window.end, utc(2025, 1, 5, 11, 15));
    }

    #[test]
    fn next_occurrence_rejects_unknown_and_unscheduled_services() {
        let scheduler = scheduler();
        let now = utc(2025, 1, 8, 12, 0);

        assert!(matches!(
            scheduler.next_occurrence(now, 7, Weekday::Sun),
            Err(CoreError::InvalidServiceNumber { service: 7 })
        ));
        assert!(matches!(
            scheduler.next_occurrence(now, 1, Weekday::Sat),
            Err(CoreError::NotScheduled { service: 1, weekday: Weekday::Sat })
        ));
    }

    #[test]
    fn windows_near_local_midnight_use_the_local_date() {
        let mut schedule = WeeklySchedule::empty();
        schedule.sunday.push(ServiceSlot::new(
            9,
            ClockTime::MIDNIGHT,
            "03:00".parse().unwrap(),
        ));
        let scheduler = ServiceScheduler::from_offset_minutes(schedule, 180).unwrap();

        // Saturday 22:30 UTC is Sunday 01:30 local.
        let window = scheduler.current_window(utc(2025, 1, 4, 22, 30)).unwrap();
        assert_eq!(window.start, utc(2025, 1, 4, 21, 0));
        assert_eq!(window.end, utc(2025, 1, 5, 0, 0));
    }

    #[test]
    fn rejects_invalid_tables_and_offsets() {
        let mut schedule = WeeklySchedule::empty();
        schedule
            .monday
            .push(ServiceSlot::new(1, ClockTime::END_OF_DAY, ClockTime::MIDNIGHT));
        assert!(ServiceScheduler::from_offset_minutes(schedule, 0).is_err());

        assert!(
            ServiceScheduler::from_offset_minutes(WeeklySchedule::sunday_services(), 24 * 60)
                .is_err()
        );
    }
}
