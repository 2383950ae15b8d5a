//! `usher schedule`: the weekly service table and the active window.

use serde::Serialize;
use tabled::Tabled;

use usher_core::{ClockTime, ServiceWindow, format_instant};

use crate::cli::{GlobalOpts, ScheduleArgs};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

/// One configured slot, in local wall-clock time.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SlotEntry {
    day: String,
    service: u32,
    start: ClockTime,
    end: ClockTime,
    target: bool,
}

#[derive(Tabled)]
struct SlotRow {
    #[tabled(rename = "Day")]
    day: String,
    #[tabled(rename = "Service")]
    service: u32,
    #[tabled(rename = "Start")]
    start: String,
    #[tabled(rename = "End")]
    end: String,
    #[tabled(rename = "Target")]
    target: &'static str,
}

impl From<&SlotEntry> for SlotRow {
    fn from(e: &SlotEntry) -> Self {
        Self {
            day: e.day.clone(),
            service: e.service,
            start: e.start.to_string(),
            end: e.end.to_string(),
            target: if e.target { "*" } else { "" },
        }
    }
}

fn entries(cfg: &Config) -> Vec<SlotEntry> {
    cfg.schedule
        .weekly
        .iter()
        .flat_map(|(weekday, slots)| {
            slots.iter().map(move |slot| SlotEntry {
                day: weekday.to_string(),
                service: slot.service,
                start: slot.start,
                end: slot.end,
                target: weekday == cfg.schedule.target_weekday,
            })
        })
        .collect()
}

fn window_detail(w: &ServiceWindow) -> String {
    [
        format!("Service:  {}", w.service_number),
        format!("Opens:    {}", format_instant(&w.start)),
        format!("Closes:   {}", format_instant(&w.end)),
    ]
    .join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(cfg: &Config, args: &ScheduleArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let out = if args.active {
        let now = config::evaluation_instant(global)?;
        let tokens = cfg.token_service()?;
        let window = tokens
            .scheduler()
            .current_window(now)
            .ok_or_else(|| CliError::NoActiveService {
                at: format_instant(&now),
            })?;
        output::render_single(global.output, &window, window_detail, |w| {
            w.service_number.to_string()
        })?
    } else {
        let slots = entries(cfg);
        if slots.is_empty() && !global.quiet {
            eprintln!("No services configured. Add slots under [schedule.weekly].");
        }
        output::render_list(global.output, &slots, |e| SlotRow::from(e), |e| {
            format!("{} {} {}-{}", e.day, e.service, e.start, e.end)
        })?
    };
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_lists_three_sunday_services() {
        let rows = entries(&Config::default());
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.day == "Sun" && r.target));
        assert_eq!(rows[1].service, 2);
        assert_eq!(rows[1].start.to_string(), "10:00");
        assert_eq!(rows[1].end.to_string(), "12:15");
    }

    #[test]
    fn active_window_detail() {
        let cfg = Config::default();
        let now = chrono::DateTime::parse_from_rfc3339("2025-01-05T08:30:00+03:00")
            .map(|t| t.with_timezone(&chrono::Utc))
            .unwrap_or_else(|e| panic!("{e}"));
        let window = cfg
            .token_service()
            .ok()
            .and_then(|t| t.scheduler().current_window(now));
        let text = window.map(|w| window_detail(&w)).unwrap_or_default();
        assert!(text.contains("Service:  1"));
        assert!(text.contains("Opens:    2025-01-05T05:00:00.000Z"));
    }
}
