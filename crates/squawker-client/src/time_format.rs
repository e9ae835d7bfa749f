use std::fmt::Display;

use chrono::{Local, TimeZone, Utc};
use tracing::debug;

pub const MINUTE_MILLIS: i64 = 60 * 1000;
pub const HOUR_MILLIS: i64 = 60 * MINUTE_MILLIS;
pub const DAY_MILLIS: i64 = 24 * HOUR_MILLIS;

/// Day of month and abbreviated month, e.g. "14 Jan".
const DATE_PATTERN: &str = "%d %b";

const SEPARATOR: &str = "\u{2022}";

/// Source of wall-clock time for list refreshes.
pub trait Clock: Send + Sync + 'static {
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Turns a squawk's age into a compact label: "• 3m", "• 2h", or the
/// calendar date once it is a day old.
#[derive(Debug, Clone)]
pub struct RelativeTimeFormatter<Tz: TimeZone = Local> {
    tz: Tz,
}

impl RelativeTimeFormatter<Local> {
    pub fn local() -> Self {
        Self { tz: Local }
    }
}

impl Default for RelativeTimeFormatter<Local> {
    fn default() -> Self {
        Self::local()
    }
}

impl<Tz> RelativeTimeFormatter<Tz>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Event times in the future are labelled as "0m".
    pub fn format(&self, event_millis: i64, now_millis: i64) -> String {
        let elapsed = now_millis.saturating_sub(event_millis).max(0);

        let label = if elapsed < HOUR_MILLIS {
            format!("{}m", round_div(elapsed, MINUTE_MILLIS))
        } else if elapsed < DAY_MILLIS {
            format!("{}h", round_div(elapsed, HOUR_MILLIS))
        } else {
            self.calendar_date(event_millis)
                .unwrap_or_else(|| format!("{}d", elapsed / DAY_MILLIS))
        };

        format!("{SEPARATOR} {label}")
    }

    /// `None` when the zone has no single local date for the instant.
    fn calendar_date(&self, event_millis: i64) -> Option<String> {
        let date = self.tz.timestamp_millis_opt(event_millis).single();
        if date.is_none() {
            debug!(event_millis, "Squawk date has no calendar form, showing days");
        }
        date.map(|date| date.format(DATE_PATTERN).to_string())
    }
}

/// Half-up rounding of a non-negative quotient.
fn round_div(value: i64, unit: i64) -> i64 {
    (value as f64 / unit as f64).round() as i64
}
