//! Time formatting.
//!
//! Converts absolute time values (years from the Big Bang) into labels whose
//! resolution matches the current zoom: billions of years at the widest
//! scales, down to hours and minutes when a single day fills the screen.

use std::collections::HashMap;

use chrono::{Datelike, Days, NaiveDate};

use super::catalog::TimelineEvent;
use super::config::CalendarSettings;

/// Maximum number of memoized weekday lookups before the cache is flushed.
pub const WEEKDAY_CACHE_CAPACITY: usize = 1000;

/// Times below this fraction of the calendar epoch are labelled post-bang.
const POST_BANG_CUTOFF: f64 = 0.9999;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

const DAYS_PER_YEAR: f64 = 365.25;

/// Format an integer with comma thousands separators.
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Format a year count for the ruler.
///
/// When less than 200 years are visible the value is written out in full;
/// otherwise it is abbreviated with a B/M/k suffix.
pub fn format_year_label(value: f64, visible_range: f64) -> String {
    let abs = value.abs();
    if visible_range < 200.0 {
        return group_thousands(abs.floor() as u64);
    }
    if abs >= 1e9 {
        format!("{:.1}B", value / 1e9)
    } else if abs >= 1e6 {
        format!("{:.1}M", value / 1e6)
    } else if abs >= 1e3 {
        format!("{:.1}k", value / 1e3)
    } else {
        format!("{}", value.floor())
    }
}

/// Format a time value as a calendar year for detail display.
///
/// The two anchors get names; everything else is written as a BC/AD year,
/// abbreviated to two decimals once it reaches millions.
pub fn format_calendar_year(time: f64, calendar: &CalendarSettings) -> String {
    if time == 0.0 {
        return "Big Bang".to_string();
    }
    if time == calendar.present_day {
        return "Present Day".to_string();
    }

    let year = calendar.time_to_year(time);
    let abs = year.abs();
    let suffix = if year < 0.0 { " BC" } else { " AD" };
    let magnitude = if abs >= 1e9 {
        format!("{:.2}B", abs / 1e9)
    } else if abs >= 1e6 {
        format!("{:.2}M", abs / 1e6)
    } else {
        group_thousands(abs.floor() as u64)
    };
    format!("{}{}", magnitude, suffix)
}

/// Format the time span of an event as a single date or a dash-separated range.
pub fn format_event_time(event: &TimelineEvent, calendar: &CalendarSettings) -> String {
    let start = format_calendar_year(event.start_time, calendar);
    match event.range_end() {
        Some(end) => format!("{} – {}", start, format_calendar_year(end, calendar)),
        None => start,
    }
}

/// Describe how much time is visible, e.g. `4.2M Years` or `3.0 Hours`.
pub fn format_span_label(span_years: f64) -> String {
    if span_years >= 1e9 {
        return format!("{:.1}B Years", span_years / 1e9);
    }
    if span_years >= 1e6 {
        return format!("{:.1}M Years", span_years / 1e6);
    }
    if span_years >= 1e3 {
        return format!("{:.1}k Years", span_years / 1e3);
    }
    if span_years >= 1.0 {
        return format!("{:.1} Years", span_years);
    }

    let span_days = span_years * DAYS_PER_YEAR;
    if span_days >= 1.0 {
        return format!("{:.1} Days", span_days);
    }

    let span_hours = span_days * 24.0;
    if span_hours >= 1.0 {
        return format!("{:.1} Hours", span_hours);
    }

    format!("{:.1} Minutes", span_hours * 60.0)
}

/// Parse a user-entered date into a time value.
///
/// Accepts an ISO date (`YYYY-MM-DD`) or a bare signed calendar year.
pub fn parse_date(text: &str, calendar: &CalendarSettings) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        let fractional_year = date.year() as f64 + date.ordinal() as f64 / DAYS_PER_YEAR;
        return Some(calendar.year_to_time(fractional_year));
    }

    text.parse::<i64>()
        .ok()
        .map(|year| calendar.year_to_time(year as f64))
}

/// Produces the multi-line ruler labels.
///
/// Holds the calendar anchors and a memo of weekday lookups, which are the
/// only non-trivial computation on the labelling path.
#[derive(Debug, Clone, Default)]
pub struct LabelFormatter {
    calendar: CalendarSettings,
    weekday_cache: HashMap<(i32, u32, u32), u32>,
}

impl LabelFormatter {
    /// Create a formatter for the given calendar anchors.
    pub fn new(calendar: CalendarSettings) -> Self {
        Self {
            calendar,
            weekday_cache: HashMap::new(),
        }
    }

    /// Calendar anchors in use.
    pub fn calendar(&self) -> &CalendarSettings {
        &self.calendar
    }

    /// Number of memoized weekday lookups.
    #[cfg(test)]
    pub fn cached_weekdays(&self) -> usize {
        self.weekday_cache.len()
    }

    /// Build the label lines for a ruler tick at `time`.
    ///
    /// The number of lines grows as the visible range (`width / scale`)
    /// shrinks: year, then month, then weekday and day, then `HH:MM`.
    pub fn format_granular_lines(&mut self, time: f64, scale: f64, width: f64) -> Vec<String> {
        let visible_range = width / scale;
        let epoch = self.calendar.calendar_epoch;

        if time < epoch * POST_BANG_CUTOFF {
            if time == 0.0 {
                return vec!["Big Bang".to_string()];
            }
            return vec![format!("{} PB", format_year_label(time, visible_range))];
        }

        let year = self.calendar.time_to_year(time);
        let abs_year = year.abs();
        let mut lines = Vec::with_capacity(4);

        if year == 0.0 {
            lines.push("Year 0".to_string());
        } else {
            let suffix = if year < 0.0 { " BC" } else { "" };
            lines.push(format!(
                "{}{}",
                format_year_label(abs_year, visible_range),
                suffix
            ));
        }

        if visible_range < 5.0 {
            let month = ((abs_year * 12.0) % 12.0).floor() as usize;
            lines.push(MONTHS[month.min(11)].to_string());
        }

        if visible_range < 0.2 {
            lines.push(self.day_line(year, abs_year));
        }

        if visible_range < 0.005 {
            let hours = abs_year * DAYS_PER_YEAR * 24.0;
            lines.push(format!(
                "{:02}:{:02}",
                (hours % 24.0).floor() as u32,
                ((hours % 1.0) * 60.0).floor() as u32
            ));
        }

        lines
    }

    /// Weekday and day-of-month line, or `Day N` before year 1.
    fn day_line(&mut self, year: f64, abs_year: f64) -> String {
        if year > 0.0 {
            let whole = year.floor();
            let day_of_year = ((year - whole) * DAYS_PER_YEAR).floor() as u32;
            let day_of_month = day_of_year % 30 + 1;
            let month_index = (day_of_year as f64 / 30.44).floor() as u32;

            if let Ok(whole) = i32::try_from(whole as i64)
                && let Some(weekday) = self.weekday(whole, month_index, day_of_month)
            {
                return format!("{} {}", WEEKDAYS[weekday as usize], day_of_month);
            }
            return format!("Day {}", day_of_month);
        }

        let day_of_month = (abs_year * DAYS_PER_YEAR).floor() as u64 % 30 + 1;
        format!("Day {}", day_of_month)
    }

    /// Weekday (0 = Sunday) of a day counted from the first of a month.
    ///
    /// Days past the end of the month roll into the following month.
    fn weekday(&mut self, year: i32, month_index: u32, day_of_month: u32) -> Option<u32> {
        let key = (year, month_index, day_of_month);
        if let Some(weekday) = self.weekday_cache.get(&key) {
            return Some(*weekday);
        }

        let weekday = NaiveDate::from_ymd_opt(year, month_index + 1, 1)?
            .checked_add_days(Days::new(u64::from(day_of_month.saturating_sub(1))))?
            .weekday()
            .num_days_from_sunday();

        if self.weekday_cache.len() >= WEEKDAY_CACHE_CAPACITY {
            self.weekday_cache.clear();
        }
        self.weekday_cache.insert(key, weekday);
        Some(weekday)
    }
}
