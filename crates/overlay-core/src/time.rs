// File: crates/overlay-core/src/time.rs
// Summary: Domain time input as a tagged union and conversion to epoch seconds.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

/// A calendar day as hosts usually supply it. `month` and `day` are optional
/// so partially filled payloads deserialize and are rejected at conversion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDate {
    pub year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<u32>,
}

impl CalendarDate {
    pub const fn new(year: i32, month: u32, day: u32) -> Self {
        Self { year, month: Some(month), day: Some(day) }
    }

    /// UTC midnight of the date, or `None` if a field is missing or out of range.
    pub fn to_epoch_seconds(&self) -> Option<f64> {
        let date = NaiveDate::from_ymd_opt(self.year, self.month?, self.day?)?;
        midnight_utc(date)
    }
}

/// Time on the chart's horizontal axis in any of the forms a host may use.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimeInput {
    Seconds(f64),
    Text(String),
    Calendar(CalendarDate),
}

impl TimeInput {
    pub const fn seconds(s: f64) -> Self { TimeInput::Seconds(s) }

    pub const fn date(year: i32, month: u32, day: u32) -> Self {
        TimeInput::Calendar(CalendarDate::new(year, month, day))
    }

    /// Whether a mapper result of this value may be handed to callers.
    /// Strings and calendar values pass through; numbers must be finite.
    pub fn is_usable(&self) -> bool {
        match self {
            TimeInput::Seconds(s) => s.is_finite(),
            TimeInput::Text(_) | TimeInput::Calendar(_) => true,
        }
    }
}

impl From<f64> for TimeInput {
    fn from(s: f64) -> Self { TimeInput::Seconds(s) }
}

impl From<&str> for TimeInput {
    fn from(s: &str) -> Self { TimeInput::Text(s.to_string()) }
}

impl From<String> for TimeInput {
    fn from(s: String) -> Self { TimeInput::Text(s) }
}

impl From<CalendarDate> for TimeInput {
    fn from(d: CalendarDate) -> Self { TimeInput::Calendar(d) }
}

impl From<NaiveDate> for TimeInput {
    fn from(d: NaiveDate) -> Self {
        use chrono::Datelike;
        TimeInput::date(d.year(), d.month(), d.day())
    }
}

/// Epoch seconds for `t`, or `None` when it cannot be interpreted.
pub fn to_seconds(t: &TimeInput) -> Option<f64> {
    match t {
        TimeInput::Seconds(s) => s.is_finite().then_some(*s),
        TimeInput::Text(s) => parse_text(s),
        TimeInput::Calendar(d) => d.to_epoch_seconds(),
    }
}

/// Epoch seconds for `t`; anything that cannot be interpreted yields `0`.
pub fn time_to_sec(t: &TimeInput) -> f64 {
    to_seconds(t).unwrap_or(0.0)
}

/// `YYYY-MM-DD HH:MM` in UTC, used for vertical-line labels.
pub fn format_utc(seconds: f64) -> Option<String> {
    if !seconds.is_finite() { return None; }
    let dt = DateTime::from_timestamp(seconds.floor() as i64, 0)?;
    Some(dt.format("%Y-%m-%d %H:%M").to_string())
}

fn parse_text(s: &str) -> Option<f64> {
    let s = s.trim();
    if let Ok(v) = s.parse::<f64>() {
        return v.is_finite().then_some(v);
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok().and_then(midnight_utc)
}

fn midnight_utc(date: NaiveDate) -> Option<f64> {
    let dt = date.and_hms_opt(0, 0, 0)?;
    Some(dt.and_utc().timestamp() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_pass_through() {
        assert_eq!(time_to_sec(&TimeInput::seconds(1_700_000_000.0)), 1_700_000_000.0);
        assert_eq!(time_to_sec(&TimeInput::seconds(f64::NAN)), 0.0);
    }

    #[test]
    fn numeric_and_iso_strings_parse() {
        assert_eq!(time_to_sec(&"1700000000".into()), 1_700_000_000.0);
        assert_eq!(time_to_sec(&" 42.5 ".into()), 42.5);
        assert_eq!(time_to_sec(&"2024-01-02".into()), 1_704_153_600.0);
        assert_eq!(time_to_sec(&"yesterday".into()), 0.0);
    }

    #[test]
    fn calendar_dates_map_to_utc_midnight() {
        assert_eq!(time_to_sec(&TimeInput::date(1970, 1, 2)), 86_400.0);
        assert_eq!(time_to_sec(&TimeInput::date(2024, 2, 30)), 0.0);
    }

    #[test]
    fn calendar_without_month_is_invalid() {
        let t: TimeInput = serde_json::from_str(r#"{"year": 2024, "day": 3}"#).unwrap();
        assert!(matches!(t, TimeInput::Calendar(_)));
        assert_eq!(time_to_sec(&t), 0.0);
    }

    #[test]
    fn untagged_json_picks_the_right_variant() {
        let n: TimeInput = serde_json::from_str("12").unwrap();
        let s: TimeInput = serde_json::from_str(r#""2024-01-02""#).unwrap();
        assert_eq!(n, TimeInput::Seconds(12.0));
        assert_eq!(s, TimeInput::Text("2024-01-02".into()));
    }

    #[test]
    fn utc_formatting() {
        assert_eq!(format_utc(86_400.0).as_deref(), Some("1970-01-02 00:00"));
        assert_eq!(format_utc(f64::INFINITY), None);
    }
}
