//! Date and time parsing for record timestamps, and fractional-year conversion for brushing.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use std::sync::OnceLock;

/// Marker used by the source data for timestamps that were never recorded.
pub const UNKNOWN_MARKER: &str = "Unknown";

pub fn is_unknown(field: &str) -> bool {
    field.contains(UNKNOWN_MARKER)
}

/// Parses `M/D/YYYY` (the source format) or ISO `YYYY-MM-DD`.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    let parts = text.split('/').collect::<Vec<_>>();
    if let [m, d, y] = parts.as_slice() {
        let month = m.trim().parse::<u32>().ok()?;
        let day = d.trim().parse::<u32>().ok()?;
        let year = y.trim().parse::<i32>().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
}

/// Parses `H:MM`, `H:MM:SS`, and 12-hour forms such as `4:30 p.m.` or `11:05 AM`.
pub fn parse_time(text: &str) -> Option<NaiveTime> {
    static TIME_RE: OnceLock<Regex> = OnceLock::new();
    let re = TIME_RE.get_or_init(|| {
        Regex::new(r"^(\d{1,2}):(\d{2})(?::(\d{2}))?\s*(?:([aApP])\.?\s*[mM]\.?)?$")
            .expect("valid time regex")
    });

    let caps = re.captures(text.trim())?;
    let mut hour = caps.get(1)?.as_str().parse::<u32>().ok()?;
    let minute = caps.get(2)?.as_str().parse::<u32>().ok()?;
    let second = match caps.get(3) {
        Some(s) => s.as_str().parse::<u32>().ok()?,
        None => 0,
    };
    if let Some(meridiem) = caps.get(4) {
        if !(1..=12).contains(&hour) {
            return None;
        }
        let pm = meridiem.as_str().eq_ignore_ascii_case("p");
        hour = match (pm, hour) {
            (false, 12) => 0,
            (true, 12) => 12,
            (true, h) => h + 12,
            (false, h) => h,
        };
    }
    NaiveTime::from_hms_opt(hour, minute, second)
}

pub fn parse_date_time(date: &str, time: &str) -> Option<NaiveDateTime> {
    Some(parse_date(date)?.and_time(parse_time(time)?))
}

pub fn is_leap_year(year: i32) -> bool {
    NaiveDate::from_ymd_opt(year, 2, 29).is_some()
}

pub fn days_in_year(year: i32) -> u32 {
    if is_leap_year(year) { 366 } else { 365 }
}

/// Fractional part of `value`, always in `[0, 1)` for finite input.
pub fn fractional(value: f64) -> f64 {
    value - value.floor()
}

/// Converts a fractional year (e.g. `2016.5`) into a concrete date-time.
///
/// The integer part is the calendar year. The fractional part, scaled by the year's length in
/// days, gives a day value: its integer part selects the ordinal day (day 0 and day 1 both map
/// to January 1st) and its fractional part, scaled to hours, gives the time of day rounded to
/// the nearest minute.
pub fn find_date(fractional_year: f64) -> Option<NaiveDateTime> {
    if !fractional_year.is_finite() {
        return None;
    }
    let year = i32::try_from(fractional_year.floor() as i64).ok()?;
    let day_value = fractional(fractional_year) * f64::from(days_in_year(year));
    let ordinal = (day_value.trunc() as u32).clamp(1, days_in_year(year));
    let date = NaiveDate::from_yo_opt(year, ordinal)?;

    let hours = fractional(day_value) * 24.0;
    let minutes = (hours * 60.0).round() as i64;
    date.and_hms_opt(0, 0, 0)?
        .checked_add_signed(chrono::Duration::minutes(minutes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|d| d.and_hms_opt(h, min, 0))
            .expect("valid date")
    }

    #[test]
    fn parses_source_and_iso_dates() {
        assert_eq!(parse_date("3/7/2016"), NaiveDate::from_ymd_opt(2016, 3, 7));
        assert_eq!(parse_date(" 12/31/2019 "), NaiveDate::from_ymd_opt(2019, 12, 31));
        assert_eq!(parse_date("2016-03-07"), NaiveDate::from_ymd_opt(2016, 3, 7));
        assert_eq!(parse_date("2/30/2016"), None);
        assert_eq!(parse_date("Unknown"), None);
    }

    #[test]
    fn parses_24h_and_12h_times() {
        assert_eq!(parse_time("14:05"), NaiveTime::from_hms_opt(14, 5, 0));
        assert_eq!(parse_time("7:30:15"), NaiveTime::from_hms_opt(7, 30, 15));
        assert_eq!(parse_time("4:00 p.m."), NaiveTime::from_hms_opt(16, 0, 0));
        assert_eq!(parse_time("12:15 a.m."), NaiveTime::from_hms_opt(0, 15, 0));
        assert_eq!(parse_time("12:45 PM"), NaiveTime::from_hms_opt(12, 45, 0));
        assert_eq!(parse_time("11:05am"), NaiveTime::from_hms_opt(11, 5, 0));
        assert_eq!(parse_time("13:00 p.m."), None);
        assert_eq!(parse_time("noon"), None);
    }

    #[test]
    fn leap_years_follow_the_gregorian_rule() {
        assert!(is_leap_year(2016));
        assert!(!is_leap_year(2017));
        assert!(is_leap_year(2000));
        assert!(!is_leap_year(1900));
    }

    #[test]
    fn find_date_mid_year() {
        // 0.5 * 366 = 183 -> ordinal day 183 of 2016 is July 1st.
        let d = find_date(2016.5).expect("date");
        assert_eq!(d.year(), 2016);
        assert_eq!(d.ordinal(), 183);
        assert_eq!(d, dt(2016, 7, 1, 0, 0));
    }

    #[test]
    fn find_date_uses_year_length_for_leap_and_common_years() {
        // 2016: 0.25 * 366 = 91.5 -> day 91 (Mar 31), 12:00.
        assert_eq!(find_date(2016.25), Some(dt(2016, 3, 31, 12, 0)));
        // 2017: 0.25 * 365 = 91.25 -> day 91 (Apr 1), 06:00.
        assert_eq!(find_date(2017.25), Some(dt(2017, 4, 1, 6, 0)));
    }

    #[test]
    fn find_date_start_of_year_and_rounding() {
        assert_eq!(find_date(2018.0), Some(dt(2018, 1, 1, 0, 0)));
        // Very small fractions stay on January 1st.
        let d = find_date(2018.0001).expect("date");
        assert_eq!(d.ordinal(), 1);
        assert!(find_date(f64::NAN).is_none());
        assert!(find_date(f64::INFINITY).is_none());
    }
}
