//! Date-window matchers.
//!
//! [`date_matches`] answers whether a candidate date falls inside the window
//! described by a [`DateOptions`]; [`date_in_period_matches`] relaxes the
//! comparison to a calendar granularity (day, week, month, or year), which
//! suits listings that only expose a coarse timestamp.
//!
//! Date arguments accept a parsed datetime, a date-only value (treated as
//! midnight), or a human-readable phrase such as `"3 days ago"`. A maximum
//! bound with an unset time-of-day is pushed to `23:59:59` so that
//! `before: "2016-04-10"` still covers the whole of April 10th. Absent bounds
//! resolve to the datetime extremes and the window comparison is
//! `min <= target < max`.

use std::str::FromStr;

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, Timelike, Utc};

use crate::error::PaginateError;

/// A date argument: already-parsed, date-only, or human-readable text.
#[derive(Debug, Clone)]
pub enum DateInput {
    /// A parsed datetime, used as-is.
    DateTime(NaiveDateTime),
    /// A date without time-of-day, treated as midnight.
    Date(NaiveDate),
    /// Text to be resolved by the date parser, absolute or relative.
    Text(String),
}

impl From<NaiveDateTime> for DateInput {
    fn from(value: NaiveDateTime) -> Self {
        DateInput::DateTime(value)
    }
}

impl From<NaiveDate> for DateInput {
    fn from(value: NaiveDate) -> Self {
        DateInput::Date(value)
    }
}

impl From<&str> for DateInput {
    fn from(value: &str) -> Self {
        DateInput::Text(value.to_string())
    }
}

impl From<String> for DateInput {
    fn from(value: String) -> Self {
        DateInput::Text(value)
    }
}

impl DateInput {
    /// Resolves the input to a datetime, or fails with
    /// [`PaginateError::InvalidDate`] when the text cannot be parsed.
    pub fn to_datetime(&self) -> Result<NaiveDateTime, PaginateError> {
        match self {
            DateInput::DateTime(dt) => Ok(*dt),
            DateInput::Date(date) => Ok(midnight(*date)),
            DateInput::Text(text) => parse_text(text),
        }
    }
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_opt(0, 0, 0).unwrap_or(NaiveDateTime::MIN)
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d %B %Y", "%B %d, %Y"];

fn parse_text(text: &str) -> Result<NaiveDateTime, PaginateError> {
    let trimmed = text.trim();

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(dt);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Ok(midnight(date));
        }
    }
    if let Some(dt) = parse_relative(trimmed) {
        return Ok(dt);
    }

    Err(PaginateError::InvalidDate(text.to_string()))
}

/// Resolves relative phrases like `"3 days ago"` against the current UTC time.
fn parse_relative(text: &str) -> Option<NaiveDateTime> {
    let now = Utc::now().naive_utc();
    let lowered = text.to_ascii_lowercase();

    match lowered.as_str() {
        "now" => return Some(now),
        "today" => return Some(midnight(now.date())),
        "yesterday" => return Some(midnight(now.date() - Duration::days(1))),
        "tomorrow" => return Some(midnight(now.date() + Duration::days(1))),
        _ => {}
    }

    let mut parts = lowered.split_whitespace();
    let amount: u32 = parts.next()?.parse().ok()?;
    let unit = parts.next()?;
    if parts.next() != Some("ago") || parts.next().is_some() {
        return None;
    }

    match unit {
        "minute" | "minutes" => Some(now - Duration::minutes(amount as i64)),
        "hour" | "hours" => Some(now - Duration::hours(amount as i64)),
        "day" | "days" => Some(now - Duration::days(amount as i64)),
        "week" | "weeks" => Some(now - Duration::weeks(amount as i64)),
        "month" | "months" => now.checked_sub_months(Months::new(amount)),
        "year" | "years" => now.checked_sub_months(Months::new(amount.checked_mul(12)?)),
        _ => None,
    }
}

/// A calendar granularity for [`date_in_period_matches`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Day,
    Week,
    Month,
    Year,
}

impl FromStr for Period {
    type Err = PaginateError;

    /// Parses a period name; plural aliases are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" | "days" => Ok(Period::Day),
            "week" | "weeks" => Ok(Period::Week),
            "month" | "months" => Ok(Period::Month),
            "year" | "years" => Ok(Period::Year),
            other => Err(PaginateError::InvalidPeriod(other.to_string())),
        }
    }
}

/// The date window a candidate is checked against.
///
/// `on` pins both ends of the window to one day; `after`/`since` set the
/// minimum bound and `before` the maximum; `min_date`/`max_date` set either
/// bound directly and yield to the named options when both are given.
#[derive(Debug, Clone, Default)]
pub struct DateOptions {
    on: Option<DateInput>,
    before: Option<DateInput>,
    after: Option<DateInput>,
    since: Option<DateInput>,
    min_date: Option<DateInput>,
    max_date: Option<DateInput>,
}

impl DateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the window to the given day.
    pub fn on(mut self, value: impl Into<DateInput>) -> Self {
        self.on = Some(value.into());
        self
    }

    /// Sets the maximum bound.
    pub fn before(mut self, value: impl Into<DateInput>) -> Self {
        self.before = Some(value.into());
        self
    }

    /// Sets the minimum bound.
    pub fn after(mut self, value: impl Into<DateInput>) -> Self {
        self.after = Some(value.into());
        self
    }

    /// Sets the minimum bound.
    pub fn since(mut self, value: impl Into<DateInput>) -> Self {
        self.since = Some(value.into());
        self
    }

    /// Sets the minimum bound directly.
    pub fn min_date(mut self, value: impl Into<DateInput>) -> Self {
        self.min_date = Some(value.into());
        self
    }

    /// Sets the maximum bound directly.
    pub fn max_date(mut self, value: impl Into<DateInput>) -> Self {
        self.max_date = Some(value.into());
        self
    }

    /// Resolves the minimum bound, defaulting to the datetime minimum.
    fn min_bound(&self) -> Result<NaiveDateTime, PaginateError> {
        for candidate in [&self.on, &self.after, &self.since, &self.min_date] {
            if let Some(input) = candidate {
                return input.to_datetime();
            }
        }
        Ok(NaiveDateTime::MIN)
    }

    /// Resolves the maximum bound, defaulting to the datetime maximum. A
    /// configured bound with an unset time-of-day is normalized to 23:59:59.
    fn max_bound(&self) -> Result<NaiveDateTime, PaginateError> {
        for candidate in [&self.on, &self.before, &self.max_date] {
            if let Some(input) = candidate {
                let max = input.to_datetime()?;
                if max.hour() == 0 && max.minute() == 0 && max.second() == 0 {
                    return Ok(max
                        .date()
                        .and_hms_opt(23, 59, 59)
                        .unwrap_or(NaiveDateTime::MAX));
                }
                return Ok(max);
            }
        }
        Ok(NaiveDateTime::MAX)
    }
}

/// Returns `true` when `target` lies in `[min, max)`.
pub fn has_valid_date(target: NaiveDateTime, min: NaiveDateTime, max: NaiveDateTime) -> bool {
    min <= target && target < max
}

/// Returns whether `data` carries a date inside the window described by
/// `options`. Empty data never matches.
pub fn date_matches(
    data: Option<DateInput>,
    options: &DateOptions,
) -> Result<bool, PaginateError> {
    let Some(input) = data else {
        return Ok(false);
    };
    let target = input.to_datetime()?;
    Ok(has_valid_date(target, options.min_bound()?, options.max_bound()?))
}

/// Returns whether `data` carries a date inside the window at the given
/// calendar granularity: the minimum bound's period must not come after the
/// target's, and when `check_maximum` is set the target's period must not
/// come after the maximum bound's. Empty data never matches.
pub fn date_in_period_matches(
    data: Option<DateInput>,
    period: Period,
    check_maximum: bool,
    options: &DateOptions,
) -> Result<bool, PaginateError> {
    let Some(input) = data else {
        return Ok(false);
    };
    let target = input.to_datetime()?;
    let min = options.min_bound()?;
    let max = options.max_bound()?;

    let matched = match period {
        Period::Day => {
            min.date() <= target.date() && (!check_maximum || target.date() <= max.date())
        }
        Period::Week => {
            let week = |dt: NaiveDateTime| {
                let iso = dt.date().iso_week();
                (iso.year(), iso.week())
            };
            week(min) <= week(target) && (!check_maximum || week(target) <= week(max))
        }
        Period::Month => {
            let month = |dt: NaiveDateTime| (dt.year(), dt.month());
            month(min) <= month(target) && (!check_maximum || month(target) <= month(max))
        }
        Period::Year => min.year() <= target.year() && (!check_maximum || target.year() <= max.year()),
    };
    Ok(matched)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    #[test]
    fn datetime_input_is_used_as_is() {
        let value = dt("2016-04-10T12:30:00");
        assert_eq!(DateInput::from(value).to_datetime().unwrap(), value);
    }

    #[test]
    fn date_input_resolves_to_midnight() {
        let date = NaiveDate::from_ymd_opt(2016, 4, 10).unwrap();
        assert_eq!(
            DateInput::from(date).to_datetime().unwrap(),
            dt("2016-04-10T00:00:00")
        );
    }

    #[test]
    fn text_input_parses_common_formats() {
        assert_eq!(
            DateInput::from("2016-04-10").to_datetime().unwrap(),
            dt("2016-04-10T00:00:00")
        );
        assert_eq!(
            DateInput::from("2016-04-10 12:00:00").to_datetime().unwrap(),
            dt("2016-04-10T12:00:00")
        );
    }

    #[test]
    fn relative_phrases_resolve_against_now() {
        let resolved = DateInput::from("3 days ago").to_datetime().unwrap();
        let expected = Utc::now().naive_utc() - Duration::days(3);
        assert!((expected - resolved).num_seconds().abs() < 5);
    }

    #[test]
    fn absurd_relative_years_fail_instead_of_overflowing() {
        let err = DateInput::from("400000000 years ago")
            .to_datetime()
            .unwrap_err();
        assert!(matches!(err, PaginateError::InvalidDate(_)));
    }

    #[test]
    fn unparseable_text_is_an_invalid_date() {
        let err = DateInput::from("---").to_datetime().unwrap_err();
        assert!(matches!(err, PaginateError::InvalidDate(_)));
    }

    #[test]
    fn unrecognized_period_is_an_invalid_argument() {
        let err = Period::from_str("fortnight").unwrap_err();
        assert!(matches!(err, PaginateError::InvalidPeriod(_)));
        assert_eq!(Period::from_str("weeks").unwrap(), Period::Week);
    }

    #[test]
    fn empty_data_never_matches() {
        assert!(!date_matches(None, &DateOptions::new()).unwrap());
        assert!(!date_in_period_matches(None, Period::Day, true, &DateOptions::new()).unwrap());
    }

    #[test]
    fn missing_bounds_default_to_extremes() {
        let options = DateOptions::new();
        assert!(date_matches(Some("2016-04-10".into()), &options).unwrap());
    }

    #[test]
    fn before_without_time_covers_the_whole_day() {
        let options = DateOptions::new().before("2016-04-10");
        assert!(date_matches(Some(dt("2016-04-10T12:00:00").into()), &options).unwrap());
        assert!(!date_matches(Some(dt("2016-04-11T00:00:00").into()), &options).unwrap());
    }

    #[test]
    fn on_pins_the_window_to_one_day() {
        let options = DateOptions::new().on("2016-04-10");
        assert!(date_matches(Some(dt("2016-04-10T08:00:00").into()), &options).unwrap());
        assert!(!date_matches(Some(dt("2016-04-09T23:00:00").into()), &options).unwrap());
        assert!(!date_matches(Some(dt("2016-04-11T01:00:00").into()), &options).unwrap());
    }

    #[test]
    fn since_sets_the_minimum_bound() {
        let options = DateOptions::new().since("2016-04-08");
        assert!(date_matches(Some(dt("2016-04-09T00:00:00").into()), &options).unwrap());
        assert!(!date_matches(Some(dt("2016-04-07T23:59:59").into()), &options).unwrap());
    }

    #[test]
    fn week_period_matches_same_iso_week_without_maximum() {
        // 2016-04-05 and 2016-04-08 share ISO week 14 of 2016.
        let options = DateOptions::new().since("2016-04-05");
        let matched = date_in_period_matches(
            Some(dt("2016-04-08T10:00:00").into()),
            Period::Week,
            false,
            &options,
        )
        .unwrap();
        assert!(matched);
    }

    #[test]
    fn week_period_respects_the_maximum_when_checked() {
        let options = DateOptions::new().since("2016-04-05").before("2016-04-09");
        // Next ISO week is out of the window once the maximum is checked.
        let matched = date_in_period_matches(
            Some(dt("2016-04-12T10:00:00").into()),
            Period::Week,
            true,
            &options,
        )
        .unwrap();
        assert!(!matched);
    }

    #[test]
    fn month_and_year_periods_compare_at_their_granularity() {
        let options = DateOptions::new().since("2016-04-30");
        // Earlier day of the same month still matches at month granularity.
        assert!(date_in_period_matches(
            Some(dt("2016-04-01T00:00:00").into()),
            Period::Month,
            false,
            &options,
        )
        .unwrap());
        assert!(!date_in_period_matches(
            Some(dt("2016-03-31T00:00:00").into()),
            Period::Month,
            false,
            &options,
        )
        .unwrap());
        assert!(date_in_period_matches(
            Some(dt("2016-01-01T00:00:00").into()),
            Period::Year,
            false,
            &options,
        )
        .unwrap());
    }

    #[test]
    fn day_period_ignores_time_of_day() {
        let options = DateOptions::new()
            .min_date(dt("2016-04-10T22:00:00"))
            .max_date(dt("2016-04-10T23:00:00"));
        assert!(date_in_period_matches(
            Some(dt("2016-04-10T01:00:00").into()),
            Period::Day,
            true,
            &options,
        )
        .unwrap());
    }
}
