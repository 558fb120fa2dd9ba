// ABOUTME: Resolves relative ("5 gün önce", "3 days ago") and absolute date strings to UTC instants.
// ABOUTME: Unrecognized input yields the epoch sentinel instead of an error.

//! Date resolution.
//!
//! [`resolve_date`] first tries `<count> <unit> <ago>` using the locale's
//! tokens, wherever they appear in the text and with or without a space
//! between count and unit, then each absolute format of the locale in order.
//! Months and years are subtracted on the calendar (a month before 31 March
//! is 29 February in a leap year), shorter units as fixed durations.
//! Anything else maps to the Unix epoch, which records store as `0`.
//!
//! Token comparison folds Turkish letters to ASCII (`ı`/`İ` to `i`, `ğ` to
//! `g`, and so on), so `GÜN`, `gün` and `gun` are the same unit.

use chrono::{DateTime, Months, NaiveDate, NaiveDateTime, TimeDelta, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::text::fold_case as fold;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

/// Absolute date layouts, tried in the order a locale lists them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbsoluteFormat {
    /// RFC 3339 / ISO-8601 with or without offset, or a bare `yyyy-MM-dd`.
    Iso,
    /// `12 Ocak 2024`
    DayMonthYear,
    /// `Ocak 12, 2024`
    MonthDayYear,
    /// A chrono `NaiveDate` pattern such as `%d.%m.%Y`.
    Pattern(&'static str),
    /// Last-resort heuristic parser.
    Loose,
}

/// Language tokens for relative dates and month names.
#[derive(Debug)]
pub struct DateLocale {
    pub units: &'static [(&'static str, Unit)],
    pub ago: &'static [&'static str],
    pub one: &'static [&'static str],
    pub months: [&'static str; 12],
    pub formats: &'static [AbsoluteFormat],
}

pub static TURKISH: DateLocale = DateLocale {
    units: &[
        ("saniye", Unit::Second),
        ("dakika", Unit::Minute),
        ("saat", Unit::Hour),
        ("gün", Unit::Day),
        ("hafta", Unit::Week),
        ("ay", Unit::Month),
        ("yıl", Unit::Year),
    ],
    ago: &["önce"],
    one: &["bir"],
    months: [
        "ocak", "şubat", "mart", "nisan", "mayıs", "haziran", "temmuz", "ağustos", "eylül", "ekim",
        "kasım", "aralık",
    ],
    formats: &[
        AbsoluteFormat::Iso,
        AbsoluteFormat::DayMonthYear,
        AbsoluteFormat::MonthDayYear,
        AbsoluteFormat::Pattern("%d.%m.%Y"),
        AbsoluteFormat::Pattern("%d/%m/%Y"),
    ],
};

pub static ENGLISH: DateLocale = DateLocale {
    units: &[
        ("second", Unit::Second),
        ("minute", Unit::Minute),
        ("hour", Unit::Hour),
        ("day", Unit::Day),
        ("week", Unit::Week),
        ("month", Unit::Month),
        ("year", Unit::Year),
    ],
    ago: &["ago"],
    one: &["a", "an", "one"],
    months: [
        "january",
        "february",
        "march",
        "april",
        "may",
        "june",
        "july",
        "august",
        "september",
        "october",
        "november",
        "december",
    ],
    formats: &[
        AbsoluteFormat::Iso,
        AbsoluteFormat::MonthDayYear,
        AbsoluteFormat::DayMonthYear,
        AbsoluteFormat::Pattern("%m/%d/%Y"),
        AbsoluteFormat::Loose,
    ],
};

/// Digit runs and letter runs, so "3gün" and "önce." tokenize like "3 gün" and "önce".
static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+|\p{L}+").expect("valid word regex"));

static DAY_MONTH_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})\s+(\p{L}+)\.?,?\s+(\d{4})").expect("valid regex"));

static MONTH_DAY_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\p{L}+)\.?\s+(\d{1,2}),?\s+(\d{4})").expect("valid regex"));

/// The Unix epoch, used for "unknown".
pub fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::default()
}

/// Resolve `text` relative to `reference`. Never fails.
pub fn resolve_date(text: &str, locale: &DateLocale, reference: DateTime<Utc>) -> DateTime<Utc> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return epoch();
    }
    if let Some(dt) = resolve_relative(trimmed, locale, reference) {
        return dt;
    }
    for format in locale.formats {
        if let Some(dt) = parse_absolute(trimmed, *format, locale) {
            return dt;
        }
    }
    log::debug!("unrecognized date {:?}", trimmed);
    epoch()
}

/// [`resolve_date`] as epoch milliseconds (0 when unknown).
pub fn resolve_date_millis(text: &str, locale: &DateLocale, reference: DateTime<Utc>) -> i64 {
    resolve_date(text, locale, reference).timestamp_millis()
}

/// Parse one absolute date string as UTC millis, 0 when unparsable. For API timestamps.
pub fn iso_millis(text: &str) -> i64 {
    parse_absolute(text.trim(), AbsoluteFormat::Iso, &ENGLISH)
        .map(|dt| dt.timestamp_millis())
        .unwrap_or(0)
}

fn resolve_relative(text: &str, locale: &DateLocale, reference: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let folded = fold(text);
    if !locale.ago.iter().any(|a| folded.contains(fold(a).as_str())) {
        return None;
    }
    let tokens: Vec<&str> = WORD.find_iter(&folded).map(|m| m.as_str()).collect();
    tokens.windows(2).find_map(|pair| {
        let count = parse_count(pair[0], locale)?;
        let unit = parse_unit(pair[1], locale)?;
        subtract(reference, count, unit)
    })
}

fn parse_count(token: &str, locale: &DateLocale) -> Option<i64> {
    if let Ok(n) = token.parse::<i64>() {
        return Some(n);
    }
    locale
        .one
        .iter()
        .any(|w| fold(w) == token)
        .then_some(1)
}

/// Units match by prefix so plurals and suffixed forms ("weeks", "günü") count.
fn parse_unit(token: &str, locale: &DateLocale) -> Option<Unit> {
    locale
        .units
        .iter()
        .find_map(|(name, unit)| token.starts_with(fold(name).as_str()).then_some(*unit))
}

fn subtract(reference: DateTime<Utc>, count: i64, unit: Unit) -> Option<DateTime<Utc>> {
    let delta = match unit {
        Unit::Second => TimeDelta::try_seconds(count),
        Unit::Minute => TimeDelta::try_minutes(count),
        Unit::Hour => TimeDelta::try_hours(count),
        Unit::Day => TimeDelta::try_days(count),
        Unit::Week => TimeDelta::try_weeks(count),
        Unit::Month => {
            return reference.checked_sub_months(Months::new(u32::try_from(count).ok()?));
        }
        Unit::Year => {
            let months = u32::try_from(count).ok()?.checked_mul(12)?;
            return reference.checked_sub_months(Months::new(months));
        }
    };
    reference.checked_sub_signed(delta?)
}

fn month_index(token: &str, locale: &DateLocale) -> Option<u32> {
    let token = fold(token);
    if token.chars().count() < 3 {
        return None;
    }
    locale
        .months
        .iter()
        .position(|m| fold(m).starts_with(&token))
        .map(|i| i as u32 + 1)
}

fn midnight(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_opt(0, 0, 0).map(|dt| Utc.from_utc_datetime(&dt))
}

fn parse_absolute(text: &str, format: AbsoluteFormat, locale: &DateLocale) -> Option<DateTime<Utc>> {
    match format {
        AbsoluteFormat::Iso => {
            if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
                return Some(dt.with_timezone(&Utc));
            }
            for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
                if let Ok(naive) = NaiveDateTime::parse_from_str(text, pattern) {
                    return Some(Utc.from_utc_datetime(&naive));
                }
            }
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(midnight)
        }
        AbsoluteFormat::DayMonthYear => {
            let caps = DAY_MONTH_YEAR.captures(text)?;
            let day = caps[1].parse().ok()?;
            let month = month_index(&caps[2], locale)?;
            let year = caps[3].parse().ok()?;
            NaiveDate::from_ymd_opt(year, month, day).and_then(midnight)
        }
        AbsoluteFormat::MonthDayYear => {
            let caps = MONTH_DAY_YEAR.captures(text)?;
            let month = month_index(&caps[1], locale)?;
            let day = caps[2].parse().ok()?;
            let year = caps[3].parse().ok()?;
            NaiveDate::from_ymd_opt(year, month, day).and_then(midnight)
        }
        AbsoluteFormat::Pattern(pattern) => NaiveDate::parse_from_str(text, pattern)
            .ok()
            .and_then(midnight),
        AbsoluteFormat::Loose => dateparser::parse_with_timezone(text, &Utc).ok(),
    }
}
