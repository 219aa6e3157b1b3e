//! Date normalization: translated names, timestamps and date formats.

use crate::locale::Locale;
use crate::natural;
use crate::value::is_numeric_str;
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use regex::{Captures, Regex};

/// Replaces translated weekday and month names with their English names.
///
/// Matching is case-insensitive and only on whole words. Names whose
/// translation already is the English name are left alone, so English text
/// comes back unchanged.
pub fn translated_names_to_english(text: &str, locale: &Locale) -> String {
    if text.trim().is_empty() {
        return text.to_string();
    }

    let table = locale.table();
    let days = substitute(text, table.day_pairs().collect());
    substitute(&days, table.month_pairs().collect())
}

fn substitute(text: &str, pairs: Vec<(&str, &'static str)>) -> String {
    let mut names: Vec<(String, &'static str)> = pairs
        .into_iter()
        .map(|(translated, english)| (translated.trim().to_lowercase(), english))
        .filter(|(translated, english)| !translated.is_empty() && *translated != english.to_lowercase())
        .collect();

    if names.is_empty() {
        return text.to_string();
    }

    // longest first so "Mittwoch" never loses to a shorter prefix
    names.sort_by(|a, b| b.0.chars().count().cmp(&a.0.chars().count()));

    let alternatives: Vec<String> = names.iter().map(|(name, _)| regex::escape(name)).collect();
    let pattern = format!(r"(?i)\b(?:{})\b", alternatives.join("|"));
    let regex = match Regex::new(&pattern) {
        Ok(regex) => regex,
        Err(err) => {
            tracing::warn!(error = %err, "could not build name pattern, leaving text untouched");
            return text.to_string();
        }
    };

    regex
        .replace_all(text, |caps: &Captures| {
            let matched = caps[0].to_lowercase();
            names
                .iter()
                .find(|(name, _)| *name == matched)
                .map(|(_, english)| english.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Returns the value as a timestamp if it already is one (integer text).
pub fn parse_timestamp(value: &str) -> Option<i64> {
    value.trim().parse::<i64>().ok()
}

/// Converts a date expression to a Unix timestamp.
///
/// Integer text is taken as a timestamp and never re-parsed.
pub fn try_epoch(value: &str, now: DateTime<FixedOffset>) -> Option<i64> {
    parse_timestamp(value).or_else(|| natural::parse_datetime(value, now).map(|dt| dt.timestamp()))
}

/// Converts a date expression to a Unix timestamp, or coerces it to an integer.
///
/// Timestamp-shaped input passes through unchanged. Other numeric text is
/// truncated to an integer; text that is not a date yields its leading
/// integer, or `0`.
pub fn to_epoch_or_passthrough(value: &str, now: DateTime<FixedOffset>) -> i64 {
    try_epoch(value, now)
        .or_else(|| numeric_int(value))
        .unwrap_or_else(|| leading_int(value))
}

/// Truncated integer of numeric text such as `"1.5e3"`.
fn numeric_int(value: &str) -> Option<i64> {
    if !is_numeric_str(value) {
        return None;
    }
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
        .map(|number| number as i64)
}

/// Leading integer of a string, `0` when there is none.
pub fn leading_int(value: &str) -> i64 {
    let trimmed = value.trim_start();
    let (sign, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1, &trimmed[1..]),
        Some(b'+') => (1, &trimmed[1..]),
        _ => (1, trimmed),
    };
    let end = digits.bytes().take_while(u8::is_ascii_digit).count();
    digits[..end]
        .parse::<i64>()
        .map(|n| sign * n)
        .unwrap_or_else(|_| if end == 0 { 0 } else if sign < 0 { i64::MIN } else { i64::MAX })
}

/// Parses a date-picker value against a list of strftime formats.
///
/// Formats without a time component produce midnight.
pub fn parse_picker_date(value: &str, formats: &[String], offset: FixedOffset) -> Option<i64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    formats.iter().find_map(|format| {
        let local = NaiveDateTime::parse_from_str(value, format)
            .ok()
            .or_else(|| NaiveDate::parse_from_str(value, format).ok()?.and_hms_opt(0, 0, 0))?;
        offset.from_local_datetime(&local).single().map(|dt| dt.timestamp())
    })
}

/// Converts a PHP `date()` format string to a chrono strftime string.
pub fn php_format_to_strftime(format: &str) -> String {
    let mut out = String::with_capacity(format.len() * 2);
    let mut chars = format.chars();

    while let Some(c) = chars.next() {
        match c {
            'd' | 'j' => out.push_str("%d"),
            'm' | 'n' => out.push_str("%m"),
            'Y' => out.push_str("%Y"),
            'y' => out.push_str("%y"),
            'F' => out.push_str("%B"),
            'M' => out.push_str("%b"),
            'D' => out.push_str("%a"),
            'l' => out.push_str("%A"),
            'H' | 'G' => out.push_str("%H"),
            'h' | 'g' => out.push_str("%I"),
            'i' => out.push_str("%M"),
            's' => out.push_str("%S"),
            'a' | 'A' => out.push_str("%p"),
            'U' => out.push_str("%s"),
            'S' => {}
            '%' => out.push_str("%%"),
            '\\' => {
                if let Some(escaped) = chars.next() {
                    if escaped == '%' {
                        out.push_str("%%");
                    } else {
                        out.push(escaped);
                    }
                }
            }
            other => out.push(other),
        }
    }

    out
}

/// Parses a value stored in a PHP date format.
///
/// With `date_only` the time of day is dropped and midnight is used.
pub fn parse_with_php_format(
    value: &str,
    php_format: &str,
    offset: FixedOffset,
    date_only: bool,
) -> Option<i64> {
    let format = php_format_to_strftime(php_format);
    let value = value.trim();

    let local = match NaiveDateTime::parse_from_str(value, &format) {
        Ok(moment) if date_only => moment.date().and_hms_opt(0, 0, 0)?,
        Ok(moment) => moment,
        Err(_) => NaiveDate::parse_from_str(value, &format).ok()?.and_hms_opt(0, 0, 0)?,
    };

    offset.from_local_datetime(&local).single().map(|dt| dt.timestamp())
}

/// ISO weekday number (1 = Monday) of a timestamp.
pub fn weekday_number(timestamp: i64, offset: FixedOffset) -> Option<u32> {
    offset
        .timestamp_opt(timestamp, 0)
        .single()
        .map(|dt| dt.weekday().number_from_monday())
}

/// Month number (1 = January) of a timestamp.
pub fn month_number(timestamp: i64, offset: FixedOffset) -> Option<u32> {
    offset.timestamp_opt(timestamp, 0).single().map(|dt| dt.month())
}

/// ISO weekday number for an English weekday name.
pub fn weekday_index(name: &str) -> Option<u32> {
    natural::weekday_from_name(name).map(|weekday| weekday.number_from_monday())
}

/// Month number for an English month name.
pub fn month_index(name: &str) -> Option<u32> {
    natural::month_from_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::DayMonthTable;

    fn now() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2024-03-13T10:30:00+00:00").unwrap()
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn german() -> Locale {
        Locale::with_table(
            "de_DE",
            DayMonthTable::from_names(
                ["Montag", "Dienstag", "Mittwoch", "Donnerstag", "Freitag", "Samstag", "Sonntag"],
                [
                    "Januar", "Februar", "März", "April", "Mai", "Juni", "Juli", "August",
                    "September", "Oktober", "November", "Dezember",
                ],
            ),
        )
    }

    #[test]
    fn test_translate_german_names() {
        let text = translated_names_to_english("Mittwoch, 13. März 2024", &german());
        assert_eq!(text, "Wednesday, 13. March 2024");

        let text = translated_names_to_english("montag und MAI", &german());
        assert_eq!(text, "Monday und May");
    }

    #[test]
    fn test_translate_whole_words_only() {
        // "Mai" inside "Maier" is not a month
        let text = translated_names_to_english("Herr Maier", &german());
        assert_eq!(text, "Herr Maier");
    }

    #[test]
    fn test_translate_english_is_idempotent() {
        let english = Locale::english();
        let text = "monday, 5 January and friday in MAY";
        assert_eq!(translated_names_to_english(text, &english), text);
    }

    #[test]
    fn test_timestamp_passthrough() {
        assert_eq!(to_epoch_or_passthrough("1700000000", now()), 1_700_000_000);
        assert_eq!(to_epoch_or_passthrough(" 42 ", now()), 42);
    }

    #[test]
    fn test_epoch_from_text() {
        assert_eq!(to_epoch_or_passthrough("2024-01-05", now()), 1_704_412_800);
        assert_eq!(try_epoch("today", now()), Some(1_710_288_000));
    }

    #[test]
    fn test_unparseable_coerces_to_int() {
        assert_eq!(to_epoch_or_passthrough("hello", now()), 0);
        assert_eq!(to_epoch_or_passthrough("12 monkeys", now()), 12);
        assert_eq!(to_epoch_or_passthrough("1.5e3", now()), 1500);
        assert_eq!(try_epoch("hello", now()), None);
    }

    #[test]
    fn test_leading_int() {
        assert_eq!(leading_int("-17abc"), -17);
        assert_eq!(leading_int("abc"), 0);
        assert_eq!(leading_int(""), 0);
    }

    #[test]
    fn test_picker_date() {
        let formats = vec!["%Y-%m-%d %H:%M".to_string(), "%Y-%m-%d".to_string()];
        assert_eq!(parse_picker_date("2024-01-05 12:00", &formats, utc()), Some(1_704_456_000));
        assert_eq!(parse_picker_date("2024-01-05", &formats, utc()), Some(1_704_412_800));
        assert_eq!(parse_picker_date("next friday", &formats, utc()), None);
    }

    #[test]
    fn test_php_format_conversion() {
        assert_eq!(php_format_to_strftime("d/m/Y"), "%d/%m/%Y");
        assert_eq!(php_format_to_strftime("F j, Y g:i a"), "%B %d, %Y %I:%M %p");
        assert_eq!(php_format_to_strftime(r"Y\m\d"), "%Ymd");
    }

    #[test]
    fn test_parse_with_php_format() {
        assert_eq!(parse_with_php_format("05/01/2024", "d/m/Y", utc(), true), Some(1_704_412_800));
        assert_eq!(
            parse_with_php_format("2024-01-05 12:00:00", "Y-m-d H:i:s", utc(), false),
            Some(1_704_456_000)
        );
        assert_eq!(
            parse_with_php_format("2024-01-05 12:00:00", "Y-m-d H:i:s", utc(), true),
            Some(1_704_412_800)
        );
        assert_eq!(parse_with_php_format("garbage", "d/m/Y", utc(), true), None);
    }

    #[test]
    fn test_weekday_and_month_numbers() {
        // 2024-01-05 is a Friday
        assert_eq!(weekday_number(1_704_412_800, utc()), Some(5));
        assert_eq!(month_number(1_704_412_800, utc()), Some(1));
        assert_eq!(weekday_index("Sunday"), Some(7));
        assert_eq!(month_index("december"), Some(12));
    }
}
