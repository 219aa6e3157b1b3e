//! Natural-language date parsing for English date expressions.
//!
//! Supports formats:
//! - keywords: "now", "today", "midnight", "noon", "tomorrow", "yesterday"
//! - timestamps: "@1700000000"
//! - numeric dates: "2024-01-05", "2024/01/05", "01/05/2024", "05.01.2024", "05-01-2024"
//! - textual dates: "5 January 2024", "January 5, 2024", "5. Jan 2024", "January"
//! - weekdays: "monday", "next fri", "last sunday"
//! - clock times: "14:30", "2:30pm", "9am"
//! - relative offsets: "+1 day", "-2 weeks", "3 months ago", "next year"

use chrono::{
    DateTime, Datelike, Days, FixedOffset, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta,
    TimeZone, Weekday,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    This,
    Next,
    Last,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Fortnight,
    Month,
    Year,
}

#[derive(Debug, Default)]
struct Parsed {
    date: Option<NaiveDate>,
    year: Option<i32>,
    month: Option<u32>,
    day: Option<u32>,
    time: Option<NaiveTime>,
    weekday: Option<(Weekday, Direction)>,
    day_offset: i64,
    relative: Vec<(i64, Unit)>,
    reset_time: bool,
}

/// Parses an English date expression relative to `now`.
///
/// Returns `None` for anything it does not fully understand.
pub fn parse_datetime(text: &str, now: DateTime<FixedOffset>) -> Option<DateTime<FixedOffset>> {
    let lowered = text.trim().to_lowercase();
    if lowered.is_empty() {
        return None;
    }

    if let Some(rest) = lowered.strip_prefix('@') {
        let timestamp: i64 = rest.trim().parse().ok()?;
        return now.offset().timestamp_opt(timestamp, 0).single();
    }

    let tokens = tokenize(&lowered);
    let parsed = parse_tokens(&tokens)?;
    let local = apply(parsed, now.naive_local())?;
    now.offset().from_local_datetime(&local).single()
}

fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for token in text.replace(',', " ").split_whitespace() {
        // "2024-01-05t10:00" carries date and time in one token
        if let Some((date, time)) = token.split_once('t') {
            if parse_numeric_date(date).is_some() && !time.is_empty() {
                tokens.push(date.to_string());
                tokens.push(time.trim_end_matches('z').to_string());
                continue;
            }
        }
        tokens.push(token.to_string());
    }
    tokens
}

fn parse_tokens(tokens: &[String]) -> Option<Parsed> {
    let mut parsed = Parsed::default();
    let mut i = 0;

    while i < tokens.len() {
        let token = tokens[i].as_str();
        let next = tokens.get(i + 1).map(String::as_str);

        match token {
            "now" | "at" | "on" | "the" => {}
            "today" | "midnight" => parsed.reset_time = true,
            "noon" => parsed.time = NaiveTime::from_hms_opt(12, 0, 0),
            "tomorrow" => {
                parsed.day_offset += 1;
                parsed.reset_time = true;
            }
            "yesterday" => {
                parsed.day_offset -= 1;
                parsed.reset_time = true;
            }
            "ago" => {
                for (amount, _) in parsed.relative.iter_mut() {
                    *amount = -*amount;
                }
            }
            "next" | "last" | "previous" | "this" => {
                let direction = match token {
                    "next" => Direction::Next,
                    "this" => Direction::This,
                    _ => Direction::Last,
                };
                let target = next?;
                if let Some(weekday) = weekday_from_name(target) {
                    parsed.weekday = Some((weekday, direction));
                    parsed.reset_time = true;
                } else if let Some(unit) = unit_from_name(target) {
                    match direction {
                        Direction::Next => parsed.relative.push((1, unit)),
                        Direction::Last => parsed.relative.push((-1, unit)),
                        Direction::This => {}
                    }
                } else {
                    return None;
                }
                i += 2;
                continue;
            }
            _ => {
                if let Some(date) = parse_numeric_date(token) {
                    parsed.date = Some(date);
                    parsed.reset_time = true;
                } else if let Some((time, consumed_next)) = parse_clock(token, next) {
                    parsed.time = Some(time);
                    if consumed_next {
                        i += 1;
                    }
                } else if let Some(weekday) = weekday_from_name(token) {
                    parsed.weekday = Some((weekday, Direction::This));
                    parsed.reset_time = true;
                } else if let Some(month) = month_from_name(token) {
                    // "january 5 2024", "january 2024", "january"
                    parsed.month = Some(month);
                    parsed.reset_time = true;
                    if let Some(day) = tokens.get(i + 1).and_then(|t| parse_day_number(t)) {
                        parsed.day = Some(day);
                        i += 1;
                    }
                    if let Some(year) = tokens.get(i + 1).and_then(|t| parse_year(t)) {
                        parsed.year = Some(year);
                        i += 1;
                    }
                } else if let (Some(day), Some(month)) =
                    (parse_day_number(token), next.and_then(month_from_name))
                {
                    // "5 january 2024", "5. jan"
                    parsed.day = Some(day);
                    parsed.month = Some(month);
                    parsed.reset_time = true;
                    i += 1;
                    if let Some(year) = tokens.get(i + 1).and_then(|t| parse_year(t)) {
                        parsed.year = Some(year);
                        i += 1;
                    }
                } else if let (Some(amount), Some(unit)) =
                    (parse_signed_int(token), next.and_then(unit_from_name))
                {
                    parsed.relative.push((amount, unit));
                    i += 1;
                } else {
                    return None;
                }
            }
        }

        i += 1;
    }

    Some(parsed)
}

fn apply(parsed: Parsed, now: NaiveDateTime) -> Option<NaiveDateTime> {
    let mut date = parsed.date.unwrap_or_else(|| now.date());

    if parsed.year.is_some() || parsed.month.is_some() || parsed.day.is_some() {
        let year = parsed.year.unwrap_or_else(|| date.year());
        let month = parsed.month.unwrap_or_else(|| date.month());
        let day = parsed.day.unwrap_or_else(|| date.day());
        date = clamped_date(year, month, day)?;
    }

    if let Some((weekday, direction)) = parsed.weekday {
        let current = i64::from(date.weekday().num_days_from_monday());
        let target = i64::from(weekday.num_days_from_monday());
        let mut delta = (target - current).rem_euclid(7);
        match direction {
            Direction::This => {}
            Direction::Next if delta == 0 => delta = 7,
            Direction::Next => {}
            Direction::Last => delta -= 7,
        }
        date = shift_days(date, delta)?;
    }

    date = shift_days(date, parsed.day_offset)?;

    let time = match parsed.time {
        Some(time) => time,
        None if parsed.reset_time => NaiveTime::from_hms_opt(0, 0, 0)?,
        None => now.time(),
    };

    let mut moment = date.and_time(time);
    for (amount, unit) in parsed.relative {
        moment = shift(moment, amount, unit)?;
    }

    Some(moment)
}

fn clamped_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    (28..=day.max(28))
        .rev()
        .filter(|candidate| *candidate <= day)
        .find_map(|candidate| NaiveDate::from_ymd_opt(year, month, candidate))
        .or_else(|| NaiveDate::from_ymd_opt(year, month, day))
}

fn shift_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    if days >= 0 {
        date.checked_add_days(Days::new(days.unsigned_abs()))
    } else {
        date.checked_sub_days(Days::new(days.unsigned_abs()))
    }
}

fn shift(moment: NaiveDateTime, amount: i64, unit: Unit) -> Option<NaiveDateTime> {
    let seconds_per = match unit {
        Unit::Second => 1,
        Unit::Minute => 60,
        Unit::Hour => 3_600,
        Unit::Day => 86_400,
        Unit::Week => 7 * 86_400,
        Unit::Fortnight => 14 * 86_400,
        Unit::Month | Unit::Year => {
            let months = if unit == Unit::Year {
                amount.checked_mul(12)?
            } else {
                amount
            };
            let months = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
            return if amount >= 0 {
                moment.checked_add_months(months)
            } else {
                moment.checked_sub_months(months)
            };
        }
    };

    let delta = TimeDelta::try_seconds(amount.checked_mul(seconds_per)?)?;
    moment.checked_add_signed(delta)
}

/// Parses "2024-01-05", "2024/01/05", "01/05/2024" (m/d/Y), "05.01.2024" and "05-01-2024" (d.m.Y).
fn parse_numeric_date(token: &str) -> Option<NaiveDate> {
    let separator = ['-', '/', '.'].into_iter().find(|sep| token.contains(*sep))?;
    let parts: Vec<&str> = token.split(separator).collect();
    if parts.len() != 3 || parts.iter().any(|p| p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit())) {
        return None;
    }

    let numbers: Vec<u32> = parts.iter().map(|p| p.parse().ok()).collect::<Option<_>>()?;

    if parts[0].len() == 4 {
        return NaiveDate::from_ymd_opt(numbers[0] as i32, numbers[1], numbers[2]);
    }
    if parts[2].len() != 4 {
        return None;
    }

    let year = numbers[2] as i32;
    match separator {
        '/' => NaiveDate::from_ymd_opt(year, numbers[0], numbers[1]),
        _ => NaiveDate::from_ymd_opt(year, numbers[1], numbers[0]),
    }
}

fn parse_clock(token: &str, next: Option<&str>) -> Option<(NaiveTime, bool)> {
    let (body, mut meridiem) = if let Some(body) = token.strip_suffix("am") {
        (body, Some(false))
    } else if let Some(body) = token.strip_suffix("pm") {
        (body, Some(true))
    } else {
        (token, None)
    };

    let mut consumed_next = false;
    if meridiem.is_none() {
        match next {
            Some("am") => meridiem = Some(false),
            Some("pm") => meridiem = Some(true),
            _ => {}
        }
        consumed_next = meridiem.is_some();
    }

    if !body.contains(':') && meridiem.is_none() {
        return None;
    }

    let parts: Vec<&str> = body.split(':').collect();
    if parts.is_empty()
        || parts.len() > 3
        || parts.iter().any(|p| p.is_empty() || p.len() > 2 || !p.bytes().all(|b| b.is_ascii_digit()))
    {
        return None;
    }

    let mut hour: u32 = parts[0].parse().ok()?;
    let minute: u32 = parts.get(1).map_or(Some(0), |p| p.parse().ok())?;
    let second: u32 = parts.get(2).map_or(Some(0), |p| p.parse().ok())?;

    if let Some(is_pm) = meridiem {
        if !(1..=12).contains(&hour) {
            return None;
        }
        hour = match (hour, is_pm) {
            (12, false) => 0,
            (12, true) => 12,
            (h, true) => h + 12,
            (h, false) => h,
        };
    }

    NaiveTime::from_hms_opt(hour, minute, second).map(|time| (time, consumed_next))
}

fn parse_day_number(token: &str) -> Option<u32> {
    let digits = token
        .strip_suffix('.')
        .or_else(|| ["st", "nd", "rd", "th"].iter().find_map(|s| token.strip_suffix(s)))
        .unwrap_or(token);
    if digits.is_empty() || digits.len() > 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let day: u32 = digits.parse().ok()?;
    (1..=31).contains(&day).then_some(day)
}

fn parse_year(token: &str) -> Option<i32> {
    if token.len() == 4 && token.bytes().all(|b| b.is_ascii_digit()) {
        token.parse().ok()
    } else {
        None
    }
}

fn parse_signed_int(token: &str) -> Option<i64> {
    let digits = token.strip_prefix('+').unwrap_or(token);
    let unsigned = digits.strip_prefix('-').unwrap_or(digits);
    if unsigned.is_empty() || !unsigned.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Maps an English weekday name or abbreviation to a weekday.
pub(crate) fn weekday_from_name(name: &str) -> Option<Weekday> {
    match name.trim().trim_end_matches('.').to_lowercase().as_str() {
        "mon" | "monday" => Some(Weekday::Mon),
        "tue" | "tues" | "tuesday" => Some(Weekday::Tue),
        "wed" | "wednesday" => Some(Weekday::Wed),
        "thu" | "thur" | "thurs" | "thursday" => Some(Weekday::Thu),
        "fri" | "friday" => Some(Weekday::Fri),
        "sat" | "saturday" => Some(Weekday::Sat),
        "sun" | "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}

/// Maps an English month name or abbreviation to its number (1 = January).
pub(crate) fn month_from_name(name: &str) -> Option<u32> {
    match name.trim().trim_end_matches('.').to_lowercase().as_str() {
        "jan" | "january" => Some(1),
        "feb" | "february" => Some(2),
        "mar" | "march" => Some(3),
        "apr" | "april" => Some(4),
        "may" => Some(5),
        "jun" | "june" => Some(6),
        "jul" | "july" => Some(7),
        "aug" | "august" => Some(8),
        "sep" | "sept" | "september" => Some(9),
        "oct" | "october" => Some(10),
        "nov" | "november" => Some(11),
        "dec" | "december" => Some(12),
        _ => None,
    }
}

fn unit_from_name(name: &str) -> Option<Unit> {
    match name {
        "sec" | "secs" | "second" | "seconds" => Some(Unit::Second),
        "min" | "mins" | "minute" | "minutes" => Some(Unit::Minute),
        "hour" | "hours" => Some(Unit::Hour),
        "day" | "days" => Some(Unit::Day),
        "week" | "weeks" => Some(Unit::Week),
        "fortnight" | "fortnights" => Some(Unit::Fortnight),
        "month" | "months" => Some(Unit::Month),
        "year" | "years" => Some(Unit::Year),
        _ => None,
    }
}
