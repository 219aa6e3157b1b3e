//! Locale-aware weekday and month name tables.

use chrono::{Datelike, Days, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// English weekday names, index 0 = Monday.
pub const ENGLISH_DAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// English month names, index 0 = January.
pub const ENGLISH_MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Locale code used when none is configured.
pub const DEFAULT_LOCALE: &str = "en_US";

/// Weekday (1..=7) and month (1..=12) names in one language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayMonthTable {
    days: [String; 7],
    months: [String; 12],
}

impl DayMonthTable {
    /// The canonical English table.
    pub fn english() -> Self {
        Self {
            days: ENGLISH_DAYS.map(String::from),
            months: ENGLISH_MONTHS.map(String::from),
        }
    }

    /// Builds a table from explicit names.
    pub fn from_names(days: [&str; 7], months: [&str; 12]) -> Self {
        Self {
            days: days.map(String::from),
            months: months.map(String::from),
        }
    }

    /// Builds a table from chrono's locale data.
    ///
    /// Weekday names come from walking the ISO week containing `today`;
    /// month names from the first of each month of a fixed year.
    fn from_chrono(locale: chrono::Locale, today: NaiveDate) -> Option<Self> {
        let monday = today.checked_sub_days(Days::new(u64::from(today.weekday().num_days_from_monday())))?;

        let mut days: [String; 7] = Default::default();
        for (offset, slot) in days.iter_mut().enumerate() {
            let date = monday.checked_add_days(Days::new(offset as u64))?;
            let moment = Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?);
            *slot = moment.format_localized("%A", locale).to_string();
        }

        let mut months: [String; 12] = Default::default();
        for (index, slot) in months.iter_mut().enumerate() {
            let date = NaiveDate::from_ymd_opt(2000, index as u32 + 1, 1)?;
            let moment = Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?);
            *slot = moment.format_localized("%B", locale).to_string();
        }

        if days.iter().chain(months.iter()).any(|name| name.trim().is_empty()) {
            return None;
        }

        Some(Self { days, months })
    }

    /// Translated weekday name for an ISO weekday number.
    pub fn day(&self, number: u32) -> Option<&str> {
        let index = usize::try_from(number).ok()?.checked_sub(1)?;
        self.days.get(index).map(String::as_str)
    }

    /// Translated month name for a month number.
    pub fn month(&self, number: u32) -> Option<&str> {
        let index = usize::try_from(number).ok()?.checked_sub(1)?;
        self.months.get(index).map(String::as_str)
    }

    /// `(translated, english)` weekday pairs, Monday first.
    pub fn day_pairs(&self) -> impl Iterator<Item = (&str, &'static str)> {
        self.days.iter().map(String::as_str).zip(ENGLISH_DAYS)
    }

    /// `(translated, english)` month pairs, January first.
    pub fn month_pairs(&self) -> impl Iterator<Item = (&str, &'static str)> {
        self.months.iter().map(String::as_str).zip(ENGLISH_MONTHS)
    }
}

impl Default for DayMonthTable {
    fn default() -> Self {
        Self::english()
    }
}

/// A site locale and its name tables.
///
/// Serializes as its code. Unknown codes fall back to the English table, so
/// normalization becomes a no-op rather than an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Locale {
    code: String,
    table: DayMonthTable,
}

impl Locale {
    /// Looks up a locale by code (`de_DE`, `de-DE` or `de`).
    pub fn new(code: impl Into<String>) -> Self {
        let code = code.into();
        let today = Utc::now().date_naive();
        let table = lookup_chrono_locale(&code)
            .and_then(|locale| DayMonthTable::from_chrono(locale, today))
            .unwrap_or_else(|| {
                tracing::debug!(locale = %code, "no locale data, using english names");
                DayMonthTable::english()
            });
        Self { code, table }
    }

    /// The English locale.
    pub fn english() -> Self {
        Self {
            code: DEFAULT_LOCALE.to_string(),
            table: DayMonthTable::english(),
        }
    }

    /// A locale with an explicit name table.
    pub fn with_table(code: impl Into<String>, table: DayMonthTable) -> Self {
        Self {
            code: code.into(),
            table,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn table(&self) -> &DayMonthTable {
        &self.table
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::english()
    }
}

impl From<String> for Locale {
    fn from(code: String) -> Self {
        Locale::new(code)
    }
}

impl From<Locale> for String {
    fn from(locale: Locale) -> Self {
        locale.code
    }
}

fn lookup_chrono_locale(code: &str) -> Option<chrono::Locale> {
    let normalized = code.trim().replace('-', "_");
    let normalized = normalized.split('.').next().unwrap_or_default().to_string();
    if normalized.is_empty() {
        return None;
    }

    if let Ok(locale) = chrono::Locale::try_from(normalized.as_str()) {
        return Some(locale);
    }

    // bare language codes map to their main territory ("de" -> "de_DE")
    if !normalized.contains('_') {
        let guess = format!("{}_{}", normalized.to_lowercase(), normalized.to_uppercase());
        return chrono::Locale::try_from(guess.as_str()).ok();
    }

    None
}
