//! Statement date parsing helpers.
//!
//! Nothing here ever falls back to the current date: an unparseable value is
//! `None`, and `None` stays visible all the way into filenames.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

static NUMERIC_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2})[/-](\d{1,2})[/-](\d{4}|\d{2})\b").unwrap());

static LONG_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)\b((?:jan|feb|mar|apr|may|jun|jul|aug|sep|sept|oct|nov|dec)",
        r"[a-z]*\.?\s+\d{1,2},\s*\d{4})\b",
    ))
    .unwrap()
});

/// chrono knows `Sep` but not `Sept`.
static SEPT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bsept\b").unwrap());

static ISO_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{4})[-_]?(\d{2})[-_]?(\d{2})").unwrap());

/// Parse `MM/DD/YYYY`, `MM/DD/YY` (or `-` separated). Two-digit years are 20YY.
pub fn parse_numeric_date(s: &str) -> Option<NaiveDate> {
    let caps = NUMERIC_DATE_RE.captures(s.trim())?;
    let m: u32 = caps[1].parse().ok()?;
    let d: u32 = caps[2].parse().ok()?;
    let y_raw = &caps[3];
    let mut y: i32 = y_raw.parse().ok()?;
    if y_raw.len() == 2 {
        y += 2000;
    }
    NaiveDate::from_ymd_opt(y, m, d)
}

/// Parse `March 31, 2024` / `Mar 31, 2024` / `Sept. 3, 2024`.
pub fn parse_long_date(s: &str) -> Option<NaiveDate> {
    let cleaned = s.trim().replace('.', "");
    let cleaned = SEPT_RE.replace(&cleaned, "Sep");
    let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    ["%B %d, %Y", "%b %d, %Y", "%B %d,%Y", "%b %d,%Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&cleaned, fmt).ok())
}

/// Parse `YYYY-MM-DD`, `YYYY_MM_DD` or `YYYYMMDD`.
pub fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    let caps = ISO_DATE_RE.captures(s)?;
    NaiveDate::from_ymd_opt(
        caps[1].parse().ok()?,
        caps[2].parse().ok()?,
        caps[3].parse().ok()?,
    )
}

/// Every parseable numeric date in `text`, in order of appearance.
pub fn find_numeric_dates(text: &str) -> Vec<NaiveDate> {
    NUMERIC_DATE_RE
        .find_iter(text)
        .filter_map(|m| parse_numeric_date(m.as_str()))
        .collect()
}

/// Every parseable long-form date in `text`, in order of appearance.
pub fn find_long_dates(text: &str) -> Vec<NaiveDate> {
    LONG_DATE_RE
        .captures_iter(text)
        .filter_map(|c| parse_long_date(&c[1]))
        .collect()
}

/// Numeric and long-form dates together, ordered by position in `text`.
pub fn find_any_dates(text: &str) -> Vec<NaiveDate> {
    let mut found: Vec<(usize, NaiveDate)> = NUMERIC_DATE_RE
        .find_iter(text)
        .filter_map(|m| parse_numeric_date(m.as_str()).map(|d| (m.start(), d)))
        .collect();
    found.extend(
        LONG_DATE_RE
            .captures_iter(text)
            .filter_map(|c| {
                let m = c.get(1)?;
                parse_long_date(m.as_str()).map(|d| (m.start(), d))
            }),
    );
    found.sort_by_key(|(pos, _)| *pos);
    found.into_iter().map(|(_, d)| d).collect()
}

/// First `YYYY-MM-DD`-style date embedded in a filename.
pub fn date_from_filename(filename: &str) -> Option<NaiveDate> {
    ISO_DATE_RE
        .captures_iter(filename)
        .find_map(|c| parse_iso_date(c.get(0)?.as_str()))
}

/// Drop dates earlier than `earliest_year` (layout noise such as "01/01/0001").
pub fn plausible(dates: Vec<NaiveDate>, earliest_year: i32) -> Vec<NaiveDate> {
    dates
        .into_iter()
        .filter(|d| d.year() >= earliest_year)
        .collect()
}
