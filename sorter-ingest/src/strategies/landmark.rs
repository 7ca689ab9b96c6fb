//! Landmark-based search: find an anchor phrase, then scan a small window of
//! following lines for the value. Shared by every strategy.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

use sorter_core::dates::{self, plausible};

static ENTITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(LLC|LP|INC|FUND|HOLDINGS|TRUST)\b").unwrap());

static GENERIC_FULL_ACCOUNT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:account|acct)[^0-9\n]*?(\d{6,})\b").unwrap());

static GENERIC_LAST4_ACCOUNT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:account|acct)[^0-9\n]*?(?:[\dX*]+-){0,2}[X*]*(\d{4})\b").unwrap()
});

static ENDING_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:ending|as of|through)\b").unwrap());

/// How a window's dates are found.
pub type DateScanner = fn(&str) -> Vec<NaiveDate>;

/// Indices of lines containing `marker` (case-insensitive).
pub fn landmark_indices(lines: &[&str], marker: &str) -> Vec<usize> {
    let marker = marker.to_lowercase();
    if marker.is_empty() {
        return Vec::new();
    }
    lines
        .iter()
        .enumerate()
        .filter(|(_, l)| l.to_lowercase().contains(&marker))
        .map(|(i, _)| i)
        .collect()
}

/// The landmark line and the lines after it, `window` lines in total.
pub fn window_text(lines: &[&str], idx: usize, window: usize) -> String {
    let end = (idx + window.max(1)).min(lines.len());
    lines[idx.min(end)..end].join("\n")
}

/// Plausible dates inside the window starting at `idx`.
pub fn window_dates(
    lines: &[&str],
    idx: usize,
    window: usize,
    scan: DateScanner,
    earliest_year: i32,
) -> Vec<NaiveDate> {
    plausible(scan(&window_text(lines, idx, window)), earliest_year)
}

/// Period end from the first landmark (any of `markers`) whose window holds
/// a date. The latest date in that window wins.
pub fn first_landmark_date(
    lines: &[&str],
    markers: &[String],
    window: usize,
    scan: DateScanner,
    earliest_year: i32,
) -> Option<NaiveDate> {
    let markers: Vec<String> = markers.iter().map(|m| m.to_lowercase()).collect();
    lines.iter().enumerate().find_map(|(i, line)| {
        let lower = line.to_lowercase();
        if !markers.iter().any(|m| !m.is_empty() && lower.contains(m.as_str())) {
            return None;
        }
        let found = window_dates(lines, i, window, scan, earliest_year);
        tracing::debug!("Landmark on line {}: '{}' -> {:?}", i, line, found);
        found.into_iter().max()
    })
}

/// Period end from the LAST occurrence of `marker` whose window holds a date.
pub fn last_landmark_date(
    lines: &[&str],
    marker: &str,
    window: usize,
    scan: DateScanner,
    earliest_year: i32,
) -> Option<NaiveDate> {
    landmark_indices(lines, marker)
        .into_iter()
        .rev()
        .find_map(|i| window_dates(lines, i, window, scan, earliest_year).into_iter().max())
}

/// Date on an "Ending ..." / "As of ..." / "through ..." line.
pub fn ending_line_date(lines: &[&str], earliest_year: i32) -> Option<NaiveDate> {
    lines
        .iter()
        .filter(|l| ENDING_DATE_RE.is_match(l))
        .find_map(|l| plausible(dates::find_any_dates(l), earliest_year).into_iter().max())
}

/// Date embedded in the filename, if it is not layout noise.
pub fn filename_date(filename: &str, earliest_year: i32) -> Option<NaiveDate> {
    dates::date_from_filename(filename).filter(|d| d.year() >= earliest_year)
}

/// Case-insensitive whole-word match of `word` (may contain spaces) in `line`.
pub fn contains_word(line: &str, word: &str) -> bool {
    let word = word.to_lowercase();
    if word.is_empty() {
        return false;
    }
    let line = line.to_lowercase();
    let is_word_char = |c: char| c.is_alphanumeric() || c == '_';
    line.match_indices(&word).any(|(i, m)| {
        let before = line[..i].chars().next_back().is_none_or(|c| !is_word_char(c));
        let after = line[i + m.len()..].chars().next().is_none_or(|c| !is_word_char(c));
        before && after
    })
}

/// Whether a line looks like a legal-entity name.
pub fn is_entity_line(line: &str) -> bool {
    ENTITY_RE.is_match(line) && line.chars().any(|c| c.is_alphabetic())
}

/// Uppercase, collapse whitespace, drop commas/periods and a trailing
/// "Tax ID ..." tail.
pub fn clean_name(line: &str) -> String {
    let upper = line.to_uppercase();
    let cut = upper.find("TAX ID").map(|i| &upper[..i]).unwrap_or(&upper);
    cut.replace([',', '.'], "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Entity-looking lines, cleaned, excluding any containing an `exclude` word.
pub fn entity_names(lines: &[&str], exclude: &[&str]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for line in lines {
        if !is_entity_line(line) {
            continue;
        }
        let name = clean_name(line);
        if name.len() <= 5 || exclude.iter().any(|x| name.contains(x)) {
            continue;
        }
        if !out.contains(&name) {
            out.push(name);
        }
    }
    out
}

/// Any "Account ... 123456789" (full) or "Account ... xxxx1234" (last 4).
pub fn generic_account_number(lines: &[&str]) -> Option<String> {
    if let Some(c) = lines.iter().find_map(|l| GENERIC_FULL_ACCOUNT_RE.captures(l)) {
        return Some(c[1].to_string());
    }
    lines
        .iter()
        .find_map(|l| GENERIC_LAST4_ACCOUNT_RE.captures(l))
        .map(|c| format!("xxxx{}", &c[1]))
}
