//! Filesystem-safe names for renamed statements and their folders.

use chrono::{Datelike, NaiveDate};

/// Filename token for a missing statement date.
pub const NO_DATE_TOKEN: &str = "NODATE";
/// Folder segment for a missing statement date.
pub const UNKNOWN_DATE_DIR: &str = "UnknownDate";

const FALLBACK_NAME: &str = "sanitized_filename";

/// Replace characters that are illegal on common filesystems with `_`,
/// collapse whitespace and trim leading/trailing spaces, dots and underscores.
///
/// With `allow_spaces = false`, spaces become `_` as well.
pub fn sanitize_filename(name: &str, allow_spaces: bool) -> String {
    let replaced: String = name
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let collapsed = replaced.split_whitespace().collect::<Vec<_>>();
    let joined = if allow_spaces {
        collapsed.join(" ")
    } else {
        collapsed.join("_")
    };

    let trimmed = joined.trim_matches(|c: char| c == ' ' || c == '_' || c == '.');
    if trimmed.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Shorten `name` to at most `max_len` characters, keeping its extension and
/// marking the cut with `...`.
pub fn truncate_filename(name: &str, max_len: usize) -> String {
    let total = name.chars().count();
    if total <= max_len {
        return name.to_string();
    }

    let (stem, ext) = match name.rfind('.') {
        Some(i) if i > 0 => (&name[..i], &name[i..]),
        _ => (name, ""),
    };
    let ext_len = ext.chars().count();
    let marker = "...";
    let keep = max_len.saturating_sub(ext_len + marker.len());
    if keep == 0 {
        return name.chars().take(max_len).collect();
    }
    let head: String = stem.chars().take(keep).collect();
    format!("{}{}{}", head.trim_end(), marker, ext)
}

/// Sanitize with spaces kept, then truncate to `max_len`.
pub fn finalize_filename(name: &str, max_len: usize) -> String {
    truncate_filename(&sanitize_filename(name, true), max_len)
}

pub fn month_name(date: NaiveDate) -> String {
    date.format("%B").to_string()
}

/// `YYYY-MM` folder segment, or [`UNKNOWN_DATE_DIR`].
pub fn year_month_dir(date: Option<NaiveDate>) -> String {
    match date {
        Some(d) => format!("{:04}-{:02}", d.year(), d.month()),
        None => UNKNOWN_DATE_DIR.to_string(),
    }
}

/// `fmt`-formatted date, or [`NO_DATE_TOKEN`].
pub fn date_token(date: Option<NaiveDate>, fmt: &str) -> String {
    match date {
        Some(d) => d.format(fmt).to_string(),
        None => NO_DATE_TOKEN.to_string(),
    }
}
