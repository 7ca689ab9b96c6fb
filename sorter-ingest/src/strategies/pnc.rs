//! PNC Bank statements.
//!
//! Expected extracted-text header:
//!   Business Checking
//!   For the period 03/01/2024 to 03/31/2024
//!   ACME IMPACT FUND LLC
//!   123 MAIN ST STE 400
//!   Primary account number: 12-3456-7890
//!
//! Long statements repeat the period landmark on later pages, sometimes
//! with the end date wrapped onto the next line, so the last landmark that
//! yields a date is the one used.

use once_cell::sync::Lazy;
use regex::Regex;

use sorter_core::naming::{
    UNKNOWN_DATE_DIR, date_token, finalize_filename, month_name, sanitize_filename,
};
use sorter_core::statement::last4_digits;
use sorter_core::{
    Bank, EngineConfig, ResolvedAccount, SensitiveAccountRegistry, StatementInfo, dates,
};

use super::landmark::{self, clean_name, is_entity_line};
use super::{Candidates, ResolvePolicy, resolve, with_placeholder_name};
use crate::source::PageText;

static FULL_ACCOUNT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)account\s*(?:number|no\.?|#)?\s*:?\s*(\d{2}-\d{4}-\d{4}|\d{10,12})\b").unwrap()
});

static PARTIAL_ACCOUNT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:ending\s+in\s*|[x*]{4,}-?)(\d{4})\b").unwrap());

/// Lines around the landmark searched before the whole text.
const NUMBER_SEARCH_MARGIN: usize = 3;
/// Header lines considered for the name when no stop marker shows up.
const MAX_HEADER_LINES: usize = 15;

#[derive(Debug, Clone, Copy)]
pub struct PncStrategy<'a> {
    config: &'a EngineConfig,
}

impl<'a> PncStrategy<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    pub fn extract_info(
        &self,
        filename: &str,
        text: &PageText,
        registry: &SensitiveAccountRegistry,
    ) -> StatementInfo {
        let settings = &self.config.landmarks;
        let lines = text.lines();
        let landmarks = landmark::landmark_indices(&lines, &settings.period_marker);

        let statement_date = landmark::last_landmark_date(
            &lines,
            &settings.period_marker,
            settings.date_window_lines,
            dates::find_any_dates,
            self.config.earliest_statement_year,
        )
        .or_else(|| {
            let d = landmark::filename_date(filename, self.config.earliest_statement_year);
            if d.is_some() {
                tracing::debug!("PNC: no period landmark date, using date in filename");
            }
            d
        });

        let number = self.find_number(&lines, landmarks.first().copied());
        let header = self.header_names(&lines);
        let raw_name = header.iter().find(|n| is_entity_line(n)).cloned();
        tracing::debug!(
            "PNC: number {:?}, header candidates {:?}, raw name {:?}",
            number,
            header,
            raw_name
        );

        let candidates = Candidates {
            names: header,
            raw_name,
            number,
        };
        let mapped = self.mapped_name(candidates.number.as_deref());
        let policy = ResolvePolicy {
            name_threshold: self.config.name_thresholds.for_bank(Bank::Pnc),
            require_number_for_name: false,
        };
        let account: ResolvedAccount = with_placeholder_name(
            resolve(Bank::Pnc, registry, policy, &candidates, mapped),
            "PNC",
        );
        StatementInfo::new(Bank::Pnc, filename, account, statement_date)
    }

    /// Full number (dashes dropped) or `xxxx1234`, near the landmark first.
    fn find_number(&self, lines: &[&str], landmark: Option<usize>) -> Option<String> {
        if let Some(idx) = landmark {
            let start = idx.saturating_sub(NUMBER_SEARCH_MARGIN);
            let window = self.config.landmarks.date_window_lines;
            let end = (idx + window + NUMBER_SEARCH_MARGIN).min(lines.len());
            if let Some(n) = number_in(&lines[start..end]) {
                return Some(n);
            }
        }
        number_in(lines)
    }

    /// Header block: leading lines up to the first stop-marker line, minus
    /// landmark lines, configured skip prefixes and lines without letters.
    fn header_names(&self, lines: &[&str]) -> Vec<String> {
        let settings = &self.config.landmarks;
        let period = settings.period_marker.to_lowercase();
        let skips: Vec<String> = settings.skip_starters.iter().map(|s| s.to_lowercase()).collect();
        let mut out = Vec::new();
        for line in lines.iter().take(MAX_HEADER_LINES) {
            if settings.stop_markers.iter().any(|m| landmark::contains_word(line, m)) {
                break;
            }
            let lower = line.to_lowercase();
            if (!period.is_empty() && lower.contains(&period))
                || skips.iter().any(|s| lower.starts_with(s.as_str()))
                || !line.chars().any(|c| c.is_alphabetic())
            {
                continue;
            }
            let name = clean_name(line);
            if name.len() > 3 && !name.contains("SUMMARY") && !out.contains(&name) {
                out.push(name);
            }
        }
        out
    }

    fn mapped_name(&self, number: Option<&str>) -> Option<String> {
        let number = number?;
        let maps = &self.config.account_mappings;
        if !number.starts_with("xxxx") {
            if let Some(name) = maps.pnc.get(number) {
                return Some(name.clone());
            }
        }
        maps.pnc_last4.get(&last4_digits(number)?).cloned()
    }

    /// `[Account name] statement_[account number]_YYYY_MM_DD.pdf`
    pub fn get_filename(&self, info: &StatementInfo) -> String {
        let name = sanitize_filename(info.account_name().unwrap_or("UNKNOWN PNC ACCOUNT"), true);
        let number = sanitize_filename(info.account_number_display().unwrap_or("UNKNOWN"), false);
        let date = date_token(info.statement_date(), "%Y_%m_%d");
        finalize_filename(
            &format!("{} statement_{}_{}.pdf", name, number, date),
            self.config.max_filename_len,
        )
    }

    /// `PNC/YYYY/Month`
    pub fn get_subfolder_path(&self, info: &StatementInfo) -> Vec<String> {
        match info.statement_date() {
            Some(d) => vec![
                Bank::Pnc.name().to_string(),
                d.format("%Y").to_string(),
                month_name(d),
            ],
            None => vec![Bank::Pnc.name().to_string(), UNKNOWN_DATE_DIR.to_string()],
        }
    }
}

fn number_in(lines: &[&str]) -> Option<String> {
    if let Some(c) = lines.iter().find_map(|l| FULL_ACCOUNT_RE.captures(l)) {
        return Some(c[1].replace('-', ""));
    }
    lines
        .iter()
        .find_map(|l| PARTIAL_ACCOUNT_RE.captures(l))
        .map(|c| format!("xxxx{}", &c[1]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use sorter_core::{MatchBasis, MatchStatus, SensitiveAccount};

    const SAMPLE: &str = "\
Business Checking
For the period 03/01/2024 to
03/31/2024
ACME IMPACT FUND LLC
123 MAIN ST STE 400
Primary account number: 12-3456-7890
";

    fn registry() -> SensitiveAccountRegistry {
        SensitiveAccountRegistry::from_accounts([SensitiveAccount {
            bank: Bank::Pnc,
            name: "ACME IMPACT FUND LLC".to_string(),
            number: "12-3456-7890".to_string(),
        }])
    }

    #[test]
    fn test_extract_with_registry_number() {
        let cfg = EngineConfig::default();
        let s = PncStrategy::new(&cfg);
        let info = s.extract_info("Statement_Mar.pdf", &PageText::from_text(SAMPLE), &registry());
        assert_eq!(info.bank(), Bank::Pnc);
        assert_eq!(info.account_name(), Some("ACME IMPACT FUND LLC"));
        assert_eq!(info.statement_date(), NaiveDate::from_ymd_opt(2024, 3, 31));
        assert_eq!(info.match_status(), MatchStatus::Success);
        assert_eq!(info.match_basis(), MatchBasis::SensitiveNumber);
        assert_eq!(
            s.get_filename(&info),
            "ACME IMPACT FUND LLC statement_12-3456-7890_2024_03_31.pdf"
        );
        assert_eq!(s.get_subfolder_path(&info), vec!["PNC", "2024", "March"]);
    }

    #[test]
    fn test_extract_without_registry_uses_regex() {
        let cfg = EngineConfig::default();
        let s = PncStrategy::new(&cfg);
        let none = SensitiveAccountRegistry::empty();
        let info = s.extract_info("x.pdf", &PageText::from_text(SAMPLE), &none);
        assert_eq!(info.account_name(), Some("ACME IMPACT FUND LLC"));
        assert_eq!(info.account_number_display(), Some("1234567890"));
        assert_eq!(info.match_status(), MatchStatus::RegexMatchReview);
        assert_eq!(
            s.get_filename(&info),
            "ACME IMPACT FUND LLC statement_1234567890_2024_03_31.pdf"
        );
    }

    /// Regression test: the period end comes from the last landmark, not the first.
    #[test]
    fn test_last_period_landmark_wins() {
        let cfg = EngineConfig::default();
        let text = "\
For the period 01/01/2024 to 01/31/2024
ACME FUND LLC
Account ending in 7890
--- page 2 ---
For the period 02/01/2024 to
02/29/2024
";
        let info = PncStrategy::new(&cfg).extract_info(
            "x.pdf",
            &PageText::from_text(text),
            &SensitiveAccountRegistry::empty(),
        );
        assert_eq!(info.statement_date(), NaiveDate::from_ymd_opt(2024, 2, 29));
        assert_eq!(info.account_number_display(), Some("xxxx7890"));
    }

    #[test]
    fn test_last4_mapping_fallback() {
        let mut cfg = EngineConfig::default();
        cfg.account_mappings
            .pnc_last4
            .insert("7890".to_string(), "ACME IMPACT PROGRAM".to_string());
        let text = "For the period 03/01/2024 to 03/31/2024\nAccount ending in 7890\n";
        let info = PncStrategy::new(&cfg).extract_info(
            "x.pdf",
            &PageText::from_text(text),
            &SensitiveAccountRegistry::empty(),
        );
        assert_eq!(info.account_name(), Some("ACME IMPACT PROGRAM"));
        assert_eq!(info.match_status(), MatchStatus::Fallback);
        assert_eq!(info.match_basis(), MatchBasis::Mapping);
    }

    #[test]
    fn test_nothing_found_is_unresolved_with_placeholder() {
        let cfg = EngineConfig::default();
        let s = PncStrategy::new(&cfg);
        let none = SensitiveAccountRegistry::empty();
        let info = s.extract_info("PNC_scan.pdf", &PageText::empty(), &none);
        assert_eq!(info.account_name(), Some("UNKNOWN PNC ACCOUNT"));
        assert_eq!(info.match_status(), MatchStatus::Unresolved);
        assert_eq!(info.statement_date(), None);
        assert_eq!(s.get_filename(&info), "UNKNOWN PNC ACCOUNT statement_UNKNOWN_NODATE.pdf");
        assert_eq!(s.get_subfolder_path(&info), vec!["PNC", "UnknownDate"]);
    }

    #[test]
    fn test_filename_date_fallback_is_plausibility_checked() {
        let cfg = EngineConfig::default();
        let s = PncStrategy::new(&cfg);
        let none = SensitiveAccountRegistry::empty();
        let info = s.extract_info("Statement_2024-03-31.pdf", &PageText::empty(), &none);
        assert_eq!(info.statement_date(), NaiveDate::from_ymd_opt(2024, 3, 31));
        let info = s.extract_info("Statement_1900-01-31.pdf", &PageText::empty(), &none);
        assert_eq!(info.statement_date(), None);
    }

    #[test]
    fn test_stop_marker_ends_header_on_whole_words() {
        let cfg = EngineConfig::default();
        let text = "\
HILLTOP FUND LLC
STEWART HOLDINGS LLC
123 MAIN ST STE 400
SEASIDE PARTNERS LLC
";
        let names = PncStrategy::new(&cfg).header_names(&PageText::from_text(text).lines());
        assert_eq!(names, vec!["HILLTOP FUND LLC", "STEWART HOLDINGS LLC"]);
    }
}
