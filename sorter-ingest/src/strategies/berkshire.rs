//! Berkshire Bank statements.
//!
//! Berkshire PDFs are usually image-only scans named like
//! `NewStatement_2024-03-31_1234.pdf`. Without text, the filename is the
//! only evidence, and the result is always `Fallback` so an operator
//! checks it.

use once_cell::sync::Lazy;
use regex::Regex;

use sorter_core::naming::{date_token, finalize_filename, sanitize_filename, year_month_dir};
use sorter_core::statement::last4_digits;
use sorter_core::{
    Bank, EngineConfig, MatchBasis, MatchStatus, ResolvedAccount, SensitiveAccountRegistry,
    StatementInfo, dates,
};

use super::landmark;
use super::{Candidates, ResolvePolicy, resolve, with_placeholder_name};
use crate::source::PageText;

static NEW_STATEMENT_LAST4_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)_(\d{4})(?:\.pdf)?$").unwrap());

const EXCLUDED_NAME_WORDS: [&str; 2] = ["BERKSHIRE BANK", "PAGE"];

#[derive(Debug, Clone, Copy)]
pub struct BerkshireStrategy<'a> {
    config: &'a EngineConfig,
}

impl<'a> BerkshireStrategy<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    pub fn extract_info(
        &self,
        filename: &str,
        text: &PageText,
        registry: &SensitiveAccountRegistry,
    ) -> StatementInfo {
        if text.is_empty() {
            tracing::warn!(
                "Berkshire: no text for '{}' (image-only scan?); using filename heuristics",
                filename
            );
            return self.from_filename(filename, registry);
        }
        self.from_text(filename, text, registry)
    }

    /// Last 4 from `NewStatement…_1234.pdf`, date from `YYYY-MM-DD`/`YYYYMMDD`.
    fn from_filename(&self, filename: &str, registry: &SensitiveAccountRegistry) -> StatementInfo {
        let lower = filename.to_lowercase();
        let last4 = if lower.contains("newstatement") || lower.contains("new_statement") {
            NEW_STATEMENT_LAST4_RE
                .captures(filename)
                .map(|c| c[1].to_string())
        } else {
            None
        };
        let statement_date = landmark::filename_date(filename, self.config.earliest_statement_year);

        let mut account = ResolvedAccount {
            name: None,
            number: None,
            status: MatchStatus::Fallback,
            basis: if last4.is_some() || statement_date.is_some() {
                MatchBasis::FilenameHeuristic
            } else {
                MatchBasis::Default
            },
        };

        if let Some(l4) = last4 {
            if let Some(entry) = registry.find_by_number(Bank::Berkshire, &l4) {
                tracing::info!("Berkshire: filename last 4 {} -> '{}'", l4, entry.name);
                account.name = Some(entry.name.clone());
                account.number = Some(entry.number.clone());
            } else {
                account.name = self.config.account_mappings.berkshire_last4.get(&l4).cloned();
                account.number = Some(format!("xxxx{}", l4));
            }
        }

        StatementInfo::new(
            Bank::Berkshire,
            filename,
            with_placeholder_name(account, "BERKSHIRE"),
            statement_date,
        )
    }

    fn from_text(
        &self,
        filename: &str,
        text: &PageText,
        registry: &SensitiveAccountRegistry,
    ) -> StatementInfo {
        let settings = &self.config.landmarks;
        let earliest = self.config.earliest_statement_year;
        let lines = text.lines();

        let number = landmark::generic_account_number(&lines);
        let names = landmark::entity_names(&lines, &EXCLUDED_NAME_WORDS);
        let statement_date = landmark::first_landmark_date(
            &lines,
            &settings.statement_markers,
            settings.date_window_lines,
            dates::find_any_dates,
            earliest,
        )
        .or_else(|| landmark::ending_line_date(&lines, earliest))
        .or_else(|| landmark::filename_date(filename, earliest));

        let mapped = number
            .as_deref()
            .and_then(last4_digits)
            .and_then(|l4| self.config.account_mappings.berkshire_last4.get(&l4).cloned());
        let candidates = Candidates {
            raw_name: names.first().cloned(),
            names,
            number,
        };
        let policy = ResolvePolicy {
            name_threshold: self.config.name_thresholds.for_bank(Bank::Berkshire),
            require_number_for_name: false,
        };
        let account = with_placeholder_name(
            resolve(Bank::Berkshire, registry, policy, &candidates, mapped),
            "BERKSHIRE",
        );
        StatementInfo::new(Bank::Berkshire, filename, account, statement_date)
    }

    /// `[last4]-[NAME_UNDERSCORED]-[YYYYMMDD].pdf`
    pub fn get_filename(&self, info: &StatementInfo) -> String {
        let last4 = info
            .account_number_display()
            .and_then(last4_digits)
            .unwrap_or_else(|| "XXXX".to_string());
        let name = sanitize_filename(
            &info.account_name().unwrap_or("UNKNOWN BERKSHIRE ACCOUNT").to_uppercase(),
            false,
        );
        let date = date_token(info.statement_date(), "%Y%m%d");
        finalize_filename(
            &format!("{}-{}-{}.pdf", last4, name, date),
            self.config.max_filename_len,
        )
    }

    /// `Berkshire/YYYY-MM`
    pub fn get_subfolder_path(&self, info: &StatementInfo) -> Vec<String> {
        vec![
            Bank::Berkshire.name().to_string(),
            year_month_dir(info.statement_date()),
        ]
    }
}
