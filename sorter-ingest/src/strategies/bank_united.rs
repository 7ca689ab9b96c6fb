//! BankUnited statements.
//!
//! Account numbers are printed masked (`ACCOUNT # ******1234`). Several
//! accounts of one entity differ only by a suffix ("OPERATING", "MMK"), so
//! a name match alone never picks the account: the masked number decides.

use once_cell::sync::Lazy;
use regex::Regex;

use sorter_core::naming::{
    NO_DATE_TOKEN, finalize_filename, month_name, sanitize_filename, year_month_dir,
};
use sorter_core::statement::last4_digits;
use sorter_core::{Bank, EngineConfig, SensitiveAccountRegistry, StatementInfo, dates};

use super::landmark::{self, clean_name, is_entity_line};
use super::{Candidates, ResolvePolicy, resolve, with_placeholder_name};
use crate::source::PageText;

static MASKED_ACCOUNT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:account\s+number|account\s*#)\s*.*?(?:\*+|x{2,})(\d{4})\b").unwrap()
});

static FULL_ACCOUNT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)account(?:\s+number)?:?\s*(\d{4,})\b").unwrap());

const EXCLUDED_NAME_WORDS: [&str; 3] = ["BANKUNITED", "BANK UNITED", "PAGE"];
const MAX_NAME_LINES: usize = 20;

#[derive(Debug, Clone, Copy)]
pub struct BankUnitedStrategy<'a> {
    config: &'a EngineConfig,
}

impl<'a> BankUnitedStrategy<'a> {
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

        let number = find_number(&lines);
        let names = name_candidates(&lines);
        let raw_name = names.iter().find(|n| is_entity_line(n)).cloned();
        tracing::debug!("BankUnited: number {:?}, names {:?}", number, names);

        let statement_date = landmark::first_landmark_date(
            &lines,
            &settings.statement_markers,
            settings.date_window_lines,
            dates::find_long_dates,
            self.config.earliest_statement_year,
        )
        .or_else(|| {
            landmark::first_landmark_date(
                &lines,
                &settings.statement_markers,
                settings.date_window_lines,
                dates::find_numeric_dates,
                self.config.earliest_statement_year,
            )
        });

        let mapped = number
            .as_deref()
            .and_then(last4_digits)
            .and_then(|l4| self.config.account_mappings.bankunited_last4.get(&l4).cloned());
        let candidates = Candidates {
            names,
            raw_name,
            number,
        };
        let policy = ResolvePolicy {
            name_threshold: self.config.name_thresholds.for_bank(Bank::BankUnited),
            require_number_for_name: true,
        };
        let account = with_placeholder_name(
            resolve(Bank::BankUnited, registry, policy, &candidates, mapped),
            "BANKUNITED",
        );
        StatementInfo::new(Bank::BankUnited, filename, account, statement_date)
    }

    /// `[Account Name] [Account Number] BankUnited [Month] [Year].pdf`
    pub fn get_filename(&self, info: &StatementInfo) -> String {
        let name = sanitize_filename(
            info.account_name().unwrap_or("UNKNOWN BANKUNITED ACCOUNT"),
            true,
        );
        let number = sanitize_filename(info.account_number_display().unwrap_or("UNKNOWN"), false);
        let period = match info.statement_date() {
            Some(d) => format!("{} {}", month_name(d), d.format("%Y")),
            None => NO_DATE_TOKEN.to_string(),
        };
        finalize_filename(
            &format!("{} {} BankUnited {}.pdf", name, number, period),
            self.config.max_filename_len,
        )
    }

    /// `BankUnited/YYYY-MM`
    pub fn get_subfolder_path(&self, info: &StatementInfo) -> Vec<String> {
        vec![
            Bank::BankUnited.name().to_string(),
            year_month_dir(info.statement_date()),
        ]
    }
}

/// Masked `xxxx1234` near an account label, else a full number.
fn find_number(lines: &[&str]) -> Option<String> {
    if let Some(c) = lines.iter().find_map(|l| MASKED_ACCOUNT_RE.captures(l)) {
        return Some(format!("xxxx{}", &c[1]));
    }
    lines
        .iter()
        .find_map(|l| FULL_ACCOUNT_RE.captures(l))
        .map(|c| c[1].to_string())
}

/// Multi-word header lines with letters; the bank's own name and page
/// footers excluded.
fn name_candidates(lines: &[&str]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for line in lines.iter().take(MAX_NAME_LINES) {
        if !line.contains(' ') || line.chars().any(|c| c.is_ascii_digit()) {
            continue;
        }
        let name = clean_name(line);
        if name.len() <= 5 || EXCLUDED_NAME_WORDS.iter().any(|x| name.contains(x)) {
            continue;
        }
        if !out.contains(&name) {
            out.push(name);
        }
    }
    out
}
