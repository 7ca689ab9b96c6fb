//! Cambridge Savings Bank statements.
//!
//! The statement period is often split over two or three lines:
//!   Statement Period: 02/01/2024 -
//!   02/29/2024

use once_cell::sync::Lazy;
use regex::Regex;

use sorter_core::naming::{
    NO_DATE_TOKEN, finalize_filename, month_name, sanitize_filename, year_month_dir,
};
use sorter_core::{Bank, EngineConfig, SensitiveAccountRegistry, StatementInfo, dates};

use super::landmark::{self, clean_name};
use super::{Candidates, ResolvePolicy, resolve, with_placeholder_name};
use crate::source::PageText;

static ACCOUNT_LANDMARK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^Account(?:\s+Number)?[\s#:]*(\d+-?\d+)\b").unwrap());

static OWNER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(?:Owner|Name)[:\s]+(.+)$").unwrap());

const EXCLUDED_NAME_WORDS: [&str; 2] = ["CAMBRIDGE SAVINGS", "PAGE"];

#[derive(Debug, Clone, Copy)]
pub struct CambridgeStrategy<'a> {
    config: &'a EngineConfig,
}

impl<'a> CambridgeStrategy<'a> {
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

        let number = lines
            .iter()
            .find_map(|l| ACCOUNT_LANDMARK_RE.captures(l))
            .map(|c| c[1].to_string());

        let names = self.name_candidates(&lines);
        tracing::debug!("Cambridge: number {:?}, names {:?}", number, names);

        let statement_date = landmark::first_landmark_date(
            &lines,
            &settings.statement_markers,
            settings.date_window_lines,
            dates::find_any_dates,
            self.config.earliest_statement_year,
        );

        let candidates = Candidates {
            raw_name: names.first().cloned(),
            names,
            number,
        };
        let policy = ResolvePolicy {
            name_threshold: self.config.name_thresholds.for_bank(Bank::Cambridge),
            require_number_for_name: false,
        };
        let account = with_placeholder_name(
            resolve(Bank::Cambridge, registry, policy, &candidates, None),
            "CAMBRIDGE",
        );
        StatementInfo::new(Bank::Cambridge, filename, account, statement_date)
    }

    /// `Owner:`/`Name:` values first, then entity-looking lines.
    fn name_candidates(&self, lines: &[&str]) -> Vec<String> {
        let mut out: Vec<String> = lines
            .iter()
            .filter_map(|l| OWNER_RE.captures(l))
            .map(|c| clean_name(&c[1]))
            .filter(|n| n.len() > 5 && !EXCLUDED_NAME_WORDS.iter().any(|x| n.contains(x)))
            .collect();
        for n in landmark::entity_names(lines, &EXCLUDED_NAME_WORDS) {
            if !out.contains(&n) {
                out.push(n);
            }
        }
        out
    }

    /// `[NAME] [Number] Cambridge Savings [Month] [YYYY].pdf`
    pub fn get_filename(&self, info: &StatementInfo) -> String {
        let name = sanitize_filename(
            &info.account_name().unwrap_or("UNKNOWN CAMBRIDGE ACCOUNT").to_uppercase(),
            true,
        );
        let number = sanitize_filename(info.account_number_display().unwrap_or("0000"), false);
        let period = match info.statement_date() {
            Some(d) => format!("{} {}", month_name(d), d.format("%Y")),
            None => NO_DATE_TOKEN.to_string(),
        };
        finalize_filename(
            &format!("{} {} Cambridge Savings {}.pdf", name, number, period),
            self.config.max_filename_len,
        )
    }

    /// `Cambridge/YYYY-MM`
    pub fn get_subfolder_path(&self, info: &StatementInfo) -> Vec<String> {
        vec![
            Bank::Cambridge.name().to_string(),
            year_month_dir(info.statement_date()),
        ]
    }
}
