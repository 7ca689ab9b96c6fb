//! Documents no rule or keyword profile claimed.
//!
//! Nothing here may rename the file: `get_filename` hands back the original
//! name untouched. The generic scan only fills checklist columns.

use sorter_core::naming::year_month_dir;
use sorter_core::{
    Bank, EngineConfig, MatchBasis, MatchStatus, ResolvedAccount, StatementInfo, dates,
};

use super::landmark;
use crate::source::PageText;

#[derive(Debug, Clone, Copy)]
pub struct UnlabeledStrategy<'a> {
    config: &'a EngineConfig,
}

impl<'a> UnlabeledStrategy<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    pub fn extract_info(&self, filename: &str, text: &PageText) -> StatementInfo {
        let settings = &self.config.landmarks;
        let earliest = self.config.earliest_statement_year;
        let lines = text.lines();

        let number = landmark::generic_account_number(&lines);
        let statement_date = landmark::first_landmark_date(
            &lines,
            &settings.statement_markers,
            settings.date_window_lines,
            dates::find_any_dates,
            earliest,
        )
        .or_else(|| landmark::ending_line_date(&lines, earliest));

        let account = ResolvedAccount {
            name: None,
            number,
            status: MatchStatus::Unresolved,
            basis: MatchBasis::Unlabeled,
        };
        StatementInfo::new(Bank::Unlabeled, filename, account, statement_date)
    }

    /// The original filename, byte for byte.
    pub fn get_filename(&self, info: &StatementInfo) -> String {
        info.original_filename().to_string()
    }

    /// `Unlabeled/YYYY-MM`
    pub fn get_subfolder_path(&self, info: &StatementInfo) -> Vec<String> {
        vec![
            Bank::Unlabeled.name().to_string(),
            year_month_dir(info.statement_date()),
        ]
    }
}
