//! Classification result for a single statement file.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::bank::Bank;

/// Confidence tag, ordered from least to most trustworthy.
/// Anything below `Success` should be checked by an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MatchStatus {
    Unresolved,
    RegexMatchReview,
    Fallback,
    Success,
}

impl MatchStatus {
    pub fn needs_review(&self) -> bool {
        *self < MatchStatus::Success
    }

    pub fn label(&self) -> &'static str {
        match self {
            MatchStatus::Success => "Success",
            MatchStatus::Fallback => "Fallback",
            MatchStatus::RegexMatchReview => "Regex Match (Review)",
            MatchStatus::Unresolved => "Unresolved",
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How the account identity was arrived at. Audit detail for checklist rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchBasis {
    /// Extracted number matched a registry entry.
    SensitiveNumber,
    /// Registry name matched and the extracted number agrees with it.
    NameAndNumberVerified,
    /// Registry name matched; no number in the document to verify against.
    SensitiveNameOnly,
    /// Registry name matched but the document carries a different number.
    NameNumberMismatch,
    /// Static last-4 / full-number mapping table.
    Mapping,
    /// Derived from the filename only.
    FilenameHeuristic,
    /// Raw regex values with no registry confirmation.
    RegexOnly,
    /// Placeholder values.
    Default,
    Unlabeled,
}

impl MatchBasis {
    pub fn label(&self) -> &'static str {
        match self {
            MatchBasis::SensitiveNumber => "Sensitive Number",
            MatchBasis::NameAndNumberVerified => "Name & Num Verified",
            MatchBasis::SensitiveNameOnly => "Sensitive Name, Num Unverified",
            MatchBasis::NameNumberMismatch => "Sensitive Name, Num Mismatch",
            MatchBasis::Mapping => "Mapping",
            MatchBasis::FilenameHeuristic => "Filename Heuristic",
            MatchBasis::RegexOnly => "Regex",
            MatchBasis::Default => "Default",
            MatchBasis::Unlabeled => "Unlabeled",
        }
    }
}

/// Account identity after reconciling regex output with the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAccount {
    pub name: Option<String>,
    pub number: Option<String>,
    pub status: MatchStatus,
    pub basis: MatchBasis,
}

impl ResolvedAccount {
    pub fn unresolved() -> Self {
        Self {
            name: None,
            number: None,
            status: MatchStatus::Unresolved,
            basis: MatchBasis::Default,
        }
    }

    /// Last four digits of the number, if it has at least four.
    pub fn last4(&self) -> Option<String> {
        self.number.as_deref().and_then(last4_digits)
    }
}

/// Structured, confidence-annotated record for one input file.
///
/// Built once by a strategy and never mutated; fields are read through
/// accessors. An `Unlabeled` record always carries `MatchStatus::Unresolved`
/// and must never be used to rename or move the source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementInfo {
    bank: Bank,
    account_name: Option<String>,
    account_number_display: Option<String>,
    statement_date: Option<NaiveDate>,
    match_status: MatchStatus,
    match_basis: MatchBasis,
    original_filename: String,
}

impl StatementInfo {
    pub fn new(
        bank: Bank,
        original_filename: impl Into<String>,
        account: ResolvedAccount,
        statement_date: Option<NaiveDate>,
    ) -> Self {
        let (match_status, match_basis) = if bank == Bank::Unlabeled {
            (MatchStatus::Unresolved, MatchBasis::Unlabeled)
        } else {
            (account.status, account.basis)
        };
        Self {
            bank,
            account_name: account.name,
            account_number_display: account.number,
            statement_date,
            match_status,
            match_basis,
            original_filename: original_filename.into(),
        }
    }

    /// Record for a document nobody could identify.
    pub fn unlabeled(original_filename: impl Into<String>) -> Self {
        Self::new(
            Bank::Unlabeled,
            original_filename,
            ResolvedAccount::unresolved(),
            None,
        )
    }

    pub fn bank(&self) -> Bank {
        self.bank
    }

    pub fn account_name(&self) -> Option<&str> {
        self.account_name.as_deref()
    }

    pub fn account_number_display(&self) -> Option<&str> {
        self.account_number_display.as_deref()
    }

    pub fn statement_date(&self) -> Option<NaiveDate> {
        self.statement_date
    }

    pub fn match_status(&self) -> MatchStatus {
        self.match_status
    }

    pub fn match_basis(&self) -> MatchBasis {
        self.match_basis
    }

    pub fn original_filename(&self) -> &str {
        &self.original_filename
    }

    /// Whether the placement stage may rename/move this file.
    pub fn is_placeable(&self) -> bool {
        self.bank != Bank::Unlabeled
    }

    /// Bank identified, some account identity and a date present.
    pub fn is_complete(&self) -> bool {
        self.is_placeable()
            && (self.account_name.is_some() || self.account_number_display.is_some())
            && self.statement_date.is_some()
    }
}

impl fmt::Display for StatementInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "StatementInfo(bank='{}', name='{}', acc_num='{}', date='{}', status='{}', \
             orig_file='{}')",
            self.bank,
            self.account_name.as_deref().unwrap_or("None"),
            self.account_number_display.as_deref().unwrap_or("None"),
            self.statement_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "None".to_string()),
            self.match_status,
            self.original_filename
        )
    }
}

/// Trailing four digits of `s` after dropping every non-digit.
pub fn last4_digits(s: &str) -> Option<String> {
    let digits: Vec<char> = s.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() < 4 {
        return None;
    }
    Some(digits[digits.len() - 4..].iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved(status: MatchStatus) -> ResolvedAccount {
        ResolvedAccount {
            name: Some("ACME CORP".to_string()),
            number: Some("123456789".to_string()),
            status,
            basis: MatchBasis::SensitiveNumber,
        }
    }

    #[test]
    fn test_match_status_ordering() {
        assert!(MatchStatus::Unresolved < MatchStatus::RegexMatchReview);
        assert!(MatchStatus::RegexMatchReview < MatchStatus::Fallback);
        assert!(MatchStatus::Fallback < MatchStatus::Success);
        assert!(MatchStatus::Fallback.needs_review());
        assert!(!MatchStatus::Success.needs_review());
    }

    /// Regression test: an Unlabeled record can never claim a better status.
    #[test]
    fn test_unlabeled_is_always_unresolved() {
        let info = StatementInfo::new(
            Bank::Unlabeled,
            "scan.pdf",
            resolved(MatchStatus::Success),
            NaiveDate::from_ymd_opt(2024, 3, 31),
        );
        assert_eq!(info.match_status(), MatchStatus::Unresolved);
        assert_eq!(info.match_basis(), MatchBasis::Unlabeled);
        assert!(!info.is_placeable());
        assert!(!info.is_complete());
    }

    #[test]
    fn test_original_filename_is_verbatim() {
        let info = StatementInfo::new(
            Bank::Pnc,
            "  Weird Name (1).PDF",
            resolved(MatchStatus::Success),
            None,
        );
        assert_eq!(info.original_filename(), "  Weird Name (1).PDF");
        assert!(info.is_placeable());
        assert!(!info.is_complete());
    }

    #[test]
    fn test_last4_digits() {
        assert_eq!(last4_digits("12-3456-7890"), Some("7890".to_string()));
        assert_eq!(last4_digits("xxxx1234"), Some("1234".to_string()));
        assert_eq!(last4_digits("12"), None);
    }
}
