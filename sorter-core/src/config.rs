//! Static engine configuration: keyword profiles, thresholds, mapping tables.
//!
//! Everything here is read-only once the engine is built. The CLI embeds it
//! as the `[engine]` table of its config file; every field has a default so
//! an empty table is valid.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::bank::Bank;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Minimum summed keyword weight for content-based identification.
    pub bank_id_min_score: u32,
    pub keyword_profiles: Vec<BankKeywordProfile>,
    /// Ordered; first match wins.
    pub filename_rules: Vec<FilenameRule>,
    pub name_thresholds: NameThresholds,
    pub account_mappings: AccountMappings,
    pub landmarks: LandmarkSettings,
    /// Longest filename the strategies will render (extension included).
    pub max_filename_len: usize,
    /// Dates before this year are treated as OCR/layout noise.
    pub earliest_statement_year: i32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            bank_id_min_score: 2,
            keyword_profiles: default_keyword_profiles(),
            filename_rules: default_filename_rules(),
            name_thresholds: NameThresholds::default(),
            account_mappings: AccountMappings::default(),
            landmarks: LandmarkSettings::default(),
            max_filename_len: 200,
            earliest_statement_year: 2000,
        }
    }
}

impl EngineConfig {
    pub fn profile(&self, bank: Bank) -> Option<&BankKeywordProfile> {
        self.keyword_profiles.iter().find(|p| p.bank == bank)
    }
}

/// Weighted keywords that suggest a document came from `bank`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankKeywordProfile {
    pub bank: Bank,
    pub keywords: BTreeMap<String, u32>,
}

impl BankKeywordProfile {
    fn new(bank: Bank, keywords: &[(&str, u32)]) -> Self {
        Self {
            bank,
            keywords: keywords
                .iter()
                .map(|(k, w)| (k.to_string(), *w))
                .collect(),
        }
    }

    /// Sum of weights for keywords present in `text_upper` (each counted once).
    pub fn score(&self, text_upper: &str) -> u32 {
        self.keywords
            .iter()
            .filter(|(k, _)| text_upper.contains(&k.to_uppercase()))
            .map(|(_, w)| *w)
            .sum()
    }
}

/// Case-insensitive regex over the file's basename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilenameRule {
    pub bank: Bank,
    pub pattern: String,
}

impl FilenameRule {
    fn new(bank: Bank, pattern: &str) -> Self {
        Self {
            bank,
            pattern: pattern.to_string(),
        }
    }
}

/// Minimum similarity ratio for fuzzy account-name matching, per bank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NameThresholds {
    pub pnc: f64,
    pub cambridge: f64,
    /// Strict: "Operating" and "MMK" accounts of one entity differ by a few characters.
    pub bank_united: f64,
    pub berkshire: f64,
    pub unlabeled: f64,
}

impl Default for NameThresholds {
    fn default() -> Self {
        Self {
            pnc: 0.85,
            cambridge: 0.90,
            bank_united: 0.95,
            berkshire: 0.85,
            unlabeled: 0.85,
        }
    }
}

impl NameThresholds {
    pub fn for_bank(&self, bank: Bank) -> f64 {
        match bank {
            Bank::Pnc => self.pnc,
            Bank::Cambridge => self.cambridge,
            Bank::BankUnited => self.bank_united,
            Bank::Berkshire => self.berkshire,
            Bank::Unlabeled => self.unlabeled,
        }
    }
}

/// Static number → account-name tables used when the registry has no match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountMappings {
    /// Full (dash-free) PNC account number → name.
    pub pnc: BTreeMap<String, String>,
    pub pnc_last4: BTreeMap<String, String>,
    pub bankunited_last4: BTreeMap<String, String>,
    pub berkshire_last4: BTreeMap<String, String>,
}

/// Anchor phrases and header-parsing hints for landmark-based search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandmarkSettings {
    /// PNC statement-period anchor.
    pub period_marker: String,
    /// Anchors for Cambridge / BankUnited / generic date search.
    pub statement_markers: Vec<String>,
    /// Header lines containing one of these words end the name block.
    pub stop_markers: Vec<String>,
    /// Header lines starting with one of these are never account names.
    pub skip_starters: Vec<String>,
    /// Lines scanned after a landmark, landmark line included.
    pub date_window_lines: usize,
}

impl Default for LandmarkSettings {
    fn default() -> Self {
        Self {
            period_marker: "FOR THE PERIOD".to_string(),
            statement_markers: vec!["statement period".to_string(), "statement date".to_string()],
            stop_markers: vec!["STE".to_string()],
            skip_starters: [
                "Number",
                "Tax ID",
                "For Client",
                "Visit",
                "For 24-hour",
                "PNC Bank",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            date_window_lines: 3,
        }
    }
}

fn default_keyword_profiles() -> Vec<BankKeywordProfile> {
    vec![
        BankKeywordProfile::new(
            Bank::Pnc,
            &[
                ("PNC BANK", 2),
                ("WWW.PNC.COM", 2),
                ("PNCBANK.COM", 2),
                ("PNC FINANCIAL SERVICES", 2),
                ("PNC VIRTUAL WALLET", 2),
                ("PNC BANK, N.A.", 1),
                ("PNC ONLINE BANKING", 1),
                ("PNC", 1),
            ],
        ),
        BankKeywordProfile::new(
            Bank::Cambridge,
            &[
                ("CAMBRIDGE SAVINGS", 2),
                ("CAMBRIDGE SAVINGS BANK", 1),
                ("CAMBRIDGESAVINGS.COM", 2),
                ("CAMBRIDGE BANK", 1),
                ("CAMBRIDGE, MA", 1),
                ("CSB CUSTOMER SERVICE", 1),
            ],
        ),
        BankKeywordProfile::new(
            Bank::BankUnited,
            &[
                ("BANKUNITED", 2),
                ("BANK UNITED", 2),
                ("BANKUNITED.COM", 1),
                ("BANKUNITED, N.A.", 1),
                ("WWW.BANKUNITEDFL.COM", 1),
            ],
        ),
        BankKeywordProfile::new(
            Bank::Berkshire,
            &[
                ("BERKSHIRE BANK", 2),
                ("BERKSHIREBANK.COM", 2),
                ("MYBANKNOW", 1),
                ("MEMBER FDIC BERKSHIRE", 1),
                ("BERKSHIRE, N.A.", 1),
                ("BERKSHIRE", 1),
            ],
        ),
    ]
}

fn default_filename_rules() -> Vec<FilenameRule> {
    vec![
        FilenameRule::new(Bank::Cambridge, r"online[ _]statements"),
        FilenameRule::new(Bank::BankUnited, r"dxweb"),
        FilenameRule::new(Bank::Berkshire, r"new_?statement"),
        FilenameRule::new(Bank::Pnc, r"^statement_"),
        FilenameRule::new(Bank::Pnc, r"pnc.*statement|statement.*pnc|virtual.*wallet|pnc.*account"),
        FilenameRule::new(
            Bank::Berkshire,
            r"berk.*bank|berkshire.*statement|berk.*statement|mybanknow",
        ),
        FilenameRule::new(
            Bank::BankUnited,
            r"bankunited|bank.*united|statement.*united|bu.*online",
        ),
        FilenameRule::new(
            Bank::Cambridge,
            r"cambridge.*savings|cambridge.*bank|csb.*statement|cambridge.*statement",
        ),
        FilenameRule::new(Bank::Pnc, r"pnc"),
        FilenameRule::new(Bank::Berkshire, r"berkshire"),
        FilenameRule::new(Bank::BankUnited, r"bankunited"),
        FilenameRule::new(Bank::Cambridge, r"cambridge"),
    ]
}
