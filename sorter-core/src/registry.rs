//! Sensitive Account Registry: known (bank, name, number) triples used to
//! validate and canonicalize extracted identities.
//!
//! Loading is optional. A missing source yields an empty registry and every
//! lookup simply fails, so extraction proceeds on raw regex values.
//!
//! File shape (JSON, or the same shape in TOML):
//!   { "PNC": [ { "name": "ACME CORP", "number": "12-3456-7890" } ] }

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::bank::Bank;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensitiveAccount {
    pub bank: Bank,
    pub name: String,
    /// Full or masked (`******1234`) number, as configured.
    pub number: String,
}

/// Fuzzy name hit with its similarity ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NameMatch<'a> {
    pub account: &'a SensitiveAccount,
    pub ratio: f64,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    name: String,
    number: RawNumber,
}

/// Numbers are sometimes written as bare integers in hand-edited files.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Text(String),
    Int(u64),
}

impl RawNumber {
    fn into_string(self) -> String {
        match self {
            RawNumber::Text(s) => s,
            RawNumber::Int(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SensitiveAccountRegistry {
    accounts: BTreeMap<Bank, Vec<SensitiveAccount>>,
}

impl SensitiveAccountRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_accounts(accounts: impl IntoIterator<Item = SensitiveAccount>) -> Self {
        let mut out = Self::default();
        for a in accounts {
            out.accounts.entry(a.bank).or_default().push(a);
        }
        out
    }

    /// Load from an optional path. `None` or a missing file gives an empty
    /// registry; a file that exists but cannot be parsed is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            tracing::info!("No sensitive account file configured; registry is empty");
            return Ok(Self::empty());
        };
        if !path.exists() {
            tracing::warn!(
                "Sensitive account file not found at {}; registry is empty",
                path.display()
            );
            return Ok(Self::empty());
        }

        let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        let is_toml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("toml"));
        let registry = if is_toml {
            Self::parse_toml(&s)
        } else {
            Self::parse_json(&s)
        }
        .with_context(|| format!("parse {}", path.display()))?;

        tracing::info!(
            "Loaded {} sensitive account(s) from {}",
            registry.len(),
            path.display()
        );
        Ok(registry)
    }

    pub fn parse_json(s: &str) -> Result<Self> {
        let raw: BTreeMap<String, Vec<RawEntry>> = serde_json::from_str(s)?;
        Ok(Self::from_raw(raw))
    }

    pub fn parse_toml(s: &str) -> Result<Self> {
        let raw: BTreeMap<String, Vec<RawEntry>> = toml::from_str(s)?;
        Ok(Self::from_raw(raw))
    }

    fn from_raw(raw: BTreeMap<String, Vec<RawEntry>>) -> Self {
        let mut accounts = Vec::new();
        for (key, entries) in raw {
            let Some(bank) = Bank::from_key(&key) else {
                tracing::warn!("Skipping sensitive accounts for unknown bank key '{}'", key);
                continue;
            };
            for e in entries {
                accounts.push(SensitiveAccount {
                    bank,
                    name: e.name.trim().to_string(),
                    number: e.number.into_string().trim().to_string(),
                });
            }
        }
        Self::from_accounts(accounts)
    }

    pub fn len(&self) -> usize {
        self.accounts.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn accounts_for(&self, bank: Bank) -> &[SensitiveAccount] {
        self.accounts.get(&bank).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Exact full-number match first, then masked / last-4 suffix match.
    ///
    /// A suffix that fits several distinct numbers is ambiguous and returns
    /// `None` rather than guessing.
    pub fn find_by_number(&self, bank: Bank, candidate: &str) -> Option<&SensitiveAccount> {
        let accounts = self.accounts_for(bank);
        if accounts.is_empty() {
            return None;
        }
        let cand = normalize_account_number(candidate);
        let cand_tail = trailing_digits(&cand);
        if cand_tail.is_empty() {
            return None;
        }

        if !is_masked(&cand) {
            if let Some(a) = accounts.iter().find(|a| {
                let n = normalize_account_number(&a.number);
                !is_masked(&n) && n == cand
            }) {
                tracing::debug!("Sensitive match on full account number for {}", bank);
                return Some(a);
            }
        }

        if cand_tail.len() < 4 {
            return None;
        }
        let cand_last4 = &cand_tail[cand_tail.len() - 4..];
        let hits: Vec<&SensitiveAccount> = accounts
            .iter()
            .filter(|a| {
                let normalized = normalize_account_number(&a.number);
                let tail = trailing_digits(&normalized);
                tail.len() >= 4 && &tail[tail.len() - 4..] == cand_last4
            })
            .collect();

        let first = hits.first().copied()?;
        let first_norm = normalize_account_number(&first.number);
        if hits
            .iter()
            .any(|a| normalize_account_number(&a.number) != first_norm)
        {
            tracing::warn!(
                "Last 4 digits {} match {} different {} accounts; not resolving by number",
                cand_last4,
                hits.len(),
                bank
            );
            return None;
        }
        tracing::debug!("Sensitive match on last 4 digits {} for {}", cand_last4, bank);
        Some(first)
    }

    /// Best fuzzy name match at or above `threshold`. Equal ratios keep the
    /// earlier entry.
    pub fn find_by_name(
        &self,
        bank: Bank,
        candidate: &str,
        threshold: f64,
    ) -> Option<NameMatch<'_>> {
        let cand = normalize_name(candidate);
        if cand.is_empty() {
            return None;
        }
        let mut best: Option<NameMatch<'_>> = None;
        for a in self.accounts_for(bank) {
            let ratio = name_similarity(&cand, &normalize_name(&a.name));
            if ratio < threshold {
                continue;
            }
            match best {
                Some(b) if ratio <= b.ratio => {}
                _ => best = Some(NameMatch { account: a, ratio }),
            }
        }
        if let Some(m) = best {
            tracing::debug!(
                "Sensitive name match '{}' -> '{}' (ratio {:.2})",
                candidate,
                m.account.name,
                m.ratio
            );
        }
        best
    }
}

/// Strip separators and whitespace, uppercase, and turn `*`/`#` masks into `X`.
pub fn normalize_account_number(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '.' | '/'))
        .map(|c| match c {
            '*' | '#' => 'X',
            c => c.to_ascii_uppercase(),
        })
        .collect()
}

fn is_masked(normalized: &str) -> bool {
    normalized.contains('X')
}

fn trailing_digits(s: &str) -> &str {
    let start = s
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    &s[start..]
}

fn normalize_name(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// Edit-distance similarity in `0.0..=1.0`.
pub fn name_similarity(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acct(bank: Bank, name: &str, number: &str) -> SensitiveAccount {
        SensitiveAccount {
            bank,
            name: name.to_string(),
            number: number.to_string(),
        }
    }

    #[test]
    fn test_normalize_account_number() {
        assert_eq!(normalize_account_number("12-3456 7890"), "1234567890");
        assert_eq!(normalize_account_number("******1234"), "XXXXXX1234");
        assert_eq!(normalize_account_number("xxxx1234"), "XXXX1234");
    }

    #[test]
    fn test_full_number_beats_earlier_last4_hit() {
        let reg = SensitiveAccountRegistry::from_accounts([
            acct(Bank::Pnc, "FIRST", "99997890"),
            acct(Bank::Pnc, "SECOND", "12-3456-7890"),
        ]);
        let hit = reg.find_by_number(Bank::Pnc, "1234567890").unwrap();
        assert_eq!(hit.name, "SECOND");
    }

    /// Two "Acme Corp" accounts: the number decides.
    #[test]
    fn test_same_name_resolved_by_number() {
        let reg = SensitiveAccountRegistry::from_accounts([
            acct(Bank::BankUnited, "Acme Corp", "5550001111"),
            acct(Bank::BankUnited, "Acme Corp", "5550002222"),
        ]);
        let hit = reg.find_by_number(Bank::BankUnited, "******2222").unwrap();
        assert_eq!(hit.number, "5550002222");
    }

    #[test]
    fn test_ambiguous_last4_is_not_resolved() {
        let reg = SensitiveAccountRegistry::from_accounts([
            acct(Bank::Cambridge, "ALPHA LLC", "1110001234"),
            acct(Bank::Cambridge, "BETA LLC", "2220001234"),
        ]);
        assert!(reg.find_by_number(Bank::Cambridge, "xxxx1234").is_none());
        // the full number is still unambiguous
        assert_eq!(
            reg.find_by_number(Bank::Cambridge, "2220001234").unwrap().name,
            "BETA LLC"
        );
    }

    #[test]
    fn test_masked_registry_entry_matches_full_candidate() {
        let gamma = acct(Bank::Berkshire, "GAMMA FUND", "****4321");
        let reg = SensitiveAccountRegistry::from_accounts([gamma]);
        assert!(reg.find_by_number(Bank::Berkshire, "000987654321").is_some());
        assert!(reg.find_by_number(Bank::Berkshire, "321").is_none());
        assert!(reg.find_by_number(Bank::Pnc, "000987654321").is_none());
    }

    #[test]
    fn test_find_by_name_threshold() {
        let reg = SensitiveAccountRegistry::from_accounts([
            acct(Bank::BankUnited, "HARBOR FUND OPERATING", "1"),
            acct(Bank::BankUnited, "HARBOR FUND MMK", "2"),
        ]);
        let m = reg
            .find_by_name(Bank::BankUnited, "harbor  fund operating", 0.95)
            .unwrap();
        assert_eq!(m.account.number, "1");
        assert_eq!(m.ratio, 1.0);
        assert!(reg.find_by_name(Bank::BankUnited, "HARBOR FUND OPERATNG CO", 0.95).is_none());
        assert!(reg.find_by_name(Bank::BankUnited, "", 0.5).is_none());
    }

    #[test]
    fn test_parse_json_and_toml() {
        let reg = SensitiveAccountRegistry::parse_json(
            r#"{
                "PNC": [{"name": "ACME CORP", "number": 1234567890}],
                "Chase": [{"name": "X", "number": "1"}]
            }"#,
        )
        .unwrap();
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.accounts_for(Bank::Pnc)[0].number, "1234567890");

        let reg = SensitiveAccountRegistry::parse_toml(
            r#"
[[BankUnited]]
name = "HARBOR FUND"
number = "******1234"
"#,
        )
        .unwrap();
        assert_eq!(reg.accounts_for(Bank::BankUnited).len(), 1);
    }

    #[test]
    fn test_load_missing_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let reg = SensitiveAccountRegistry::load(Some(&dir.path().join("nope.json"))).unwrap();
        assert!(reg.is_empty());
        assert!(SensitiveAccountRegistry::load(None).unwrap().is_empty());
    }

    #[test]
    fn test_load_malformed_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("accounts.json");
        std::fs::write(&p, "{not json").unwrap();
        assert!(SensitiveAccountRegistry::load(Some(&p)).is_err());
    }
}
