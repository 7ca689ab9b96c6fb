//! Bank-specific extraction strategies.
//!
//! Each supported bank is one variant of [`Strategy`]; all of them offer the
//! same three operations and none of them do I/O. [`Dispatcher`] maps a
//! [`Bank`] to its variant.

pub mod bank_united;
pub mod berkshire;
pub mod cambridge;
pub mod landmark;
pub mod pnc;
pub mod unlabeled;

use sorter_core::registry::{SensitiveAccount, normalize_account_number};
use sorter_core::statement::last4_digits;
use sorter_core::{
    Bank, EngineConfig, MatchBasis, MatchStatus, ResolvedAccount, SensitiveAccountRegistry,
    StatementInfo,
};

use crate::source::PageText;

pub use bank_united::BankUnitedStrategy;
pub use berkshire::BerkshireStrategy;
pub use cambridge::CambridgeStrategy;
pub use pnc::PncStrategy;
pub use unlabeled::UnlabeledStrategy;

#[derive(Debug, Clone, Copy)]
pub enum Strategy<'a> {
    Pnc(PncStrategy<'a>),
    Cambridge(CambridgeStrategy<'a>),
    BankUnited(BankUnitedStrategy<'a>),
    Berkshire(BerkshireStrategy<'a>),
    Unlabeled(UnlabeledStrategy<'a>),
}

impl<'a> Strategy<'a> {
    pub fn bank(&self) -> Bank {
        match self {
            Strategy::Pnc(_) => Bank::Pnc,
            Strategy::Cambridge(_) => Bank::Cambridge,
            Strategy::BankUnited(_) => Bank::BankUnited,
            Strategy::Berkshire(_) => Bank::Berkshire,
            Strategy::Unlabeled(_) => Bank::Unlabeled,
        }
    }

    pub fn extract_info(
        &self,
        filename: &str,
        text: &PageText,
        registry: &SensitiveAccountRegistry,
    ) -> StatementInfo {
        let info = match self {
            Strategy::Pnc(s) => s.extract_info(filename, text, registry),
            Strategy::Cambridge(s) => s.extract_info(filename, text, registry),
            Strategy::BankUnited(s) => s.extract_info(filename, text, registry),
            Strategy::Berkshire(s) => s.extract_info(filename, text, registry),
            Strategy::Unlabeled(s) => s.extract_info(filename, text),
        };
        if info.statement_date().is_none() {
            tracing::warn!("{}: no statement date found for '{}'", self.bank(), filename);
        }
        tracing::info!("{}: {}", self.bank(), info);
        info
    }

    pub fn get_filename(&self, info: &StatementInfo) -> String {
        match self {
            Strategy::Pnc(s) => s.get_filename(info),
            Strategy::Cambridge(s) => s.get_filename(info),
            Strategy::BankUnited(s) => s.get_filename(info),
            Strategy::Berkshire(s) => s.get_filename(info),
            Strategy::Unlabeled(s) => s.get_filename(info),
        }
    }

    /// Folder segments below the output root, bank folder first.
    pub fn get_subfolder_path(&self, info: &StatementInfo) -> Vec<String> {
        match self {
            Strategy::Pnc(s) => s.get_subfolder_path(info),
            Strategy::Cambridge(s) => s.get_subfolder_path(info),
            Strategy::BankUnited(s) => s.get_subfolder_path(info),
            Strategy::Berkshire(s) => s.get_subfolder_path(info),
            Strategy::Unlabeled(s) => s.get_subfolder_path(info),
        }
    }
}

/// Stateless bank → strategy mapping.
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher<'a> {
    config: &'a EngineConfig,
}

impl<'a> Dispatcher<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    pub fn dispatch(&self, bank: Bank) -> Strategy<'a> {
        let config = self.config;
        match bank {
            Bank::Pnc => Strategy::Pnc(PncStrategy::new(config)),
            Bank::Cambridge => Strategy::Cambridge(CambridgeStrategy::new(config)),
            Bank::BankUnited => Strategy::BankUnited(BankUnitedStrategy::new(config)),
            Bank::Berkshire => Strategy::Berkshire(BerkshireStrategy::new(config)),
            Bank::Unlabeled => Strategy::Unlabeled(UnlabeledStrategy::new(config)),
        }
    }

    /// Unknown keys get the Unlabeled strategy.
    pub fn dispatch_key(&self, key: &str) -> Strategy<'a> {
        let bank = Bank::from_key(key).unwrap_or_else(|| {
            tracing::warn!("Unknown bank key '{}'; using Unlabeled strategy", key);
            Bank::Unlabeled
        });
        self.dispatch(bank)
    }
}

/// Raw values a strategy pulled out of the text, before registry checks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidates {
    /// Lines that might hold the account name; all are tried against the
    /// registry.
    pub names: Vec<String>,
    /// Name to report when the registry confirms nothing.
    pub raw_name: Option<String>,
    /// Display form of the extracted number (full digits or `xxxx1234`).
    pub number: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvePolicy {
    pub name_threshold: f64,
    /// Never adopt a registry name unless the document also shows a number.
    pub require_number_for_name: bool,
}

/// Reconcile extracted values with the registry.
///
/// Order: registry number match, registry name match (checked against the
/// extracted number), static mapping, raw regex values, nothing.
pub fn resolve(
    bank: Bank,
    registry: &SensitiveAccountRegistry,
    policy: ResolvePolicy,
    candidates: &Candidates,
    mapped_name: Option<String>,
) -> ResolvedAccount {
    let number = candidates.number.as_deref();

    if let Some(entry) = number.and_then(|n| registry.find_by_number(bank, n)) {
        tracing::info!("{}: sensitive number match -> '{}'", bank, entry.name);
        return ResolvedAccount {
            name: Some(entry.name.clone()),
            number: Some(display_number(entry, number)),
            status: MatchStatus::Success,
            basis: MatchBasis::SensitiveNumber,
        };
    }

    // best ratio over all candidates; earlier candidates win ties
    let mut name_hit = None;
    for candidate in &candidates.names {
        if let Some(m) = registry.find_by_name(bank, candidate, policy.name_threshold) {
            if name_hit.is_none_or(|b: sorter_core::NameMatch| m.ratio > b.ratio) {
                name_hit = Some(m);
            }
        }
    }

    if let Some(hit) = name_hit {
        let entry = hit.account;
        match number {
            Some(n)
                if last4_digits(n).is_some() && last4_digits(n) == last4_digits(&entry.number) =>
            {
                return ResolvedAccount {
                    name: Some(entry.name.clone()),
                    number: Some(n.to_string()),
                    status: MatchStatus::Success,
                    basis: MatchBasis::NameAndNumberVerified,
                };
            }
            Some(n) if policy.require_number_for_name => {
                tracing::warn!(
                    "{}: sensitive name '{}' matched but document number {} disagrees with {}; \
                     not adopting",
                    bank,
                    entry.name,
                    n,
                    entry.number
                );
            }
            Some(n) => {
                tracing::warn!(
                    "{}: sensitive name '{}' matched but document number {} disagrees with {}",
                    bank,
                    entry.name,
                    n,
                    entry.number
                );
                return ResolvedAccount {
                    name: Some(entry.name.clone()),
                    number: Some(n.to_string()),
                    status: MatchStatus::RegexMatchReview,
                    basis: MatchBasis::NameNumberMismatch,
                };
            }
            None if policy.require_number_for_name => {
                tracing::debug!(
                    "{}: name '{}' matched but no number to confirm it; not adopting",
                    bank,
                    entry.name
                );
            }
            None => {
                return ResolvedAccount {
                    name: Some(entry.name.clone()),
                    number: Some(entry.number.clone()),
                    status: MatchStatus::Fallback,
                    basis: MatchBasis::SensitiveNameOnly,
                };
            }
        }
    }

    if let Some(name) = mapped_name {
        tracing::debug!("{}: mapping table gave '{}'", bank, name);
        return ResolvedAccount {
            name: Some(name),
            number: candidates.number.clone(),
            status: MatchStatus::Fallback,
            basis: MatchBasis::Mapping,
        };
    }

    if candidates.raw_name.is_some() || candidates.number.is_some() {
        return ResolvedAccount {
            name: candidates.raw_name.clone(),
            number: candidates.number.clone(),
            status: MatchStatus::RegexMatchReview,
            basis: MatchBasis::RegexOnly,
        };
    }

    ResolvedAccount::unresolved()
}

/// Registry number when it is unmasked, otherwise what the document showed.
fn display_number(entry: &SensitiveAccount, extracted: Option<&str>) -> String {
    let normalized = normalize_account_number(&entry.number);
    if normalized.contains('X') {
        extracted.unwrap_or(&entry.number).to_string()
    } else {
        entry.number.clone()
    }
}

/// Fill a missing name with `"<LABEL> ACCOUNT 1234"` or `"UNKNOWN <LABEL> ACCOUNT"`.
/// Status and basis are left alone.
pub fn with_placeholder_name(mut account: ResolvedAccount, label: &str) -> ResolvedAccount {
    if account.name.is_none() {
        account.name = Some(match account.last4() {
            Some(l4) => format!("{} ACCOUNT {}", label, l4),
            None => format!("UNKNOWN {} ACCOUNT", label),
        });
    }
    account
}
