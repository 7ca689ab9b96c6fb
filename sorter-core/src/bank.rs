//! Supported banking institutions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Institution a statement belongs to. `Unlabeled` is the explicit
/// "unknown / do not touch" outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Bank {
    #[serde(rename = "PNC")]
    Pnc,
    #[serde(rename = "Cambridge")]
    Cambridge,
    #[serde(rename = "BankUnited")]
    BankUnited,
    #[serde(rename = "Berkshire")]
    Berkshire,
    #[serde(rename = "Unlabeled")]
    Unlabeled,
}

impl Bank {
    /// Tie-break order for content scoring. Earlier wins.
    pub const PRIORITY: [Bank; 4] = [Bank::Pnc, Bank::Cambridge, Bank::BankUnited, Bank::Berkshire];

    /// Canonical name, also used as the top-level output folder.
    pub fn name(&self) -> &'static str {
        match self {
            Bank::Pnc => "PNC",
            Bank::Cambridge => "Cambridge",
            Bank::BankUnited => "BankUnited",
            Bank::Berkshire => "Berkshire",
            Bank::Unlabeled => "Unlabeled",
        }
    }

    /// Lowercase key used in filenames, mapping tables and config files.
    pub fn key(&self) -> &'static str {
        match self {
            Bank::Pnc => "pnc",
            Bank::Cambridge => "cambridge",
            Bank::BankUnited => "bankunited",
            Bank::Berkshire => "berkshire",
            Bank::Unlabeled => "unlabeled",
        }
    }

    /// Position in [`Bank::PRIORITY`]; Unlabeled sorts last.
    pub fn priority(&self) -> usize {
        Self::PRIORITY
            .iter()
            .position(|b| b == self)
            .unwrap_or(Self::PRIORITY.len())
    }

    /// Parse a bank key leniently ("PNC", "pnc", "Bank United", "bank_united").
    /// Returns `None` for anything unrecognised.
    pub fn from_key(key: &str) -> Option<Bank> {
        let k: String = key
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match k.as_str() {
            "pnc" => Some(Bank::Pnc),
            "cambridge" | "cambridgesavings" | "cambridgesavingsbank" => Some(Bank::Cambridge),
            "bankunited" => Some(Bank::BankUnited),
            "berkshire" | "berkshirebank" => Some(Bank::Berkshire),
            "unlabeled" => Some(Bank::Unlabeled),
            _ => None,
        }
    }
}

impl fmt::Display for Bank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_key_is_lenient() {
        assert_eq!(Bank::from_key("PNC"), Some(Bank::Pnc));
        assert_eq!(Bank::from_key("Bank United"), Some(Bank::BankUnited));
        assert_eq!(Bank::from_key("bank_united"), Some(Bank::BankUnited));
        assert_eq!(Bank::from_key("Cambridge Savings"), Some(Bank::Cambridge));
        assert_eq!(Bank::from_key("chase"), None);
    }

    #[test]
    fn test_priority_order() {
        assert!(Bank::Pnc.priority() < Bank::Cambridge.priority());
        assert!(Bank::BankUnited.priority() < Bank::Berkshire.priority());
        assert_eq!(Bank::Unlabeled.priority(), Bank::PRIORITY.len());
    }
}
