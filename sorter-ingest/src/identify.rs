//! Bank identification: filename rules first, then weighted keyword scoring.

use anyhow::{Context, Result};
use regex::{Regex, RegexBuilder};

use sorter_core::{Bank, BankKeywordProfile, EngineConfig};

use crate::source::PageText;

/// How a bank was picked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdSource {
    /// Matched the filename rule at this index.
    Filename { rule: usize },
    /// Won keyword scoring with this score.
    Content { score: u32 },
    Unidentified,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identification {
    pub bank: Bank,
    pub source: IdSource,
}

impl Identification {
    fn unlabeled() -> Self {
        Self {
            bank: Bank::Unlabeled,
            source: IdSource::Unidentified,
        }
    }
}

/// Filename rules are compiled once; keyword profiles are copied out of the
/// config so the identifier can live inside a shared classifier.
#[derive(Debug, Clone)]
pub struct BankIdentifier {
    rules: Vec<(Bank, Regex)>,
    profiles: Vec<BankKeywordProfile>,
    min_score: u32,
}

impl BankIdentifier {
    /// Compiles the filename rules; a bad pattern is a configuration error.
    pub fn new(config: &EngineConfig) -> Result<Self> {
        let rules = config
            .filename_rules
            .iter()
            .map(|r| {
                RegexBuilder::new(&r.pattern)
                    .case_insensitive(true)
                    .build()
                    .map(|re| (r.bank, re))
                    .with_context(|| {
                        format!("compile filename rule '{}' for {}", r.pattern, r.bank)
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            rules,
            profiles: config.keyword_profiles.clone(),
            min_score: config.bank_id_min_score,
        })
    }

    pub fn identify(&self, filename: &str, text: &PageText) -> Identification {
        if let Some(id) = self.identify_by_filename(filename) {
            return id;
        }
        if text.is_empty() {
            tracing::warn!("No text and no filename rule for '{}'; Unlabeled", filename);
            return Identification::unlabeled();
        }
        self.identify_by_content(filename, text)
    }

    pub fn identify_by_filename(&self, filename: &str) -> Option<Identification> {
        let base = basename(filename);
        let (rule, (bank, _)) = self
            .rules
            .iter()
            .enumerate()
            .find(|(_, (bank, re))| *bank != Bank::Unlabeled && re.is_match(base))?;
        tracing::debug!("'{}' identified as {} by filename rule {}", filename, bank, rule);
        Some(Identification {
            bank: *bank,
            source: IdSource::Filename { rule },
        })
    }

    fn identify_by_content(&self, filename: &str, text: &PageText) -> Identification {
        let upper = text.full_text().to_uppercase();

        let mut best: Option<(Bank, u32)> = None;
        for bank in Bank::PRIORITY {
            let Some(profile) = self.profiles.iter().find(|p| p.bank == bank) else {
                continue;
            };
            let score = profile.score(&upper);
            tracing::debug!("'{}' content score for {}: {}", filename, bank, score);
            // strictly greater keeps the earlier bank on ties
            if best.is_none_or(|(_, s)| score > s) {
                best = Some((bank, score));
            }
        }

        match best {
            Some((bank, score)) if score >= self.min_score => {
                tracing::info!(
                    "'{}' identified as {} by content (score {})",
                    filename,
                    bank,
                    score
                );
                Identification {
                    bank,
                    source: IdSource::Content { score },
                }
            }
            _ => {
                tracing::info!(
                    "'{}' did not reach bank score {}; Unlabeled",
                    filename,
                    self.min_score
                );
                Identification::unlabeled()
            }
        }
    }
}

fn basename(filename: &str) -> &str {
    filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename)
}
