//! Operator checklist (CSV), processing log (JSON) and run statistics.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::Serialize;

use sorter_core::{MatchStatus, StatementInfo};
use sorter_ingest::Classification;

/// Final state of one input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Placed,
    WouldPlace,
    LeftUnlabeled,
    SkippedDuplicate,
    FailedVerification,
    Error,
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Placed => "Placed",
            Outcome::WouldPlace => "Dry Run",
            Outcome::LeftUnlabeled => "Unlabeled (not moved)",
            Outcome::SkippedDuplicate => "Skipped (duplicate)",
            Outcome::FailedVerification => "Skipped (verification failed)",
            Outcome::Error => "Error",
        }
    }
}

/// One processed file, as recorded in the JSON log.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub original_path: PathBuf,
    pub destination: Option<PathBuf>,
    pub outcome: Outcome,
    pub detail: Option<String>,
    pub classification: Option<Classification>,
}

impl LogEntry {
    pub fn new(original_path: impl Into<PathBuf>, outcome: Outcome) -> Self {
        Self {
            original_path: original_path.into(),
            destination: None,
            outcome,
            detail: None,
            classification: None,
        }
    }

    pub fn with_destination(mut self, dest: impl Into<PathBuf>) -> Self {
        self.destination = Some(dest.into());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_classification(mut self, c: Classification) -> Self {
        self.classification = Some(c);
        self
    }

    fn info(&self) -> Option<&StatementInfo> {
        self.classification.as_ref().map(|c| &c.info)
    }
}

/// A checklist CSV row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChecklistRow {
    #[serde(rename = "Original File")]
    pub original_file: String,
    #[serde(rename = "Destination File")]
    pub destination_file: String,
    #[serde(rename = "Bank Type")]
    pub bank_type: String,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "Match Status")]
    pub match_status: String,
    #[serde(rename = "Match Basis")]
    pub match_basis: String,
    /// Filled in by hand.
    #[serde(rename = "Verified")]
    pub verified: String,
}

impl From<&LogEntry> for ChecklistRow {
    fn from(e: &LogEntry) -> Self {
        let info = e.info();
        Self {
            original_file: e.original_path.display().to_string(),
            destination_file: e
                .destination
                .as_ref()
                .map(|d| d.display().to_string())
                .unwrap_or_default(),
            bank_type: info.map(|i| i.bank().name().to_string()).unwrap_or_default(),
            status: e.outcome.label().to_string(),
            match_status: info.map(|i| i.match_status().label().to_string()).unwrap_or_default(),
            match_basis: info.map(|i| i.match_basis().label().to_string()).unwrap_or_default(),
            verified: String::new(),
        }
    }
}

/// `checklist_YYYYMMDD_HHMMSS.csv`, prefixed with `preview_` for dry runs.
pub fn checklist_filename(at: DateTime<Local>, preview: bool) -> String {
    format!(
        "{}checklist_{}.csv",
        if preview { "preview_" } else { "" },
        at.format("%Y%m%d_%H%M%S")
    )
}

/// Write the checklist CSV, rows sorted by original file. Returns its path.
pub fn write_checklist(
    entries: &[LogEntry],
    dir: &Path,
    preview: bool,
    at: DateTime<Local>,
) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    let path = dir.join(checklist_filename(at, preview));

    let mut rows: Vec<ChecklistRow> = entries.iter().map(ChecklistRow::from).collect();
    rows.sort_by(|a, b| a.original_file.cmp(&b.original_file));

    let mut wtr =
        csv::Writer::from_path(&path).with_context(|| format!("create {}", path.display()))?;
    for row in &rows {
        wtr.serialize(row)?;
    }
    wtr.flush().with_context(|| format!("write {}", path.display()))?;
    tracing::info!("Checklist written to {} ({} rows)", path.display(), rows.len());
    Ok(path)
}

/// Write every entry as pretty JSON beside the checklist (`.json` extension).
pub fn write_json_log(entries: &[LogEntry], checklist_path: &Path) -> Result<PathBuf> {
    let path = checklist_path.with_extension("json");
    let json = serde_json::to_string_pretty(entries)?;
    fs::write(&path, json).with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}

/// Counters printed in the run summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub total: usize,
    pub success: usize,
    pub needs_review: usize,
    pub unlabeled: usize,
    pub text_extraction_failed: usize,
    pub missing_date: usize,
    pub duplicates_skipped: usize,
    pub verification_failed: usize,
    pub errors: usize,
    pub by_bank: BTreeMap<String, usize>,
}

impl RunStats {
    pub fn from_entries(entries: &[LogEntry]) -> Self {
        let mut s = RunStats {
            total: entries.len(),
            ..Default::default()
        };
        for e in entries {
            match e.outcome {
                Outcome::SkippedDuplicate => s.duplicates_skipped += 1,
                Outcome::FailedVerification => s.verification_failed += 1,
                Outcome::Error => s.errors += 1,
                _ => {}
            }
            let Some(c) = &e.classification else {
                continue;
            };
            if !c.text_extracted() {
                s.text_extraction_failed += 1;
            }
            if c.info.statement_date().is_none() {
                s.missing_date += 1;
            }
            *s.by_bank.entry(c.info.bank().name().to_string()).or_default() += 1;
            if !c.info.is_placeable() {
                s.unlabeled += 1;
            } else if c.info.match_status() == MatchStatus::Success {
                s.success += 1;
            } else {
                s.needs_review += 1;
            }
        }
        s
    }

    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Files seen:              {}", self.total),
            format!("Matched (Success):       {}", self.success),
            format!("Needs review:            {}", self.needs_review),
            format!("Unlabeled (not moved):   {}", self.unlabeled),
            format!("Text extraction failed:  {}", self.text_extraction_failed),
            format!("Missing statement date:  {}", self.missing_date),
            format!("Duplicates skipped:      {}", self.duplicates_skipped),
            format!("Failed verification:     {}", self.verification_failed),
            format!("Errors:                  {}", self.errors),
        ];
        for (bank, n) in &self.by_bank {
            lines.push(format!("  {:<22} {}", bank, n));
        }
        lines
    }
}
