//! The `run` command: collect, dedup, verify, classify, preview, place, log.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use chrono::Local;
use tokio::sync::Semaphore;

use sorter_core::SensitiveAccountRegistry;
use sorter_ingest::{ChainedTextSource, Classification, Classifier};
use sorter_placement::{
    FilePlacer, LogEntry, Outcome, PlacementError, RunStats, find_duplicates, plan_placement,
    redundant_copies, verify_pdf, write_checklist, write_json_log,
};

use crate::config::Config;

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub checklist_dir: PathBuf,
    pub accounts: Option<PathBuf>,
    pub dry_run: bool,
    pub show_preview: bool,
    pub assume_yes: bool,
    pub process_duplicates: bool,
}

impl RunOptions {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            input: cfg.input_folder.clone(),
            output: cfg.processed_folder.clone(),
            checklist_dir: cfg.checklist_dir.clone(),
            accounts: cfg.sensitive_accounts.clone(),
            dry_run: false,
            show_preview: false,
            assume_yes: false,
            process_duplicates: false,
        }
    }
}

/// PDFs directly inside `dir`, sorted by name. `*.repaired.pdf` is skipped.
pub fn collect_pdfs(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        bail!("Input folder not found: {}", dir.display());
    }
    let mut out = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read {}", dir.display()))? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if name.ends_with(".pdf") && !name.ends_with(".repaired.pdf") {
            out.push(path);
        }
    }
    out.sort();
    Ok(out)
}

pub fn build_classifier(cfg: &Config, accounts: Option<&Path>) -> Result<Classifier> {
    let registry = SensitiveAccountRegistry::load(accounts)?;
    tracing::info!("Loaded {} sensitive accounts", registry.len());
    Classifier::new(
        cfg.engine.clone(),
        registry,
        Box::new(ChainedTextSource::standard(cfg.pdf_scan_max_pages)),
    )
}

type Classified = (PathBuf, Result<Classification, String>);

/// Classify on blocking workers, at most `max_workers` at a time. Results
/// come back in input order.
pub async fn classify_all(
    classifier: Arc<Classifier>,
    paths: Vec<PathBuf>,
    max_workers: usize,
) -> Vec<Classified> {
    let permits = Arc::new(Semaphore::new(max_workers.max(1)));
    let mut handles = Vec::with_capacity(paths.len());
    for path in paths {
        let classifier = Arc::clone(&classifier);
        let permits = Arc::clone(&permits);
        let p = path.clone();
        let handle = tokio::spawn(async move {
            let _permit = permits.acquire_owned().await.map_err(|e| e.to_string())?;
            tokio::task::spawn_blocking(move || classifier.classify_path(&p))
                .await
                .map_err(|e| e.to_string())
        });
        handles.push((path, handle));
    }

    let mut out = Vec::with_capacity(handles.len());
    for (path, handle) in handles {
        let res = match handle.await {
            Ok(r) => r,
            Err(e) => Err(e.to_string()),
        };
        out.push((path, res));
    }
    out
}

/// Reads one answer from stdin on a blocking worker.
async fn prompt(label: String) -> Result<String> {
    tokio::task::spawn_blocking(move || -> Result<String> {
        print!("{}: ", label);
        io::stdout().flush().ok();
        let mut s = String::new();
        io::stdin().read_line(&mut s).context("read answer")?;
        Ok(s.trim().to_string())
    })
    .await
    .context("prompt task")?
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

fn print_preview(classifier: &Classifier, classified: &[Classified]) {
    println!(
        "\n{:<40} {:<11} {:<22} Proposed name",
        "File", "Bank", "Match status"
    );
    for (path, res) in classified {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match res {
            Ok(c) => {
                let proposed = if c.info.is_placeable() {
                    classifier.strategy_for(&c.info).get_filename(&c.info)
                } else {
                    "(left in place)".to_string()
                };
                println!(
                    "{:<40} {:<11} {:<22} {}",
                    name,
                    c.info.bank().name(),
                    c.info.match_status().label(),
                    proposed
                );
            }
            Err(e) => println!("{:<40} {:<11} {:<22} {}", name, "-", "error", e),
        }
    }
    println!();
}

pub async fn run(cfg: &Config, opts: RunOptions) -> Result<RunStats> {
    let started = Local::now();
    let mut files = collect_pdfs(&opts.input)?;
    println!("Found {} PDF files in {}", files.len(), opts.input.display());

    let mut entries: Vec<LogEntry> = Vec::new();

    if cfg.check_duplicates {
        let groups = find_duplicates(&files);
        for g in &groups {
            tracing::warn!(
                "Duplicate content: {}",
                g.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", ")
            );
        }
        if !opts.process_duplicates {
            for g in &groups {
                for dup in g.iter().skip(1) {
                    entries.push(
                        LogEntry::new(dup, Outcome::SkippedDuplicate)
                            .with_detail(format!("same content as {}", g[0].display())),
                    );
                }
            }
            let skip = redundant_copies(&groups);
            files.retain(|f| !skip.contains(f));
        }
    }

    if cfg.file_verification {
        files.retain(|f| match verify_pdf(f) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("{}", e);
                entries.push(
                    LogEntry::new(f, Outcome::FailedVerification).with_detail(e.to_string()),
                );
                false
            }
        });
    }

    let classifier = Arc::new(build_classifier(cfg, opts.accounts.as_deref())?);
    let classified = classify_all(Arc::clone(&classifier), files, cfg.max_workers).await;

    if opts.show_preview || opts.dry_run || !opts.assume_yes {
        print_preview(&classifier, &classified);
    }

    let mut proceed = true;
    if !opts.dry_run && !opts.assume_yes {
        let placeable = classified
            .iter()
            .filter(|(_, r)| r.as_ref().is_ok_and(|c| c.info.is_placeable()))
            .count();
        let label = format!("Copy {} files into {}? [y/N]", placeable, opts.output.display());
        proceed = is_yes(&prompt(label).await?);
        if !proceed {
            println!("Nothing moved; writing a preview checklist only.");
        }
    }

    let mut placer = FilePlacer::new(opts.dry_run || !proceed, cfg.delete_originals);
    for (path, res) in classified {
        let c = match res {
            Ok(c) => c,
            Err(e) => {
                tracing::error!("Classification failed for {}: {}", path.display(), e);
                entries.push(LogEntry::new(&path, Outcome::Error).with_detail(e));
                continue;
            }
        };
        let strategy = classifier.strategy_for(&c.info);
        let entry = match plan_placement(&path, &c.info, &strategy, &opts.output) {
            Err(e @ PlacementError::Unlabeled(_)) => {
                LogEntry::new(&path, Outcome::LeftUnlabeled).with_detail(e.to_string())
            }
            Err(e) => LogEntry::new(&path, Outcome::Error).with_detail(e.to_string()),
            Ok(plan) => match placer.place(&plan) {
                Ok(out) if out.copied => {
                    LogEntry::new(&path, Outcome::Placed).with_destination(out.destination)
                }
                Ok(out) => {
                    LogEntry::new(&path, Outcome::WouldPlace).with_destination(out.destination)
                }
                Err(e) => {
                    tracing::error!("{}", e);
                    LogEntry::new(&path, Outcome::Error).with_detail(e.to_string())
                }
            },
        };
        entries.push(entry.with_classification(c));
    }

    let preview = opts.dry_run || !proceed;
    let checklist = write_checklist(&entries, &opts.checklist_dir, preview, started)?;
    let log = write_json_log(&entries, &checklist)?;

    let stats = RunStats::from_entries(&entries);
    println!("\nSummary{}", if preview { " (preview)" } else { "" });
    for line in stats.summary_lines() {
        println!("  {}", line);
    }
    println!("\nChecklist: {}", checklist.display());
    println!("Log:       {}", log.display());
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_skips_repaired_and_non_pdf() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.pdf", "A.PDF", "c.repaired.pdf", "notes.txt"] {
            fs::write(dir.path().join(name), b"%PDF-").unwrap();
        }
        fs::create_dir(dir.path().join("sub.pdf")).unwrap();
        let got: Vec<String> = collect_pdfs(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(got, vec!["A.PDF", "b.pdf"]);
    }

    #[test]
    fn test_only_yes_answers_proceed() {
        for a in ["y", "Y", "yes", " YES "] {
            assert!(is_yes(a), "{a}");
        }
        for a in ["", "n", "no", "yep", "sure"] {
            assert!(!is_yes(a), "{a}");
        }
    }

    #[test]
    fn test_missing_input_folder_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        assert!(collect_pdfs(&dir.path().join("missing")).is_err());
    }

    #[tokio::test]
    async fn test_dry_run_moves_nothing() {
        let root = tempfile::tempdir().unwrap();
        let input = root.path().join("in");
        fs::create_dir(&input).unwrap();
        fs::write(input.join("Statement_1.pdf"), b"%PDF-1.4").unwrap();
        fs::write(
            input.join("Statement_1.pdf.txt"),
            "PNC Bank\nHILLTOP FUND LLC\nFor the period 03/01/2024 to 03/31/2024",
        )
        .unwrap();
        fs::write(input.join("copy.pdf"), b"%PDF-1.4").unwrap();
        fs::write(input.join("junk.pdf"), b"hello").unwrap();

        let cfg = Config::default();
        let opts = RunOptions {
            input: input.clone(),
            output: root.path().join("out"),
            checklist_dir: root.path().join("logs"),
            accounts: None,
            dry_run: true,
            show_preview: false,
            assume_yes: true,
            process_duplicates: false,
        };
        let stats = run(&cfg, opts).await.unwrap();

        assert_eq!(stats.duplicates_skipped, 1);
        assert_eq!(stats.verification_failed, 1);
        assert!(!root.path().join("out").exists());
        assert!(input.join("Statement_1.pdf").exists());
        let names: Vec<String> = fs::read_dir(root.path().join("logs"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert!(names.iter().any(|n| n.starts_with("preview_checklist_") && n.ends_with(".csv")));
        assert!(names.iter().any(|n| n.ends_with(".json")));
    }
}
