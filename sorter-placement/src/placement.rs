//! Turning a classified statement into a destination path, and copying it
//! there.
//!
//! Unlabeled files are refused at planning time; they stay where they are
//! and only show up in the checklist.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use sorter_core::{Bank, StatementInfo};
use sorter_ingest::Strategy;

/// Conflict suffixes tried before giving up: `name (1).pdf` .. `name (100).pdf`.
pub const MAX_CONFLICT_ATTEMPTS: u32 = 100;

#[derive(Debug, Error)]
pub enum PlacementError {
    #[error("{0} is unlabeled and will not be moved")]
    Unlabeled(String),
    #[error("no free name for {name} in {dir} after {MAX_CONFLICT_ATTEMPTS} attempts")]
    NoFreeName { dir: PathBuf, name: String },
    #[error("create {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("copy {from} -> {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Where one file should go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacementPlan {
    pub source: PathBuf,
    pub bank: Bank,
    pub dest_dir: PathBuf,
    pub filename: String,
}

impl PlacementPlan {
    pub fn destination(&self) -> PathBuf {
        self.dest_dir.join(&self.filename)
    }
}

/// `output_root/<subfolder segments>/<strategy filename>`.
pub fn plan_placement(
    source: &Path,
    info: &StatementInfo,
    strategy: &Strategy<'_>,
    output_root: &Path,
) -> Result<PlacementPlan, PlacementError> {
    if !info.is_placeable() {
        return Err(PlacementError::Unlabeled(info.original_filename().to_string()));
    }
    let dest_dir = strategy
        .get_subfolder_path(info)
        .iter()
        .fold(output_root.to_path_buf(), |dir, seg| dir.join(seg));
    Ok(PlacementPlan {
        source: source.to_path_buf(),
        bank: info.bank(),
        dest_dir,
        filename: strategy.get_filename(info),
    })
}

/// First free name in `dir`: `name.pdf`, then `name (1).pdf`, `name (2).pdf`, ...
/// A name is taken if it exists on disk or is in `claimed`.
pub fn non_conflicting_path(
    dir: &Path,
    filename: &str,
    claimed: &HashSet<PathBuf>,
) -> Result<PathBuf, PlacementError> {
    let free = |p: &Path| !p.exists() && !claimed.contains(p);
    let first = dir.join(filename);
    if free(&first) {
        return Ok(first);
    }
    let (stem, ext) = match filename.rfind('.') {
        Some(i) if i > 0 => (&filename[..i], &filename[i..]),
        _ => (filename, ""),
    };
    for n in 1..=MAX_CONFLICT_ATTEMPTS {
        let candidate = dir.join(format!("{} ({}){}", stem, n, ext));
        if free(&candidate) {
            return Ok(candidate);
        }
    }
    Err(PlacementError::NoFreeName {
        dir: dir.to_path_buf(),
        name: filename.to_string(),
    })
}

/// What actually happened to a planned file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacementOutcome {
    pub destination: PathBuf,
    pub copied: bool,
    pub original_removed: bool,
}

/// Places files one at a time. Destinations handed out during this run are
/// remembered, so a dry run reports the same suffixes a real run would use.
#[derive(Debug, Clone, Default)]
pub struct FilePlacer {
    pub dry_run: bool,
    pub delete_originals: bool,
    claimed: HashSet<PathBuf>,
}

impl FilePlacer {
    pub fn new(dry_run: bool, delete_originals: bool) -> Self {
        Self {
            dry_run,
            delete_originals,
            claimed: HashSet::new(),
        }
    }

    pub fn place(&mut self, plan: &PlacementPlan) -> Result<PlacementOutcome, PlacementError> {
        if self.dry_run {
            let destination = non_conflicting_path(&plan.dest_dir, &plan.filename, &self.claimed)?;
            self.claimed.insert(destination.clone());
            tracing::info!(
                "Dry run: would copy {} -> {}",
                plan.source.display(),
                destination.display()
            );
            return Ok(PlacementOutcome {
                destination,
                copied: false,
                original_removed: false,
            });
        }

        fs::create_dir_all(&plan.dest_dir).map_err(|source| PlacementError::CreateDir {
            path: plan.dest_dir.clone(),
            source,
        })?;
        let destination = non_conflicting_path(&plan.dest_dir, &plan.filename, &self.claimed)?;
        self.claimed.insert(destination.clone());
        fs::copy(&plan.source, &destination).map_err(|source| PlacementError::Copy {
            from: plan.source.clone(),
            to: destination.clone(),
            source,
        })?;
        tracing::info!("Copied {} -> {}", plan.source.display(), destination.display());

        let mut original_removed = false;
        if self.delete_originals {
            match fs::remove_file(&plan.source) {
                Ok(()) => original_removed = true,
                // The copy already succeeded; a leftover original is not fatal.
                Err(e) => tracing::warn!("Could not delete {}: {}", plan.source.display(), e),
            }
        }

        Ok(PlacementOutcome {
            destination,
            copied: true,
            original_removed,
        })
    }
}
