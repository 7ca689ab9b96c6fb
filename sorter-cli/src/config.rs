use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use sorter_core::EngineConfig;

pub const DEFAULT_CONFIG_PATH: &str = "stmtsort.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub input_folder: PathBuf,
    pub processed_folder: PathBuf,
    pub checklist_dir: PathBuf,
    /// JSON or TOML file of known accounts; optional.
    pub sensitive_accounts: Option<PathBuf>,
    pub log_level: String,
    /// Plain-text log copy; stderr only when unset.
    pub log_file: Option<PathBuf>,
    pub max_workers: usize,
    pub check_duplicates: bool,
    pub file_verification: bool,
    pub delete_originals: bool,
    pub pdf_scan_max_pages: usize,
    pub engine: EngineConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_folder: PathBuf::from("input"),
            processed_folder: PathBuf::from("processed"),
            checklist_dir: PathBuf::from("checklists"),
            sensitive_accounts: None,
            log_level: "info".to_string(),
            log_file: None,
            max_workers: 4,
            check_duplicates: true,
            file_verification: true,
            delete_originals: false,
            pdf_scan_max_pages: 10,
            engine: EngineConfig::default(),
        }
    }
}

/// Missing file means defaults.
pub fn load_config(p: &Path) -> Result<Config> {
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config(p: &Path, cfg: &Config) -> Result<()> {
    if let Some(parent) = p.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config(p: &Path, force: bool) -> Result<()> {
    if p.exists() && !force {
        println!("Config already exists: {} (use --force to overwrite)", p.display());
        return Ok(());
    }
    save_config(p, &Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}
