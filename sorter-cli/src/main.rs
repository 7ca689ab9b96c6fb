use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

mod config;
mod logging;
mod runner;

use config::{Config, DEFAULT_CONFIG_PATH, init_config, load_config};
use runner::{RunOptions, build_classifier};

#[derive(Parser, Debug)]
#[command(
    name = "stmtsort",
    version,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("SORTER_BUILD_ID"), ")"),
    about = "Classify bank-statement PDFs and file them by bank, account and period"
)]
struct Cli {
    /// Config file (missing file means defaults)
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Log filter, e.g. `debug` or `sorter_ingest=trace` (RUST_LOG wins)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Also append plain-text logs to this file (overrides config)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Process every PDF in the input folder
    Run(RunArgs),

    /// Classify one file and print the result as JSON
    Classify {
        file: PathBuf,

        /// Sensitive account file (overrides config)
        #[arg(long)]
        accounts: Option<PathBuf>,
    },

    /// Write a config file with every default filled in
    InitConfig {
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args, Debug)]
struct RunArgs {
    #[arg(long)]
    input: Option<PathBuf>,

    #[arg(long)]
    output: Option<PathBuf>,

    /// Classify and preview without copying anything
    #[arg(long)]
    dry_run: bool,

    #[arg(long)]
    show_preview: bool,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    yes: bool,

    /// Classify byte-identical files too instead of skipping the copies
    #[arg(long)]
    process_duplicates: bool,

    #[arg(long)]
    checklist_dir: Option<PathBuf>,

    /// Sensitive account file (overrides config)
    #[arg(long)]
    accounts: Option<PathBuf>,
}

/// Load config and install logging; every command but `init-config` starts here.
fn start(cli: &Cli) -> Result<Config> {
    let cfg = load_config(&cli.config)?;
    let level = cli.log_level.as_deref().unwrap_or(&cfg.log_level);
    let log_file = cli.log_file.as_deref().or(cfg.log_file.as_deref());
    logging::setup_logging(level, log_file)?;
    tracing::debug!("Using config {}", cli.config.display());
    Ok(cfg)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Command::InitConfig { force } => {
            init_config(&cli.config, *force)?;
        }

        Command::Run(args) => {
            let cfg = start(&cli)?;
            let mut opts = RunOptions::from_config(&cfg);
            if let Some(p) = &args.input {
                opts.input = p.clone();
            }
            if let Some(p) = &args.output {
                opts.output = p.clone();
            }
            if let Some(p) = &args.checklist_dir {
                opts.checklist_dir = p.clone();
            }
            if args.accounts.is_some() {
                opts.accounts = args.accounts.clone();
            }
            opts.dry_run = args.dry_run;
            opts.show_preview = args.show_preview;
            opts.assume_yes = args.yes;
            opts.process_duplicates = args.process_duplicates;

            let stats = runner::run(&cfg, opts).await?;
            if stats.errors > 0 {
                tracing::warn!("{} files hit errors; see the log", stats.errors);
            }
        }

        Command::Classify { file, accounts } => {
            let cfg = start(&cli)?;
            if !file.exists() {
                bail!("File not found: {}", file.display());
            }
            let accounts = accounts.clone().or_else(|| cfg.sensitive_accounts.clone());
            let classifier = build_classifier(&cfg, accounts.as_deref())?;
            let result = classifier.classify_path(file);
            let json = serde_json::to_string_pretty(&result).context("serialize classification")?;
            println!("{}", json);
            if result.info.is_placeable() {
                let strategy = classifier.strategy_for(&result.info);
                println!(
                    "\nProposed: {}/{}",
                    strategy.get_subfolder_path(&result.info).join("/"),
                    strategy.get_filename(&result.info)
                );
            }
        }
    }

    Ok(())
}
