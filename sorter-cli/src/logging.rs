use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Install the global subscriber. `RUST_LOG` wins over `level`.
/// With `log_file`, the same events are also appended there without colors.
pub fn setup_logging(level: &str, log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = match log_file {
        Some(p) => Some(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(open_log_file(p)?)),
        ),
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    match log_file {
        Some(p) => tracing::debug!("Logging setup complete; also writing {}", p.display()),
        None => tracing::debug!("Logging setup complete."),
    }
    Ok(())
}

/// Opens `p` for appending, creating it and its folder when missing.
pub fn open_log_file(p: &Path) -> Result<File> {
    if let Some(parent) = p.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(p)
        .with_context(|| format!("open log file {}", p.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_log_file_is_created_and_appended() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("logs/stmtsort.log");
        writeln!(open_log_file(&p).unwrap(), "first").unwrap();
        writeln!(open_log_file(&p).unwrap(), "second").unwrap();
        assert_eq!(fs::read_to_string(&p).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn test_log_file_in_missing_place_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        fs::write(&blocker, b"x").unwrap();
        assert!(open_log_file(&blocker.join("stmtsort.log")).is_err());
    }
}
