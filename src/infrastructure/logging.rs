use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Environment variable holding the `env_logger` filter, e.g. `debug`.
pub const LOG_ENV: &str = "DATEPICKER_LOG";

/// Send all `log` output to `log_path`. The terminal belongs to the UI, so
/// nothing is written to stderr while a picker is on screen.
pub fn init_file_logger(log_path: &Path) -> Result<()> {
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_env(LOG_ENV)
        .target(env_logger::Target::Pipe(Box::new(file)))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {:<5} {} - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .try_init()
        .context("Logger was already initialized")?;

    log::info!("Logging to {}", log_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_logger_creates_nested_log_file() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("logs").join("datepicker.log");

        init_file_logger(&log_path).unwrap();
        assert!(log_path.exists());

        // The global logger can only be installed once per process
        assert!(init_file_logger(&log_path).is_err());
    }
}
