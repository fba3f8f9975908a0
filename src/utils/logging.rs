// src/utils/logging.rs
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use chrono::Local;
use log::info;
use crate::config::subsystems::LoggingConfig;
use crate::error::{Error, Result};

/// Installs the global logger.
///
/// Lines are `"<local time> [<LEVEL>] - <message>"`. Output goes to stderr,
/// or to `jadwal_<timestamp>.log` under `log_dir` when one is configured.
/// Returns the log file path when logging to a file.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<PathBuf>> {
    let mut builder = env_logger::Builder::new();
    builder
        .format(|buf, record| {
            writeln!(buf,
                "{} [{}] - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(None, config.level);

    let log_path = match config.log_dir {
        Some(ref dir) => {
            fs::create_dir_all(dir)?;
            let timestamp = Local::now().format("%Y%m%d_%H%M%S");
            let path = dir.join(format!("jadwal_{}.log", timestamp));
            let log_file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)?;
            builder.target(env_logger::Target::Pipe(Box::new(log_file)));
            Some(path)
        }
        None => {
            builder.target(env_logger::Target::Stderr);
            None
        }
    };

    builder
        .try_init()
        .map_err(|e| Error::config(format!("Logger already initialized: {}", e)))?;

    info!("Logging initialized at level {:?}", config.level);
    Ok(log_path)
}
