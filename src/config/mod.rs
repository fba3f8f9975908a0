pub mod subsystems;

use serde::{Serialize, Deserialize};
use std::path::Path;
use std::fs;
use crate::error::{Error, Result};
use log::{warn, trace};

/// Environment variable overriding `[server] listen_addr`
pub const ENV_LISTEN_ADDR: &str = "JADWAL_LISTEN_ADDR";
/// Environment variable overriding `[logging] level`
pub const ENV_LOG_LEVEL: &str = "JADWAL_LOG_LEVEL";
/// Environment variable overriding `[matcher] worker_threads`
pub const ENV_WORKER_THREADS: &str = "JADWAL_WORKER_THREADS";

pub trait FromIni {
    fn from_ini_section(&mut self, section_name: &str, key: &str, value: &str) -> Option<Result<()>>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JadwalConfig {
    pub server: subsystems::ServerConfig,
    pub matcher: subsystems::MatcherConfig,
    pub logging: subsystems::LoggingConfig,
}

impl JadwalConfig {
    pub fn validate(&self) -> Result<()> {
        self.server.validate()?;
        self.matcher.validate()?;
        Ok(())
    }

    pub fn from_ini<P: AsRef<Path>>(path: P) -> Result<Self> {
        let absolute_path = std::fs::canonicalize(&path)
            .unwrap_or_else(|_| path.as_ref().to_path_buf());

        trace!("Loading configuration from: {:?}", absolute_path);

        let content = fs::read_to_string(&path)?;
        Self::from_ini_str(&content)
    }

    /// Parses INI text. Unknown sections and keys are logged and skipped;
    /// invalid values for known keys are errors.
    pub fn from_ini_str(content: &str) -> Result<Self> {
        let mut config = Self::default();
        let mut current_section = String::new();

        for (line_num, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if line.starts_with('[') && line.ends_with(']') {
                current_section = line[1..line.len()-1].trim().to_string();
                trace!("  Line {}: Found section: [{}]", line_num + 1, current_section);
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                warn!("Ignoring malformed config line {}: {}", line_num + 1, line);
                continue;
            };
            let key = key.trim();
            let value = value.trim();

            let handled = match current_section.as_str() {
                "server" => config.server.from_ini_section(&current_section, key, value),
                "matcher" => config.matcher.from_ini_section(&current_section, key, value),
                "logging" => config.logging.from_ini_section(&current_section, key, value),
                _ => None,
            };

            match handled {
                Some(Err(e)) => {
                    return Err(Error::Config(format!("line {}: {}", line_num + 1, e)));
                },
                Some(Ok(())) => {},
                None => {
                    warn!("Unrecognized config key: {}={} in section [{}]", key, value, current_section);
                },
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Applies `JADWAL_*` environment overrides.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup(ENV_LISTEN_ADDR) {
            self.server.listen_addr = addr.parse().map_err(|_| {
                Error::Config(format!("Invalid {}: {}", ENV_LISTEN_ADDR, addr))
            })?;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.logging.level = subsystems::logging::parse_level(&level)?;
        }
        if let Some(threads) = lookup(ENV_WORKER_THREADS) {
            self.matcher.worker_threads = threads.parse().map_err(|_| {
                Error::Config(format!("Invalid {}: {}", ENV_WORKER_THREADS, threads))
            })?;
        }
        self.validate()
    }
}
