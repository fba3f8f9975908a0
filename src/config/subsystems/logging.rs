// src/config/subsystems/logging.rs

use std::path::PathBuf;
use log::LevelFilter;
use serde::{Serialize, Deserialize};
use crate::error::{Error, Result};
use crate::config::FromIni;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: LevelFilter,
    /// When set, logs go to a timestamped file in this directory instead of stderr
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LevelFilter::Info,
            log_dir: None,
        }
    }
}

pub fn parse_level(value: &str) -> Result<LevelFilter> {
    value
        .trim_matches('"')
        .parse::<LevelFilter>()
        .map_err(|_| Error::Config(format!("Invalid log level: {}", value)))
}

impl FromIni for LoggingConfig {
    fn from_ini_section(&mut self, section_name: &str, key: &str, value: &str) -> Option<Result<()>> {
        if section_name != "logging" {
            return None;
        }

        match key {
            "level" => Some(parse_level(value).map(|level| self.level = level)),
            "log_dir" => {
                let dir = value.trim_matches('"');
                self.log_dir = if dir.is_empty() { None } else { Some(PathBuf::from(dir)) };
                Some(Ok(()))
            },
            _ => None,
        }
    }
}
