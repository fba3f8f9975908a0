// src/config/subsystems/matcher.rs

use std::str::FromStr;
use serde::{Serialize, Deserialize};
use crate::error::{Error, Result};
use crate::config::FromIni;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScorerKind {
    Ratio,
    PartialRatio,
    TokenSortRatio,
    TokenSetRatio,
    #[default]
    WeightedRatio,
}

impl ScorerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScorerKind::Ratio => "ratio",
            ScorerKind::PartialRatio => "partial_ratio",
            ScorerKind::TokenSortRatio => "token_sort_ratio",
            ScorerKind::TokenSetRatio => "token_set_ratio",
            ScorerKind::WeightedRatio => "weighted_ratio",
        }
    }

}

impl FromStr for ScorerKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim_matches('"').to_lowercase().as_str() {
            "ratio" => Ok(Self::Ratio),
            "partial_ratio" => Ok(Self::PartialRatio),
            "token_sort_ratio" => Ok(Self::TokenSortRatio),
            "token_set_ratio" => Ok(Self::TokenSetRatio),
            "weighted_ratio" | "wratio" => Ok(Self::WeightedRatio),
            _ => Err(Error::Config(format!("Invalid scorer: {}", s))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// Similarity score used to pick each row's best match
    pub scorer: ScorerKind,
    /// Distinct values at or above which rows are scored on the worker pool
    pub parallel_threshold: usize,
    /// Worker pool size, 0 means one thread per CPU
    pub worker_threads: usize,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            scorer: ScorerKind::WeightedRatio,
            parallel_threshold: 256,
            worker_threads: 0,
        }
    }
}

impl MatcherConfig {
    pub fn validate(&self) -> Result<()> {
        if self.worker_threads > 1024 {
            return Err(Error::Config(format!(
                "worker_threads must be at most 1024, got {}",
                self.worker_threads
            )));
        }
        Ok(())
    }

    /// Effective pool size.
    pub fn thread_count(&self) -> usize {
        if self.worker_threads == 0 {
            num_cpus::get()
        } else {
            self.worker_threads
        }
    }
}

impl FromIni for MatcherConfig {
    fn from_ini_section(&mut self, section_name: &str, key: &str, value: &str) -> Option<Result<()>> {
        if section_name != "matcher" {
            return None;
        }

        match key {
            "scorer" => match value.parse() {
                Ok(kind) => {
                    self.scorer = kind;
                    Some(Ok(()))
                },
                Err(e) => Some(Err(e)),
            },
            "parallel_threshold" => {
                match value.parse() {
                    Ok(threshold) => {
                        self.parallel_threshold = threshold;
                        Some(Ok(()))
                    },
                    Err(_) => Some(Err(Error::Config(
                        format!("Invalid parallel_threshold: {}", value)
                    ))),
                }
            },
            "worker_threads" => {
                match value.parse() {
                    Ok(threads) => {
                        self.worker_threads = threads;
                        Some(Ok(()))
                    },
                    Err(_) => Some(Err(Error::Config(
                        format!("Invalid worker_threads: {}", value)
                    ))),
                }
            },
            _ => None,
        }
    }
}
