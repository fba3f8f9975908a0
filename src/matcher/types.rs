// types.rs
use serde::{Serialize, Deserialize};
use crate::types::CellValue;

/// Suffix appended to the target column name to form the derived column.
pub const CLUSTERED_SUFFIX: &str = " (clustered)";

/// What to cluster and how to shape the output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterOptions {
    /// Column whose values are clustered
    pub column: String,
    /// Name for the derived column instead of `"<column> (clustered)"`
    pub cluster_col_name: Option<String>,
    /// Drop the source column, leaving only the derived one in its place
    pub replace_col: bool,
}

impl ClusterOptions {
    pub fn new<S: Into<String>>(column: S) -> Self {
        Self {
            column: column.into(),
            cluster_col_name: None,
            replace_col: false,
        }
    }

    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.cluster_col_name = Some(name.into());
        self
    }

    pub fn replacing(mut self, replace_col: bool) -> Self {
        self.replace_col = replace_col;
        self
    }

    /// Name the derived column has before any rename.
    pub fn derived_name(&self) -> String {
        format!("{}{}", self.column, CLUSTERED_SUFFIX)
    }
}

/// A distinct value of the clustered column.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// Row of the first occurrence
    pub first_row: usize,
    pub value: CellValue,
    /// Text after `default_process`
    pub processed: String,
}

/// Winning candidate for one query value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BestMatch {
    /// Index into the candidate pool
    pub candidate: usize,
    pub score: f64,
}
