// src/service/mod.rs
pub mod requests;

use std::fmt;
use std::str::FromStr;
use std::time::Instant;
use log::{debug, info};
use serde_json::Value;
use crate::config::JadwalConfig;
use crate::error::{Error, Result};
use crate::matcher::ClusteringMatcher;
use crate::table::{self, Table};

pub use requests::{parse_body, AppendRequest, ClusterRequest, JoinRequest};

/// The three operations the service exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Append,
    Join,
    Cluster,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Append => "append-table",
            Operation::Join => "join-table",
            Operation::Cluster => "cluster-matching",
        }
    }
}

impl FromStr for Operation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "append-table" => Ok(Operation::Append),
            "join-table" => Ok(Operation::Join),
            "cluster-matching" => Ok(Operation::Cluster),
            other => Err(Error::unknown_variant("operation", other)),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stateless table operations behind the HTTP surface.
///
/// Holds only the matcher built from the configuration, so one instance is
/// shared across all requests.
#[derive(Debug)]
pub struct TableService {
    matcher: ClusteringMatcher,
}

impl TableService {
    pub fn new(config: JadwalConfig) -> Result<Self> {
        config.validate()?;
        let matcher = ClusteringMatcher::new(config.matcher)?;
        Ok(Self { matcher })
    }

    pub fn append(&self, request: AppendRequest) -> Result<Table> {
        debug!(
            "append {}: {}x{} with {}x{}",
            request.append_type,
            request.table_1.row_count(),
            request.table_1.column_count(),
            request.table_2.row_count(),
            request.table_2.column_count()
        );
        table::append(request.table_1, request.table_2, request.append_type)
    }

    pub fn join(&self, request: JoinRequest) -> Result<Table> {
        debug!(
            "{} join on '{}' = '{}' ({} x {} rows)",
            request.spec.join_type,
            request.spec.left_on,
            request.spec.right_on,
            request.table_1.row_count(),
            request.table_2.row_count()
        );
        table::join(&request.table_1, &request.table_2, &request.spec)
    }

    pub fn cluster(&self, request: ClusterRequest) -> Result<Table> {
        self.matcher.cluster(request.table, &request.options)
    }

    /// Validates a raw JSON body for `op`, runs it and returns the result
    /// table in wire form.
    pub fn handle(&self, op: Operation, body: Value) -> Result<Value> {
        let start = Instant::now();
        let result = match op {
            Operation::Append => self.append(AppendRequest::from_json(body)?),
            Operation::Join => self.join(JoinRequest::from_json(body)?),
            Operation::Cluster => self.cluster(ClusterRequest::from_json(body)?),
        }?;

        info!(
            "{} produced {} rows x {} columns in {:?}",
            op,
            result.row_count(),
            result.column_count(),
            start.elapsed()
        );
        Ok(result.to_json())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn service() -> TableService {
        TableService::new(JadwalConfig::default()).unwrap()
    }

    #[test]
    fn test_operation_names() {
        for op in [Operation::Append, Operation::Join, Operation::Cluster] {
            assert_eq!(op.as_str().parse::<Operation>().unwrap(), op);
        }
        assert!("merge".parse::<Operation>().is_err());
    }

    #[test]
    fn test_handle_append_vertical_doubles_rows() {
        let t = json!([{"a": 1, "b": null}, {"a": 2, "b": "x"}]);
        let out = service()
            .handle(
                Operation::Append,
                json!({"table_1": t, "table_2": t, "append_type": "vertical"}),
            )
            .unwrap();
        assert_eq!(
            out,
            json!([
                {"a": 1, "b": null}, {"a": 2, "b": "x"},
                {"a": 1, "b": null}, {"a": 2, "b": "x"},
            ])
        );
    }

    #[test]
    fn test_handle_join_inner() {
        let out = service()
            .handle(
                Operation::Join,
                json!({
                    "table_1": [{"id": 1, "x": "a"}],
                    "table_2": [{"id": 1, "y": "b"}],
                    "join_col_1": "id",
                    "join_col_2": "id",
                    "join_type": "inner",
                }),
            )
            .unwrap();
        assert_eq!(out, json!([{"id": 1, "x": "a", "y": "b"}]));
    }

    #[test]
    fn test_handle_cluster() {
        let out = service()
            .handle(
                Operation::Cluster,
                json!({
                    "table": [{"fruit": "apple"}, {"fruit": "apple"}, {"fruit": "banana"}],
                    "col": "fruit",
                    "replace_col": false,
                }),
            )
            .unwrap();
        assert_eq!(
            out,
            json!([
                {"fruit": "apple", "fruit (clustered)": "apple"},
                {"fruit": "apple", "fruit (clustered)": "apple"},
                {"fruit": "banana", "fruit (clustered)": "banana"},
            ])
        );
    }

    #[test]
    fn test_handle_propagates_operation_errors() {
        let err = service()
            .handle(
                Operation::Append,
                json!({
                    "table_1": [{"A": 1, "B": 2}],
                    "table_2": [{"A": 1, "C": 2}],
                    "append_type": "vertical",
                }),
            )
            .unwrap_err();
        assert!(matches!(err, Error::SchemaMismatch(_)));
    }
}
