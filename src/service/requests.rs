// src/service/requests.rs
//! Typed request bodies for the three table operations.
//!
//! Bodies are checked in two steps: every required key must be present
//! before any value is converted, then each value is converted on its own.
//! That keeps a missing key (`MissingField`), a bad enum string
//! (`UnknownOperationVariant`) and a wrongly typed value (`MalformedRequest`)
//! distinguishable for the caller.

use serde_json::{Map, Value};
use crate::error::{Error, Result};
use crate::matcher::ClusterOptions;
use crate::table::{json_type_name, AppendType, JoinSpec, JoinType, Table};

#[derive(Debug, Clone, PartialEq)]
pub struct AppendRequest {
    pub table_1: Table,
    pub table_2: Table,
    pub append_type: AppendType,
}

impl AppendRequest {
    pub const REQUIRED: &'static [&'static str] = &["table_1", "table_2", "append_type"];

    pub fn from_json(body: Value) -> Result<Self> {
        let mut fields = RequestFields::new(body, Self::REQUIRED)?;
        Ok(Self {
            table_1: fields.table("table_1")?,
            table_2: fields.table("table_2")?,
            append_type: fields.string("append_type")?.parse()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinRequest {
    pub table_1: Table,
    pub table_2: Table,
    pub spec: JoinSpec,
}

impl JoinRequest {
    pub const REQUIRED: &'static [&'static str] =
        &["table_1", "table_2", "join_col_1", "join_col_2", "join_type"];

    pub fn from_json(body: Value) -> Result<Self> {
        let mut fields = RequestFields::new(body, Self::REQUIRED)?;
        let table_1 = fields.table("table_1")?;
        let table_2 = fields.table("table_2")?;
        let left_on = fields.string("join_col_1")?;
        let right_on = fields.string("join_col_2")?;
        let join_type: JoinType = fields.string("join_type")?.parse()?;

        let mut spec = JoinSpec::new(left_on, right_on, join_type);
        if let Some(name) = fields.optional_string("join_col_name")? {
            spec = spec.with_key_name(name);
        }

        Ok(Self { table_1, table_2, spec })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClusterRequest {
    pub table: Table,
    pub options: ClusterOptions,
}

impl ClusterRequest {
    pub const REQUIRED: &'static [&'static str] = &["table", "col", "replace_col"];

    pub fn from_json(body: Value) -> Result<Self> {
        let mut fields = RequestFields::new(body, Self::REQUIRED)?;
        let table = fields.table("table")?;
        let column = fields.string("col")?;
        let replace_col = fields.boolean("replace_col")?;

        let mut options = ClusterOptions::new(column).replacing(replace_col);
        if let Some(name) = fields.optional_string("cluster_col_name")? {
            options = options.with_name(name);
        }

        Ok(Self { table, options })
    }
}

/// Parses raw body bytes into a JSON object.
pub fn parse_body(bytes: &[u8]) -> Result<Value> {
    serde_json::from_slice(bytes).map_err(|e| Error::malformed(format!("invalid JSON body: {}", e)))
}

/// Owned view of a request object with its required keys checked.
struct RequestFields {
    map: Map<String, Value>,
}

impl RequestFields {
    fn new(body: Value, required: &[&str]) -> Result<Self> {
        let map = match body {
            Value::Object(map) => map,
            other => {
                return Err(Error::malformed(format!(
                    "request body must be a JSON object, found {}",
                    json_type_name(&other)
                )))
            }
        };

        // Report the first missing key in declaration order
        if let Some(missing) = required.iter().find(|key| !map.contains_key(**key)) {
            return Err(Error::missing_field(*missing));
        }

        Ok(Self { map })
    }

    fn take(&mut self, key: &str) -> Value {
        self.map.remove(key).unwrap_or(Value::Null)
    }

    fn table(&mut self, key: &str) -> Result<Table> {
        Table::from_json(self.take(key))
            .map_err(|e| match e {
                Error::MalformedRequest(msg) => Error::malformed(format!("{}: {}", key, msg)),
                other => other,
            })
    }

    fn string(&mut self, key: &str) -> Result<String> {
        match self.take(key) {
            Value::String(s) => Ok(s),
            other => Err(wrong_type(key, "a string", &other)),
        }
    }

    /// Absent, `null` and `""` all mean "not given".
    fn optional_string(&mut self, key: &str) -> Result<Option<String>> {
        match self.take(key) {
            Value::Null => Ok(None),
            Value::String(s) if s.is_empty() => Ok(None),
            Value::String(s) => Ok(Some(s)),
            other => Err(wrong_type(key, "a string or null", &other)),
        }
    }

    fn boolean(&mut self, key: &str) -> Result<bool> {
        match self.take(key) {
            Value::Bool(b) => Ok(b),
            other => Err(wrong_type(key, "a boolean", &other)),
        }
    }
}

fn wrong_type(key: &str, expected: &str, found: &Value) -> Error {
    Error::malformed(format!(
        "'{}' must be {}, found {}",
        key,
        expected,
        json_type_name(found)
    ))
}
