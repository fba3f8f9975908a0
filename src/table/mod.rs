//! Columnar in-memory table shared by every operation.
//!
//! A [`Table`] is an ordered list of named [`Column`]s of equal length. On
//! the wire it travels as an array of row objects; [`Table::from_records`]
//! and [`Table::to_records`] convert between the two forms.

pub mod append;
pub mod join;
pub mod io;

use ahash::AHashSet;
use serde::de::Deserializer;
use serde::ser::{SerializeMap, SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::error::{Error, Result};
use crate::types::CellValue;

pub use append::{append, append_horizontal, append_vertical, AppendType};
pub use join::{join, JoinSpec, JoinType};

/// One row in wire form: column name to cell, in column order.
pub type Record = serde_json::Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Column {
    pub name: String,
    pub values: Vec<CellValue>,
}

impl Column {
    pub fn new<S: Into<String>>(name: S, values: Vec<CellValue>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn nulls<S: Into<String>>(name: S, len: usize) -> Self {
        Self::new(name, vec![CellValue::Null; len])
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
    // Tracked separately so a table of column-less rows (`[{}]`) keeps its height.
    row_count: usize,
}

impl Table {
    /// Builds a table, checking that columns have equal length and unique names.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let row_count = columns.first().map(Column::len).unwrap_or(0);
        Self::with_row_count(columns, row_count)
    }

    pub(crate) fn with_row_count(columns: Vec<Column>, row_count: usize) -> Result<Self> {
        let mut seen = AHashSet::with_capacity(columns.len());
        for column in &columns {
            if column.len() != row_count {
                return Err(Error::invalid_table(format!(
                    "column '{}' has {} rows, expected {}",
                    column.name,
                    column.len(),
                    row_count
                )));
            }
            if !seen.insert(column.name.as_str()) {
                return Err(Error::duplicate_columns(format!(
                    "column '{}' appears more than once",
                    column.name
                )));
            }
        }
        Ok(Self { columns, row_count })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a table from row records.
    ///
    /// Columns are ordered by first appearance of each key across all rows;
    /// a key absent from a row becomes a null cell in that row.
    pub fn from_records(records: Vec<Record>) -> Result<Self> {
        let mut names: Vec<String> = Vec::new();
        let mut positions: ahash::AHashMap<String, usize> = ahash::AHashMap::new();
        for record in &records {
            for key in record.keys() {
                if !positions.contains_key(key) {
                    positions.insert(key.clone(), names.len());
                    names.push(key.clone());
                }
            }
        }

        let row_count = records.len();
        let mut columns: Vec<Column> = names
            .into_iter()
            .map(|name| Column::new(name, Vec::with_capacity(row_count)))
            .collect();

        for (row, record) in records.into_iter().enumerate() {
            for (key, value) in record {
                let cell = CellValue::try_from(value).map_err(|e| {
                    Error::malformed(format!("row {}, column '{}': {}", row, key, e))
                })?;
                // Every key was registered above.
                let idx = positions[&key];
                columns[idx].values.push(cell);
            }
            for column in columns.iter_mut() {
                if column.values.len() <= row {
                    column.values.push(CellValue::Null);
                }
            }
        }

        Self::with_row_count(columns, row_count)
    }

    /// Parses the wire form: a JSON array of row objects.
    pub fn from_json(value: Value) -> Result<Self> {
        let rows = match value {
            Value::Array(rows) => rows,
            other => {
                return Err(Error::malformed(format!(
                    "a table must be an array of row objects, found {}",
                    json_type_name(&other)
                )))
            }
        };

        let mut records = Vec::with_capacity(rows.len());
        for (i, row) in rows.into_iter().enumerate() {
            match row {
                Value::Object(map) => records.push(map),
                other => {
                    return Err(Error::malformed(format!(
                        "row {} must be an object, found {}",
                        i,
                        json_type_name(&other)
                    )))
                }
            }
        }
        Self::from_records(records)
    }

    /// Row records with every column present in every row.
    pub fn to_records(&self) -> Vec<Record> {
        (0..self.row_count)
            .map(|row| {
                self.columns
                    .iter()
                    .map(|c| (c.name.clone(), Value::from(c.values[row].clone())))
                    .collect()
            })
            .collect()
    }

    pub fn to_json(&self) -> Value {
        Value::Array(self.to_records().into_iter().map(Value::Object).collect())
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0 && self.columns.is_empty()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn into_columns(self) -> Vec<Column> {
        self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Index of `name`, or a `MissingColumn` error.
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| Error::missing_column(name))
    }

    pub fn insert_column(&mut self, index: usize, column: Column) -> Result<()> {
        if self.has_column(&column.name) {
            return Err(Error::duplicate_columns(format!(
                "cannot insert '{}', a column with that name already exists",
                column.name
            )));
        }
        if !self.columns.is_empty() && column.len() != self.row_count {
            return Err(Error::invalid_table(format!(
                "column '{}' has {} rows, expected {}",
                column.name,
                column.len(),
                self.row_count
            )));
        }
        if self.columns.is_empty() {
            self.row_count = column.len();
        }
        let index = index.min(self.columns.len());
        self.columns.insert(index, column);
        Ok(())
    }

    pub fn remove_column(&mut self, name: &str) -> Result<Column> {
        let index = self.require_column(name)?;
        Ok(self.columns.remove(index))
    }

    pub fn rename_column(&mut self, from: &str, to: &str) -> Result<()> {
        if from == to {
            return self.require_column(from).map(|_| ());
        }
        let index = self.require_column(from)?;
        if self.has_column(to) {
            return Err(Error::duplicate_columns(format!(
                "cannot rename '{}' to '{}', a column with that name already exists",
                from, to
            )));
        }
        self.columns[index].name = to.to_string();
        Ok(())
    }
}

impl Serialize for Table {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.row_count))?;
        for row in 0..self.row_count {
            seq.serialize_element(&RowRef { table: self, row })?;
        }
        seq.end()
    }
}

struct RowRef<'a> {
    table: &'a Table,
    row: usize,
}

impl Serialize for RowRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.table.columns.len()))?;
        for column in &self.table.columns {
            map.serialize_entry(&column.name, &column.values[self.row])?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Table {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let records = Vec::<Record>::deserialize(deserializer)?;
        Table::from_records(records).map_err(serde::de::Error::custom)
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_records_round_trip_with_missing_keys() {
        let table = Table::from_json(json!([
            {"a": 1, "b": "x"},
            {"b": "y", "c": true},
        ]))
        .unwrap();

        assert_eq!(table.column_names(), vec!["a", "b", "c"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(
            table.to_json(),
            json!([
                {"a": 1, "b": "x", "c": null},
                {"a": null, "b": "y", "c": true},
            ])
        );
    }

    #[test]
    fn test_serde_matches_records() {
        let input = json!([{"id": 1, "name": null}, {"id": 2, "name": "b"}]);
        let table: Table = serde_json::from_value(input.clone()).unwrap();
        assert_eq!(serde_json::to_value(&table).unwrap(), input);
    }

    #[test]
    fn test_rejects_non_array_and_nested_cells() {
        assert!(matches!(
            Table::from_json(json!({"a": 1})),
            Err(Error::MalformedRequest(_))
        ));
        assert!(matches!(
            Table::from_json(json!([{"a": [1]}])),
            Err(Error::MalformedRequest(_))
        ));
    }

    #[test]
    fn test_new_rejects_ragged_and_duplicate_columns() {
        let ragged = Table::new(vec![
            Column::new("a", vec![CellValue::from(1i64)]),
            Column::new("b", vec![]),
        ]);
        assert!(matches!(ragged, Err(Error::InvalidTable(_))));

        let dup = Table::new(vec![
            Column::new("a", vec![CellValue::from(1i64)]),
            Column::new("a", vec![CellValue::from(2i64)]),
        ]);
        assert!(matches!(dup, Err(Error::DuplicateColumns(_))));
    }

    #[test]
    fn test_column_edits() {
        let mut table = Table::new(vec![Column::new("a", vec![CellValue::from(1i64), CellValue::from(2i64)])]).unwrap();
        table.insert_column(1, Column::nulls("b", 2)).unwrap();
        assert!(table.insert_column(0, Column::nulls("a", 2)).is_err());
        assert!(table.insert_column(0, Column::nulls("z", 3)).is_err());

        table.rename_column("b", "c").unwrap();
        assert!(table.rename_column("c", "a").is_err());
        assert!(matches!(table.rename_column("nope", "x"), Err(Error::MissingColumn(_))));

        let removed = table.remove_column("a").unwrap();
        assert_eq!(removed.values.len(), 2);
        assert_eq!(table.column_names(), vec!["c"]);
    }

    #[test]
    fn test_empty_rows_keep_height() {
        let table = Table::from_json(json!([{}, {}])).unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 0);
        assert_eq!(table.to_json(), json!([{}, {}]));
    }
}
