use std::fmt;
use std::str::FromStr;
use ahash::AHashSet;
use log::debug;
use crate::error::{Error, Result};
use crate::types::CellValue;
use super::{Column, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppendType {
    Vertical,
    Horizontal,
}

impl AppendType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppendType::Vertical => "vertical",
            AppendType::Horizontal => "horizontal",
        }
    }
}

impl FromStr for AppendType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "vertical" => Ok(Self::Vertical),
            "horizontal" => Ok(Self::Horizontal),
            other => Err(Error::unknown_variant("append_type", other)),
        }
    }
}

impl fmt::Display for AppendType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn append(first: Table, second: Table, append_type: AppendType) -> Result<Table> {
    match append_type {
        AppendType::Vertical => append_vertical(first, second),
        AppendType::Horizontal => append_horizontal(first, second),
    }
}

/// Stacks the rows of `second` under the rows of `first`.
///
/// Both tables must have the same set of column names; the result keeps the
/// column order of `first`.
pub fn append_vertical(first: Table, second: Table) -> Result<Table> {
    let first_names: AHashSet<&str> = first.columns().iter().map(|c| c.name.as_str()).collect();
    let second_names: AHashSet<&str> = second.columns().iter().map(|c| c.name.as_str()).collect();

    if first_names != second_names {
        let mut only_first: Vec<&str> = first_names.difference(&second_names).copied().collect();
        let mut only_second: Vec<&str> = second_names.difference(&first_names).copied().collect();
        only_first.sort_unstable();
        only_second.sort_unstable();
        return Err(Error::SchemaMismatch(format!(
            "only in table_1: [{}]; only in table_2: [{}]",
            only_first.join(", "),
            only_second.join(", ")
        )));
    }

    let row_count = first.row_count() + second.row_count();
    debug!(
        "Appending {} + {} rows vertically across {} columns",
        first.row_count(),
        second.row_count(),
        first.column_count()
    );

    let mut second_columns: Vec<Option<Column>> = second.into_columns().into_iter().map(Some).collect();
    let mut columns = Vec::with_capacity(second_columns.len());
    for mut column in first.into_columns() {
        let lower = second_columns
            .iter_mut()
            .find(|c| c.as_ref().map(|c| c.name == column.name).unwrap_or(false))
            .and_then(Option::take)
            .ok_or_else(|| Error::SchemaMismatch(format!("column '{}' missing from table_2", column.name)))?;
        column.values.extend(lower.values);
        columns.push(column);
    }

    Table::with_row_count(columns, row_count)
}

/// Places the columns of `second` to the right of the columns of `first`.
///
/// Column names must be disjoint. Rows are aligned by position and the
/// shorter table is padded with nulls.
pub fn append_horizontal(first: Table, second: Table) -> Result<Table> {
    let mut overlap: Vec<&str> = first
        .columns()
        .iter()
        .map(|c| c.name.as_str())
        .filter(|name| second.has_column(name))
        .collect();
    if !overlap.is_empty() {
        overlap.sort_unstable();
        return Err(Error::duplicate_columns(format!(
            "Unable to append (Columns contain duplicates): [{}]",
            overlap.join(", ")
        )));
    }

    let row_count = first.row_count().max(second.row_count());
    debug!(
        "Appending {} + {} columns horizontally over {} rows",
        first.column_count(),
        second.column_count(),
        row_count
    );

    let columns = first
        .into_columns()
        .into_iter()
        .chain(second.into_columns())
        .map(|mut column| {
            column.values.resize(row_count, CellValue::Null);
            column
        })
        .collect();

    Table::with_row_count(columns, row_count)
}
