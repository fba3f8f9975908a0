use std::fmt;
use std::str::FromStr;
use ahash::{AHashMap, AHashSet};
use log::debug;
use crate::error::{Error, Result};
use crate::types::CellValue;
use super::{Column, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Outer,
}

impl JoinType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JoinType::Inner => "inner",
            JoinType::Left => "left",
            JoinType::Right => "right",
            JoinType::Outer => "outer",
        }
    }
}

impl FromStr for JoinType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "inner" => Ok(Self::Inner),
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            "outer" => Ok(Self::Outer),
            other => Err(Error::unknown_variant("join_type", other)),
        }
    }
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters of a two-table join.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinSpec {
    /// Key column in the first table.
    pub left_on: String,
    /// Key column in the second table.
    pub right_on: String,
    pub join_type: JoinType,
    /// New name for the key column that survives in the output.
    pub key_name: Option<String>,
}

impl JoinSpec {
    pub fn new<L: Into<String>, R: Into<String>>(left_on: L, right_on: R, join_type: JoinType) -> Self {
        Self {
            left_on: left_on.into(),
            right_on: right_on.into(),
            join_type,
            key_name: None,
        }
    }

    pub fn with_key_name<S: Into<String>>(mut self, name: S) -> Self {
        self.key_name = Some(name.into());
        self
    }
}

/// Hashable form of a key cell. Numbers compare by numeric value, so `1`
/// and `1.0` join; cells of different kinds never do.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum JoinKey {
    Bool(bool),
    Int(i128),
    Float(u64),
    Text(String),
}

fn join_key(cell: &CellValue) -> Option<JoinKey> {
    match cell {
        CellValue::Null => None,
        CellValue::Bool(b) => Some(JoinKey::Bool(*b)),
        CellValue::Text(s) => Some(JoinKey::Text(s.clone())),
        CellValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Some(JoinKey::Int(i as i128));
            }
            if let Some(u) = n.as_u64() {
                return Some(JoinKey::Int(u as i128));
            }
            let f = n.as_f64()?;
            // Integral floats (including -0.0) share the integer key.
            if f.fract() == 0.0 && f.abs() < 9.0e18 {
                Some(JoinKey::Int(f as i128))
            } else {
                Some(JoinKey::Float(f.to_bits()))
            }
        }
    }
}

fn index_keys(column: &Column) -> AHashMap<JoinKey, Vec<usize>> {
    let mut index: AHashMap<JoinKey, Vec<usize>> = AHashMap::with_capacity(column.len());
    for (row, cell) in column.values.iter().enumerate() {
        if let Some(key) = join_key(cell) {
            index.entry(key).or_default().push(row);
        }
    }
    index
}

/// Output row as (row in first table, row in second table).
type RowPair = (Option<usize>, Option<usize>);

fn pair_rows(left_key: &Column, right_key: &Column, join_type: JoinType) -> Vec<RowPair> {
    let mut pairs = Vec::new();

    if join_type == JoinType::Right {
        let left_index = index_keys(left_key);
        for (r, cell) in right_key.values.iter().enumerate() {
            match join_key(cell).and_then(|k| left_index.get(&k)) {
                Some(rows) => pairs.extend(rows.iter().map(|&l| (Some(l), Some(r)))),
                None => pairs.push((None, Some(r))),
            }
        }
        return pairs;
    }

    let right_index = index_keys(right_key);
    let mut right_matched = vec![false; right_key.len()];
    for (l, cell) in left_key.values.iter().enumerate() {
        match join_key(cell).and_then(|k| right_index.get(&k)) {
            Some(rows) => {
                for &r in rows {
                    right_matched[r] = true;
                    pairs.push((Some(l), Some(r)));
                }
            }
            None if join_type != JoinType::Inner => pairs.push((Some(l), None)),
            None => {}
        }
    }

    if join_type == JoinType::Outer {
        pairs.extend(
            right_matched
                .iter()
                .enumerate()
                .filter(|(_, matched)| !**matched)
                .map(|(r, _)| (None, Some(r))),
        );
    }
    pairs
}

fn gather(column: &Column, rows: impl Iterator<Item = Option<usize>>) -> Vec<CellValue> {
    rows.map(|row| match row {
        Some(i) => column.values[i].clone(),
        None => CellValue::Null,
    })
    .collect()
}

/// Joins two tables on one key column each.
///
/// Output columns are the first table's followed by the second table's.
/// A key shared by name appears once; otherwise the second table's key is
/// dropped (the first table's for right joins). Other clashing names get
/// `_x`/`_y` suffixes. No matching rows yields an empty table, not an error.
pub fn join(left: &Table, right: &Table, spec: &JoinSpec) -> Result<Table> {
    let left_key_idx = left.require_column(&spec.left_on)?;
    let right_key_idx = right.require_column(&spec.right_on)?;
    let same_key = spec.left_on == spec.right_on;

    let pairs = pair_rows(
        &left.columns()[left_key_idx],
        &right.columns()[right_key_idx],
        spec.join_type,
    );
    debug!(
        "{} join on {}={} produced {} rows",
        spec.join_type,
        spec.left_on,
        spec.right_on,
        pairs.len()
    );

    // Names present on both sides, other than a shared key, get suffixed.
    let right_names: AHashSet<&str> = right
        .columns()
        .iter()
        .enumerate()
        .filter(|(i, _)| !(same_key && *i == right_key_idx))
        .map(|(_, c)| c.name.as_str())
        .collect();
    let clashes: AHashSet<&str> = left
        .columns()
        .iter()
        .enumerate()
        .filter(|(i, _)| !(same_key && *i == left_key_idx))
        .map(|(_, c)| c.name.as_str())
        .filter(|name| right_names.contains(name))
        .collect();

    let drop_left_key = !same_key && spec.join_type == JoinType::Right;
    let drop_right_key = !same_key && spec.join_type != JoinType::Right;
    let surviving_key_side_left = !drop_left_key;

    let mut columns = Vec::with_capacity(left.column_count() + right.column_count());

    for (i, column) in left.columns().iter().enumerate() {
        if i == left_key_idx && drop_left_key {
            continue;
        }
        let values = if i == left_key_idx && same_key {
            let right_column = &right.columns()[right_key_idx];
            pairs
                .iter()
                .map(|&(l, r)| match (l, r) {
                    (Some(l), _) => column.values[l].clone(),
                    (None, Some(r)) => right_column.values[r].clone(),
                    (None, None) => CellValue::Null,
                })
                .collect()
        } else {
            gather(column, pairs.iter().map(|p| p.0))
        };
        let mut name = if clashes.contains(column.name.as_str()) {
            format!("{}_x", column.name)
        } else {
            column.name.clone()
        };
        if i == left_key_idx && surviving_key_side_left {
            if let Some(ref key_name) = spec.key_name {
                name = key_name.clone();
            }
        }
        columns.push(Column::new(name, values));
    }

    for (i, column) in right.columns().iter().enumerate() {
        if i == right_key_idx && (same_key || drop_right_key) {
            continue;
        }
        let mut name = if clashes.contains(column.name.as_str()) {
            format!("{}_y", column.name)
        } else {
            column.name.clone()
        };
        if i == right_key_idx && !surviving_key_side_left {
            if let Some(ref key_name) = spec.key_name {
                name = key_name.clone();
            }
        }
        columns.push(Column::new(name, gather(column, pairs.iter().map(|p| p.1))));
    }

    Table::with_row_count(columns, pairs.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table(value: serde_json::Value) -> Table {
        Table::from_json(value).unwrap()
    }

    #[test]
    fn test_inner_join_same_key() {
        let t1 = table(json!([{"id": 1, "x": "a"}]));
        let t2 = table(json!([{"id": 1, "y": "b"}]));
        let result = join(&t1, &t2, &JoinSpec::new("id", "id", JoinType::Inner)).unwrap();
        assert_eq!(result.to_json(), json!([{"id": 1, "x": "a", "y": "b"}]));
    }

    #[test]
    fn test_self_join_reproduces_table() {
        let t = table(json!([{"id": 1}, {"id": 2}, {"id": 3}]));
        let result = join(&t, &t, &JoinSpec::new("id", "id", JoinType::Inner)).unwrap();
        assert_eq!(result, t);
    }

    #[test]
    fn test_left_join_keeps_unmatched_with_nulls() {
        let t1 = table(json!([{"id": 1, "x": "a"}, {"id": 2, "x": "b"}]));
        let t2 = table(json!([{"id": 2, "y": "z"}]));
        let result = join(&t1, &t2, &JoinSpec::new("id", "id", JoinType::Left)).unwrap();
        assert_eq!(
            result.to_json(),
            json!([
                {"id": 1, "x": "a", "y": null},
                {"id": 2, "x": "b", "y": "z"},
            ])
        );
    }

    #[test]
    fn test_different_key_names_drop_second_key() {
        let t1 = table(json!([{"k1": 1, "x": "a"}]));
        let t2 = table(json!([{"k2": 1, "y": "b"}]));
        let result = join(&t1, &t2, &JoinSpec::new("k1", "k2", JoinType::Inner)).unwrap();
        assert_eq!(result.to_json(), json!([{"k1": 1, "x": "a", "y": "b"}]));

        let renamed = join(
            &t1,
            &t2,
            &JoinSpec::new("k1", "k2", JoinType::Inner).with_key_name("key"),
        )
        .unwrap();
        assert_eq!(renamed.to_json(), json!([{"key": 1, "x": "a", "y": "b"}]));
    }

    #[test]
    fn test_right_join_keeps_second_key() {
        let t1 = table(json!([{"k1": 1, "x": "a"}]));
        let t2 = table(json!([{"k2": 1, "y": "b"}, {"k2": 2, "y": "c"}]));
        let result = join(
            &t1,
            &t2,
            &JoinSpec::new("k1", "k2", JoinType::Right).with_key_name("key"),
        )
        .unwrap();
        assert_eq!(
            result.to_json(),
            json!([
                {"x": "a", "key": 1, "y": "b"},
                {"x": null, "key": 2, "y": "c"},
            ])
        );
    }

    #[test]
    fn test_outer_join_appends_unmatched_right_rows() {
        let t1 = table(json!([{"id": 1, "x": "a"}]));
        let t2 = table(json!([{"id": 2, "y": "b"}]));
        let result = join(&t1, &t2, &JoinSpec::new("id", "id", JoinType::Outer)).unwrap();
        assert_eq!(
            result.to_json(),
            json!([
                {"id": 1, "x": "a", "y": null},
                {"id": 2, "x": null, "y": "b"},
            ])
        );
    }

    #[test]
    fn test_no_matches_is_empty_not_error() {
        let t1 = table(json!([{"id": 1}]));
        let t2 = table(json!([{"id": 2}]));
        let result = join(&t1, &t2, &JoinSpec::new("id", "id", JoinType::Inner)).unwrap();
        assert_eq!(result.row_count(), 0);
        assert_eq!(result.to_json(), json!([]));
    }

    #[test]
    fn test_clashing_columns_are_suffixed() {
        let t1 = table(json!([{"id": 1, "v": "a"}]));
        let t2 = table(json!([{"id": 1, "v": "b"}]));
        let result = join(&t1, &t2, &JoinSpec::new("id", "id", JoinType::Inner)).unwrap();
        assert_eq!(result.to_json(), json!([{"id": 1, "v_x": "a", "v_y": "b"}]));
    }

    #[test]
    fn test_numeric_keys_match_across_representations_and_nulls_never_match() {
        let t1 = table(json!([{"id": 1, "x": "a"}, {"id": null, "x": "n"}]));
        let t2 = table(json!([{"id": 1.0, "y": "b"}, {"id": null, "y": "m"}, {"id": "1", "y": "s"}]));
        let result = join(&t1, &t2, &JoinSpec::new("id", "id", JoinType::Inner)).unwrap();
        assert_eq!(result.to_json(), json!([{"id": 1, "x": "a", "y": "b"}]));
    }

    #[test]
    fn test_missing_key_column() {
        let t1 = table(json!([{"id": 1}]));
        let t2 = table(json!([{"other": 1}]));
        assert!(matches!(
            join(&t1, &t2, &JoinSpec::new("id", "id", JoinType::Inner)),
            Err(Error::MissingColumn(_))
        ));
    }
}
