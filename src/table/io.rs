// src/table/io.rs

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::str::FromStr;
use log::debug;
use serde_json::Number;
use crate::error::{Error, Result};
use crate::types::CellValue;
use super::{Column, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Json,
}

impl TableFormat {
    /// `.json` files hold record arrays; anything else is read as CSV.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        match path.as_ref().extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => TableFormat::Json,
            _ => TableFormat::Csv,
        }
    }
}

impl FromStr for TableFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(TableFormat::Csv),
            "json" => Ok(TableFormat::Json),
            other => Err(Error::unknown_variant("format", other)),
        }
    }
}

pub fn read_table<P: AsRef<Path>>(path: P) -> Result<Table> {
    let path = path.as_ref();
    debug!("Reading table from {:?}", path);
    let reader = BufReader::new(File::open(path)?);
    match TableFormat::from_path(path) {
        TableFormat::Json => read_json(reader),
        TableFormat::Csv => read_csv(reader),
    }
}

pub fn write_table<P: AsRef<Path>>(table: &Table, path: P) -> Result<()> {
    let path = path.as_ref();
    debug!("Writing {} rows to {:?}", table.row_count(), path);
    let writer = BufWriter::new(File::create(path)?);
    match TableFormat::from_path(path) {
        TableFormat::Json => write_json(table, writer),
        TableFormat::Csv => write_csv(table, writer),
    }
}

pub fn read_json<R: Read>(reader: R) -> Result<Table> {
    let value: serde_json::Value = serde_json::from_reader(reader)?;
    Table::from_json(value)
}

pub fn write_json<W: Write>(table: &Table, mut writer: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, table)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Reads CSV with a header row. Empty fields become null; fields that
/// parse as integers or finite floats become numbers; the rest stay text.
pub fn read_csv<R: Read>(reader: R) -> Result<Table> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut columns: Vec<Column> = headers.iter().map(|h| Column::new(h, Vec::new())).collect();

    let mut row_count = 0;
    for record in csv_reader.records() {
        let record = record?;
        for (column, field) in columns.iter_mut().zip(record.iter()) {
            column.values.push(parse_field(field));
        }
        row_count += 1;
    }

    Table::with_row_count(columns, row_count)
}

/// Writes a header row and one record per row, cells in their text form.
///
/// CSV carries no types, so a round trip through `read_csv` is lossy: null
/// and the empty string both become an empty field and read back as null,
/// numeric-looking text such as `"1"` reads back as a number, and booleans
/// read back as the text `true`/`false`. Use JSON when cell types matter.
pub fn write_csv<W: Write>(table: &Table, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(table.column_names())?;
    for row in 0..table.row_count() {
        let fields: Vec<String> = table
            .columns()
            .iter()
            .map(|c| c.values[row].as_text().map(|t| t.into_owned()).unwrap_or_default())
            .collect();
        csv_writer.write_record(&fields)?;
    }
    csv_writer.flush()?;
    Ok(())
}

fn parse_field(field: &str) -> CellValue {
    if field.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = field.parse::<i64>() {
        return CellValue::Number(Number::from(i));
    }
    if let Ok(f) = field.parse::<f64>() {
        if let Some(n) = Number::from_f64(f) {
            return CellValue::Number(n);
        }
    }
    CellValue::Text(field.to_string())
}
