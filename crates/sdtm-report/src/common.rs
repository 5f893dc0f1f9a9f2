//! Shared helpers for rendering and writing exported datasets.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use sdtm_model::{ExportError, SerializationError, Value, Variable, VariableType};
use tempfile::NamedTempFile;

/// A value after coercion to its variable's declared type.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

impl Cell {
    /// CSV rendering: absent values are empty, booleans are `Y`/`N`.
    pub fn to_csv_field(&self) -> String {
        match self {
            Cell::Null => String::new(),
            Cell::Text(text) => text.clone(),
            Cell::Integer(value) => value.to_string(),
            Cell::Float(value) => value.to_string(),
            Cell::Boolean(true) => "Y".to_string(),
            Cell::Boolean(false) => "N".to_string(),
        }
    }
}

/// Extension trait for VariableType to coerce raw values.
pub trait VariableTypeExt {
    /// Returns `None` when the value has no representation in this type.
    fn coerce(&self, value: &Value) -> Option<Cell>;
}

impl VariableTypeExt for VariableType {
    fn coerce(&self, value: &Value) -> Option<Cell> {
        if value.is_null() {
            return Some(Cell::Null);
        }
        if !matches!(self, VariableType::String)
            && value.as_text().is_some_and(|text| text.trim().is_empty())
        {
            return Some(Cell::Null);
        }
        match self {
            VariableType::String => Some(Cell::Text(value.to_string())),
            VariableType::Integer => coerce_integer(value),
            VariableType::Float => coerce_float(value),
            VariableType::Boolean => coerce_boolean(value),
            VariableType::Date => coerce_date(value),
            VariableType::DateTime => coerce_datetime(value),
        }
    }
}

// `i64::MAX as f64` rounds up to 2^63, so the upper bound is exclusive.
const I64_MIN_F64: f64 = -9_223_372_036_854_775_808.0;
const I64_END_F64: f64 = 9_223_372_036_854_775_808.0;

fn coerce_integer(value: &Value) -> Option<Cell> {
    match value {
        Value::Integer(number) => Some(Cell::Integer(*number)),
        Value::Float(number)
            if number.fract() == 0.0 && (I64_MIN_F64..I64_END_F64).contains(number) =>
        {
            Some(Cell::Integer(*number as i64))
        }
        Value::Text(text) => text.trim().parse::<i64>().ok().map(Cell::Integer),
        _ => None,
    }
}

fn coerce_float(value: &Value) -> Option<Cell> {
    match value {
        Value::Integer(number) => Some(Cell::Integer(*number)),
        Value::Float(number) if number.is_finite() => Some(Cell::Float(*number)),
        Value::Text(text) => text
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|number| number.is_finite())
            .map(Cell::Float),
        _ => None,
    }
}

fn coerce_boolean(value: &Value) -> Option<Cell> {
    match value {
        Value::Boolean(flag) => Some(Cell::Boolean(*flag)),
        Value::Integer(0) => Some(Cell::Boolean(false)),
        Value::Integer(1) => Some(Cell::Boolean(true)),
        Value::Text(text) => match text.trim().to_ascii_uppercase().as_str() {
            "Y" | "YES" | "TRUE" => Some(Cell::Boolean(true)),
            "N" | "NO" | "FALSE" => Some(Cell::Boolean(false)),
            _ => None,
        },
        _ => None,
    }
}

fn coerce_date(value: &Value) -> Option<Cell> {
    match value {
        Value::Date(date) => Some(Cell::Text(date.format("%Y-%m-%d").to_string())),
        Value::DateTime(datetime) => Some(Cell::Text(datetime.format("%Y-%m-%d").to_string())),
        Value::Text(text) => {
            let text = text.trim();
            is_iso_date(text).then(|| Cell::Text(text.to_string()))
        }
        _ => None,
    }
}

fn coerce_datetime(value: &Value) -> Option<Cell> {
    match value {
        Value::Date(_) | Value::DateTime(_) => Some(Cell::Text(value.to_string())),
        Value::Text(text) => {
            let text = text.trim();
            (is_iso_date(text) || is_iso_datetime(text)).then(|| Cell::Text(text.to_string()))
        }
        _ => None,
    }
}

/// Complete or partial ISO 8601 date: `YYYY`, `YYYY-MM` or `YYYY-MM-DD`.
pub fn is_iso_date(text: &str) -> bool {
    match text.len() {
        4 => text.bytes().all(|byte| byte.is_ascii_digit()),
        7 => NaiveDate::parse_from_str(&format!("{text}-01"), "%Y-%m-%d").is_ok(),
        10 => NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok(),
        _ => false,
    }
}

/// ISO 8601 date-time with minute or second precision.
pub fn is_iso_datetime(text: &str) -> bool {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S").is_ok()
        || NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M").is_ok()
}

/// Coerces one record value, reporting the variable and 1-based row on failure.
pub fn coerce_cell<V: Variable>(
    variable: V,
    value: &Value,
    row: usize,
) -> Result<Cell, SerializationError> {
    let expected = variable.data_type();
    expected
        .coerce(value)
        .ok_or_else(|| SerializationError::InvalidValue {
            variable: variable.name().to_string(),
            expected,
            value: value.to_string(),
            row,
        })
}

/// Ensure a parent directory exists for a file path.
pub fn ensure_parent_dir(path: &Path) -> Result<(), ExportError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| ExportError::io(parent, source))?;
    }
    Ok(())
}

/// Writes `bytes` to `path` through a temporary file in the same directory.
///
/// The destination is replaced only once the data is fully written and synced.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    ensure_parent_dir(path)?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(dir).map_err(|source| ExportError::io(dir, source))?;
    temp.write_all(bytes)
        .and_then(|()| temp.as_file().sync_all())
        .map_err(|source| ExportError::io(temp.path(), source))?;
    temp.persist(path)
        .map_err(|error| ExportError::io(path, io::Error::from(error)))?;
    Ok(())
}
