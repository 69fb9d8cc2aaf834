//! Loosely typed CSV tables.
//!
//! Uploaded files may carry any columns in any order. A [`RecordTable`]
//! keeps every column as read, extracts the model features by header name,
//! and renders JSON records with the columns in file order followed by any
//! appended columns.

use serde_json::{Map, Number, Value};
use std::io::Read;
use thiserror::Error;
use types::{FEATURE_COUNT, FeatureColumn, FeatureRow};

#[derive(Debug, Error)]
pub enum TableError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing required feature column '{0}'")]
    MissingColumn(FeatureColumn),

    #[error("column '{column}' is not numeric at row {row}")]
    NotNumeric { column: String, row: usize },

    #[error("column '{column}' has {got} values, table has {expected} rows")]
    LengthMismatch {
        column: String,
        expected: usize,
        got: usize,
    },

    #[error("table has no rows")]
    Empty,
}

/// Headers plus row cells as JSON values.
///
/// Cells that parse as finite numbers become numbers, empty cells become
/// null, anything else stays a string.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordTable {
    headers: Vec<String>,
    rows: Vec<Vec<Value>>,
}

fn cell(raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    match trimmed.parse::<f64>().ok().and_then(Number::from_f64) {
        Some(n) => Value::Number(n),
        None => Value::String(raw.to_string()),
    }
}

fn number(value: f64) -> Value {
    Number::from_f64(value).map_or(Value::Null, Value::Number)
}

impl RecordTable {
    /// Parse a CSV document with a header line.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, TableError> {
        let mut rdr = csv::Reader::from_reader(reader);
        let headers = rdr.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();
        for record in rdr.records() {
            rows.push(record?.iter().map(cell).collect());
        }
        Ok(Self { headers, rows })
    }

    /// Build a table from engineered rows (`date` plus the feature columns).
    pub fn from_feature_rows(rows: &[FeatureRow]) -> Self {
        let headers = std::iter::once("date")
            .chain(FeatureColumn::ALL.iter().map(|c| c.name()))
            .map(str::to_string)
            .collect();
        let rows = rows
            .iter()
            .map(|r| {
                std::iter::once(Value::String(r.date.to_string()))
                    .chain(r.to_features().into_iter().map(number))
                    .collect()
            })
            .collect();
        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Numeric values of a column, if present and fully numeric.
    pub fn numeric_column(&self, name: &str) -> Result<Option<Vec<f64>>, TableError> {
        let Some(idx) = self.column_index(name) else {
            return Ok(None);
        };
        self.rows
            .iter()
            .enumerate()
            .map(|(row, cells)| {
                cells
                    .get(idx)
                    .and_then(Value::as_f64)
                    .ok_or_else(|| TableError::NotNumeric {
                        column: name.to_string(),
                        row,
                    })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }

    /// Model input vectors in feature order.
    ///
    /// Fails if any feature column is missing or holds a non-numeric cell.
    pub fn feature_matrix(&self) -> Result<Vec<[f64; FEATURE_COUNT]>, TableError> {
        if self.rows.is_empty() {
            return Err(TableError::Empty);
        }
        let mut columns = Vec::with_capacity(FEATURE_COUNT);
        for column in FeatureColumn::ALL {
            let values = self
                .numeric_column(column.name())?
                .ok_or(TableError::MissingColumn(column))?;
            columns.push(values);
        }
        Ok((0..self.rows.len())
            .map(|i| std::array::from_fn(|c| columns[c][i]))
            .collect())
    }

    /// Append (or replace) a numeric column.
    pub fn set_numeric_column(&mut self, name: &str, values: &[f64]) -> Result<(), TableError> {
        if values.len() != self.rows.len() {
            return Err(TableError::LengthMismatch {
                column: name.to_string(),
                expected: self.rows.len(),
                got: values.len(),
            });
        }
        match self.column_index(name) {
            Some(idx) => {
                for (cells, &v) in self.rows.iter_mut().zip(values) {
                    cells[idx] = number(v);
                }
            }
            None => {
                self.headers.push(name.to_string());
                for (cells, &v) in self.rows.iter_mut().zip(values) {
                    cells.push(number(v));
                }
            }
        }
        Ok(())
    }

    /// One JSON object per row, keys in column order.
    pub fn to_records(&self) -> Vec<Value> {
        self.rows
            .iter()
            .map(|cells| {
                let map: Map<String, Value> = self
                    .headers
                    .iter()
                    .cloned()
                    .zip(cells.iter().cloned().chain(std::iter::repeat(Value::Null)))
                    .collect();
                Value::Object(map)
            })
            .collect()
    }
}
