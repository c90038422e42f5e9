//! In-memory tabular values exchanged between the campaign and its callers.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::errors::{DoeError, ErrorInfo};

/// Single cell of a [`DataTable`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellValue {
    /// Integer payload.
    Int(i64),
    /// Floating point payload.
    Float(f64),
    /// Textual payload (categorical levels).
    Text(String),
}

impl CellValue {
    /// Returns the numeric interpretation of the cell, if it has one.
    ///
    /// Integers promote losslessly for the magnitudes used in practice;
    /// text never coerces.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Int(v) => Some(*v as f64),
            CellValue::Float(v) => Some(*v),
            CellValue::Text(_) => None,
        }
    }

    /// Returns the textual payload, if the cell is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Int(v) => write!(f, "{v}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Text(v) => write!(f, "{v}"),
        }
    }
}

/// Rectangular table with named columns.
///
/// `DataTable` is the exchange format for measurement input and
/// recommendation output. Construction enforces unique column names and a
/// consistent width for every row; rows are otherwise opaque to this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataTable {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl DataTable {
    /// Creates a table from column names and row data.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Result<Self, DoeError> {
        for (idx, name) in columns.iter().enumerate() {
            if columns[..idx].contains(name) {
                return Err(DoeError::Schema(
                    ErrorInfo::new("table-duplicate-column", "duplicate column name")
                        .with_context("column", name.clone()),
                ));
            }
        }
        for (idx, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(DoeError::Schema(
                    ErrorInfo::new("table-ragged-row", "row width does not match column count")
                        .with_context("row", idx.to_string())
                        .with_context("expected", columns.len().to_string())
                        .with_context("actual", row.len().to_string()),
                ));
            }
        }
        Ok(Self { columns, rows })
    }

    /// Creates an empty table with the given column names.
    pub fn empty(columns: Vec<String>) -> Result<Self, DoeError> {
        Self::new(columns, Vec::new())
    }

    /// Returns the ordered column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the position of the named column.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|col| col == name)
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the ordered row data.
    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// Returns the cell at the given row for the named column.
    pub fn cell(&self, row: usize, column: &str) -> Option<&CellValue> {
        let col = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[col])
    }

    /// Serializes the table into a compact binary blob.
    ///
    /// The binary form preserves floating point values bit-exactly, which a
    /// decimal text rendering would not guarantee.
    pub fn to_bytes(&self) -> Result<Vec<u8>, DoeError> {
        bincode::serialize(self)
            .map_err(|err| DoeError::Serde(ErrorInfo::new("table-encode", err.to_string())))
    }

    /// Rehydrates a table from its binary blob form.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DoeError> {
        bincode::deserialize(bytes)
            .map_err(|err| DoeError::Serde(ErrorInfo::new("table-decode", err.to_string())))
    }

    /// Encodes the table as a hex string suitable for embedding in JSON.
    pub fn to_hex_blob(&self) -> Result<String, DoeError> {
        Ok(hex::encode(self.to_bytes()?))
    }

    /// Decodes a table from its hex blob form.
    pub fn from_hex_blob(blob: &str) -> Result<Self, DoeError> {
        let bytes = hex::decode(blob)
            .map_err(|err| DoeError::Serde(ErrorInfo::new("table-hex-decode", err.to_string())))?;
        Self::from_bytes(&bytes)
    }
}
