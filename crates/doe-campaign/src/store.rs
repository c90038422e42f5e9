//! Append-only measurement log with a monotonically increasing epoch.

use chrono::Utc;
use doe_core::{CellValue, DataTable, DoeError, ErrorInfo};
use serde::{Deserialize, Serialize};

/// One observed configuration/target row together with its metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    /// Zero-based insertion sequence index.
    pub index: u64,
    /// RFC 3339 timestamp recording when the row was appended.
    pub recorded_at: String,
    /// Cell values in the store's column order.
    pub values: Vec<CellValue>,
}

/// Ordered, append-only log of measurement records.
///
/// Rows are never mutated or removed after insertion; corrections are
/// modeled as new rows. The `epoch` counter increases once per non-empty
/// append and serves as the cache fingerprint: observers compare epochs to
/// decide whether the store's content changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementStore {
    columns: Vec<String>,
    records: Vec<MeasurementRecord>,
    epoch: u64,
}

impl MeasurementStore {
    /// Creates an empty store with the given column order.
    pub(crate) fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            records: Vec::new(),
            epoch: 0,
        }
    }

    /// Reassembles a store from serialized parts.
    pub(crate) fn from_parts(
        columns: Vec<String>,
        records: Vec<MeasurementRecord>,
        epoch: u64,
    ) -> Result<Self, DoeError> {
        for record in &records {
            if record.values.len() != columns.len() {
                return Err(DoeError::Serde(
                    ErrorInfo::new("store-ragged-record", "record width does not match columns")
                        .with_context("record", record.index.to_string())
                        .with_context("expected", columns.len().to_string())
                        .with_context("actual", record.values.len().to_string()),
                ));
            }
        }
        Ok(Self {
            columns,
            records,
            epoch,
        })
    }

    /// Appends rows (already in store column order), assigning consecutive
    /// sequence indices. A non-empty append bumps the epoch exactly once.
    pub(crate) fn append_rows(&mut self, rows: Vec<Vec<CellValue>>) {
        if rows.is_empty() {
            return;
        }
        let stamp = Utc::now().to_rfc3339();
        for values in rows {
            self.records.push(MeasurementRecord {
                index: self.records.len() as u64,
                recorded_at: stamp.clone(),
                values,
            });
        }
        self.epoch += 1;
    }

    /// Returns the store's column order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the total number of measurement rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns whether the store holds no measurements yet.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the current epoch (cache fingerprint).
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Returns the ordered records.
    pub fn records(&self) -> &[MeasurementRecord] {
        &self.records
    }

    /// Returns an ordered full copy of the measurement data.
    pub fn snapshot(&self) -> Result<DataTable, DoeError> {
        let rows = self.records.iter().map(|r| r.values.clone()).collect();
        DataTable::new(self.columns.clone(), rows)
    }
}
