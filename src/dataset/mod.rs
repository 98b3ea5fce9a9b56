//! Dataset Module - uploaded CSV tables
//!
//! Holds an upload as ordered columns of raw cell text so a labeled dataset
//! serializes back to exactly what was parsed.

pub mod features;
pub mod ingest;

#[cfg(test)]
mod tests;

use serde::Serialize;

pub use features::FeatureMatrix;
pub use ingest::{parse_csv, IngestError};

/// Tabular upload: header plus rows of raw cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// A slice of a dataset ready to be rendered as a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TablePreview {
    pub columns: Vec<String>,
    /// Zero-based row index in the full dataset
    pub first_row: usize,
    pub rows: Vec<Vec<String>>,
}

impl Dataset {
    /// Build a dataset. Every row must have one cell per column.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == columns.len()));
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Iterate the cells of one column in row order
    pub fn column_cells(&self, index: usize) -> impl Iterator<Item = &str> + '_ {
        self.rows.iter().map(move |row| row[index].as_str())
    }

    /// Set a column, replacing it in place if the name already exists
    pub fn set_column<I, S>(&mut self, name: &str, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        assert_eq!(values.len(), self.rows.len(), "column length must match row count");

        match self.column_index(name) {
            Some(idx) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                self.columns.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
    }

    /// First `n` rows
    pub fn head(&self, n: usize) -> TablePreview {
        TablePreview {
            columns: self.columns.clone(),
            first_row: 0,
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    /// Last `n` rows
    pub fn tail(&self, n: usize) -> TablePreview {
        let start = self.rows.len().saturating_sub(n);
        TablePreview {
            columns: self.columns.clone(),
            first_row: start,
            rows: self.rows[start..].to_vec(),
        }
    }
}
