//! Tabular dataset models.
//!
//! A `Dataset` is the in-memory form of a BOM sheet: the header row as a list
//! of column names and the data rows as cell vectors aligned to it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single spreadsheet cell
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Bool(bool),
    Int(i64),
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// True for empty cells and whitespace-only text
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(text) => text.trim().is_empty(),
            _ => false,
        }
    }

    /// Text form used as a lookup identifier, exactly as it appears in the
    /// cell; `None` for blank cells.
    pub fn as_identifier(&self) -> Option<String> {
        if self.is_blank() {
            return None;
        }
        Some(self.to_string())
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Bool(value) => write!(f, "{}", value),
            Self::Int(value) => write!(f, "{}", value),
            Self::Number(value) => write!(f, "{}", value),
            Self::Text(value) => f.write_str(value),
        }
    }
}

impl From<Option<String>> for CellValue {
    fn from(value: Option<String>) -> Self {
        value.map(CellValue::Text).unwrap_or(CellValue::Empty)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DatasetError {
    #[error("column '{0}' already exists")]
    DuplicateColumn(String),

    #[error("column has {actual} values but the dataset has {expected} rows")]
    LengthMismatch { expected: usize, actual: usize },
}

/// Ordered rows plus a named-column schema
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Dataset {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Dataset {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Appends a row, padding or truncating it to the schema width
    pub fn push_row(&mut self, mut row: Vec<CellValue>) {
        row.resize(self.columns.len(), CellValue::Empty);
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.trim() == name.trim())
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Cells of one column, in row order
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &CellValue> + '_> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| row.get(idx).unwrap_or(&CellValue::Empty)))
    }

    /// Appends a new column as the last column of every row
    pub fn append_column(&mut self, name: impl Into<String>, values: Vec<CellValue>) -> Result<(), DatasetError> {
        let name = name.into();
        if self.has_column(&name) {
            return Err(DatasetError::DuplicateColumn(name));
        }
        if values.len() != self.rows.len() {
            return Err(DatasetError::LengthMismatch {
                expected: self.rows.len(),
                actual: values.len(),
            });
        }

        let width = self.columns.len();
        self.columns.push(name);
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.resize(width, CellValue::Empty);
            row.push(value);
        }
        Ok(())
    }

    /// Replaces the values of `name` in place, or appends it as a new last
    /// column when it does not exist yet.
    pub fn set_column(&mut self, name: impl Into<String>, values: Vec<CellValue>) -> Result<(), DatasetError> {
        let name = name.into();
        let Some(idx) = self.column_index(&name) else {
            return self.append_column(name, values);
        };
        if values.len() != self.rows.len() {
            return Err(DatasetError::LengthMismatch {
                expected: self.rows.len(),
                actual: values.len(),
            });
        }

        for (row, value) in self.rows.iter_mut().zip(values) {
            row[idx] = value;
        }
        Ok(())
    }
}
