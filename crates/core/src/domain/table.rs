use serde::Deserialize;
use thiserror::Error;

/// What to do when CSV records do not all have the same number of fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RaggedRowPolicy {
    /// Right-pad every row with empty cells up to the widest row.
    #[default]
    Pad,
    /// Refuse the table when any row differs in width from the first one.
    Reject,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("Row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// Rectangular grid of string cells, row-major.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    rows: Vec<Vec<String>>,
    column_count: usize,
}

impl Table {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a table from possibly ragged records, applying `policy`.
    pub fn from_records(
        records: Vec<Vec<String>>,
        policy: RaggedRowPolicy,
    ) -> Result<Self, TableError> {
        let Some(first) = records.first() else {
            return Ok(Self::empty());
        };

        let column_count = match policy {
            RaggedRowPolicy::Reject => {
                let expected = first.len();
                if let Some((row, record)) = records
                    .iter()
                    .enumerate()
                    .find(|(_, record)| record.len() != expected)
                {
                    return Err(TableError::RaggedRow {
                        row,
                        expected,
                        found: record.len(),
                    });
                }
                expected
            }
            RaggedRowPolicy::Pad => records.iter().map(Vec::len).max().unwrap_or(0),
        };

        let rows = records
            .into_iter()
            .map(|mut record| {
                record.resize(column_count, String::new());
                record
            })
            .collect();

        Ok(Self { rows, column_count })
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.column_count
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.column_count == 0
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col).map(String::as_str)
    }
}
