//! Raw Tabular Input

use serde::{Deserialize, Serialize};

/// Untyped rows x columns of cells, exactly as read from the source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Create a table from rows of cells
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    /// Build a table from anything displayable, mostly for numeric literals
    pub fn from_values<T: ToString>(rows: &[Vec<T>]) -> Self {
        Self {
            rows: rows
                .iter()
                .map(|row| row.iter().map(ToString::to_string).collect())
                .collect(),
        }
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns, taken from the first row
    pub fn column_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// Total number of cells across all rows
    pub fn cell_count(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    /// Get a row by index
    pub fn row(&self, index: usize) -> Option<&[String]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// Iterate over rows
    pub fn rows(&self) -> impl Iterator<Item = &[String]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Whether the table has no rows or no columns
    pub fn is_empty(&self) -> bool {
        self.row_count() == 0 || self.column_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions() {
        let table = RawTable::from_values(&[vec![1, 2, 3], vec![4, 5, 6]]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 3);
        assert_eq!(table.cell_count(), 6);
        assert_eq!(table.row(1).unwrap()[2], "6");
    }

    #[test]
    fn test_empty_table() {
        assert!(RawTable::default().is_empty());
        assert!(RawTable::new(vec![vec![]]).is_empty());
    }
}
