use super::{column::Column, row::Row};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellPosition {
    pub col: Column,
    pub row: Row,
}

impl CellPosition {
    /// Top-left cell of a sheet.
    pub fn origin() -> Self {
        Self {
            col: Column::first(),
            row: Row::from_index(0),
        }
    }

    /// Moves the position by zero-based row and column offsets.
    pub fn offset(&self, rows: u32, cols: u32) -> Self {
        Self {
            col: self.col + cols,
            row: self.row + Row::from_index(rows),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_is_a1() {
        let origin = CellPosition::origin();
        assert_eq!(origin.col.to_string(), "A");
        assert_eq!(origin.row.to_string(), "1");
    }

    #[test]
    fn test_offset() {
        let pos = CellPosition::origin().offset(1, 2);
        assert_eq!(pos.col.to_string(), "C");
        assert_eq!(pos.row.to_string(), "2");
    }
}
