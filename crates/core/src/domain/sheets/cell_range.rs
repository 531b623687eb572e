use super::cell_position::CellPosition;

/// Inclusive rectangular block of cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellRange {
    pub start: CellPosition,
    pub end: CellPosition,
}

impl CellRange {
    /// Block of `rows` x `cols` cells whose top-left corner is `anchor`.
    /// Returns `None` for an empty block, which has no A1 representation.
    pub fn from_anchor_and_size(anchor: CellPosition, rows: u32, cols: u32) -> Option<Self> {
        if rows == 0 || cols == 0 {
            return None;
        }

        Some(Self {
            start: anchor,
            end: anchor.offset(rows - 1, cols - 1),
        })
    }

    pub fn row_count(&self) -> u32 {
        self.end.row.index() - self.start.row.index() + 1
    }

    pub fn column_count(&self) -> u32 {
        self.end.col.value() - self.start.col.value() + 1
    }
}
