use thiserror::Error;

use crate::domain::{
    sheets::{cell_position::CellPosition, cell_range::CellRange},
    Table,
};

#[derive(Error, Debug)]
pub enum SheetStoreError {
    #[error("Failed to open spreadsheet")]
    FailedToOpenSpreadsheet,
    #[error("Sheet '{0}' not found")]
    SheetNotFound(String),
    #[error("Failed to clear sheet")]
    FailedToClear,
    #[error("Failed to fetch range")]
    FailedToFetchRange,
    #[error("Failed to write range")]
    FailedToWriteRange,
}

/// A sheet resolved inside the configured spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SheetRef {
    pub spreadsheet_id: String,
    pub sheet_id: i32,
    pub title: String,
}

#[async_trait::async_trait]
pub trait SheetStore: Send + Sync {
    /// Looks a sheet up by exact title.
    async fn resolve_sheet(&self, title: &str) -> error_stack::Result<SheetRef, SheetStoreError>;

    /// Removes every cell value of the sheet. Formatting is kept.
    async fn clear_contents(&self, sheet: &SheetRef) -> error_stack::Result<(), SheetStoreError>;

    /// Writes `table` as one block whose top-left cell is `anchor`.
    async fn write_block(
        &self,
        sheet: &SheetRef,
        anchor: CellPosition,
        table: &Table,
    ) -> error_stack::Result<(), SheetStoreError>;

    async fn write_cell(
        &self,
        sheet: &SheetRef,
        position: CellPosition,
        value: &str,
    ) -> error_stack::Result<(), SheetStoreError>;

    /// Reads a block back. Cells missing from the store read as empty strings,
    /// so the result always has the shape of `range`.
    async fn read_block(
        &self,
        sheet: &SheetRef,
        range: &CellRange,
    ) -> error_stack::Result<Table, SheetStoreError>;
}
