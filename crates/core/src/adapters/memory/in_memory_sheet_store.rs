use std::collections::{BTreeMap, HashMap};

use error_stack::report;
use tokio::sync::RwLock;

use crate::{
    domain::{
        sheets::{cell_position::CellPosition, cell_range::CellRange},
        RaggedRowPolicy, Table,
    },
    ports::sheet_store::{SheetRef, SheetStore, SheetStoreError},
};

/// Mutation applied to an in-memory sheet, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetOperation {
    Clear,
    WriteBlock { rows: usize, columns: usize },
    WriteCell { value: String },
}

#[derive(Debug, Default)]
struct SheetState {
    sheet_id: i32,
    // (row index, column index) -> value; empty strings are not stored
    cells: BTreeMap<(u32, u32), String>,
    operations: Vec<SheetOperation>,
}

impl SheetState {
    fn set(&mut self, row: u32, col: u32, value: &str) {
        if value.is_empty() {
            self.cells.remove(&(row, col));
        } else {
            self.cells.insert((row, col), value.to_string());
        }
    }
}

/// Spreadsheet held in memory with faithful write/read semantics.
#[derive(Debug)]
pub struct InMemorySheetStore {
    spreadsheet_id: String,
    sheets: RwLock<HashMap<String, SheetState>>,
}

impl InMemorySheetStore {
    pub fn new(spreadsheet_id: impl Into<String>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            sheets: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_sheet(mut self, title: impl Into<String>) -> Self {
        let sheets = self.sheets.get_mut();
        let sheet_id = sheets.len() as i32;
        sheets.insert(
            title.into(),
            SheetState {
                sheet_id,
                ..SheetState::default()
            },
        );
        self
    }

    /// Sheet prefilled with `rows` starting at A1.
    pub fn with_sheet_contents(self, title: impl Into<String>, rows: &[&[&str]]) -> Self {
        let title = title.into();
        let mut store = self.with_sheet(title.clone());
        if let Some(sheet) = store.sheets.get_mut().get_mut(&title) {
            for (r, row) in rows.iter().enumerate() {
                for (c, value) in row.iter().enumerate() {
                    sheet.set(r as u32, c as u32, value);
                }
            }
        }
        store
    }

    /// Used range of the sheet, anchored at A1. `None` for an unknown sheet.
    pub async fn snapshot(&self, title: &str) -> Option<Table> {
        let sheets = self.sheets.read().await;
        let sheet = sheets.get(title)?;

        let rows = sheet.cells.keys().map(|(r, _)| r + 1).max().unwrap_or(0);
        let cols = sheet.cells.keys().map(|(_, c)| c + 1).max().unwrap_or(0);
        let records = (0..rows)
            .map(|r| {
                (0..cols)
                    .map(|c| sheet.cells.get(&(r, c)).cloned().unwrap_or_default())
                    .collect()
            })
            .collect();

        Table::from_records(records, RaggedRowPolicy::Pad).ok()
    }

    pub async fn operations(&self, title: &str) -> Vec<SheetOperation> {
        self.sheets
            .read()
            .await
            .get(title)
            .map(|sheet| sheet.operations.clone())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl SheetStore for InMemorySheetStore {
    async fn resolve_sheet(&self, title: &str) -> error_stack::Result<SheetRef, SheetStoreError> {
        let sheets = self.sheets.read().await;
        let sheet = sheets
            .get(title)
            .ok_or_else(|| report!(SheetStoreError::SheetNotFound(title.to_string())))?;

        Ok(SheetRef {
            spreadsheet_id: self.spreadsheet_id.clone(),
            sheet_id: sheet.sheet_id,
            title: title.to_string(),
        })
    }

    async fn clear_contents(&self, sheet: &SheetRef) -> error_stack::Result<(), SheetStoreError> {
        let mut sheets = self.sheets.write().await;
        let state = sheets
            .get_mut(&sheet.title)
            .ok_or_else(|| report!(SheetStoreError::FailedToClear))?;

        state.cells.clear();
        state.operations.push(SheetOperation::Clear);
        Ok(())
    }

    async fn write_block(
        &self,
        sheet: &SheetRef,
        anchor: CellPosition,
        table: &Table,
    ) -> error_stack::Result<(), SheetStoreError> {
        let mut sheets = self.sheets.write().await;
        let state = sheets
            .get_mut(&sheet.title)
            .ok_or_else(|| report!(SheetStoreError::FailedToWriteRange))?;

        for (r, row) in table.rows().iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                let position = anchor.offset(r as u32, c as u32);
                state.set(position.row.index(), position.col.index(), value);
            }
        }
        state.operations.push(SheetOperation::WriteBlock {
            rows: table.row_count(),
            columns: table.column_count(),
        });
        Ok(())
    }

    async fn write_cell(
        &self,
        sheet: &SheetRef,
        position: CellPosition,
        value: &str,
    ) -> error_stack::Result<(), SheetStoreError> {
        let mut sheets = self.sheets.write().await;
        let state = sheets
            .get_mut(&sheet.title)
            .ok_or_else(|| report!(SheetStoreError::FailedToWriteRange))?;

        state.set(position.row.index(), position.col.index(), value);
        state.operations.push(SheetOperation::WriteCell {
            value: value.to_string(),
        });
        Ok(())
    }

    async fn read_block(
        &self,
        sheet: &SheetRef,
        range: &CellRange,
    ) -> error_stack::Result<Table, SheetStoreError> {
        let sheets = self.sheets.read().await;
        let state = sheets
            .get(&sheet.title)
            .ok_or_else(|| report!(SheetStoreError::FailedToFetchRange))?;

        let records = (0..range.row_count())
            .map(|r| {
                (0..range.column_count())
                    .map(|c| {
                        let position = range.start.offset(r, c);
                        state
                            .cells
                            .get(&(position.row.index(), position.col.index()))
                            .cloned()
                            .unwrap_or_default()
                    })
                    .collect()
            })
            .collect();

        Ok(Table::from_records(records, RaggedRowPolicy::Pad)
            .unwrap_or_else(|_| Table::empty()))
    }
}
