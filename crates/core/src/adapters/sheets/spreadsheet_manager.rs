use error_stack::{report, ResultExt};
use google_sheets4::{
    api::{ClearValuesRequest, ValueRange},
    Sheets,
};
use std::{collections::HashMap, fmt::Debug};
use tokio::sync::RwLock;
use tracing::instrument;

use crate::{
    adapters::{
        config::sheets_config::SpreadsheetConfig,
        google::{
            auth,
            http_client::{self, HttpsConnector},
        },
    },
    domain::{
        sheets::{
            a1_notation::{whole_sheet, A1Notation, ToA1Notation},
            cell_position::CellPosition,
            cell_range::CellRange,
        },
        Table,
    },
    ports::sheet_store::{SheetRef, SheetStore, SheetStoreError},
};

use super::{spreadsheet_read::table_from_value_range, value_range_factory::ValueRangeFactory};

pub struct SpreadsheetManager {
    pub config: SpreadsheetConfig,
    hub: Sheets<HttpsConnector>,
    /// Sheet title -> sheet id
    pub sheet_id_cache: RwLock<Option<HashMap<String, i32>>>,
}

impl Debug for SpreadsheetManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SpreadsheetManager {{ config: {:?} }}", self.config)
    }
}

impl SpreadsheetManager {
    #[instrument(name = "SpreadsheetManager::new")]
    pub async fn new(config: SpreadsheetConfig) -> error_stack::Result<Self, SheetStoreError> {
        let client = http_client::http_client()
            .change_context(SheetStoreError::FailedToOpenSpreadsheet)?;
        let auth = auth::service_account_auth(&config.priv_key, None, client.clone())
            .await
            .change_context(SheetStoreError::FailedToOpenSpreadsheet)?;
        let hub = Sheets::new(client, auth);

        Ok(SpreadsheetManager {
            config,
            hub,
            sheet_id_cache: RwLock::new(None),
        })
    }

    #[instrument]
    async fn fetch_sheet_ids(&self) -> error_stack::Result<HashMap<String, i32>, SheetStoreError> {
        let (_, spreadsheet) = self
            .hub
            .spreadsheets()
            .get(&self.config.spreadsheet_id)
            .doit()
            .await
            .change_context(SheetStoreError::FailedToOpenSpreadsheet)
            .attach_printable_lazy(|| {
                format!("spreadsheet id: {}", self.config.spreadsheet_id)
            })?;

        Ok(spreadsheet
            .sheets
            .unwrap_or_default()
            .into_iter()
            .filter_map(|sheet| {
                let properties = sheet.properties?;
                Some((properties.title?, properties.sheet_id.unwrap_or(0)))
            })
            .collect())
    }

    #[instrument]
    pub async fn sheet_ids(&self) -> error_stack::Result<HashMap<String, i32>, SheetStoreError> {
        let cache = {
            // -- MUTEX READ --
            let guard = self.sheet_id_cache.read().await;
            guard.clone()
            // -- END MUTEX READ --
        };

        if let Some(map) = cache {
            return Ok(map);
        }

        let fetched_map = self.fetch_sheet_ids().await?;
        {
            // -- MUTEX WRITE --
            let mut guard = self.sheet_id_cache.write().await;
            guard.replace(fetched_map.clone());
            // -- END MUTEX WRITE --
        }

        Ok(fetched_map)
    }

    #[instrument]
    async fn write_range(
        &self,
        range_str: &A1Notation,
        value_range: ValueRange,
    ) -> error_stack::Result<(), SheetStoreError> {
        self.hub
            .spreadsheets()
            .values_update(value_range, &self.config.spreadsheet_id, range_str.as_ref())
            .value_input_option(&self.config.value_input_option)
            .doit()
            .await
            .map(|_| ())
            .change_context(SheetStoreError::FailedToWriteRange)
            .attach_printable_lazy(|| format!("Failed to write to range {} ", range_str))
    }

    #[instrument]
    async fn read_range(&self, range_str: &A1Notation) -> error_stack::Result<ValueRange, SheetStoreError> {
        let (_, value_range) = self
            .hub
            .spreadsheets()
            .values_get(&self.config.spreadsheet_id, range_str.as_ref())
            .doit()
            .await
            .change_context(SheetStoreError::FailedToFetchRange)
            .attach_printable_lazy(|| format!("Failed to read range {}", range_str))?;

        Ok(value_range)
    }
}

#[async_trait::async_trait]
impl SheetStore for SpreadsheetManager {
    #[instrument]
    async fn resolve_sheet(&self, title: &str) -> error_stack::Result<SheetRef, SheetStoreError> {
        let sheet_ids = self.sheet_ids().await?;

        let sheet_id = sheet_ids
            .get(title)
            .copied()
            .ok_or_else(|| report!(SheetStoreError::SheetNotFound(title.to_string())))
            .attach_printable_lazy(|| {
                format!("available sheets: {:?}", sheet_ids.keys().collect::<Vec<_>>())
            })?;

        Ok(SheetRef {
            spreadsheet_id: self.config.spreadsheet_id.to_string(),
            sheet_id,
            title: title.to_string(),
        })
    }

    #[instrument]
    async fn clear_contents(&self, sheet: &SheetRef) -> error_stack::Result<(), SheetStoreError> {
        let range = whole_sheet(&sheet.title);

        self.hub
            .spreadsheets()
            .values_clear(
                ClearValuesRequest::default(),
                &self.config.spreadsheet_id,
                range.as_ref(),
            )
            .doit()
            .await
            .map(|_| ())
            .change_context(SheetStoreError::FailedToClear)
            .attach_printable_lazy(|| format!("Failed to clear {}", range))
    }

    #[instrument(skip(table), fields(rows = table.row_count(), columns = table.column_count()))]
    async fn write_block(
        &self,
        sheet: &SheetRef,
        anchor: CellPosition,
        table: &Table,
    ) -> error_stack::Result<(), SheetStoreError> {
        let Some(range) = CellRange::from_anchor_and_size(
            anchor,
            table.row_count() as u32,
            table.column_count() as u32,
        ) else {
            return Ok(());
        };

        self.write_range(
            &range.to_a1_notation(Some(&sheet.title)),
            ValueRange::from_table(table),
        )
        .await
    }

    #[instrument]
    async fn write_cell(
        &self,
        sheet: &SheetRef,
        position: CellPosition,
        value: &str,
    ) -> error_stack::Result<(), SheetStoreError> {
        self.write_range(
            &position.to_a1_notation(Some(&sheet.title)),
            ValueRange::from_single_cell(value),
        )
        .await
    }

    #[instrument]
    async fn read_block(
        &self,
        sheet: &SheetRef,
        range: &CellRange,
    ) -> error_stack::Result<Table, SheetStoreError> {
        let value_range = self
            .read_range(&range.to_a1_notation(Some(&sheet.title)))
            .await?;

        Ok(table_from_value_range(
            value_range,
            range.row_count(),
            range.column_count(),
        ))
    }
}
