use std::{collections::HashMap, sync::Arc};

use tokio::sync::Mutex;

use crate::ports::sheet_store::SheetRef;

type DestinationKey = (String, String);

/// One mutex per destination sheet, so that the clear and write of two imports
/// targeting the same sheet never interleave.
#[derive(Debug, Default)]
pub struct DestinationLocks {
    locks: Mutex<HashMap<DestinationKey, Arc<Mutex<()>>>>,
}

impl DestinationLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock_for(&self, sheet: &SheetRef) -> Arc<Mutex<()>> {
        let key = (sheet.spreadsheet_id.clone(), sheet.title.clone());

        // -- MUTEX WRITE --
        let mut guard = self.locks.lock().await;
        let lock = Arc::clone(guard.entry(key).or_default());
        // -- END MUTEX WRITE --

        lock
    }
}
