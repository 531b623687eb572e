use google_sheets4::api::ValueRange;
use serde_json::Value;

use crate::domain::{RaggedRowPolicy, Table};

/// Renders a cell returned by the values API as text.
fn cell_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Shapes a `values.get` response into a `rows` x `columns` table. The API
/// drops trailing empty rows and cells, so those come back as empty strings.
pub fn table_from_value_range(value_range: ValueRange, rows: u32, columns: u32) -> Table {
    let mut values = value_range.values.unwrap_or_default().into_iter();

    let records = (0..rows)
        .map(|_| {
            let mut row: Vec<String> = values
                .next()
                .unwrap_or_default()
                .into_iter()
                .take(columns as usize)
                .map(cell_text)
                .collect();
            row.resize(columns as usize, String::new());
            row
        })
        .collect();

    Table::from_records(records, RaggedRowPolicy::Pad).unwrap_or_default()
}
