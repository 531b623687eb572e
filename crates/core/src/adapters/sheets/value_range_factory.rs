use google_sheets4::api::ValueRange;
use serde_json::Value;
use std::borrow::Cow;

use crate::domain::Table;

pub trait ValueRangeFactory {
    fn from_single_cell<'a, T: Into<Cow<'a, str>>>(cell_value: T) -> Self;
    fn from_table(table: &Table) -> Self;
}

fn wrap_value<'a, T: Into<Cow<'a, str>>>(value: T) -> Value {
    Value::String(value.into().into_owned())
}

impl ValueRangeFactory for ValueRange {
    fn from_single_cell<'a, T: Into<Cow<'a, str>>>(cell_value: T) -> Self {
        ValueRange {
            major_dimension: None,
            range: None,
            values: Some(vec![vec![wrap_value(cell_value)]]),
        }
    }

    fn from_table(table: &Table) -> Self {
        let values = table
            .rows()
            .iter()
            .map(|row| row.iter().map(|cell| wrap_value(cell.as_str())).collect())
            .collect();

        Self {
            major_dimension: Some("ROWS".to_string()),
            range: None,
            values: Some(values),
        }
    }
}
