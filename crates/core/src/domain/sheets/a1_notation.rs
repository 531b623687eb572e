use std::fmt::Formatter;

use super::{cell_position::CellPosition, cell_range::CellRange};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct A1Notation(pub String);

impl std::fmt::Display for A1Notation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<A1Notation> for String {
    fn from(a1_notation: A1Notation) -> Self {
        a1_notation.0
    }
}

impl AsRef<str> for A1Notation {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

pub trait ToA1Notation {
    fn to_a1_notation(&self, sheet_name: Option<&str>) -> A1Notation;
}

/// Quotes a sheet title for use in A1 notation. Embedded quotes are doubled.
pub fn quote_sheet_title(sheet_title: &str) -> String {
    format!("'{}'", sheet_title.replace('\'', "''"))
}

/// A1 notation addressing a whole sheet, e.g. `'MANTIS'`.
pub fn whole_sheet(sheet_title: &str) -> A1Notation {
    A1Notation(quote_sheet_title(sheet_title))
}

fn with_sheet(sheet_name: Option<&str>, local: String) -> A1Notation {
    match sheet_name {
        Some(sheet_name) => A1Notation(format!("{}!{}", quote_sheet_title(sheet_name), local)),
        None => A1Notation(local),
    }
}

impl ToA1Notation for CellPosition {
    fn to_a1_notation(&self, sheet_name: Option<&str>) -> A1Notation {
        with_sheet(sheet_name, format!("{}{}", self.col, self.row))
    }
}

impl ToA1Notation for CellRange {
    fn to_a1_notation(&self, sheet_name: Option<&str>) -> A1Notation {
        with_sheet(
            sheet_name,
            format!(
                "{}{}:{}{}",
                self.start.col, self.start.row, self.end.col, self.end.row
            ),
        )
    }
}
