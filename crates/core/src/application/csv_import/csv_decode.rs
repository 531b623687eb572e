use error_stack::ResultExt;
use thiserror::Error;

use crate::domain::{RaggedRowPolicy, Table};

const UTF8_BOM: char = '\u{feff}';

#[derive(Error, Debug)]
pub enum CsvDecodeError {
    #[error("Attachment is not valid UTF-8")]
    InvalidUtf8,
    #[error("Malformed CSV")]
    MalformedCsv,
    #[error("CSV rows have inconsistent widths")]
    RaggedRows,
}

/// Decodes a CSV attachment: UTF-8 text, comma separated, `"` quoted, no header
/// row. Record widths are reconciled according to `policy`.
pub fn decode_csv(
    bytes: &[u8],
    policy: RaggedRowPolicy,
) -> error_stack::Result<Table, CsvDecodeError> {
    let text = std::str::from_utf8(bytes).change_context(CsvDecodeError::InvalidUtf8)?;
    let text = text.strip_prefix(UTF8_BOM).unwrap_or(text);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut records = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record = result
            .change_context(CsvDecodeError::MalformedCsv)
            .attach_printable_lazy(|| format!("while reading record {}", index))?;
        records.push(record.iter().map(str::to_owned).collect::<Vec<_>>());
    }

    Table::from_records(records, policy).change_context(CsvDecodeError::RaggedRows)
}
