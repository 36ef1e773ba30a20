use std::io;

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::error::DataError;

// Both header and cell whitespace is trimmed so names line up across files.
pub(crate) fn csv_reader<R: io::Read>(reader: R) -> csv::Reader<R> {
    ReaderBuilder::new().trim(Trim::All).from_reader(reader)
}

pub(crate) fn require_columns(
    headers: &StringRecord,
    table: &'static str,
    columns: &[&'static str],
) -> Result<(), DataError> {
    for column in columns {
        if !headers.iter().any(|h| h == *column) {
            return Err(DataError::MissingColumn { table, column });
        }
    }
    Ok(())
}
