//! Record sources.
//!
//! This module contains adapters for the table formats a filled-in schema can
//! come back as (Excel, CSV).

pub mod csv;
pub mod excel;

pub use self::csv::{CsvOptions, CsvSource};
pub use self::excel::ExcelSource;

use std::path::Path;

use crate::error::{DataError, Result};
use crate::table::RecordTable;

/// Trait for sources that can provide a record table
pub trait RecordSource {
    /// Read the whole table; the first row is the header
    fn read_table(&self) -> Result<RecordTable>;
}

/// Table formats recognised by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Xlsx,
    Csv,
    Tsv,
}

impl TableFormat {
    /// Detect the format from a file extension (case-insensitive)
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "xlsx" | "xlsm" => Ok(TableFormat::Xlsx),
            "csv" => Ok(TableFormat::Csv),
            "tsv" | "tab" => Ok(TableFormat::Tsv),
            _ => Err(DataError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Open a record source for in-memory table bytes
///
/// `sheet` only applies to workbooks.
pub fn source_from_bytes(
    bytes: Vec<u8>,
    format: TableFormat,
    sheet: Option<&str>,
) -> Result<Box<dyn RecordSource>> {
    Ok(match format {
        TableFormat::Xlsx => {
            let source = ExcelSource::from_bytes(bytes)?;
            match sheet {
                Some(sheet) => Box::new(source.with_sheet(sheet)),
                None => Box::new(source),
            }
        }
        TableFormat::Csv => Box::new(CsvSource::from_bytes(bytes, CsvOptions::default())),
        TableFormat::Tsv => Box::new(CsvSource::from_bytes(bytes, CsvOptions::tsv())),
    })
}
