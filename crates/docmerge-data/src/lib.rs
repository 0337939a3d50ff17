//! # docmerge-data
//!
//! Record tables for docmerge: read a filled-in schema back from Excel or
//! CSV, and write blank schema workbooks.
//!
//! ## Features
//!
//! - **Excel Support**: Read `.xlsx` sheets using `calamine`
//! - **CSV Support**: Comma, tab and semicolon separated text
//! - **Schema Workbooks**: Write a header-only `.xlsx` for a list of columns
//!
//! ## Example
//!
//! ```rust,ignore
//! use docmerge_data::{schema_workbook, DataEngine};
//!
//! let bytes = schema_workbook(&["Candidate_Name".into(), "DOJ".into()])?;
//! std::fs::write("schema.xlsx", bytes)?;
//!
//! // ... the user fills in the workbook ...
//! let table = DataEngine::read_records("schema.xlsx", None)?;
//! for record in &table {
//!     println!("{:?}", record.get("Candidate_Name"));
//! }
//! ```

pub mod error;
pub mod sources;
pub mod table;
pub mod value;
pub mod writer;

use std::fs;
use std::path::Path;

// Re-exports
pub use error::{DataError, Result};
pub use sources::{
    source_from_bytes, CsvOptions, CsvSource, ExcelSource, RecordSource, TableFormat,
};
pub use table::{Record, RecordTable};
pub use value::CellValue;
pub use writer::{schema_workbook, SheetWriter, DEFAULT_SHEET_NAME};

/// Data engine for reading record tables
pub struct DataEngine;

impl DataEngine {
    /// Read a record table from a file, picking the reader by extension
    ///
    /// # Arguments
    /// * `path` - Path to an `.xlsx`, `.csv` or `.tsv` file
    /// * `sheet` - Sheet name for workbooks (first sheet if None)
    pub fn read_records(path: impl AsRef<Path>, sheet: Option<&str>) -> Result<RecordTable> {
        let path = path.as_ref();
        let format = TableFormat::from_path(path)?;
        if !path.exists() {
            return Err(DataError::FileNotFound(path.display().to_string()));
        }

        tracing::debug!(path = %path.display(), ?format, "reading records");
        let bytes = fs::read(path)?;
        Self::read_records_from_bytes(bytes, format, sheet)
    }

    /// Read a record table from bytes already in memory
    pub fn read_records_from_bytes(
        bytes: Vec<u8>,
        format: TableFormat,
        sheet: Option<&str>,
    ) -> Result<RecordTable> {
        source_from_bytes(bytes, format, sheet)?.read_table()
    }
}
