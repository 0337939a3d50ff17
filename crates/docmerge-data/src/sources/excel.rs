//! Excel/XLSX data source using calamine.

use std::fs;
use std::io::Cursor;
use std::path::Path;

use calamine::{Data, Reader, Xlsx};
use chrono::NaiveDateTime;

use crate::error::{DataError, Result};
use crate::sources::RecordSource;
use crate::table::RecordTable;
use crate::value::CellValue;

/// Excel workbook data source
///
/// The workbook is held in memory, so a source built from an upload and one
/// built from a path behave the same.
pub struct ExcelSource {
    /// Raw workbook bytes
    bytes: Vec<u8>,
    /// Sheet names cache
    sheet_names: Vec<String>,
    /// Sheet to read; the first sheet when unset
    sheet: Option<String>,
}

impl ExcelSource {
    /// Create a new Excel source from a file path
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DataError::FileNotFound(path.display().to_string()));
        }

        let bytes = fs::read(path)?;
        Self::from_bytes(bytes)
            .map_err(|e| DataError::WorkbookOpen(format!("{}: {}", path.display(), e)))
    }

    /// Create a source from workbook bytes
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let workbook = open(&bytes)?;
        let sheet_names = workbook.sheet_names().to_vec();

        Ok(Self {
            bytes,
            sheet_names,
            sheet: None,
        })
    }

    /// Read the named sheet instead of the first one
    pub fn with_sheet(mut self, sheet: impl Into<String>) -> Self {
        self.sheet = Some(sheet.into());
        self
    }

    /// List the workbook's sheets, in workbook order
    pub fn list_sheets(&self) -> &[String] {
        &self.sheet_names
    }

    /// Get the default sheet name
    pub fn default_sheet(&self) -> Option<&str> {
        self.sheet_names.first().map(String::as_str)
    }

    /// Read every used cell of a sheet, row by row
    pub fn read_grid(&self, sheet: &str) -> Result<Vec<Vec<CellValue>>> {
        if !self.sheet_names.iter().any(|name| name == sheet) {
            return Err(DataError::SheetNotFound(sheet.to_string()));
        }

        let mut workbook = open(&self.bytes)?;
        let range = workbook
            .worksheet_range(sheet)
            .map_err(|e| DataError::SheetNotFound(format!("{}: {}", sheet, e)))?;

        Ok(range
            .rows()
            .map(|row| row.iter().map(cell_value).collect())
            .collect())
    }
}

impl RecordSource for ExcelSource {
    fn read_table(&self) -> Result<RecordTable> {
        let sheet = match (&self.sheet, self.default_sheet()) {
            (Some(sheet), _) => sheet.as_str(),
            (None, Some(first)) => first,
            (None, None) => {
                return Err(DataError::SheetNotFound(
                    "No sheets in workbook".to_string(),
                ))
            }
        };

        let table = RecordTable::from_grid(self.read_grid(sheet)?);
        tracing::debug!(sheet, rows = table.len(), "read Excel records");
        Ok(table)
    }
}

fn open(bytes: &[u8]) -> Result<Xlsx<Cursor<&[u8]>>> {
    Xlsx::new(Cursor::new(bytes)).map_err(|e| DataError::WorkbookOpen(e.to_string()))
}

/// Convert a calamine cell to a record value
fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Error(e) => {
            tracing::warn!(error = ?e, "treating error cell as blank");
            CellValue::Empty
        }
        Data::DateTime(dt) => {
            if dt.is_duration() {
                return CellValue::DateTime(dt.to_string());
            }
            match dt.as_datetime() {
                Some(naive) => CellValue::DateTime(format_datetime(&naive, dt.as_f64())),
                None => CellValue::DateTime(dt.to_string()),
            }
        }
        Data::DateTimeIso(s) => CellValue::DateTime(s.clone()),
        Data::DurationIso(s) => CellValue::DateTime(s.clone()),
    }
}

/// Date-only form when the serial value has no time part
fn format_datetime(naive: &NaiveDateTime, serial: f64) -> String {
    if serial.fract() == 0.0 {
        naive.format("%Y-%m-%d").to_string()
    } else {
        naive.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}
