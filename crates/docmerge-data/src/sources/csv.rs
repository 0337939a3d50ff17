//! CSV data source.

use std::fs;
use std::path::Path;

use crate::error::{DataError, Result};
use crate::sources::RecordSource;
use crate::table::RecordTable;
use crate::value::CellValue;

/// Options for CSV parsing
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Field delimiter (default: comma)
    pub delimiter: u8,
    /// Whether the CSV has a header row
    pub has_header: bool,
    /// Quote character (default: double quote)
    pub quote: u8,
    /// Whether to trim whitespace from fields
    pub trim: bool,
    /// Whether to allow flexible column counts
    pub flexible: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            has_header: true,
            quote: b'"',
            trim: true,
            flexible: true,
        }
    }
}

impl CsvOptions {
    /// Create options for tab-separated values (TSV)
    pub fn tsv() -> Self {
        Self {
            delimiter: b'\t',
            ..Default::default()
        }
    }

    /// Create options for semicolon-separated values (common in European locales)
    pub fn semicolon() -> Self {
        Self {
            delimiter: b';',
            ..Default::default()
        }
    }

    /// Create options without header row
    ///
    /// Columns are then named `Column1`, `Column2`, …
    pub fn without_header() -> Self {
        Self {
            has_header: false,
            ..Default::default()
        }
    }
}

/// CSV data source
pub struct CsvSource {
    /// Raw file contents
    bytes: Vec<u8>,
    /// Parsing options
    options: CsvOptions,
}

impl CsvSource {
    /// Create a new CSV source from a file path
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_options(path, CsvOptions::default())
    }

    /// Create a new CSV source with custom options
    pub fn with_options(path: impl AsRef<Path>, options: CsvOptions) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DataError::FileNotFound(path.display().to_string()));
        }

        Ok(Self::from_bytes(fs::read(path)?, options))
    }

    /// Create a source from CSV text held in memory
    pub fn from_bytes(bytes: Vec<u8>, options: CsvOptions) -> Self {
        Self { bytes, options }
    }

    /// Read all data from the CSV, header included
    pub fn read_all(&self) -> Result<Vec<Vec<String>>> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(self.options.delimiter)
            .quote(self.options.quote)
            .has_headers(false) // We handle headers ourselves
            .trim(if self.options.trim {
                csv::Trim::All
            } else {
                csv::Trim::None
            })
            .flexible(self.options.flexible)
            .from_reader(self.bytes.as_slice());

        let mut result = Vec::new();

        for record in csv_reader.records() {
            let record = record?;
            let row: Vec<String> = record.iter().map(|s| s.to_string()).collect();
            result.push(row);
        }

        Ok(result)
    }
}

impl RecordSource for CsvSource {
    fn read_table(&self) -> Result<RecordTable> {
        let mut grid: Vec<Vec<CellValue>> = self
            .read_all()?
            .into_iter()
            .map(|row| row.into_iter().map(text_cell).collect())
            .collect();

        if !self.options.has_header {
            let width = grid.iter().map(Vec::len).max().unwrap_or(0);
            let header = (1..=width)
                .map(|i| CellValue::Text(format!("Column{}", i)))
                .collect();
            grid.insert(0, header);
        }

        let table = RecordTable::from_grid(grid);
        tracing::debug!(rows = table.len(), "read CSV records");
        Ok(table)
    }
}

fn text_cell(field: String) -> CellValue {
    if field.is_empty() {
        CellValue::Empty
    } else {
        CellValue::Text(field)
    }
}
