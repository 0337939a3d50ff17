//! Record tables: a header plus one record per data row.

use crate::value::CellValue;

/// One data row, keyed by column name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    cells: Vec<(String, CellValue)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, column: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.insert(column, value);
        self
    }

    /// Set a column's value, replacing an earlier value for the same column
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<CellValue>) {
        let column = column.into();
        let value = value.into();
        match self.cells.iter_mut().find(|(name, _)| *name == column) {
            Some(cell) => cell.1 = value,
            None => self.cells.push((column, value)),
        }
    }

    /// Value of a column, if the record has that column
    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Cells in column order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.cells.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// True when every cell is empty
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|(_, value)| value.is_empty())
    }
}

/// A header row and the records below it
///
/// Records built from a grid carry every header column. Records pushed
/// directly may carry more or fewer columns than the header; nothing checks
/// them against it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordTable {
    columns: Vec<String>,
    rows: Vec<Record>,
}

impl RecordTable {
    /// Empty table with the given header
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a table from raw rows, the first row being the header
    ///
    /// Trailing blank header cells are dropped, as are rows where every cell
    /// is blank. Short rows are padded with [`CellValue::Empty`]; cells
    /// beyond the header are ignored.
    pub fn from_grid(grid: Vec<Vec<CellValue>>) -> Self {
        let mut grid = grid.into_iter();
        let Some(header) = grid.next() else {
            return Self::default();
        };

        let mut columns: Vec<String> = header.iter().map(CellValue::to_context_string).collect();
        while columns.last().is_some_and(|c| c.trim().is_empty()) {
            columns.pop();
        }

        let mut table = Self::new(columns);
        let mut skipped = 0;
        for row in grid {
            if row.iter().all(CellValue::is_empty) {
                skipped += 1;
                continue;
            }
            table.push_values(row);
        }

        if skipped > 0 {
            tracing::debug!(skipped, "skipped blank rows");
        }
        table
    }

    /// Append a row given positionally, matched against the header
    pub fn push_values(&mut self, values: Vec<CellValue>) {
        if values.len() > self.columns.len() {
            tracing::debug!(
                extra = values.len() - self.columns.len(),
                "ignoring cells beyond the header"
            );
        }

        let mut values = values.into_iter();
        let cells = self
            .columns
            .iter()
            .map(|column| (column.clone(), values.next().unwrap_or_default()))
            .collect();
        self.rows.push(Record { cells });
    }

    /// Append a record as-is
    pub fn push(&mut self, record: Record) {
        self.rows.push(record);
    }

    /// Header names, in sheet order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.rows.iter()
    }
}

impl<'a> IntoIterator for &'a RecordTable {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
