//! Typed cell values and their text form.

use std::fmt;

/// A single cell of a record table
///
/// Spreadsheets hand back typed cells; the template engine only substitutes
/// text. [`CellValue::to_context_string`] is the one place that decides how
/// each type is spelled.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    /// Blank or missing cell
    #[default]
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Date or time, already formatted
    DateTime(String),
}

impl CellValue {
    /// True for blank cells and empty text
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) | CellValue::DateTime(s) => s.is_empty(),
            _ => false,
        }
    }

    /// The text substituted for this cell in a template
    ///
    /// Blank cells become an empty string. Floats with an integral value are
    /// written without a fractional part; a non-finite float is treated as
    /// blank.
    pub fn to_context_string(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) | CellValue::DateTime(s) => s.clone(),
            CellValue::Int(i) => i.to_string(),
            CellValue::Float(f) => format_float(*f),
            CellValue::Bool(b) => b.to_string(),
        }
    }
}

fn format_float(f: f64) -> String {
    if !f.is_finite() {
        String::new()
    } else if f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{:.0}", f)
    } else {
        f.to_string()
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_context_string())
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Float(f)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(CellValue::Empty, Into::into)
    }
}
