//! Minimal XLSX writer.
//!
//! Produces a single-sheet SpreadsheetML package: a bold header row followed
//! by optional data rows. Strings are written inline so no shared-strings
//! part is needed.

use std::fs;
use std::io::{Cursor, Seek, Write};
use std::path::Path;

use quick_xml::escape::escape;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::error::Result;
use crate::value::CellValue;

/// Name of the only worksheet
pub const DEFAULT_SHEET_NAME: &str = "Sheet1";

/// Style index of the bold header cells in `xl/styles.xml`
const HEADER_STYLE: u32 = 1;

/// Writes a header and rows as an `.xlsx` workbook
#[derive(Debug, Clone)]
pub struct SheetWriter {
    sheet_name: String,
    header: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Default for SheetWriter {
    fn default() -> Self {
        Self {
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            header: Vec::new(),
            rows: Vec::new(),
        }
    }
}

impl SheetWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rename the worksheet
    pub fn with_sheet_name(mut self, name: impl Into<String>) -> Self {
        self.sheet_name = name.into();
        self
    }

    /// Set the header row
    pub fn with_header<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.header = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Append a data row
    pub fn push_row(&mut self, values: Vec<CellValue>) {
        self.rows.push(values);
    }

    /// Generate the workbook as bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        self.write_content_types(&mut zip, options)?;
        self.write_root_rels(&mut zip, options)?;
        self.write_workbook(&mut zip, options)?;
        self.write_workbook_rels(&mut zip, options)?;
        self.write_styles(&mut zip, options)?;
        self.write_sheet(&mut zip, options)?;

        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }

    /// Generate the workbook and write it to a file
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.to_bytes()?)?;
        Ok(())
    }

    /// Write [Content_Types].xml
    fn write_content_types<W: Write + Seek>(
        &self,
        zip: &mut ZipWriter<W>,
        options: SimpleFileOptions,
    ) -> Result<()> {
        zip.start_file("[Content_Types].xml", options)?;

        let content = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
  <Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
  <Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>
</Types>"#;

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    /// Write _rels/.rels
    fn write_root_rels<W: Write + Seek>(
        &self,
        zip: &mut ZipWriter<W>,
        options: SimpleFileOptions,
    ) -> Result<()> {
        zip.start_file("_rels/.rels", options)?;

        let content = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    /// Write xl/workbook.xml
    fn write_workbook<W: Write + Seek>(
        &self,
        zip: &mut ZipWriter<W>,
        options: SimpleFileOptions,
    ) -> Result<()> {
        zip.start_file("xl/workbook.xml", options)?;

        let content = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <sheets>
    <sheet name="{}" sheetId="1" r:id="rId1"/>
  </sheets>
</workbook>"#,
            escape(self.sheet_name.as_str())
        );

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    /// Write xl/_rels/workbook.xml.rels
    fn write_workbook_rels<W: Write + Seek>(
        &self,
        zip: &mut ZipWriter<W>,
        options: SimpleFileOptions,
    ) -> Result<()> {
        zip.start_file("xl/_rels/workbook.xml.rels", options)?;

        let content = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#;

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    /// Write xl/styles.xml (normal and bold fonts)
    fn write_styles<W: Write + Seek>(
        &self,
        zip: &mut ZipWriter<W>,
        options: SimpleFileOptions,
    ) -> Result<()> {
        zip.start_file("xl/styles.xml", options)?;

        let content = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <fonts count="2">
    <font><sz val="11"/><name val="Calibri"/></font>
    <font><b/><sz val="11"/><name val="Calibri"/></font>
  </fonts>
  <fills count="2">
    <fill><patternFill patternType="none"/></fill>
    <fill><patternFill patternType="gray125"/></fill>
  </fills>
  <borders count="1">
    <border><left/><right/><top/><bottom/><diagonal/></border>
  </borders>
  <cellStyleXfs count="1">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0"/>
  </cellStyleXfs>
  <cellXfs count="2">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>
    <xf numFmtId="0" fontId="1" fillId="0" borderId="0" xfId="0" applyFont="1"/>
  </cellXfs>
  <cellStyles count="1">
    <cellStyle name="Normal" xfId="0" builtinId="0"/>
  </cellStyles>
</styleSheet>"#;

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    /// Write xl/worksheets/sheet1.xml
    fn write_sheet<W: Write + Seek>(
        &self,
        zip: &mut ZipWriter<W>,
        options: SimpleFileOptions,
    ) -> Result<()> {
        zip.start_file("xl/worksheets/sheet1.xml", options)?;

        let mut rows = String::new();
        if !self.header.is_empty() {
            rows.push_str("<row r=\"1\">");
            for (col, name) in self.header.iter().enumerate() {
                rows.push_str(&inline_string_cell(&cell_ref(col, 1), name, Some(HEADER_STYLE)));
            }
            rows.push_str("</row>");
        }

        for (i, values) in self.rows.iter().enumerate() {
            let row_number = i as u32 + 2;
            rows.push_str(&format!("<row r=\"{}\">", row_number));
            for (col, value) in values.iter().enumerate() {
                rows.push_str(&value_cell(&cell_ref(col, row_number), value));
            }
            rows.push_str("</row>");
        }

        let content = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <sheetData>{}</sheetData>
</worksheet>"#,
            rows
        );

        zip.write_all(content.as_bytes())?;
        Ok(())
    }
}

/// Workbook with a header row only, one column per name
pub fn schema_workbook(columns: &[String]) -> Result<Vec<u8>> {
    SheetWriter::new().with_header(columns.iter().cloned()).to_bytes()
}

/// Convert a 0-indexed column number to letters (0=A, 25=Z, 26=AA)
pub fn column_letters(index: usize) -> String {
    let mut letters = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

fn cell_ref(col: usize, row: u32) -> String {
    format!("{}{}", column_letters(col), row)
}

fn inline_string_cell(reference: &str, text: &str, style: Option<u32>) -> String {
    let style = style.map(|s| format!(" s=\"{}\"", s)).unwrap_or_default();
    format!(
        "<c r=\"{}\" t=\"inlineStr\"{}><is><t xml:space=\"preserve\">{}</t></is></c>",
        reference,
        style,
        escape(text)
    )
}

fn value_cell(reference: &str, value: &CellValue) -> String {
    match value {
        CellValue::Empty => String::new(),
        CellValue::Text(s) | CellValue::DateTime(s) => inline_string_cell(reference, s, None),
        CellValue::Int(i) => format!("<c r=\"{}\"><v>{}</v></c>", reference, i),
        CellValue::Float(f) if f.is_finite() => {
            format!("<c r=\"{}\"><v>{}</v></c>", reference, f)
        }
        CellValue::Float(_) => String::new(),
        CellValue::Bool(b) => format!("<c r=\"{}\" t=\"b\"><v>{}</v></c>", reference, u8::from(*b)),
    }
}
