//! Step one: placeholder extraction and schema export.

use docmerge_data::schema_workbook;
use docmerge_ooxml::DocxTemplate;

use crate::error::Result;

/// Placeholder names of a template, deduplicated in first-seen order
///
/// The body comes first, then headers, then footers.
pub fn extract_placeholders(template: &[u8]) -> Result<Vec<String>> {
    let names = DocxTemplate::from_bytes(template)?.placeholders()?;
    tracing::debug!(count = names.len(), "extracted placeholders");
    Ok(names)
}

/// A workbook whose header row is `placeholders`, with no data rows
pub fn export_schema(placeholders: &[String]) -> Result<Vec<u8>> {
    Ok(schema_workbook(placeholders)?)
}
