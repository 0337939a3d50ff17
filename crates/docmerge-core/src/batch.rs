//! Step two: render one document per record and bundle them.
//!
//! Rows are rendered sequentially in table order. Each row gets a fresh
//! [`DocxTemplate`] opened from the original bytes, so nothing rendered for
//! one row can leak into the next. The first failing row aborts the batch.

use std::collections::BTreeMap;

use docmerge_data::{Record, RecordTable};
use docmerge_ooxml::{DocxTemplate, DOCX_EXTENSION};

use crate::bundle::DocumentBundle;
use crate::config::{CollisionPolicy, MergeSettings};
use crate::error::{MergeError, Result};
use crate::filename::output_stem;

/// Substitution context of one record
pub type RenderContext = BTreeMap<String, String>;

/// Build the substitution context for a record
///
/// Column names are trimmed and blank ones skipped. Values are the cells'
/// text form, so a blank cell becomes `""`.
pub fn build_context(record: &Record) -> RenderContext {
    let mut context = RenderContext::new();
    for (column, value) in record.iter() {
        let key = column.trim();
        if key.is_empty() {
            continue;
        }
        if context
            .insert(key.to_string(), value.to_context_string())
            .is_some()
        {
            tracing::warn!(column = key, "duplicate column, later value wins");
        }
    }
    context
}

/// Renders a template once per record
#[derive(Debug)]
pub struct BatchRenderer<'a> {
    template: &'a [u8],
    settings: MergeSettings,
}

impl<'a> BatchRenderer<'a> {
    /// Check the template and prepare a renderer for it
    ///
    /// Fails with [`MergeError::Template`] if the bytes are not a DOCX
    /// package or a part has malformed template syntax.
    pub fn new(template: &'a [u8], settings: MergeSettings) -> Result<Self> {
        DocxTemplate::from_bytes(template)?.placeholders()?;
        Ok(Self { template, settings })
    }

    pub fn settings(&self) -> &MergeSettings {
        &self.settings
    }

    /// Render every record into a bundle
    ///
    /// No bundle is returned unless every row renders.
    pub fn render(&self, table: &RecordTable) -> Result<DocumentBundle> {
        let mut bundle = DocumentBundle::new();

        for (index, record) in table.iter().enumerate() {
            let row = index + 1;
            let (stem, bytes) = self.render_row(record, row)?;
            self.insert(&mut bundle, stem, bytes, row);
        }

        tracing::debug!(
            rows = table.len(),
            documents = bundle.len(),
            "rendered batch"
        );
        Ok(bundle)
    }

    /// Render a single record, returning its filename stem and DOCX bytes
    ///
    /// `row` is the 1-based ordinal used for error tagging and the fallback
    /// filename.
    pub fn render_row(&self, record: &Record, row: usize) -> Result<(String, Vec<u8>)> {
        let context = build_context(record);
        let stem = output_stem(
            context.get(self.settings.name_column.trim()).map(String::as_str),
            row,
        );

        let render = || -> docmerge_ooxml::Result<Vec<u8>> {
            let mut instance = DocxTemplate::from_bytes(self.template)?;
            instance.render(&context, self.settings.missing_values)?;
            instance.into_bytes()
        };
        let bytes = render().map_err(|source| MergeError::Render { row, source })?;

        tracing::debug!(row, name = %stem, "rendered row");
        Ok((stem, bytes))
    }

    fn insert(&self, bundle: &mut DocumentBundle, stem: String, bytes: Vec<u8>, row: usize) {
        let mut name = entry_name(&stem);
        if bundle.contains(&name) {
            match self.settings.on_collision {
                CollisionPolicy::Overwrite => {
                    tracing::warn!(row, name = %name, "duplicate filename, replacing earlier document");
                }
                CollisionPolicy::Suffix => {
                    let base = format!("{}_{}", stem, row);
                    name = entry_name(&base);
                    let mut attempt = 2;
                    while bundle.contains(&name) {
                        name = entry_name(&format!("{}_{}", base, attempt));
                        attempt += 1;
                    }
                    tracing::warn!(row, name = %name, "duplicate filename, adding row suffix");
                }
            }
        }
        bundle.insert(name, bytes);
    }
}

/// Render `table` against `template` with the given settings
pub fn generate_documents(
    template: &[u8],
    table: &RecordTable,
    settings: MergeSettings,
) -> Result<DocumentBundle> {
    BatchRenderer::new(template, settings)?.render(table)
}

fn entry_name(stem: &str) -> String {
    format!("{}.{}", stem, DOCX_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use docmerge_data::CellValue;
    use docmerge_ooxml::test_utils::{document_text, DocxBuilder};

    fn template() -> Vec<u8> {
        DocxBuilder::new()
            .paragraph("Dear {{ Candidate_Name }}, you join on {{ DOJ }}.")
            .build()
    }

    fn table(rows: &[(&str, &str)]) -> RecordTable {
        let mut table = RecordTable::new(vec!["Candidate_Name".into(), "DOJ".into()]);
        for (name, doj) in rows {
            table.push_values(vec![CellValue::from(*name), CellValue::from(*doj)]);
        }
        table
    }

    #[test]
    fn test_build_context_trims_and_skips() {
        let record = Record::new()
            .with(" Name ", "Jane")
            .with("  ", "ignored")
            .with("Salary", CellValue::Float(10.0))
            .with("Note", CellValue::Empty);

        let context = build_context(&record);
        assert_eq!(context.len(), 3);
        assert_eq!(context["Name"], "Jane");
        assert_eq!(context["Salary"], "10");
        assert_eq!(context["Note"], "");
    }

    #[test]
    fn test_render_row_names_document() {
        let bytes = template();
        let renderer = BatchRenderer::new(&bytes, MergeSettings::default()).unwrap();
        let record = Record::new()
            .with("Candidate_Name", "John/Doe?!")
            .with("DOJ", "2024-05-01");

        let (stem, docx) = renderer.render_row(&record, 1).unwrap();
        assert_eq!(stem, "JohnDoe");
        assert!(document_text(&docx).contains("Dear John/Doe?!, you join on 2024-05-01."));
    }

    #[test]
    fn test_custom_name_column() {
        let bytes = template();
        let settings = MergeSettings {
            name_column: "DOJ".to_string(),
            ..Default::default()
        };
        let bundle = generate_documents(&bytes, &table(&[("Jane", "2024-05-01")]), settings)
            .unwrap();
        assert_eq!(bundle.names().collect::<Vec<_>>(), vec!["2024-05-01.docx"]);
    }

    #[test]
    fn test_overwrite_collision() {
        let bytes = template();
        let bundle = generate_documents(
            &bytes,
            &table(&[("Jane", "first"), ("Jane", "second")]),
            MergeSettings::default(),
        )
        .unwrap();

        assert_eq!(bundle.len(), 1);
        assert_eq!(bundle.replaced(), &["Jane.docx"]);
        let text = document_text(bundle.get("Jane.docx").unwrap());
        assert!(text.contains("second"));
    }

    #[test]
    fn test_suffix_collision() {
        let bytes = template();
        let settings = MergeSettings {
            on_collision: CollisionPolicy::Suffix,
            ..Default::default()
        };
        let bundle = generate_documents(
            &bytes,
            &table(&[("Jane", "a"), ("John", "b"), ("Jane", "c")]),
            settings,
        )
        .unwrap();

        assert_eq!(
            bundle.names().collect::<Vec<_>>(),
            vec!["Jane.docx", "John.docx", "Jane_3.docx"]
        );
        assert!(bundle.replaced().is_empty());
    }

    #[test]
    fn test_suffix_skips_names_already_taken() {
        let bytes = template();
        let settings = MergeSettings {
            on_collision: CollisionPolicy::Suffix,
            ..Default::default()
        };
        let bundle = generate_documents(
            &bytes,
            &table(&[
                ("Jane_3", "first"),
                ("Jane", "second"),
                ("Jane", "third"),
                ("Jane_3", "fourth"),
            ]),
            settings,
        )
        .unwrap();

        assert_eq!(
            bundle.names().collect::<Vec<_>>(),
            vec!["Jane_3.docx", "Jane.docx", "Jane_3_2.docx", "Jane_3_4.docx"]
        );
        assert!(bundle.replaced().is_empty());
        assert!(document_text(bundle.get("Jane_3.docx").unwrap()).contains("first"));
        assert!(document_text(bundle.get("Jane_3_2.docx").unwrap()).contains("third"));
    }

    #[test]
    fn test_rejects_bad_template() {
        let broken = DocxBuilder::new()
            .paragraph("{{ Name ")
            .paragraph("}} {{ }}")
            .build();
        let result = BatchRenderer::new(&broken, MergeSettings::default());
        assert!(matches!(result, Err(MergeError::Template(_))));
    }
}
