//! End-to-end tests: extract, export, fill in, render.

use std::io::{Cursor, Read};

use zip::ZipArchive;

use docmerge_core::{
    export_schema, extract_placeholders, generate_documents, MergeError, MergeSettings,
    MissingValuePolicy,
};
use docmerge_data::{CellValue, DataEngine, Record, RecordTable, SheetWriter, TableFormat};
use docmerge_ooxml::test_utils::{document_text, extract_document_xml, DocxBuilder};
use docmerge_ooxml::OoxmlError;

fn offer_letter() -> Vec<u8> {
    DocxBuilder::new()
        .paragraph("Dear {{ Candidate_Name }},")
        .paragraph("Your salary will be {{ Salary }} from {{ DOJ }}.")
        .paragraph("Regards, {{ Company }}")
        .header("{{ Company }} confidential")
        .build()
}

fn unzip(bytes: &[u8]) -> Vec<(String, Vec<u8>)> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    (0..archive.len())
        .map(|i| {
            let mut file = archive.by_index(i).unwrap();
            let mut content = Vec::new();
            file.read_to_end(&mut content).unwrap();
            (file.name().to_string(), content)
        })
        .collect()
}

fn names_table(names: &[&str]) -> RecordTable {
    let mut table = RecordTable::new(vec!["Candidate_Name".into(), "Company".into()]);
    for name in names {
        table.push_values(vec![CellValue::from(*name), "Acme".into()]);
    }
    table
}

#[test]
fn test_repeated_placeholder_extracted_once() {
    let docx = DocxBuilder::new()
        .paragraph("{{A}} then {{B}}")
        .paragraph("and {{A}} again")
        .build();
    assert_eq!(extract_placeholders(&docx).unwrap(), vec!["A", "B"]);
}

#[test]
fn test_split_run_placeholder_extracted() {
    let docx = DocxBuilder::new()
        .raw_paragraph(
            "<w:r><w:t>{</w:t></w:r><w:r><w:t>{ Candidate_</w:t></w:r>\
             <w:r><w:rPr><w:b/></w:rPr><w:t>Name }}</w:t></w:r>",
        )
        .build();
    assert_eq!(extract_placeholders(&docx).unwrap(), vec!["Candidate_Name"]);
}

#[test]
fn test_unicode_placeholders_extracted_and_rendered() {
    let docx = DocxBuilder::new()
        .paragraph("{{ Zeta }} {{ Straße }} {{ Año }}")
        .build();
    assert_eq!(
        extract_placeholders(&docx).unwrap(),
        vec!["Zeta", "Straße", "Año"]
    );

    let mut table = RecordTable::new(vec!["Straße".into(), "Año".into()]);
    table.push_values(vec!["Ringstraße".into(), CellValue::Int(2024)]);
    let bundle = generate_documents(&docx, &table, MergeSettings::default()).unwrap();
    assert_eq!(
        document_text(bundle.get("Candidate_1.docx").unwrap()),
        " Ringstraße 2024\n"
    );
}

#[test]
fn test_control_character_in_value_fails_row() {
    let template = DocxBuilder::new().paragraph("{{ Company }}").build();
    let mut table = RecordTable::new(vec!["Candidate_Name".into(), "Company".into()]);
    table.push_values(vec!["Ana".into(), "Acme".into()]);
    table.push_values(vec!["Bruno".into(), "Acme\u{1}Corp".into()]);

    let err = generate_documents(&template, &table, MergeSettings::default()).unwrap_err();
    assert!(matches!(
        err,
        MergeError::Render {
            row: 2,
            source: OoxmlError::MalformedOutput { .. }
        }
    ));
}

#[test]
fn test_header_placeholders_follow_body() {
    let docx = DocxBuilder::new()
        .paragraph("{{ Body }}")
        .header("{{ Top }} {{ Body }}")
        .footer("{{ Bottom }}")
        .build();
    assert_eq!(
        extract_placeholders(&docx).unwrap(),
        vec!["Body", "Top", "Bottom"]
    );
}

#[test]
fn test_full_round_trip() {
    let template = offer_letter();

    // Step 1: the schema the user receives
    let placeholders = extract_placeholders(&template).unwrap();
    assert_eq!(
        placeholders,
        vec!["Candidate_Name", "Salary", "DOJ", "Company"]
    );
    let schema = export_schema(&placeholders).unwrap();
    let empty = DataEngine::read_records_from_bytes(schema, TableFormat::Xlsx, None).unwrap();
    assert_eq!(empty.columns(), placeholders.as_slice());
    assert!(empty.is_empty());

    // The user fills in one row
    let mut writer = SheetWriter::new().with_header(placeholders.iter().cloned());
    writer.push_row(vec![
        "Jane Doe".into(),
        CellValue::Float(5000.0),
        "2024-05-01".into(),
        "Smith & <Sons>".into(),
    ]);
    let filled = writer.to_bytes().unwrap();

    // Step 2: render
    let table = DataEngine::read_records_from_bytes(filled, TableFormat::Xlsx, None).unwrap();
    let bundle = generate_documents(&template, &table, MergeSettings::default()).unwrap();
    let entries = unzip(&bundle.to_zip_bytes().unwrap());

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].0, "Jane Doe.docx");

    let docx = &entries[0].1;
    let text = document_text(docx);
    assert_eq!(
        text,
        "Dear Jane Doe,\nYour salary will be 5000 from 2024-05-01.\nRegards, Smith & <Sons>\n"
    );
    let xml = extract_document_xml(docx);
    assert!(!xml.contains("{{"));
    assert!(!xml.contains("}}"));
}

#[test]
fn test_distinct_names_one_entry_each() {
    let template = offer_letter();
    let bundle = generate_documents(
        &template,
        &names_table(&["Ana", "Bruno", "Carla"]),
        MergeSettings::default(),
    )
    .unwrap();

    let names: Vec<String> = unzip(&bundle.to_zip_bytes().unwrap())
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    assert_eq!(names, vec!["Ana.docx", "Bruno.docx", "Carla.docx"]);
}

#[test]
fn test_colliding_names_later_row_wins() {
    let template = DocxBuilder::new().paragraph("{{ Company }}").build();
    let mut table = RecordTable::new(vec!["Candidate_Name".into(), "Company".into()]);
    table.push_values(vec!["Jane".into(), "First".into()]);
    table.push_values(vec!["John".into(), "Other".into()]);
    table.push_values(vec!["  Jane  ".into(), "Second".into()]);

    let bundle = generate_documents(&template, &table, MergeSettings::default()).unwrap();
    assert_eq!(bundle.len(), 2);
    assert_eq!(document_text(bundle.get("Jane.docx").unwrap()), "Second\n");
}

#[test]
fn test_filenames_sanitized_with_fallback() {
    let template = offer_letter();
    let bundle = generate_documents(
        &template,
        &names_table(&["John/Doe?!", "  Jane  ", "", "?!"]),
        MergeSettings::default(),
    )
    .unwrap();

    assert_eq!(
        bundle.names().collect::<Vec<_>>(),
        vec!["JohnDoe.docx", "Jane.docx", "Candidate_3.docx", "Candidate_4.docx"]
    );
}

#[test]
fn test_missing_name_column_uses_fallback() {
    let template = offer_letter();
    let mut table = RecordTable::new(vec!["Company".into()]);
    table.push_values(vec!["Acme".into()]);

    let bundle = generate_documents(&template, &table, MergeSettings::default()).unwrap();
    assert_eq!(bundle.names().collect::<Vec<_>>(), vec!["Candidate_1.docx"]);
}

#[test]
fn test_missing_cells_render_empty() {
    let template = offer_letter();
    let mut table = RecordTable::new(vec![
        "Candidate_Name".into(),
        "Salary".into(),
        "DOJ".into(),
    ]);
    table.push_values(vec!["Jane".into(), CellValue::Float(f64::NAN)]);

    let bundle = generate_documents(&template, &table, MergeSettings::default()).unwrap();
    let text = document_text(bundle.get("Jane.docx").unwrap());

    assert_eq!(text, "Dear Jane,\nYour salary will be  from .\nRegards, \n");
    assert!(!text.contains("null"));
    assert!(!text.contains("NaN"));
    assert!(!text.contains("none"));
}

#[test]
fn test_failing_row_aborts_batch() {
    let template = offer_letter();
    let mut table = RecordTable::new(vec!["Candidate_Name".into(), "Company".into()]);
    table.push(Record::new().with("Candidate_Name", "Ana").with("Company", "Acme"));
    table.push(Record::new().with("Candidate_Name", "Bruno"));
    table.push(Record::new().with("Candidate_Name", "Carla").with("Company", "Acme"));

    let settings = MergeSettings {
        missing_values: MissingValuePolicy::Strict,
        ..Default::default()
    };

    // Salary and DOJ are missing on every row; strict mode fails on row 1
    let err = generate_documents(&template, &table, settings.clone()).unwrap_err();
    assert_eq!(err.row(), Some(1));

    let template = DocxBuilder::new().paragraph("{{ Company }}").build();
    let err = generate_documents(&template, &table, settings).unwrap_err();
    assert!(matches!(err, MergeError::Render { row: 2, .. }));
}

#[test]
fn test_malformed_template_is_template_error() {
    let err = generate_documents(b"not a docx", &names_table(&["Ana"]), MergeSettings::default())
        .unwrap_err();
    assert!(matches!(err, MergeError::Template(_)));
}

#[test]
fn test_template_bytes_unchanged_between_rows() {
    let template = DocxBuilder::new().paragraph("Hello {{ Candidate_Name }}").build();
    let original = template.clone();

    let bundle = generate_documents(
        &template,
        &names_table(&["Ana", "Bruno"]),
        MergeSettings::default(),
    )
    .unwrap();

    assert_eq!(template, original);
    assert_eq!(document_text(bundle.get("Ana.docx").unwrap()), "Hello Ana\n");
    assert_eq!(document_text(bundle.get("Bruno.docx").unwrap()), "Hello Bruno\n");
}
