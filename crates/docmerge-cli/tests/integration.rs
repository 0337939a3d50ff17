//! Integration tests for docmerge CLI
//!
//! These tests drive the two-step workflow through the command functions:
//! template -> schema workbook -> filled workbook -> ZIP of documents

use std::fs;
use std::io::{Cursor, Read};
use std::path::Path;

use tempfile::TempDir;
use zip::ZipArchive;

use docmerge_cli::{
    apply_overrides, extract_command, generate_command, load_settings, placeholders_command,
    CollisionArg, OutputFormat,
};
use docmerge_core::{MergeError, MergeSettings};
use docmerge_data::{CellValue, DataEngine, SheetWriter};
use docmerge_ooxml::test_utils::{document_text, DocxBuilder};

fn write_template(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("offer.docx");
    let docx = DocxBuilder::new()
        .paragraph("Dear {{ Candidate_Name }},")
        .paragraph("You start on {{ DOJ }}.")
        .footer("{{ Company }}")
        .build();
    fs::write(&path, docx).unwrap();
    path
}

fn read_zip(path: &Path) -> Vec<(String, Vec<u8>)> {
    let bytes = fs::read(path).unwrap();
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

#[test]
fn test_extract_then_generate() {
    let dir = TempDir::new().unwrap();
    let template = write_template(dir.path());

    // Step 1
    let schema = dir.path().join("placeholders.xlsx");
    extract_command(&template, &schema, OutputFormat::Text).unwrap();

    let empty = DataEngine::read_records(&schema, None).unwrap();
    assert_eq!(empty.columns(), &["Candidate_Name", "DOJ", "Company"]);
    assert!(empty.is_empty());

    // The user fills in the schema
    let filled = dir.path().join("filled.xlsx");
    let mut writer = SheetWriter::new().with_header(empty.columns().iter().cloned());
    writer.push_row(vec!["Jane Doe".into(), "2024-05-01".into(), "Acme".into()]);
    writer.push_row(vec!["John/Roe".into(), "2024-06-01".into(), "Acme".into()]);
    writer.write_to_file(&filled).unwrap();

    // Step 2
    let archive = dir.path().join("documents.zip");
    generate_command(&template, &filled, &archive, &MergeSettings::default()).unwrap();

    let entries = read_zip(&archive);
    let names: Vec<&str> = entries.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, vec!["Jane Doe.docx", "JohnRoe.docx"]);
    assert_eq!(
        document_text(&entries[0].1),
        "Dear Jane Doe,\nYou start on 2024-05-01.\n"
    );
}

#[test]
fn test_generate_from_csv() {
    let dir = TempDir::new().unwrap();
    let template = write_template(dir.path());
    let data = dir.path().join("people.csv");
    fs::write(&data, "Candidate_Name,DOJ\nAna,2024-01-02\nAna,2024-03-04\n").unwrap();

    let settings = apply_overrides(
        MergeSettings::default(),
        None,
        None,
        false,
        Some(CollisionArg::Suffix),
    );
    let archive = dir.path().join("out.zip");
    generate_command(&template, &data, &archive, &settings).unwrap();

    let names: Vec<String> = read_zip(&archive).into_iter().map(|(n, _)| n).collect();
    assert_eq!(names, vec!["Ana.docx", "Ana_2.docx"]);
}

#[test]
fn test_generate_strict_failure_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let template = write_template(dir.path());
    let data = dir.path().join("people.csv");
    fs::write(&data, "Candidate_Name,DOJ\nAna,2024-01-02\n").unwrap();

    let settings = apply_overrides(MergeSettings::default(), None, None, true, None);
    let archive = dir.path().join("out.zip");
    let err = generate_command(&template, &data, &archive, &settings).unwrap_err();

    let merge_error = err.downcast_ref::<MergeError>().unwrap();
    assert_eq!(merge_error.row(), Some(1));
    assert!(!archive.exists());
}

#[test]
fn test_generate_reads_named_sheet() {
    let dir = TempDir::new().unwrap();
    let template = write_template(dir.path());
    let data = dir.path().join("people.xlsx");
    let mut writer = SheetWriter::new()
        .with_sheet_name("Staff")
        .with_header(["Employee", "DOJ"]);
    writer.push_row(vec!["Rui".into(), CellValue::Empty]);
    writer.write_to_file(&data).unwrap();

    let settings = apply_overrides(
        MergeSettings::default(),
        Some("Employee".to_string()),
        Some("Staff".to_string()),
        false,
        None,
    );
    let archive = dir.path().join("out.zip");
    generate_command(&template, &data, &archive, &settings).unwrap();

    let entries = read_zip(&archive);
    assert_eq!(entries[0].0, "Rui.docx");
    assert_eq!(document_text(&entries[0].1), "Dear ,\nYou start on .\n");
}

#[test]
fn test_missing_template() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.docx");

    let err = placeholders_command(&missing, OutputFormat::Json).unwrap_err();
    assert!(err.to_string().contains("Template file not found"));
}

#[test]
fn test_invalid_template() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("notes.docx");
    fs::write(&path, "just text").unwrap();

    let err = placeholders_command(&path, OutputFormat::Text).unwrap_err();
    assert!(err.to_string().contains("Failed to read placeholders"));
}

#[test]
fn test_unsupported_data_format() {
    let dir = TempDir::new().unwrap();
    let template = write_template(dir.path());
    let data = dir.path().join("people.ods");
    fs::write(&data, "x").unwrap();

    let archive = dir.path().join("out.zip");
    let err =
        generate_command(&template, &data, &archive, &MergeSettings::default()).unwrap_err();
    assert!(format!("{:#}", err).contains("Unsupported table format"));
}

#[test]
fn test_load_explicit_config() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("merge.toml");
    fs::write(
        &config,
        "name_column = \"Employee\"\non_collision = \"suffix\"\n\n[output]\narchive_file = \"letters.zip\"\n",
    )
    .unwrap();

    let settings = load_settings(Some(&config)).unwrap();
    assert_eq!(settings.name_column, "Employee");
    assert_eq!(settings.output.archive_file, "letters.zip");

    let missing = load_settings(Some(&dir.path().join("absent.toml")));
    assert!(missing.is_err());
}
