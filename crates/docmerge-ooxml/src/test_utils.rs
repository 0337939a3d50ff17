//! Shared test utilities for docmerge-ooxml
//!
//! In-memory DOCX fixtures for this crate's tests and, behind the
//! `test-utils` feature, for the tests of dependent crates.

use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::CompressionMethod;
use zip::ZipWriter;

use crate::archive::OoxmlArchive;
use crate::placeholder::visible_text;

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Builds a minimal but valid DOCX package
///
/// # Example
/// ```ignore
/// use docmerge_ooxml::test_utils::DocxBuilder;
/// let docx = DocxBuilder::new()
///     .paragraph("Dear {{ Candidate_Name }},")
///     .header("{{ Company }}")
///     .build();
/// ```
#[derive(Debug, Default, Clone)]
pub struct DocxBuilder {
    paragraphs: Vec<String>,
    headers: Vec<String>,
    footers: Vec<String>,
}

impl DocxBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a body paragraph holding a single run of (escaped) text
    pub fn paragraph(mut self, text: &str) -> Self {
        self.paragraphs.push(text_paragraph(text));
        self
    }

    /// Add a body paragraph from raw run XML (the content of `<w:p>`)
    pub fn raw_paragraph(mut self, runs_xml: &str) -> Self {
        self.paragraphs.push(format!("<w:p>{}</w:p>", runs_xml));
        self
    }

    /// Add a header part with one paragraph of text
    pub fn header(mut self, text: &str) -> Self {
        self.headers.push(text_paragraph(text));
        self
    }

    /// Add a footer part with one paragraph of text
    pub fn footer(mut self, text: &str) -> Self {
        self.footers.push(text_paragraph(text));
        self
    }

    /// Produce the DOCX bytes
    pub fn build(&self) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        let mut zip = ZipWriter::new(&mut buffer);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

        // [Content_Types].xml
        let mut content_types = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
"#,
        );
        for i in 1..=self.headers.len() {
            content_types.push_str(&format!(
                "  <Override PartName=\"/word/header{}.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.wordprocessingml.header+xml\"/>\n",
                i
            ));
        }
        for i in 1..=self.footers.len() {
            content_types.push_str(&format!(
                "  <Override PartName=\"/word/footer{}.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml\"/>\n",
                i
            ));
        }
        content_types.push_str("</Types>");
        zip.start_file("[Content_Types].xml", options).unwrap();
        zip.write_all(content_types.as_bytes()).unwrap();

        // _rels/.rels
        zip.start_file("_rels/.rels", options).unwrap();
        zip.write_all(
            br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#,
        )
        .unwrap();

        // word/_rels/document.xml.rels and section references
        let mut rels = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
"#,
        );
        let mut section = String::from("<w:sectPr>");
        let mut rel_id = 1;
        for i in 1..=self.headers.len() {
            rels.push_str(&format!(
                "  <Relationship Id=\"rId{}\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/header\" Target=\"header{}.xml\"/>\n",
                rel_id, i
            ));
            if i == 1 {
                section.push_str(&format!(
                    "<w:headerReference w:type=\"default\" r:id=\"rId{}\"/>",
                    rel_id
                ));
            }
            rel_id += 1;
        }
        for i in 1..=self.footers.len() {
            rels.push_str(&format!(
                "  <Relationship Id=\"rId{}\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer\" Target=\"footer{}.xml\"/>\n",
                rel_id, i
            ));
            if i == 1 {
                section.push_str(&format!(
                    "<w:footerReference w:type=\"default\" r:id=\"rId{}\"/>",
                    rel_id
                ));
            }
            rel_id += 1;
        }
        rels.push_str("</Relationships>");
        section.push_str("</w:sectPr>");
        zip.start_file("word/_rels/document.xml.rels", options)
            .unwrap();
        zip.write_all(rels.as_bytes()).unwrap();

        // word/document.xml
        let document = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n<w:document xmlns:w=\"{}\" xmlns:r=\"{}\"><w:body>{}{}</w:body></w:document>",
            W_NS,
            R_NS,
            self.paragraphs.concat(),
            section
        );
        zip.start_file("word/document.xml", options).unwrap();
        zip.write_all(document.as_bytes()).unwrap();

        for (i, body) in self.headers.iter().enumerate() {
            let header = format!(
                "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n<w:hdr xmlns:w=\"{}\">{}</w:hdr>",
                W_NS, body
            );
            zip.start_file(format!("word/header{}.xml", i + 1), options)
                .unwrap();
            zip.write_all(header.as_bytes()).unwrap();
        }

        for (i, body) in self.footers.iter().enumerate() {
            let footer = format!(
                "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n<w:ftr xmlns:w=\"{}\">{}</w:ftr>",
                W_NS, body
            );
            zip.start_file(format!("word/footer{}.xml", i + 1), options)
                .unwrap();
            zip.write_all(footer.as_bytes()).unwrap();
        }

        zip.finish().unwrap();
        buffer.into_inner()
    }
}

fn text_paragraph(text: &str) -> String {
    format!(
        "<w:p><w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>",
        escape_xml(text)
    )
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// A package that is a valid ZIP but has no main document part
pub fn create_package_without_document() -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    let mut zip = ZipWriter::new(&mut buffer);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    zip.start_file("[Content_Types].xml", options).unwrap();
    zip.write_all(br#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#)
        .unwrap();

    zip.finish().unwrap();
    buffer.into_inner()
}

/// Extract document.xml content from a DOCX byte array
pub fn extract_document_xml(docx: &[u8]) -> String {
    let archive = OoxmlArchive::from_bytes(docx).unwrap();
    archive.get_string("word/document.xml").unwrap()
}

/// Visible text of the main document part, one line per paragraph
pub fn document_text(docx: &[u8]) -> String {
    let archive = OoxmlArchive::from_bytes(docx).unwrap();
    visible_text(archive.document_xml().unwrap()).unwrap()
}
