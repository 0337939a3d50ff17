//! DOCX templates with `{{ placeholder }}` markers
//!
//! A [`DocxTemplate`] is a render instance: [`DocxTemplate::render`] rewrites
//! its parts in place, so an instance renders exactly one record. Open a new
//! instance from the original bytes for every record.
//!
//! # Example
//!
//! ```no_run
//! use std::collections::BTreeMap;
//! use docmerge_ooxml::{DocxTemplate, MissingValuePolicy};
//!
//! let bytes = std::fs::read("offer-letter.docx")?;
//! let names = DocxTemplate::from_bytes(&bytes)?.placeholders()?;
//! println!("placeholders: {:?}", names);
//!
//! let mut context = BTreeMap::new();
//! context.insert("Candidate_Name", "Jane Doe");
//!
//! let mut instance = DocxTemplate::from_bytes(&bytes)?;
//! instance.render(&context, MissingValuePolicy::Empty)?;
//! std::fs::write("Jane Doe.docx", instance.into_bytes()?)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::path::Path;

use minijinja::{AutoEscape, Environment, UndefinedBehavior};
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::{Deserialize, Serialize};

use crate::archive::OoxmlArchive;
use crate::error::{OoxmlError, Result};
use crate::placeholder::{dedup_preserving_order, has_template_syntax, patch_if_needed, scan_names};

/// What to do with a placeholder that has no value in the render context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingValuePolicy {
    /// Render it as an empty string
    #[default]
    Empty,
    /// Fail the render
    Strict,
}

impl MissingValuePolicy {
    fn undefined_behavior(self) -> UndefinedBehavior {
        match self {
            MissingValuePolicy::Empty => UndefinedBehavior::Lenient,
            MissingValuePolicy::Strict => UndefinedBehavior::Strict,
        }
    }
}

/// A Word document whose parts carry template markers
#[derive(Debug, Clone)]
pub struct DocxTemplate {
    /// The underlying OOXML archive
    archive: OoxmlArchive,
    /// Parts scanned and rendered, in order
    parts: Vec<String>,
}

impl DocxTemplate {
    /// Load a template from a file path
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_archive(OoxmlArchive::open(path)?)
    }

    /// Load a template from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_archive(OoxmlArchive::from_bytes(bytes)?)
    }

    /// Wrap an already unpacked archive
    ///
    /// Fails if the archive has no `word/document.xml`.
    pub fn from_archive(archive: OoxmlArchive) -> Result<Self> {
        archive.document_xml()?;
        let parts = archive.template_parts();
        Ok(Self { archive, parts })
    }

    /// Parts that are scanned for placeholders, in scan order
    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// Get a reference to the underlying archive
    pub fn archive(&self) -> &OoxmlArchive {
        &self.archive
    }

    /// Names of all variables the template references
    ///
    /// The template engine decides which names are variables; they are
    /// reported in order of first appearance across parts. Names only used
    /// inside block statements come after the directly substituted ones of
    /// the same part, sorted.
    pub fn placeholders(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();

        for part in &self.parts {
            let xml = self.part_text(part)?;
            let patched = patch_if_needed(&xml);
            if !has_template_syntax(&patched) {
                continue;
            }

            let env = environment(MissingValuePolicy::Empty);
            let template = env
                .template_from_str(&patched)
                .map_err(|e| syntax_error(part, e))?;
            let declared = template.undeclared_variables(false);

            let mut ordered: Vec<String> = scan_names(&patched)
                .into_iter()
                .filter(|name| declared.contains(name))
                .collect();
            let mut remaining: Vec<String> = declared
                .into_iter()
                .filter(|name| !ordered.contains(name))
                .collect();
            remaining.sort();
            ordered.extend(remaining);

            tracing::debug!(part = %part, count = ordered.len(), "scanned part");
            names.extend(ordered);
        }

        Ok(dedup_preserving_order(names))
    }

    /// Substitute `context` into every template part
    ///
    /// Values are XML-escaped. Each rendered part is checked for
    /// well-formedness before it replaces the original.
    pub fn render<S>(&mut self, context: &S, policy: MissingValuePolicy) -> Result<()>
    where
        S: Serialize + ?Sized,
    {
        for part in &self.parts {
            let xml = self.part_text(part)?;
            let patched = patch_if_needed(&xml);
            if !has_template_syntax(&patched) {
                continue;
            }

            let env = environment(policy);
            let template = env
                .template_from_str(&patched)
                .map_err(|e| syntax_error(part, e))?;
            let rendered = template.render(context).map_err(|e| OoxmlError::Render {
                part: part.clone(),
                message: e.to_string(),
            })?;
            check_well_formed(part, &rendered)?;

            tracing::debug!(part = %part, "rendered part");
            self.archive.set_string(part.clone(), rendered);
        }

        Ok(())
    }

    /// Serialize the (rendered) package
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        self.archive.to_bytes()
    }

    fn part_text(&self, part: &str) -> Result<String> {
        self.archive
            .get_string(part)
            .ok_or_else(|| OoxmlError::MissingFile(part.to_string()))
    }
}

fn environment<'source>(policy: MissingValuePolicy) -> Environment<'source> {
    let mut env = Environment::new();
    env.set_undefined_behavior(policy.undefined_behavior());
    env.set_auto_escape_callback(|_| AutoEscape::Html);
    env.set_keep_trailing_newline(true);
    env
}

fn syntax_error(part: &str, err: minijinja::Error) -> OoxmlError {
    OoxmlError::TemplateSyntax {
        part: part.to_string(),
        message: err.to_string(),
    }
}

fn check_well_formed(part: &str, xml: &str) -> Result<()> {
    if let Some((offset, c)) = xml.char_indices().find(|(_, c)| !is_xml_char(*c)) {
        return Err(OoxmlError::MalformedOutput {
            part: part.to_string(),
            message: format!("illegal XML character U+{:04X} at byte {}", c as u32, offset),
        });
    }

    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Eof) => return Ok(()),
            Ok(_) => {}
            Err(e) => {
                return Err(OoxmlError::MalformedOutput {
                    part: part.to_string(),
                    message: e.to_string(),
                })
            }
        }
    }
}

/// Characters allowed by the XML 1.0 `Char` production
fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    )
}
