//! Error types for OOXML operations

use thiserror::Error;

/// Errors that can occur while reading, rendering or writing a DOCX package
#[derive(Error, Debug)]
pub enum OoxmlError {
    /// Error reading or writing the ZIP archive
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Error reading or writing files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing XML content
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Required file not found in archive
    #[error("Required file not found: {0}")]
    MissingFile(String),

    /// A part contains placeholder syntax the template engine rejects
    #[error("Template syntax error in {part}: {message}")]
    TemplateSyntax { part: String, message: String },

    /// The template engine failed while substituting values
    #[error("Render error in {part}: {message}")]
    Render { part: String, message: String },

    /// A rendered part is no longer well-formed XML
    #[error("Rendered {part} is not well-formed XML: {message}")]
    MalformedOutput { part: String, message: String },
}

impl OoxmlError {
    /// True for errors raised while opening or analysing a template,
    /// as opposed to errors raised while rendering values into it
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            OoxmlError::Archive(_)
                | OoxmlError::Xml(_)
                | OoxmlError::MissingFile(_)
                | OoxmlError::TemplateSyntax { .. }
        )
    }
}

/// Result type for OOXML operations
pub type Result<T> = std::result::Result<T, OoxmlError>;
